//! Background sample loader
//!
//! Streams a sample into a [`SharedSample`] on a named worker thread while
//! the UI keeps rendering and playing the prefix that has arrived.
//!
//! # Lifecycle
//!
//! ```text
//! start(path) ──stop+join previous──▶ open source (sync) ──▶ reset buffer ──▶ spawn "sample-loader"
//!                                                                               │
//!          ┌────────────────────────────────────────────────────────────────────┘
//!          ▼
//!   read block ─▶ lock ─▶ append frames + progress ─▶ unlock ─▶ progress callback ─▶ repeat
//!          │
//!          └─ end of stream / cancel / decode error ─▶ lock ─▶ metadata, active=false ─▶ unlock
//! ```
//!
//! A decode error partway through keeps the frames already loaded; it is
//! logged and not reported otherwise. Failing to open the source is
//! reported synchronously from [`SampleLoader::start`].

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use thiserror::Error;

use crate::audio_file::{AudioFileError, DecodeProvider, ReadStatus, SampleSource};
use crate::sample::{CancelToken, SharedSample};
use crate::types::LoadTarget;

/// Errors reported when starting a load
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source could not be opened
    #[error("Failed to open sample: {0}")]
    Source(#[from] AudioFileError),

    /// The worker thread could not be spawned
    #[error("Failed to spawn loader thread: {0}")]
    Spawn(String),
}

/// Called on the worker thread after every appended block with the
/// current progress fraction. Must not touch the shared sample's lock.
pub type ProgressCallback = Box<dyn Fn(f64) + Send + 'static>;

/// What to load and how to shape it
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub path: PathBuf,
    pub target: LoadTarget,
}

/// Owns the worker thread that fills a [`SharedSample`].
///
/// At most one worker runs per loader. Dropping the loader cancels and
/// joins the worker.
pub struct SampleLoader {
    shared: Arc<SharedSample>,
    worker: Option<JoinHandle<()>>,
    cancel: CancelToken,
}

impl SampleLoader {
    pub fn new(shared: Arc<SharedSample>) -> Self {
        Self {
            shared,
            worker: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn shared(&self) -> &Arc<SharedSample> {
        &self.shared
    }

    /// Start loading `request`, stopping any previous load first.
    ///
    /// On error the shared buffer is left empty and no worker runs.
    pub fn start(
        &mut self,
        provider: &dyn DecodeProvider,
        request: LoadRequest,
        on_progress: ProgressCallback,
    ) -> Result<(), LoadError> {
        self.stop();

        let source = match provider.open(&request.path, &request.target) {
            Ok(source) => source,
            Err(e) => {
                log::error!("SampleLoader: cannot open {:?}: {}", request.path, e);
                self.shared.clear();
                return Err(LoadError::Source(e));
            }
        };

        let info = source.info();
        let channels = source.channels();
        self.shared.lock().begin(info, channels);

        log::info!(
            "SampleLoader: loading {:?} ({} ch source, {} ch loaded, {} Hz)",
            request.path,
            info.channels,
            channels,
            info.samplerate
        );

        self.cancel = CancelToken::new();
        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.clone();

        let handle = thread::Builder::new()
            .name("sample-loader".into())
            .spawn(move || run_load(shared, source, cancel, on_progress))
            .map_err(|e| {
                self.shared.lock().deactivate();
                LoadError::Spawn(e.to_string())
            })?;

        self.worker = Some(handle);
        Ok(())
    }

    /// Signal the worker to stop and wait for it. Idempotent; loaded data
    /// is kept.
    pub fn stop(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };

        log::debug!("SampleLoader: stopping worker");
        self.cancel.cancel();
        self.shared.lock().deactivate();

        if handle.join().is_err() {
            log::error!("SampleLoader: worker panicked");
            // The worker died before clearing its flag.
            self.shared.lock().deactivate();
        }
        log::debug!("SampleLoader: worker joined");
    }

    /// True while a worker handle is held (it may have already finished)
    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for SampleLoader {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_load(
    shared: Arc<SharedSample>,
    mut source: Box<dyn SampleSource>,
    cancel: CancelToken,
    on_progress: ProgressCallback,
) {
    let load_start = Instant::now();
    let mut block: Vec<i16> = Vec::new();
    let mut completed = false;

    loop {
        if cancel.is_cancelled() {
            log::debug!("SampleLoader: cancelled");
            break;
        }

        block.clear();
        let progress = match source.read_block(&mut block, &cancel) {
            Ok(ReadStatus::Data(_)) => {
                let progress = source.progress();
                let mut state = shared.lock();
                if !state.is_active() {
                    break;
                }
                state.append(&block, progress);
                progress
            }
            Ok(ReadStatus::Finished) => {
                completed = !cancel.is_cancelled();
                break;
            }
            Err(e) => {
                log::warn!("SampleLoader: decode stopped early: {}", e);
                break;
            }
        };

        on_progress(progress);
    }

    let frames = {
        let mut state = shared.lock();
        state.finish(source.info(), completed);
        state.frames()
    };

    log::info!(
        "[PERF] SampleLoader: {} frames in {:?}{}",
        frames,
        load_start.elapsed(),
        if completed { "" } else { " (incomplete)" }
    );

    on_progress(if completed { 1.0 } else { source.progress() });
}
