//! Shared sample buffer
//!
//! One [`SharedSample`] is shared between the loader thread (the only
//! writer), the UI thread (poller, renderer, input handlers) and the audio
//! callback. Everything lives behind a single mutex:
//!
//! ```text
//! loader thread ──append──▶ Mutex<SampleState> ◀──try_lock── UI / audio callback
//! ```
//!
//! The loader holds the lock only while appending one decoded block. The UI
//! and the audio callback use [`SharedSample::try_lock`] /
//! [`SharedSample::try_snapshot`] so they never wait on the loader.
//!
//! Invariants maintained by [`SampleState`]:
//! - `frames * channels <= raw.len()`
//! - `frames` never decreases during a load
//! - bytes below `frames` never change once written

mod cancel;

pub use cancel::CancelToken;

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use crate::types::SampleInfo;

/// Lock-guarded state of the sample being edited.
#[derive(Debug, Default)]
pub struct SampleState {
    raw: Vec<i16>,
    frames: usize,
    channels: u16,
    info: SampleInfo,
    progress: f64,
    active: bool,
}

impl SampleState {
    /// Frames fully written so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Channel count of the loaded data (1 or 2)
    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn info(&self) -> &SampleInfo {
        &self.info
    }

    /// Load progress in [0, 1]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// True while a loader worker is running
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Interleaved samples of the loaded prefix
    pub fn loaded(&self) -> &[i16] {
        let len = self.frames * self.channels as usize;
        &self.raw[..len.min(self.raw.len())]
    }

    /// Samples of one frame, `None` past the loaded prefix
    pub fn frame(&self, index: usize) -> Option<&[i16]> {
        if index >= self.frames {
            return None;
        }
        let channels = self.channels as usize;
        self.raw.get(index * channels..(index + 1) * channels)
    }

    /// Start a new load: drop previous data and mark the worker active.
    pub(crate) fn begin(&mut self, info: SampleInfo, channels: u16) {
        self.raw.clear();
        self.frames = 0;
        self.channels = channels;
        self.info = SampleInfo { frames: 0, ..info };
        self.progress = 0.0;
        self.active = true;
    }

    /// Append interleaved samples. Only whole frames are counted.
    pub(crate) fn append(&mut self, samples: &[i16], progress: f64) -> usize {
        let channels = self.channels.max(1) as usize;
        let whole = samples.len() / channels * channels;
        self.raw.extend_from_slice(&samples[..whole]);
        let appended = whole / channels;
        self.frames += appended;
        self.info.frames = self.frames;
        self.progress = progress.max(self.progress).min(1.0);
        debug_assert!(self.frames * channels <= self.raw.len());
        appended
    }

    /// Mark the load finished, keeping whatever was loaded.
    pub(crate) fn finish(&mut self, info: SampleInfo, completed: bool) {
        self.info = SampleInfo {
            frames: self.frames,
            ..info
        };
        if completed {
            self.progress = 1.0;
        }
        self.active = false;
    }

    /// Clear the cooperative running flag.
    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    pub(crate) fn clear(&mut self) {
        *self = SampleState::default();
    }
}

/// Scalar copy of the state, taken inside one short critical section.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleSnapshot {
    pub frames: usize,
    pub channels: u16,
    pub info: SampleInfo,
    pub progress: f64,
    pub active: bool,
}

impl From<&SampleState> for SampleSnapshot {
    fn from(state: &SampleState) -> Self {
        Self {
            frames: state.frames,
            channels: state.channels,
            info: state.info,
            progress: state.progress,
            active: state.active,
        }
    }
}

/// The sample buffer shared between loader, UI and audio callback.
#[derive(Debug, Default)]
pub struct SharedSample {
    state: Mutex<SampleState>,
}

impl SharedSample {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocking lock. A poisoned lock is recovered: every writer leaves the
    /// state consistent between statements that can panic.
    pub fn lock(&self) -> MutexGuard<'_, SampleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Non-blocking lock for the UI thread and the audio callback.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, SampleState>> {
        match self.state.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    pub fn snapshot(&self) -> SampleSnapshot {
        SampleSnapshot::from(&*self.lock())
    }

    /// Snapshot without waiting; `None` while the loader holds the lock.
    pub fn try_snapshot(&self) -> Option<SampleSnapshot> {
        self.try_lock().map(|state| SampleSnapshot::from(&*state))
    }

    /// Drop all loaded data. Callers must have stopped the loader first.
    pub fn clear(&self) {
        self.lock().clear();
    }
}
