//! Editor session
//!
//! One `EditorSession` owns everything that belongs to the sample being
//! edited: the shared buffer, the loader thread, the readiness poller, the
//! viewport and selection, and the playback engine. Every handler in the
//! front end goes through the session; there is no global state.
//!
//! ```text
//!  open(path) ──► SampleLoader ──(worker)──► SharedSample ◄── try_lock ── tick() / on_frame()
//!                      │                         ▲                          │
//!                      └─ progress ─► RedrawSignal                          ▼
//!                                                │                 controls, autoplay
//!  press/drag/release ─► Selection ─► play() ────┘ (PlaybackEngine reads the loaded prefix)
//! ```
//!
//! Serialization: a new load always stops and joins the previous worker
//! before the buffer is reset, and `close` (also run on drop) joins the
//! worker before the buffer is released.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use audition_core::audio_file::DecodeProvider;
use audition_core::loader::{LoadError, LoadRequest, SampleLoader};
use audition_core::playback::{PlaybackEngine, PlaybackRequest};
use audition_core::poller::{PollOutcome, PollReport, ReadinessPoller};
use audition_core::sample::{SampleSnapshot, SharedSample};
use audition_core::LoadTarget;
use audition_widgets::{
    build_waveform, Selection, ViewportState, WaveformAction, WaveformEvent, WaveformImage,
    ZoomDirection,
};

use crate::config::{save_config, EditorConfig};
use crate::properties::SampleProperties;
use crate::redraw::RedrawSignal;

/// Capabilities of the attached device, when the sample comes from one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCaps {
    pub stereo: bool,
}

/// Preferred channel count for a load: stereo for local files, stereo
/// devices, or when mixing is off; mono otherwise.
pub fn preferred_channels(device: Option<DeviceCaps>, mix: bool) -> u16 {
    match device {
        None => 2,
        Some(caps) if caps.stereo || !mix => 2,
        Some(_) => 1,
    }
}

pub struct EditorSession {
    playback: Box<dyn PlaybackEngine>,
    provider: Box<dyn DecodeProvider>,
    sample: Arc<SharedSample>,
    loader: SampleLoader,
    poller: ReadinessPoller,
    viewport: ViewportState,
    selection: Selection,
    config: EditorConfig,
    config_path: Option<PathBuf>,
    redraw: RedrawSignal,
    path: Option<PathBuf>,
    device: Option<DeviceCaps>,
    controls_enabled: bool,
    /// Effective channel count reported by the poller
    channels: u16,
    properties: SampleProperties,
    /// Last snapshot taken without blocking
    last: SampleSnapshot,
    /// Last waveform built from the sample
    waveform: WaveformImage,
    /// A redraw was requested but the image is not rebuilt yet
    waveform_pending: bool,
}

impl EditorSession {
    pub fn new(
        mut playback: Box<dyn PlaybackEngine>,
        provider: Box<dyn DecodeProvider>,
        config: EditorConfig,
    ) -> Self {
        playback.set_volume(config.playback.volume);
        playback.set_loop(config.playback.loop_playback);

        let sample = Arc::new(SharedSample::new());
        Self {
            playback,
            provider,
            loader: SampleLoader::new(Arc::clone(&sample)),
            sample,
            poller: ReadinessPoller::new(config.poll_interval()),
            viewport: ViewportState::default(),
            selection: Selection::new(),
            config,
            config_path: None,
            redraw: RedrawSignal::new(),
            path: None,
            device: None,
            controls_enabled: false,
            channels: 0,
            properties: SampleProperties::default(),
            last: SampleSnapshot::default(),
            waveform: WaveformImage::default(),
            waveform_pending: false,
        }
    }

    /// Write toggle changes to `path`
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// The sample comes from a device with these capabilities
    pub fn with_device(mut self, caps: DeviceCaps) -> Self {
        self.device = Some(caps);
        self
    }

    /// Replace the readiness poller (tests use a small threshold)
    pub fn with_poller(mut self, poller: ReadinessPoller) -> Self {
        self.poller = poller;
        self
    }

    // Accessors

    pub fn sample(&self) -> &SharedSample {
        &self.sample
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn properties(&self) -> &SampleProperties {
        &self.properties
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn waveform(&self) -> &WaveformImage {
        &self.waveform
    }

    /// True while a requested redraw has not produced a new image yet
    pub fn waveform_pending(&self) -> bool {
        self.waveform_pending
    }

    /// True while the last observed state had a running load
    pub fn is_loading(&self) -> bool {
        self.last.active
    }

    pub fn poller(&self) -> &ReadinessPoller {
        &self.poller
    }

    pub fn target_channels(&self) -> u16 {
        preferred_channels(self.device, self.config.loading.mix)
    }

    // Loading

    /// Load `path`, replacing the current sample.
    ///
    /// A source that cannot be opened leaves the session empty with the
    /// controls disabled.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<(), LoadError> {
        self.path = Some(path.into());
        self.start_load()
    }

    /// Load the current path again with the current channel policy
    pub fn reload(&mut self) -> Result<(), LoadError> {
        if self.path.is_none() {
            return Ok(());
        }
        self.start_load()
    }

    fn start_load(&mut self) -> Result<(), LoadError> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        self.playback.stop();
        self.poller.stop();
        self.reset_view();

        let target = LoadTarget::new(self.target_channels(), self.playback.sample_rate());
        let handle = self.redraw.handle();
        let request = LoadRequest { path, target };

        let result = self.loader.start(
            self.provider.as_ref(),
            request,
            Box::new(move |_: f64| handle.request()),
        );

        match result {
            Ok(()) => {
                self.poller.start(target.channels);
                self.last = SampleSnapshot {
                    active: true,
                    ..SampleSnapshot::default()
                };
                self.refresh();
            }
            Err(ref e) => {
                log::error!("EditorSession: load failed: {}", e);
                self.last = SampleSnapshot::default();
                self.properties = SampleProperties::default();
            }
        }
        self.redraw.request();
        result
    }

    fn reset_view(&mut self) {
        self.viewport.reset();
        self.selection.clear();
        self.controls_enabled = false;
        self.properties = SampleProperties::default();
    }

    /// Toggle stereo-to-mono mixing, persist it, and reload the sample
    pub fn set_mix(&mut self, mix: bool) -> Result<(), LoadError> {
        if self.config.loading.mix == mix {
            return Ok(());
        }
        self.config.loading.mix = mix;
        self.persist_config();
        self.reload()
    }

    pub fn set_autoplay(&mut self, autoplay: bool) {
        if self.config.playback.autoplay == autoplay {
            return;
        }
        self.config.playback.autoplay = autoplay;
        self.persist_config();
    }

    fn persist_config(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        let result = save_config(&self.config, path)
            .with_context(|| format!("Failed to persist editor toggles to {:?}", path));
        if let Err(e) = result {
            log::warn!("EditorSession: {:#}", e);
        }
    }

    // Timers

    /// Poller tick. Enables the controls and starts autoplay once enough
    /// audio is loaded.
    pub fn tick(&mut self) -> PollOutcome {
        let outcome = self.poller.tick(&self.sample);
        match outcome {
            PollOutcome::Loading(report) => self.observe(report),
            PollOutcome::Ready(report) => {
                self.observe(report);
                self.controls_enabled = self.playback.is_available();
                log::debug!(
                    "EditorSession: playable ({} frames, {} ch)",
                    report.snapshot.frames,
                    report.channels
                );
                if self.controls_enabled && self.config.playback.autoplay {
                    self.play();
                }
            }
            PollOutcome::Idle | PollOutcome::Busy => {}
        }
        outcome
    }

    /// Frame timer: pick up the loader's progress without blocking.
    pub fn on_frame(&mut self) {
        self.refresh();
    }

    /// Rebuild the waveform image if a redraw was requested.
    ///
    /// Returns true when a new image replaced the previous one. A busy
    /// lock keeps the previous image and leaves the redraw pending for
    /// the next call.
    pub fn sync_waveform(&mut self) -> bool {
        if self.redraw.take() {
            self.waveform_pending = true;
        }
        if !self.waveform_pending {
            return false;
        }

        let image = {
            let Some(state) = self.sample.try_lock() else {
                log::trace!("EditorSession: sample busy, keeping previous waveform");
                return false;
            };
            build_waveform(
                &state,
                &self.viewport,
                &self.selection,
                self.viewport.surface_width(),
            )
        };
        self.waveform = image;
        self.waveform_pending = false;
        true
    }

    fn observe(&mut self, report: PollReport) {
        self.channels = report.channels;
        self.set_snapshot(report.snapshot);
    }

    fn refresh(&mut self) {
        if let Some(snapshot) = self.sample.try_snapshot() {
            self.set_snapshot(snapshot);
        }
    }

    fn set_snapshot(&mut self, snapshot: SampleSnapshot) {
        self.last = snapshot;
        self.properties = SampleProperties::from_info(&snapshot.info);
    }

    /// Loaded frames, from a fresh snapshot when the lock is free
    fn frames(&mut self) -> usize {
        self.refresh();
        self.last.frames
    }

    // Viewport

    pub fn zoom_at(&mut self, x: f32, direction: ZoomDirection) -> bool {
        let frames = self.frames();
        let changed = self.viewport.zoom_at(direction, x, frames);
        if changed {
            self.redraw.request();
        }
        changed
    }

    pub fn scroll_to(&mut self, frame: i64) {
        let frames = self.frames();
        self.viewport.set_start_frame(frame, frames);
        self.redraw.request();
    }

    pub fn scroll_by(&mut self, dx: f32) {
        let frames = self.frames();
        self.viewport.scroll_by_pixels(dx, frames);
        self.redraw.request();
    }

    /// Track the drawing surface width, keeping the start frame
    pub fn resize(&mut self, surface_width: u32) {
        if self.viewport.surface_width() == surface_width {
            return;
        }
        let frames = self.frames();
        self.viewport.set_surface_width(surface_width, frames);
        self.redraw.request();
    }

    /// Dispatch a waveform gesture
    pub fn handle_waveform(&mut self, event: WaveformEvent) {
        self.resize(event.surface_width);
        match event.action {
            WaveformAction::Press { x } => self.press(x),
            WaveformAction::Drag { x } => self.drag(x),
            WaveformAction::Release => self.release(),
            WaveformAction::Zoom { x, direction } => {
                self.zoom_at(x, direction);
            }
            WaveformAction::Scroll { dx } => self.scroll_by(dx),
            WaveformAction::Resize => {}
        }
    }

    // Selection

    pub fn press(&mut self, x: f32) {
        self.playback.stop();
        let frames = self.frames();
        self.selection.begin(self.viewport.frame_at(x, frames));
        self.redraw.request();
    }

    pub fn drag(&mut self, x: f32) {
        if !self.selection.is_dragging() {
            return;
        }
        let frames = self.frames();
        self.selection.update(self.viewport.frame_at(x, frames));
        self.redraw.request();
    }

    pub fn release(&mut self) {
        let non_empty = self.selection.finish();
        self.redraw.request();
        if non_empty && self.config.playback.autoplay {
            self.play();
        }
    }

    // Playback

    /// Play the selection, or everything loaded when nothing is selected.
    /// Returns false while the controls are disabled.
    pub fn play(&mut self) -> bool {
        if !self.controls_enabled {
            return false;
        }
        let frames = self.frames();
        let range = if self.selection.is_empty() {
            None
        } else {
            self.selection.range(frames)
        };

        log::debug!("EditorSession: play {:?} of {} frames", range, frames);
        self.playback.play(PlaybackRequest {
            sample: Arc::clone(&self.sample),
            channels: self.channels,
            sample_rate: self.last.info.samplerate,
            range,
        });
        true
    }

    pub fn stop(&mut self) {
        self.playback.stop();
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.config.playback.loop_playback = looping;
        self.playback.set_loop(looping);
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.config.playback.volume = volume;
        self.playback.set_volume(volume);
    }

    // Teardown

    /// Drop the current sample: no source, empty layout.
    pub fn clear(&mut self) {
        self.close();
        self.path = None;
        self.reset_view();
        self.last = SampleSnapshot::default();
        self.redraw.request();
    }

    /// Stop playback and the loader (joining its worker), then release
    /// the buffer. Idempotent.
    pub fn close(&mut self) {
        self.playback.stop();
        self.loader.stop();
        self.poller.stop();
        self.sample.clear();
        self.controls_enabled = false;
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.close();
        log::debug!("EditorSession: closed");
    }
}
