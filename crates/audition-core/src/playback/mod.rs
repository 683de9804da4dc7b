//! Sample playback
//!
//! The editor triggers playback through the [`PlaybackEngine`] trait. A
//! request names the shared sample and an optional frame range; engines
//! read the loaded prefix directly from the [`SharedSample`] and never
//! block on the loader (a busy lock yields a block of silence).

mod cpal_backend;
mod cursor;
mod error;

pub use cpal_backend::CpalPlayback;
pub use cursor::PlaybackCursor;
pub use error::{PlaybackError, PlaybackResult};

use std::sync::Arc;

use crate::sample::SharedSample;
use crate::types::DEFAULT_SAMPLE_RATE;

/// What to play
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    pub sample: Arc<SharedSample>,
    /// Channel count of the loaded data
    pub channels: u16,
    /// Sample rate of the loaded data
    pub sample_rate: u32,
    /// Frame range `[start, end)`; `None` plays everything loaded
    pub range: Option<(usize, usize)>,
}

/// Output used by the editor to audition the sample.
pub trait PlaybackEngine {
    /// False when there is no usable output (controls stay disabled)
    fn is_available(&self) -> bool;

    /// Output rate; loads target this rate
    fn sample_rate(&self) -> u32;

    /// Start playing `request`, replacing anything already playing
    fn play(&mut self, request: PlaybackRequest);

    fn stop(&mut self);

    /// Linear gain in [0, 1]
    fn set_volume(&mut self, volume: f32);

    fn set_loop(&mut self, looping: bool);

    fn is_playing(&self) -> bool;
}

/// Engine used when no output device could be opened.
#[derive(Debug, Clone)]
pub struct NullPlayback {
    sample_rate: u32,
}

impl NullPlayback {
    pub fn new() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl Default for NullPlayback {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackEngine for NullPlayback {
    fn is_available(&self) -> bool {
        false
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn play(&mut self, request: PlaybackRequest) {
        log::debug!("NullPlayback: ignoring play of {:?}", request.range);
    }

    fn stop(&mut self) {}

    fn set_volume(&mut self, _volume: f32) {}

    fn set_loop(&mut self, _looping: bool) {}

    fn is_playing(&self) -> bool {
        false
    }
}
