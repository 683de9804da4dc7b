//! Common types for Audition
//!
//! Sample metadata and the constants shared by the loader, the poller and
//! the widgets.

/// Frames that must be loaded before playback is enabled while a load is
/// still in progress.
#[cfg(target_os = "linux")]
pub const READY_THRESHOLD_FRAMES: usize = 16 * 1024;

/// Frames that must be loaded before playback is enabled while a load is
/// still in progress.
#[cfg(not(target_os = "linux"))]
pub const READY_THRESHOLD_FRAMES: usize = 64 * 1024;

/// Default sample rate used when no playback device reports one
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// Largest channel count a loaded buffer can have
pub const MAX_LOADED_CHANNELS: u16 = 2;

/// Metadata describing a sample, written by the loader and read by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleInfo {
    /// Channel count of the source, before any reduction
    pub channels: u16,
    /// Sample rate of the loaded data in Hz
    pub samplerate: u32,
    /// Sample rate of the source in Hz
    pub source_samplerate: u32,
    /// Bit depth of the source (0 when unknown)
    pub bitdepth: u16,
    /// Total frames; the loaded count while loading, the final count after
    pub frames: usize,
    /// Loop points in loaded frames, when the source carries them
    pub loop_start: Option<usize>,
    pub loop_end: Option<usize>,
}

impl SampleInfo {
    /// Duration of `frames` in seconds at the loaded rate
    pub fn duration_seconds(&self) -> f64 {
        if self.samplerate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.samplerate as f64
    }
}

/// What the loader should convert the source into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTarget {
    /// Preferred channel count (1 or 2)
    pub channels: u16,
    /// Sample rate of the loaded data in Hz
    pub samplerate: u32,
}

impl LoadTarget {
    pub fn new(channels: u16, samplerate: u32) -> Self {
        Self {
            channels: channels.clamp(1, MAX_LOADED_CHANNELS),
            samplerate,
        }
    }
}

/// Channel count of the loaded data: stereo only when both the target and
/// the source are stereo, mono otherwise.
pub fn effective_channels(target_channels: u16, source_channels: u16) -> u16 {
    if target_channels == 2 && source_channels == 2 {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_channels() {
        assert_eq!(effective_channels(2, 2), 2);
        assert_eq!(effective_channels(1, 2), 1);
        assert_eq!(effective_channels(2, 1), 1);
        assert_eq!(effective_channels(2, 6), 1);
        assert_eq!(effective_channels(1, 1), 1);
    }

    #[test]
    fn test_load_target_clamps_channels() {
        assert_eq!(LoadTarget::new(0, 48000).channels, 1);
        assert_eq!(LoadTarget::new(8, 48000).channels, 2);
    }

    #[test]
    fn test_duration_seconds() {
        let info = SampleInfo {
            samplerate: 48000,
            frames: 96000,
            ..Default::default()
        };
        assert!((info.duration_seconds() - 2.0).abs() < f64::EPSILON);
        assert_eq!(SampleInfo::default().duration_seconds(), 0.0);
    }
}
