//! Human-readable sample information for the properties row

use audition_core::SampleInfo;

/// Formatted fields; `visible` is false while no frame is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleProperties {
    pub visible: bool,
    pub frames: String,
    pub duration: String,
    pub samplerate: String,
    pub channels: String,
    /// `None` when the bit depth is unknown
    pub bitdepth: Option<String>,
}

impl SampleProperties {
    pub fn from_info(info: &SampleInfo) -> Self {
        if info.frames == 0 {
            return Self::default();
        }

        let seconds = info.duration_seconds();
        let duration = if seconds >= 60.0 {
            format!("{:.2} minutes", seconds / 60.0)
        } else {
            format!("{:.2} s", seconds)
        };

        Self {
            visible: true,
            frames: info.frames.to_string(),
            duration,
            samplerate: format!("{:.2} kHz", info.samplerate as f64 / 1000.0),
            channels: info.channels.to_string(),
            bitdepth: (info.bitdepth != 0).then(|| info.bitdepth.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_without_frames() {
        let info = SampleInfo {
            samplerate: 48000,
            channels: 2,
            ..Default::default()
        };
        assert_eq!(SampleProperties::from_info(&info), SampleProperties::default());
    }

    #[test]
    fn test_seconds_format() {
        let info = SampleInfo {
            frames: 66150,
            samplerate: 44100,
            channels: 2,
            bitdepth: 16,
            ..Default::default()
        };
        let props = SampleProperties::from_info(&info);
        assert!(props.visible);
        assert_eq!(props.frames, "66150");
        assert_eq!(props.duration, "1.50 s");
        assert_eq!(props.samplerate, "44.10 kHz");
        assert_eq!(props.channels, "2");
        assert_eq!(props.bitdepth.as_deref(), Some("16"));
    }

    #[test]
    fn test_minutes_format_and_unknown_bitdepth() {
        let info = SampleInfo {
            frames: 48000 * 90,
            samplerate: 48000,
            channels: 1,
            bitdepth: 0,
            ..Default::default()
        };
        let props = SampleProperties::from_info(&info);
        assert_eq!(props.duration, "1.50 minutes");
        assert_eq!(props.bitdepth, None);
    }
}
