//! Editor configuration
//!
//! Stored as YAML in the user's config directory.
//! Default location: ~/.config/audition/config.yaml

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use audition_core::config::{load_config, save_config};

/// Config file name inside the audition config directory
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub playback: PlaybackConfig,
    pub loading: LoadingConfig,
}

/// Playback section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Start playback when the sample becomes playable and after a
    /// non-empty selection
    pub autoplay: bool,
    /// Linear output gain in [0, 1]
    pub volume: f32,
    pub loop_playback: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            autoplay: true,
            volume: 1.0,
            loop_playback: false,
        }
    }
}

/// Loading section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Mix stereo sources down to mono when the device is mono
    pub mix: bool,
    /// Readiness poll period in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            mix: true,
            poll_interval_ms: 100,
        }
    }
}

impl EditorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.loading.poll_interval_ms.max(1))
    }
}

/// Get the default config file path
pub fn default_config_path() -> PathBuf {
    audition_core::config::default_config_path(CONFIG_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!(config.playback.autoplay);
        assert!(config.loading.mix);
        assert_eq!(config.playback.volume, 1.0);
        assert!(!config.playback.loop_playback);
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        let mut config = EditorConfig::default();
        config.playback.autoplay = false;
        config.loading.mix = false;
        config.playback.volume = 0.5;

        save_config(&config, &path).unwrap();
        let loaded: EditorConfig = load_config(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "playback:\n  autoplay: false\n").unwrap();

        let loaded: EditorConfig = load_config(&path);
        assert!(!loaded.playback.autoplay);
        assert_eq!(loaded.playback.volume, 1.0);
        assert_eq!(loaded.loading, LoadingConfig::default());
    }

    #[test]
    fn test_default_path() {
        assert!(default_config_path().ends_with("audition/config.yaml"));
    }
}
