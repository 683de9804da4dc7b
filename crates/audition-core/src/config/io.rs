//! Generic YAML configuration loading and saving

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Load configuration from a YAML file
///
/// A missing file yields `T::default()`. An unreadable or invalid file is
/// logged and also yields the defaults, so a broken config never keeps
/// the editor from starting.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    log::info!("load_config: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_config: No config file, using defaults");
        return T::default();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            log::warn!("load_config: Failed to read {:?}: {}, using defaults", path, e);
            return T::default();
        }
    };

    serde_yaml::from_str::<T>(&contents).unwrap_or_else(|e| {
        log::warn!("load_config: Failed to parse {:?}: {}, using defaults", path, e);
        T::default()
    })
}

/// Save configuration to a YAML file, creating parent directories.
pub fn save_config<T>(config: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    log::debug!("save_config: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Prefs {
        autoplay: bool,
        volume: f32,
    }

    impl Default for Prefs {
        fn default() -> Self {
            Self {
                autoplay: true,
                volume: 1.0,
            }
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let prefs: Prefs = load_config(Path::new("/nonexistent/audition/config.yaml"));
        assert_eq!(prefs, Prefs::default());
    }

    #[test]
    fn test_roundtrip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let prefs = Prefs {
            autoplay: false,
            volume: 0.25,
        };

        save_config(&prefs, &path).unwrap();
        let loaded: Prefs = load_config(&path);
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn test_partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "autoplay: false\n").unwrap();

        let loaded: Prefs = load_config(&path);
        assert!(!loaded.autoplay);
        assert_eq!(loaded.volume, 1.0);
    }

    #[test]
    fn test_invalid_yaml_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "autoplay: [not, a, bool").unwrap();

        let loaded: Prefs = load_config(&path);
        assert_eq!(loaded, Prefs::default());
    }
}
