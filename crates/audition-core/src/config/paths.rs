//! Standard locations of audition configuration files

use std::path::PathBuf;

/// Per-user configuration directory
///
/// Returns: `<config dir>/audition` (e.g. `~/.config/audition` on Linux)
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("audition")
}

/// Default path of a config file inside [`default_config_dir`]
pub fn default_config_path(filename: &str) -> PathBuf {
    default_config_dir().join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_ends_with_app_name() {
        assert!(default_config_dir().ends_with("audition"));
    }

    #[test]
    fn test_config_path_includes_filename() {
        let path = default_config_path("config.yaml");
        assert!(path.ends_with("audition/config.yaml"));
    }
}
