// src/infra/paths.rs — Config path management
//
// All paths respect the PIXELSCRIBE_HOME environment variable for isolation.
// When PIXELSCRIBE_HOME is set, config lives under that directory.
// When unset, config uses ~/.pixelscribe/.

use std::path::PathBuf;

/// Returns the PIXELSCRIBE_HOME override, if set.
fn pixelscribe_home() -> Option<PathBuf> {
    std::env::var_os("PIXELSCRIBE_HOME").map(PathBuf::from)
}

/// Configuration directory: $PIXELSCRIBE_HOME/ or ~/.pixelscribe/
pub fn config_dir() -> PathBuf {
    if let Some(home) = pixelscribe_home() {
        return home;
    }
    match dirs_home() {
        Some(home) => home.join(".pixelscribe"),
        None => PathBuf::from(".pixelscribe"),
    }
}

/// Home directory, if the platform can tell us one.
pub fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf())
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_is_toml_in_config_dir() {
        let path = config_file_path();
        assert_eq!(path.file_name().unwrap(), "config.toml");
        assert_eq!(path.parent().unwrap(), config_dir());
    }
}
