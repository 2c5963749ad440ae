use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Name of the data directory `td` looks for.
pub const DATA_DIR_NAME: &str = ".todos";

/// Starter config written by `td init`.
const CONFIG_TEMPLATE: &str = r#"# todos configuration. Every setting is optional.

[storage]
list_key = "TodoApp"
theme_key = "Theme"

[input]
max_title_length = 30

[ui]
default_theme = "light"
"#;

/// Error type for locating and loading the data directory
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no .todos/ directory found (run `td init`)")]
    NotInitialized,
    #[error("{0} already exists (use --force to rewrite its config)")]
    AlreadyInitialized(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Walk up from `start` looking for a `.todos/` directory.
/// Returns the data directory itself.
pub fn discover_data_dir(start: &Path) -> Result<PathBuf, ConfigError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(ConfigError::NotInitialized);
        }
    }
}

/// Read `config.toml` from the data directory. A missing file yields defaults.
pub fn read_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let config_path = data_dir.join("config.toml");
    if !config_path.exists() {
        return Ok(AppConfig::default());
    }
    let text = fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Create `<root>/.todos/` with a starter config. Returns the data directory.
pub fn init_data_dir(root: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    let data_dir = root.join(DATA_DIR_NAME);
    if data_dir.exists() && !force {
        return Err(ConfigError::AlreadyInitialized(data_dir));
    }
    fs::create_dir_all(data_dir.join("store"))?;
    fs::write(data_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    Ok(data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::theme::ThemePreference;
    use tempfile::TempDir;

    #[test]
    fn template_parses_to_defaults() {
        let config: AppConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.storage.list_key, defaults.storage.list_key);
        assert_eq!(config.storage.theme_key, defaults.storage.theme_key);
        assert_eq!(
            config.input.max_title_length,
            defaults.input.max_title_length
        );
        assert_eq!(config.ui.default_theme, ThemePreference::Light);
    }

    #[test]
    fn init_then_discover_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        let data_dir = init_data_dir(tmp.path(), false).unwrap();
        assert!(data_dir.join("config.toml").exists());

        let sub = tmp.path().join("a/b");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(discover_data_dir(&sub).unwrap(), data_dir);
    }

    #[test]
    fn init_twice_requires_force() {
        let tmp = TempDir::new().unwrap();
        init_data_dir(tmp.path(), false).unwrap();
        assert!(matches!(
            init_data_dir(tmp.path(), false),
            Err(ConfigError::AlreadyInitialized(_))
        ));
        assert!(init_data_dir(tmp.path(), true).is_ok());
    }

    #[test]
    fn discover_not_found() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            discover_data_dir(tmp.path()),
            Err(ConfigError::NotInitialized)
        ));
    }

    #[test]
    fn missing_config_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(tmp.path()).unwrap();
        assert_eq!(config.storage.list_key, "TodoApp");
    }

    #[test]
    fn malformed_config_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[input]\nmax_title_length = \"x\"\n").unwrap();
        assert!(matches!(
            read_config(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
