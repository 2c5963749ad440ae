use serde::{Deserialize, Serialize};

use crate::model::theme::ThemePreference;

/// Configuration from `.todos/config.toml`. Every field has a default, so a
/// missing or empty file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key the item list is persisted under
    #[serde(default = "default_list_key")]
    pub list_key: String,
    /// Key the theme preference is persisted under
    #[serde(default = "default_theme_key")]
    pub theme_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            list_key: default_list_key(),
            theme_key: default_theme_key(),
        }
    }
}

fn default_list_key() -> String {
    "TodoApp".to_string()
}

fn default_theme_key() -> String {
    "Theme".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Longest title accepted from the command line, in grapheme clusters
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            max_title_length: default_max_title_length(),
        }
    }
}

fn default_max_title_length() -> usize {
    30
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Used when no theme has been persisted yet
    #[serde(default)]
    pub default_theme: ThemePreference,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.storage.list_key, "TodoApp");
        assert_eq!(config.storage.theme_key, "Theme");
        assert_eq!(config.input.max_title_length, 30);
        assert_eq!(config.ui.default_theme, ThemePreference::Light);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[storage]
list_key = "Groceries"

[ui]
default_theme = "dark"
"#,
        )
        .unwrap();
        assert_eq!(config.storage.list_key, "Groceries");
        assert_eq!(config.storage.theme_key, "Theme");
        assert_eq!(config.ui.default_theme, ThemePreference::Dark);
    }
}
