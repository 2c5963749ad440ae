use std::path::{Path, PathBuf};

use crate::io::config_io::{self, ConfigError};
use crate::io::recovery::RecoveryLog;
use crate::io::store::{FileStore, Store};
use crate::io::worker::{StoreHandle, WriteReceipt};
use crate::model::config::AppConfig;
use crate::model::theme::{Palette, ThemePreference};
use crate::ops::theme_ops;

/// Everything the list and detail flows share: configuration, the store
/// worker, and the current theme. Passed explicitly to whatever needs it.
pub struct AppContext {
    pub config: AppConfig,
    pub store: StoreHandle,
    data_dir: Option<PathBuf>,
    theme: ThemePreference,
}

impl AppContext {
    /// Open the data directory: read its config, start a file-backed store
    /// worker, and load the persisted theme.
    pub fn open(data_dir: &Path) -> Result<Self, ConfigError> {
        let config = config_io::read_config(data_dir)?;
        let store = StoreHandle::spawn(FileStore::new(data_dir), RecoveryLog::new(data_dir));
        let mut ctx = AppContext::with_store(config, store);
        ctx.data_dir = Some(data_dir.to_path_buf());
        Ok(ctx)
    }

    /// Build a context around any store. Problems are only reported on stderr.
    pub fn with_backend<S: Store + 'static>(config: AppConfig, store: S) -> Self {
        let store = StoreHandle::spawn(store, RecoveryLog::stderr_only());
        AppContext::with_store(config, store)
    }

    fn with_store(config: AppConfig, store: StoreHandle) -> Self {
        let theme = theme_ops::load_theme(
            &store,
            &config.storage.theme_key,
            config.ui.default_theme,
        );
        AppContext {
            config,
            store,
            data_dir: None,
            theme,
        }
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    pub fn list_key(&self) -> &str {
        &self.config.storage.list_key
    }

    pub fn theme(&self) -> ThemePreference {
        self.theme
    }

    pub fn palette(&self) -> Palette {
        self.theme.palette()
    }

    /// Switch theme and persist it.
    pub fn set_theme(&mut self, theme: ThemePreference) -> WriteReceipt {
        self.theme = theme;
        theme_ops::save_theme(&self.store, &self.config.storage.theme_key, theme)
    }

    pub fn toggle_theme(&mut self) -> WriteReceipt {
        self.set_theme(self.theme.toggle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;
    use tempfile::TempDir;

    #[test]
    fn theme_is_loaded_from_store() {
        let view = MemoryStore::with_entry("Theme", "dark");
        let ctx = AppContext::with_backend(AppConfig::default(), view);
        assert_eq!(ctx.theme(), ThemePreference::Dark);
        assert_eq!(ctx.palette(), Palette::dark());
    }

    #[test]
    fn toggle_persists() {
        let view = MemoryStore::new();
        let mut ctx = AppContext::with_backend(AppConfig::default(), view.clone());
        assert_eq!(ctx.theme(), ThemePreference::Light);
        ctx.toggle_theme().wait().unwrap();
        assert_eq!(ctx.theme(), ThemePreference::Dark);
        assert_eq!(view.get("Theme").as_deref(), Some("dark"));
    }

    #[test]
    fn config_default_theme_applies_when_unset() {
        let mut config = AppConfig::default();
        config.ui.default_theme = ThemePreference::Dark;
        let ctx = AppContext::with_backend(config, MemoryStore::new());
        assert_eq!(ctx.theme(), ThemePreference::Dark);
    }

    #[test]
    fn open_uses_configured_keys() {
        let tmp = TempDir::new().unwrap();
        let data_dir = config_io::init_data_dir(tmp.path(), false).unwrap();
        std::fs::write(
            data_dir.join("config.toml"),
            "[storage]\ntheme_key = \"Look\"\n",
        )
        .unwrap();

        let mut ctx = AppContext::open(&data_dir).unwrap();
        assert_eq!(ctx.data_dir(), Some(data_dir.as_path()));
        assert_eq!(ctx.list_key(), "TodoApp");
        ctx.set_theme(ThemePreference::Dark).wait().unwrap();
        assert_eq!(
            std::fs::read_to_string(data_dir.join("store/Look")).unwrap(),
            "dark"
        );
    }
}
