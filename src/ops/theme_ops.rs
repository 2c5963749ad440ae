use crate::io::worker::{StoreHandle, WriteReceipt};
use crate::model::theme::ThemePreference;

/// Read the persisted theme. Missing, unreadable, or unknown values fall back
/// to `default`.
pub fn load_theme(store: &StoreHandle, key: &str, default: ThemePreference) -> ThemePreference {
    match store.load(key) {
        Ok(Some(raw)) => ThemePreference::parse_persisted(&raw).unwrap_or(default),
        // Read failures were already recorded by the store worker
        Ok(None) | Err(_) => default,
    }
}

/// Persist `theme` as its bare name.
pub fn save_theme(store: &StoreHandle, key: &str, theme: ThemePreference) -> WriteReceipt {
    store.save(key, theme.as_str().to_string())
}
