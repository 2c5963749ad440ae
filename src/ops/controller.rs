use crate::io::recovery::{RecoveryCategory, RecoveryEntry};
use crate::io::store::StorageError;
use crate::io::worker::{StoreHandle, WriteReceipt};
use crate::model::item::{Item, parse_items, serialize_items};
use crate::ops::context::AppContext;
use crate::ops::list_ops::{self, ValidationError};
use crate::ops::seed::seed_items;

/// What the store holds under the list key.
pub(crate) enum Persisted {
    Missing,
    Items(Vec<Item>),
    /// Present but not a valid list; the raw text is in the recovery log
    Corrupt,
    /// The read itself failed; the worker has already logged it
    Unreadable(StorageError),
}

/// Read and parse the persisted list, in stored order.
pub(crate) fn read_persisted(store: &StoreHandle, key: &str) -> Persisted {
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Persisted::Missing,
        Err(e) => return Persisted::Unreadable(e),
    };
    match parse_items(&raw) {
        Ok(items) => Persisted::Items(items),
        Err(e) => {
            store.recovery().record(
                RecoveryEntry::new(RecoveryCategory::Parser, "persisted list is not valid")
                    .field("Key", key)
                    .field("Error", e.to_string())
                    .body(raw),
            );
            Persisted::Corrupt
        }
    }
}

/// Serialize the full list and queue it for writing.
pub(crate) fn write_list(store: &StoreHandle, key: &str, items: &[Item]) -> WriteReceipt {
    match serialize_items(items) {
        Ok(json) => store.save(key, json),
        Err(e) => {
            let err = StorageError::Unavailable(format!("could not serialize list: {}", e));
            store.recovery().record(
                RecoveryEntry::new(RecoveryCategory::Write, "list serialization failed")
                    .field("Key", key)
                    .field("Error", e.to_string()),
            );
            WriteReceipt::failed(err)
        }
    }
}

/// Result of a successful `add`.
pub struct Added {
    pub id: u64,
    pub receipt: WriteReceipt,
}

/// The in-memory list, newest first, with write-through on every mutation.
pub struct ListController {
    items: Vec<Item>,
    store: StoreHandle,
    key: String,
}

impl ListController {
    /// Load the persisted list, or the seed list when none is usable.
    pub fn initialize(ctx: &AppContext) -> Self {
        let store = ctx.store.clone();
        let key = ctx.list_key().to_string();
        let items = load_or_seed(&store, &key);
        ListController { items, store, key }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: u64) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Prepend a new item titled `title`.
    pub fn add(&mut self, title: &str) -> Result<Added, ValidationError> {
        let id = list_ops::add_item(&mut self.items, title)?;
        Ok(Added {
            id,
            receipt: self.write_through(),
        })
    }

    /// Flip `completed` on `id`. The list is written even when `id` is absent.
    pub fn toggle_completed(&mut self, id: u64) -> WriteReceipt {
        list_ops::toggle_item(&mut self.items, id);
        self.write_through()
    }

    /// Remove `id`. The list is written even when `id` is absent.
    pub fn remove(&mut self, id: u64) -> WriteReceipt {
        list_ops::remove_item(&mut self.items, id);
        self.write_through()
    }

    /// Re-read from the store and re-sort, picking up edits made elsewhere.
    pub fn reload(&mut self) {
        self.items = load_or_seed(&self.store, &self.key);
    }

    /// Clear the persisted list. The in-memory list goes back to the seed.
    pub fn clear(&mut self) -> WriteReceipt {
        self.items = seed_or_empty(&self.store);
        self.store.remove(&self.key)
    }

    fn write_through(&self) -> WriteReceipt {
        write_list(&self.store, &self.key, &self.items)
    }
}

fn load_or_seed(store: &StoreHandle, key: &str) -> Vec<Item> {
    match read_persisted(store, key) {
        Persisted::Items(mut items) => {
            list_ops::sort_newest_first(&mut items);
            items
        }
        Persisted::Missing | Persisted::Corrupt | Persisted::Unreadable(_) => {
            seed_or_empty(store)
        }
    }
}

fn seed_or_empty(store: &StoreHandle) -> Vec<Item> {
    seed_items().unwrap_or_else(|e| {
        store.recovery().record(
            RecoveryEntry::new(RecoveryCategory::Parser, "bundled seed list is not valid")
                .field("Error", e.to_string()),
        );
        Vec::new()
    })
}
