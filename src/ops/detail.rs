use crate::io::store::StorageError;
use crate::io::worker::{StoreHandle, WriteReceipt};
use crate::model::item::Item;
use crate::ops::context::AppContext;
use crate::ops::controller::{Persisted, read_persisted, write_list};
use crate::ops::list_ops::{self, ValidationError};

/// Result of a successful `rename`.
pub struct Renamed {
    pub id: u64,
    pub receipt: WriteReceipt,
}

/// Single-item view addressed by id. Works directly against the persisted
/// list, independent of any `ListController`.
pub struct DetailEditor {
    store: StoreHandle,
    key: String,
}

impl DetailEditor {
    pub fn new(ctx: &AppContext) -> Self {
        DetailEditor {
            store: ctx.store.clone(),
            key: ctx.list_key().to_string(),
        }
    }

    /// Find the persisted item whose id, as text, equals `id`.
    pub fn load(&self, id: &str) -> Option<Item> {
        match read_persisted(&self.store, &self.key) {
            Persisted::Items(items) => items.into_iter().find(|item| item.matches_id_text(id)),
            Persisted::Missing | Persisted::Corrupt | Persisted::Unreadable(_) => None,
        }
    }

    /// Write `edited` back, replacing any item with the same id. The edited
    /// item always ends up last in the stored list.
    ///
    /// Only an absent list is replaced outright. A list that can't be read or
    /// parsed is left untouched and the receipt carries the failure.
    pub fn save(&self, edited: Item) -> WriteReceipt {
        let items = match read_persisted(&self.store, &self.key) {
            Persisted::Items(mut items) => {
                list_ops::upsert_at_end(&mut items, edited);
                items
            }
            Persisted::Missing => vec![edited],
            Persisted::Corrupt => {
                return WriteReceipt::failed(StorageError::Corrupt(self.key.clone()));
            }
            Persisted::Unreadable(e) => return WriteReceipt::failed(e),
        };
        write_list(&self.store, &self.key, &items)
    }

    /// Load `id`, set its title, and save it.
    /// `Ok(None)` when no persisted item has that id.
    pub fn rename(&self, id: &str, title: &str) -> Result<Option<Renamed>, ValidationError> {
        let title = list_ops::normalize_title(title)?;
        let Some(mut item) = self.load(id) else {
            return Ok(None);
        };
        item.title = title;
        Ok(Some(Renamed {
            id: item.id,
            receipt: self.save(item),
        }))
    }
}
