use unicode_segmentation::UnicodeSegmentation;

use crate::model::item::Item;

/// Error type for user-supplied titles
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("you need to fill in a todo first")]
    EmptyTitle,
    #[error("title is {len} characters long (max {max})")]
    TitleTooLong { len: usize, max: usize },
    #[error("no ids left: the list already holds id {0}")]
    IdExhausted(u64),
}

// ---------------------------------------------------------------------------
// Title validation
// ---------------------------------------------------------------------------

/// Trim a title, rejecting one that is empty afterwards.
pub fn normalize_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Enforce the input-surface length limit, counted in grapheme clusters.
pub fn check_title_length(title: &str, max: usize) -> Result<(), ValidationError> {
    let len = title.trim().graphemes(true).count();
    if len > max {
        return Err(ValidationError::TitleTooLong { len, max });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// List mutations
// ---------------------------------------------------------------------------

/// Next id: one past the largest existing id, or 1 for an empty list.
pub fn next_id(items: &[Item]) -> Result<u64, ValidationError> {
    match items.iter().map(|item| item.id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(ValidationError::IdExhausted(max)),
    }
}

/// Display order: newest (highest id) first.
pub fn sort_newest_first(items: &mut [Item]) {
    items.sort_by(|a, b| b.id.cmp(&a.id));
}

/// Prepend a new item. Returns its id.
pub fn add_item(items: &mut Vec<Item>, title: &str) -> Result<u64, ValidationError> {
    let title = normalize_title(title)?;
    let id = next_id(items)?;
    items.insert(0, Item::new(id, title));
    Ok(id)
}

/// Flip `completed` on the item with `id`. Returns false if absent.
pub fn toggle_item(items: &mut [Item], id: u64) -> bool {
    match items.iter_mut().find(|item| item.id == id) {
        Some(item) => {
            item.completed = !item.completed;
            true
        }
        None => false,
    }
}

/// Remove the item with `id`. Returns the removed item, if any.
pub fn remove_item(items: &mut Vec<Item>, id: u64) -> Option<Item> {
    let idx = items.iter().position(|item| item.id == id)?;
    Some(items.remove(idx))
}

/// Replace any item sharing `edited.id` and append `edited` at the end.
pub fn upsert_at_end(items: &mut Vec<Item>, edited: Item) {
    items.retain(|item| item.id != edited.id);
    items.push(edited);
}
