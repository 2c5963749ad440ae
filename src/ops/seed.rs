use crate::model::item::{Item, parse_items};
use crate::ops::list_ops::sort_newest_first;

/// Default list shipped with the binary, used when nothing is persisted.
const SEED_JSON: &str = include_str!("../../data/seed.json");

/// The bundled seed list, newest first.
pub fn seed_items() -> Result<Vec<Item>, serde_json::Error> {
    let mut items = parse_items(SEED_JSON)?;
    sort_newest_first(&mut items);
    Ok(items)
}
