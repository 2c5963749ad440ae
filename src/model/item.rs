use serde::{Deserialize, Serialize};

/// A single to-do record, in the exact shape it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Unique within a list; assigned as max existing id + 1
    pub id: u64,
    /// Item text, stored trimmed
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Item {
    /// Create a new, not yet completed item
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Item {
            id,
            title: title.into(),
            completed: false,
        }
    }

    /// Whether this item's id matches an identifier given as text
    /// (e.g. a path parameter or command-line argument).
    pub fn matches_id_text(&self, id: &str) -> bool {
        self.id.to_string() == id
    }
}

/// Parse a persisted list value.
pub fn parse_items(raw: &str) -> Result<Vec<Item>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Serialize a list for persistence.
pub fn serialize_items(items: &[Item]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_shape() {
        let item = Item::new(3, "Buy milk");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"id":3,"title":"Buy milk","completed":false}"#);
    }

    #[test]
    fn completed_defaults_to_false() {
        let items = parse_items(r#"[{"id":1,"title":"a"}]"#).unwrap();
        assert!(!items[0].completed);
    }

    #[test]
    fn rejects_non_integer_id() {
        assert!(parse_items(r#"[{"id":"x","title":"a","completed":false}]"#).is_err());
    }

    #[test]
    fn id_text_match_is_exact() {
        let item = Item::new(12, "t");
        assert!(item.matches_id_text("12"));
        assert!(!item.matches_id_text("012"));
        assert!(!item.matches_id_text("1"));
    }
}
