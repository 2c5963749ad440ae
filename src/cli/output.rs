use crossterm::style::Stylize;
use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::item::Item;
use crate::model::theme::{Palette, ThemePreference};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ListJson<'a> {
    pub theme: ThemePreference,
    pub items: &'a [Item],
}

#[derive(Serialize)]
pub struct ThemeJson {
    pub theme: ThemePreference,
}

#[derive(Serialize)]
pub struct RecoveryEntryJson {
    pub timestamp: String,
    pub category: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<(String, String)>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

pub fn recovery_entry_to_json(entry: &RecoveryEntry) -> RecoveryEntryJson {
    RecoveryEntryJson {
        timestamp: entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        category: entry.category.to_string(),
        description: entry.description.clone(),
        fields: entry.fields.clone(),
        body: entry.body.clone(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// How list lines are decorated.
#[derive(Debug, Clone)]
pub enum Style {
    Plain,
    Themed(Palette),
}

fn checkbox(item: &Item) -> &'static str {
    if item.completed { "[x]" } else { "[ ]" }
}

/// Format a single item as a one-line summary
pub fn format_item_line(item: &Item, id_width: usize, style: &Style) -> String {
    let id = format!("{:>width$}", item.id, width = id_width);
    match style {
        Style::Plain => format!("{}  {} {}", id, checkbox(item), item.title),
        Style::Themed(palette) => {
            let title = if item.completed {
                item.title.as_str().with(palette.done).crossed_out()
            } else {
                item.title.as_str().with(palette.text)
            };
            format!(
                "{}  {} {}",
                id.with(palette.icon),
                checkbox(item).with(palette.button),
                title
            )
        }
    }
}

/// Format the whole list, or the empty-list notice.
pub fn format_list(items: &[Item], style: &Style) -> Vec<String> {
    if items.is_empty() {
        return vec!["No todos.".to_string()];
    }
    let id_width = items
        .iter()
        .map(|item| item.id.to_string().len())
        .max()
        .unwrap_or(1);
    items
        .iter()
        .map(|item| format_item_line(item, id_width, style))
        .collect()
}

/// Format the single-item view
pub fn format_item_detail(item: &Item) -> Vec<String> {
    vec![
        format!("id: {}", item.id),
        format!("title: {}", item.title),
        format!("completed: {}", if item.completed { "yes" } else { "no" }),
    ]
}

/// Count line shown under the list
pub fn format_summary(items: &[Item]) -> String {
    let done = items.iter().filter(|item| item.completed).count();
    format!("{} items, {} done", items.len(), done)
}

pub fn format_recovery_entry(entry: &RecoveryEntry) -> Vec<String> {
    let mut lines = vec![format!(
        "{} [{}] {}",
        entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        entry.category,
        entry.description
    )];
    for (key, value) in &entry.fields {
        lines.push(format!("  {}: {}", key, value));
    }
    for line in entry.body.lines() {
        lines.push(format!("  | {}", line));
    }
    lines
}

/// Parse an id given on the command line
pub fn parse_item_id(s: &str) -> Result<u64, String> {
    s.trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid item id '{}' (expected a positive number)", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn sample() -> Vec<Item> {
        let mut done = Item::new(12, "Water the plants");
        done.completed = true;
        vec![Item::new(13, "Buy milk"), done, Item::new(4, "Call mum")]
    }

    #[test]
    fn plain_list_aligns_ids() {
        let out = format_list(&sample(), &Style::Plain).join("\n");
        assert_snapshot!(out, @r"
        13  [ ] Buy milk
        12  [x] Water the plants
         4  [ ] Call mum
        ");
    }

    #[test]
    fn empty_list_notice() {
        assert_eq!(format_list(&[], &Style::Plain), vec!["No todos."]);
    }

    #[test]
    fn themed_line_keeps_title_text() {
        let style = Style::Themed(ThemePreference::Dark.palette());
        let line = format_item_line(&sample()[1], 2, &style);
        assert!(line.contains("Water the plants"));
        assert!(line.contains('\u{1b}'));
    }

    #[test]
    fn detail_view() {
        let out = format_item_detail(&sample()[1]).join("\n");
        assert_snapshot!(out, @r"
        id: 12
        title: Water the plants
        completed: yes
        ");
    }

    #[test]
    fn summary_counts_done() {
        assert_eq!(format_summary(&sample()), "3 items, 1 done");
    }

    #[test]
    fn list_json_shape() {
        let items = vec![Item::new(1, "a")];
        let json = serde_json::to_string(&ListJson {
            theme: ThemePreference::Dark,
            items: &items,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"theme":"dark","items":[{"id":1,"title":"a","completed":false}]}"#
        );
    }

    #[test]
    fn parse_ids() {
        assert_eq!(parse_item_id("7"), Ok(7));
        assert_eq!(parse_item_id(" 7 "), Ok(7));
        assert!(parse_item_id("-1").is_err());
        assert!(parse_item_id("seven").is_err());
    }
}
