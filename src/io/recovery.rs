use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

/// Size above which the oldest entries are dropped on the next append (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- todos recovery log: append-only record of storage problems.
     Values that could not be read or written are kept here.
     View with: td recovery
     Safe to delete. -->

---
";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// A persisted value could not be parsed
    Parser,
    /// A store read failed
    Read,
    /// A store write failed
    Write,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Parser => write!(f, "parser"),
            RecoveryCategory::Read => write!(f, "read"),
            RecoveryCategory::Write => write!(f, "write"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "parser" => Some(RecoveryCategory::Parser),
            "read" => Some(RecoveryCategory::Read),
            "write" => Some(RecoveryCategory::Write),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Format this entry as a markdown block for the recovery log.
    fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "## {} [{}] {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        ));
        out.push('\n');

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        if !self.body.is_empty() {
            out.push('\n');
            out.push_str("```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }

        out.push('\n');
        out.push_str("---\n");
        out
    }
}

// ---------------------------------------------------------------------------
// Path helper
// ---------------------------------------------------------------------------

/// Return the path to the recovery log file.
pub fn recovery_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".recovery.log")
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Where storage problems get reported.
///
/// With a data directory attached, entries are appended to its recovery log
/// and a one-line warning goes to stderr. Without one (in-memory stores) only
/// the warning is printed.
#[derive(Debug, Clone, Default)]
pub struct RecoveryLog {
    dir: Option<PathBuf>,
}

impl RecoveryLog {
    pub fn new(data_dir: &Path) -> Self {
        RecoveryLog {
            dir: Some(data_dir.to_path_buf()),
        }
    }

    /// A log that only warns on stderr.
    pub fn stderr_only() -> Self {
        RecoveryLog { dir: None }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Record an entry. Never fails; problems writing the log itself are
    /// printed to stderr.
    pub fn record(&self, entry: RecoveryEntry) {
        eprintln!("warning: {}: {}", entry.category, entry.description);
        if let Some(dir) = &self.dir
            && let Err(e) = append_entry(dir, &entry)
        {
            eprintln!("warning: could not write to recovery log: {}", e);
        }
    }
}

fn append_entry(data_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(data_dir);

    if let Ok(meta) = std::fs::metadata(&path)
        && meta.len() > MAX_LOG_SIZE
    {
        trim_oldest(&path)?;
    }

    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }

    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

/// Drop the oldest half of the entries.
fn trim_oldest(path: &Path) -> io::Result<()> {
    let content = std::fs::read_to_string(path)?;
    let entries = parse_entries(&content);
    let keep = &entries[entries.len() / 2..];

    let mut out = String::from(FILE_HEADER);
    for entry in keep {
        out.push_str(&entry.to_markdown());
    }
    atomic_write(path, out.as_bytes())
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read recovery entries, most recent first.
pub fn read_recovery_entries(data_dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let path = recovery_log_path(data_dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);

    // Entries are parsed oldest-first
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries = entries.into_iter().skip(skip).collect();
    }

    entries.reverse();
    entries
}

/// Remove the recovery log. Returns how many entries it held.
pub fn clear_recovery_log(data_dir: &Path) -> io::Result<usize> {
    let path = recovery_log_path(data_dir);
    if !path.exists() {
        return Ok(0);
    }
    let count = parse_entries(&std::fs::read_to_string(&path)?).len();
    std::fs::remove_file(&path)?;
    Ok(count)
}

/// Parse all entries from the log content string.
fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        let mut in_code_block = false;

        for line in lines.by_ref() {
            if in_code_block {
                if line == "```" {
                    in_code_block = false;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }

            if line == "---" {
                break;
            }

            if line.starts_with("```") {
                in_code_block = true;
                continue;
            }

            if let Some((key, value)) = line.trim().split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }

    entries
}

/// Parse an entry header: `<timestamp> [<category>] <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp_str, rest) = header.split_once(" [")?;
    let (category_str, description) = rest.split_once("] ")?;

    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);
    let category = RecoveryCategory::parse_category(category_str)?;

    Some((timestamp, category, description.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn record_and_read_back() {
        let tmp = TempDir::new().unwrap();
        let log = RecoveryLog::new(tmp.path());

        log.record(
            RecoveryEntry::new(RecoveryCategory::Write, "save failed")
                .field("Key", "TodoApp")
                .body("[{\"id\":1}]"),
        );
        log.record(RecoveryEntry::new(RecoveryCategory::Parser, "bad list"));

        let content = fs_read(tmp.path());
        assert!(content.starts_with("<!-- todos recovery log"));

        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 2);
        // Most recent first
        assert_eq!(entries[0].category, RecoveryCategory::Parser);
        assert_eq!(entries[1].description, "save failed");
        assert_eq!(
            entries[1].fields,
            vec![("Key".to_string(), "TodoApp".to_string())]
        );
        assert_eq!(entries[1].body, "[{\"id\":1}]");
    }

    #[test]
    fn limit_keeps_most_recent() {
        let tmp = TempDir::new().unwrap();
        let log = RecoveryLog::new(tmp.path());
        for i in 0..5 {
            log.record(RecoveryEntry::new(RecoveryCategory::Read, format!("e{}", i)));
        }
        let entries = read_recovery_entries(tmp.path(), Some(2));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "e4");
        assert_eq!(entries[1].description, "e3");
    }

    #[test]
    fn missing_log_reads_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(read_recovery_entries(tmp.path(), None).is_empty());
        assert_eq!(clear_recovery_log(tmp.path()).unwrap(), 0);
    }

    #[test]
    fn clear_removes_file() {
        let tmp = TempDir::new().unwrap();
        let log = RecoveryLog::new(tmp.path());
        log.record(RecoveryEntry::new(RecoveryCategory::Write, "x"));
        assert_eq!(clear_recovery_log(tmp.path()).unwrap(), 1);
        assert!(!recovery_log_path(tmp.path()).exists());
    }

    #[test]
    fn stderr_only_log_writes_nothing() {
        let log = RecoveryLog::stderr_only();
        assert!(log.dir().is_none());
        log.record(RecoveryEntry::new(RecoveryCategory::Write, "ignored"));
    }

    #[test]
    fn atomic_write_replaces_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("value");
        atomic_write(&path, b"one").unwrap();
        atomic_write(&path, b"two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
    }

    fn fs_read(dir: &Path) -> String {
        std::fs::read_to_string(recovery_log_path(dir)).unwrap()
    }
}
