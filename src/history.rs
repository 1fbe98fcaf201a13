use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One recorded shell command.
///
/// An entry is immutable once written; its position in the log file is its
/// total order, since ids are handed out at append time under the write lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Assigned by the store on first save. 0 means "not yet assigned".
    #[serde(default)]
    pub id: u64,
    pub session_id: String,
    pub cwd: String,
    pub command: String,
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    pub fn new(session_id: String, cwd: String, command: String) -> Self {
        Self {
            id: 0,
            session_id,
            cwd,
            command,
            timestamp: Utc::now(),
        }
    }
}

/// Query predicate for loading entries. All supplied fields must match (AND).
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    /// Cap on the number of matches, counted in file order. 0 = unbounded.
    pub limit: usize,
}

impl EntryFilter {
    pub fn matches(&self, entry: &Entry) -> bool {
        if let Some(ref session_id) = self.session_id {
            if entry.session_id != *session_id {
                return false;
            }
        }
        if let Some(ref cwd) = self.cwd {
            if entry.cwd != *cwd {
                return false;
            }
        }
        true
    }
}

#[derive(Debug)]
pub enum StorageError {
    NotFound(u64),
    Io(std::io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "history entry {} not found", id),
            Self::Io(err) => write!(f, "history file error: {}", err),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(session: &str, cwd: &str, command: &str) -> Entry {
        Entry::new(session.to_string(), cwd.to_string(), command.to_string())
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = EntryFilter::default();
        assert!(filter.matches(&entry("s1", "/tmp", "ls")));
        assert!(filter.matches(&entry("", "", "")));
    }

    #[test]
    fn filter_predicates_are_conjunctive() {
        let filter = EntryFilter {
            session_id: Some("s1".to_string()),
            cwd: Some("/tmp".to_string()),
            limit: 0,
        };
        assert!(filter.matches(&entry("s1", "/tmp", "ls")));
        assert!(!filter.matches(&entry("s1", "/home", "ls")));
        assert!(!filter.matches(&entry("s2", "/tmp", "ls")));
    }

    #[test]
    fn entry_round_trips_through_json() {
        let e = entry("s1", "/home/user", "cargo test -- --nocapture");
        let json = serde_json::to_string(&e).unwrap();
        let back: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }
}
