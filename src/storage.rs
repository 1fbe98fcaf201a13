use crate::history::{Entry, EntryFilter, StorageError};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

const HISTORY_FILE: &str = "history.jsonl";

/// Append-only store for history entries, backed by a JSONL file.
///
/// Writers are serialized through the internal lock; readers share it. The
/// lock only arbitrates within one process — cross-process appends rely on
/// the filesystem's append semantics for record atomicity.
pub struct Store {
    base_path: PathBuf,
    next_id: RwLock<u64>,
}

impl Store {
    /// Open (or create) the store rooted at `base_path`.
    ///
    /// Scans any existing log once to resume id allocation at `max + 1`.
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        let store = Self {
            base_path,
            next_id: RwLock::new(1),
        };
        let next = store.scan_next_id()?;
        *store.write_guard() = next;
        Ok(store)
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn history_file(&self) -> PathBuf {
        self.base_path.join(HISTORY_FILE)
    }

    fn scan_next_id(&self) -> Result<u64, StorageError> {
        let file = match File::open(self.history_file()) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(1),
            Err(err) => return Err(err.into()),
        };

        let mut max_id = 0;
        for line in BufReader::new(file).lines() {
            if let Some(entry) = decode_line(&line?) {
                max_id = max_id.max(entry.id);
            }
        }
        Ok(max_id + 1)
    }

    /// Append an entry to the log, assigning the next id if it has none.
    pub fn save(&self, entry: &mut Entry) -> Result<(), StorageError> {
        let mut next_id = self.write_guard();

        if entry.id == 0 {
            entry.id = *next_id;
            *next_id += 1;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.history_file())?;

        let line = serde_json::to_string(entry)
            .map_err(|err| std::io::Error::new(ErrorKind::InvalidData, err))?;
        writeln!(file, "{}", line)?;

        debug!(id = entry.id, cwd = %entry.cwd, "recorded entry");
        Ok(())
    }

    /// Load entries matching `filter`, in file (== id) order.
    ///
    /// Stops after `filter.limit` matches when the limit is positive; this is
    /// "first N in file order", not "last N". A missing log file is an empty
    /// history, not an error.
    pub fn load(&self, filter: &EntryFilter) -> Result<Vec<Entry>, StorageError> {
        let _guard = self.read_guard();

        let file = match File::open(self.history_file()) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let Some(entry) = decode_line(&line?) else {
                continue;
            };
            if !filter.matches(&entry) {
                continue;
            }
            entries.push(entry);
            if filter.limit > 0 && entries.len() >= filter.limit {
                break;
            }
        }
        Ok(entries)
    }

    /// Find the entry with the given id.
    pub fn get_by_id(&self, id: u64) -> Result<Entry, StorageError> {
        let _guard = self.read_guard();

        let file = match File::open(self.history_file()) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(id))
            }
            Err(err) => return Err(err.into()),
        };

        for line in BufReader::new(file).lines() {
            if let Some(entry) = decode_line(&line?) {
                if entry.id == id {
                    return Ok(entry);
                }
            }
        }
        Err(StorageError::NotFound(id))
    }

    /// Distinct session ids, in order of first appearance in the log.
    pub fn list_sessions(&self) -> Result<Vec<String>, StorageError> {
        self.distinct(|entry| entry.session_id)
    }

    /// Distinct working directories, in order of first appearance in the log.
    pub fn list_directories(&self) -> Result<Vec<String>, StorageError> {
        self.distinct(|entry| entry.cwd)
    }

    fn distinct(&self, key: impl Fn(Entry) -> String) -> Result<Vec<String>, StorageError> {
        let _guard = self.read_guard();

        let file = match File::open(self.history_file()) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut values: Vec<String> = Vec::new();
        for line in BufReader::new(file).lines() {
            if let Some(entry) = decode_line(&line?) {
                let value = key(entry);
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        Ok(values)
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, u64> {
        self.next_id.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, u64> {
        self.next_id.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Tolerant scan policy: a line that fails to decode is dropped, never an
/// error. This keeps a torn or concurrently-written record from poisoning
/// the rest of the log.
fn decode_line(line: &str) -> Option<Entry> {
    match serde_json::from_str::<Entry>(line) {
        Ok(entry) => Some(entry),
        Err(err) => {
            debug!(%err, "skipping undecodable history line");
            None
        }
    }
}
