//! String key-value storage for local play state.
//!
//! Mirrors the browser's local storage: string keys, string values, no
//! transactions. Each date has up to three slots, `<key>-answers`,
//! `<key>-correct` and `<key>-overturns`.
//!
//! Values written by this crate are versioned envelopes
//! (`{"version":1,"data":[...]}`); bare JSON arrays written by older releases
//! are still read.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Current format version for values written to the store.
pub const RECORD_VERSION: u32 = 1;

/// A string-keyed, string-valued persistent store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write several keys together. Stores that persist on every write
    /// override this to persist once, all or nothing.
    fn set_many(&mut self, entries: &[(String, String)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Remove a key. Returns whether it was present.
    fn remove(&mut self, key: &str) -> Result<bool, StoreError>;

    /// All keys currently in the store, sorted.
    fn keys(&self) -> Vec<String>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn set_many(&mut self, entries: &[(String, String)]) -> Result<(), StoreError> {
        (**self).set_many(entries)
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

/// The per-date slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Answers,
    Correct,
    Overturns,
}

impl Slot {
    pub fn suffix(self) -> &'static str {
        match self {
            Slot::Answers => "answers",
            Slot::Correct => "correct",
            Slot::Overturns => "overturns",
        }
    }

    /// The store key for this slot under a date key.
    pub fn key(self, date_key: &str) -> String {
        format!("{date_key}-{}", self.suffix())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredValue<T> {
    Versioned { version: u32, data: T },
    Legacy(T),
}

/// Encode a value as a current-version envelope.
pub fn encode<T: Serialize>(value: &T) -> Result<String, StoreError> {
    let envelope = EnvelopeRef {
        version: RECORD_VERSION,
        data: value,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode either a versioned envelope or a bare legacy value.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, StoreError> {
    match serde_json::from_str::<StoredValue<T>>(raw) {
        Ok(StoredValue::Versioned { version, data }) => {
            if version > RECORD_VERSION {
                return Err(StoreError::UnsupportedVersion {
                    found: version,
                    supported: RECORD_VERSION,
                });
            }
            Ok(data)
        }
        Ok(StoredValue::Legacy(data)) => Ok(data),
        // Re-parse as the bare type to surface a useful error message.
        Err(_) => Ok(serde_json::from_str::<T>(raw)?),
    }
}

/// In-memory store, used for tests and offline one-shot runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// A store persisted as one JSON object on disk.
///
/// Every mutation rewrites the whole file through a temporary file in the
/// same directory, so a crash leaves either the old or the new contents.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        tracing::debug!("opened store {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(io_err)?;

        let json = serde_json::to_string_pretty(&self.entries)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn set_many(&mut self, entries: &[(String, String)]) -> Result<(), StoreError> {
        let previous: Vec<(String, Option<String>)> = entries
            .iter()
            .map(|(key, value)| (key.clone(), self.entries.insert(key.clone(), value.clone())))
            .collect();

        if let Err(e) = self.flush() {
            for (key, old) in previous.into_iter().rev() {
                match old {
                    Some(old) => self.entries.insert(key, old),
                    None => self.entries.remove(&key),
                };
            }
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_keys() {
        assert_eq!(Slot::Answers.key("20240307"), "20240307-answers");
        assert_eq!(Slot::Correct.key("7/3/2024"), "7/3/2024-correct");
        assert_eq!(Slot::Overturns.to_string(), "overturns");
    }

    #[test]
    fn encode_writes_versioned_envelope() {
        let raw = encode(&vec![true, false]).unwrap();
        assert_eq!(raw, r#"{"version":1,"data":[true,false]}"#);
        assert_eq!(decode::<Vec<bool>>(&raw).unwrap(), vec![true, false]);
    }

    #[test]
    fn decode_reads_legacy_bare_arrays() {
        let answers: Vec<String> = decode(r#"["Oslo","Mozart"]"#).unwrap();
        assert_eq!(answers, vec!["Oslo", "Mozart"]);
        let correct: Vec<bool> = decode("[true,false,true]").unwrap();
        assert_eq!(correct, vec![true, false, true]);
    }

    #[test]
    fn decode_rejects_future_versions() {
        let err = decode::<Vec<bool>>(r#"{"version":7,"data":[true]}"#).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedVersion { found: 7, supported: 1 }
        ));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode::<Vec<bool>>("not json"),
            Err(StoreError::Json(_))
        ));
        assert!(decode::<Vec<bool>>(r#"["yes"]"#).is_err());
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys(), vec!["a", "b"]);
        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.keys().is_empty());
        store.set("20240307-answers", r#"["Oslo"]"#).unwrap();
        drop(store);

        let store = FileStore::open(&path).unwrap();
        assert_eq!(
            store.get("20240307-answers").unwrap().as_deref(),
            Some(r#"["Oslo"]"#)
        );
    }

    #[test]
    fn file_store_set_many_persists_together() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        store
            .set_many(&[
                ("20240307-answers".to_string(), r#"["Oslo"]"#.to_string()),
                ("20240307-correct".to_string(), "[true]".to_string()),
            ])
            .unwrap();
        drop(store);

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.keys(), vec!["20240307-answers", "20240307-correct"]);
    }

    #[test]
    fn file_store_set_many_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocked").join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        std::fs::write(dir.path().join("blocked"), "").unwrap();

        let err = store
            .set_many(&[
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ])
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(store.keys().is_empty());
    }

    #[test]
    fn file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));
    }
}
