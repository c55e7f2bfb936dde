//! Key-value backends for the forecast cache.
//!
//! Both backends are write-once at the storage level: `set` on an existing key
//! is rejected rather than overwriting.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Outcome of a `set` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Written,
    AlreadyPresent,
}

/// Minimal string store the cache is generic over.
pub trait KeyValueStore {
    /// `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Store `value` under `key` unless the key already exists.
    fn set(&mut self, key: &str, value: &str) -> io::Result<SetOutcome>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<SetOutcome> {
        (**self).set(key, value)
    }
}

/// Process-local store; contents vanish with the value.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
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

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<SetOutcome> {
        if self.entries.contains_key(key) {
            return Ok(SetOutcome::AlreadyPresent);
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(SetOutcome::Written)
    }
}

/// One `<key>.json` file per entry inside a directory.
///
/// Writes go to a temp file in the same directory and are persisted with a
/// no-clobber rename, so concurrent writers of the same key cannot replace
/// each other's entry and readers never observe a partial file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a cache directory.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<SetOutcome> {
        let path = self.path_for(key);
        if path.exists() {
            return Ok(SetOutcome::AlreadyPresent);
        }

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;

        match tmp.persist_noclobber(&path) {
            Ok(_) => Ok(SetOutcome::Written),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(SetOutcome::AlreadyPresent),
            Err(e) => Err(e.error),
        }
    }
}

/// Keys are generated internally, but keep file names portable anyway.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_is_write_once() {
        let mut s = MemoryStore::new();
        assert_eq!(s.set("k", "a").unwrap(), SetOutcome::Written);
        assert_eq!(s.set("k", "b").unwrap(), SetOutcome::AlreadyPresent);
        assert_eq!(s.get("k").unwrap().as_deref(), Some("a"));
        assert_eq!(s.get("missing").unwrap(), None);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn file_store_round_trips_and_never_clobbers() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = FileStore::open(dir.path().join("cache")).unwrap();

        assert_eq!(s.get("fp-abc").unwrap(), None);
        assert_eq!(s.set("fp-abc", "{\"v\":1}").unwrap(), SetOutcome::Written);
        assert_eq!(s.set("fp-abc", "{\"v\":2}").unwrap(), SetOutcome::AlreadyPresent);
        assert_eq!(s.get("fp-abc").unwrap().as_deref(), Some("{\"v\":1}"));
        assert!(s.path_for("fp-abc").ends_with("fp-abc.json"));
    }

    #[test]
    fn file_store_sanitizes_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStore::open(dir.path()).unwrap();
        let p = s.path_for("../evil key");
        assert_eq!(p.parent(), Some(dir.path()));
        assert!(p.ends_with("___evil_key.json"));
    }
}
