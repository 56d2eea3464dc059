//! Key-value persistence for bookmarks and column presets.
//!
//! The engine never touches storage on its own; callers pass a
//! [`KeyValueStore`] to the load/save methods.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const BOOKMARKS_KEY: &str = "bookmarks";
pub const COLUMN_PRESETS_KEY: &str = "column_presets";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait KeyValueStore {
    /// `None` when the key was never saved.
    fn load(&self, key: &str) -> StoreResult<Option<String>>;

    fn save(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys in one JSON object on disk. Writes go to a temp file that is
/// then renamed over the original.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StoreResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        serde_json::to_writer_pretty(&mut writer, entries)?;
        writer.flush()?;
        drop(writer);

        fs::rename(&temp_path, &self.path)?;
        debug!(path = %self.path.display(), keys = entries.len(), "store written");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }
}

/// Decode a JSON value stored under `key`. Missing or malformed entries
/// yield the default.
fn load_json<T, S>(store: &S, key: &str) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.load(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!(key, error = %e, "ignoring malformed stored value");
            Ok(T::default())
        }
    }
}

fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> StoreResult<()>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.save(key, &raw)
}

/// Bookmarked record ids, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bookmarks {
    ids: Vec<String>,
}

impl Bookmarks {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> StoreResult<Self> {
        let mut bookmarks: Bookmarks = load_json(store, BOOKMARKS_KEY)?;
        let mut seen = std::collections::HashSet::new();
        bookmarks.ids.retain(|id| seen.insert(id.clone()));
        Ok(bookmarks)
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> StoreResult<()> {
        save_json(store, BOOKMARKS_KEY, self)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|b| b == id)
    }

    /// Add or remove `id`. Returns whether it is bookmarked afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|b| b == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Named column lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnPresets {
    presets: BTreeMap<String, Vec<String>>,
}

impl ColumnPresets {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> StoreResult<Self> {
        load_json(store, COLUMN_PRESETS_KEY)
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> StoreResult<()> {
        save_json(store, COLUMN_PRESETS_KEY, self)
    }

    /// Insert or replace a preset.
    pub fn set(&mut self, name: impl Into<String>, columns: Vec<String>) {
        self.presets.insert(name.into(), columns);
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.presets.get(name).map(Vec::as_slice)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.presets.remove(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.presets.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
