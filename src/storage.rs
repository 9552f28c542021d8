use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Prefix shared by every key this application writes.
pub const KEY_PREFIX: &str = "komaread";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access store file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store file {path:?} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Minimal key/value persistence surface.
///
/// Writes are last-write-wins. Implementations log their own failures;
/// callers never see a persistence error.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Store handle shared between the application and the open reader session.
pub type SharedStore = Rc<RefCell<dyn KeyValueStore>>;

pub fn shared<S: KeyValueStore + 'static>(store: S) -> SharedStore {
    Rc::new(RefCell::new(store))
}

#[derive(Debug, Default, Clone)]
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

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// String map persisted as pretty JSON, rewritten on every mutation.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFileStore {
    entries: BTreeMap<String, String>,
    #[serde(skip)]
    file_path: Option<PathBuf>,
}

impl JsonFileStore {
    pub fn ephemeral() -> Self {
        Self {
            entries: BTreeMap::new(),
            file_path: None,
        }
    }

    pub fn with_file(file_path: impl Into<PathBuf>) -> Self {
        Self {
            entries: BTreeMap::new(),
            file_path: Some(file_path.into()),
        }
    }

    /// Open the store at `file_path`, falling back to an empty store when the
    /// file is unreadable or malformed. `None` gives an in-memory store.
    pub fn load_or_ephemeral(file_path: Option<&Path>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load store, starting empty: {e}");
                Self::with_file(path)
            }),
            None => Self::ephemeral(),
        }
    }

    pub fn load_from_file(file_path: &Path) -> Result<Self, StoreError> {
        if !file_path.exists() {
            return Ok(Self::with_file(file_path));
        }
        let content = fs::read_to_string(file_path).map_err(|source| StoreError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;
        let mut store: Self =
            serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
                path: file_path.to_path_buf(),
                source,
            })?;
        store.file_path = Some(file_path.to_path_buf());
        log::debug!(
            "Loaded {} store entries from {file_path:?}",
            store.entries.len()
        );
        Ok(store)
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| StoreError::Malformed {
            path: path.clone(),
            source,
        })?;
        fs::write(path, content).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            log::error!("Failed to persist store: {e}");
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.persist();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = JsonFileStore::load_or_ephemeral(Some(&path));
        store.set("a", "1");
        store.set("b", "2");
        store.remove("a");

        let reloaded = JsonFileStore::load_from_file(&path).unwrap();
        assert_eq!(reloaded.get("a"), None);
        assert_eq!(reloaded.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn malformed_file_falls_back_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonFileStore::load_from_file(&path),
            Err(StoreError::Malformed { .. })
        ));

        let mut store = JsonFileStore::load_or_ephemeral(Some(&path));
        assert_eq!(store.get("anything"), None);

        // The first write replaces the broken file.
        store.set("k", "v");
        let reloaded = JsonFileStore::load_from_file(&path).unwrap();
        assert_eq!(reloaded.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn ephemeral_store_never_touches_disk() {
        let mut store = JsonFileStore::load_or_ephemeral(None);
        store.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert!(store.save().is_ok());
    }
}
