use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

const SESSION_ID_KEY: &str = "sessionId";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed storage file {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value store, modelled after browser `Storage`
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Session-scoped storage, gone with the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Persistent storage backed by a flat JSON object on disk
///
/// The file is read on every access so another process (the login flow)
/// can rotate the session id underneath us.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&contents).map_err(|source| StorageError::Format {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn write_all(&self, items: &Map<String, Value>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let contents = serde_json::to_string_pretty(items).map_err(|source| {
            StorageError::Format {
                path: self.path.display().to_string(),
                source,
            }
        })?;
        std::fs::write(&self.path, contents).map_err(io_err)
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(items) => items.get(key).and_then(Value::as_str).map(str::to_string),
            Err(e) => {
                tracing::warn!("Failed to read credential storage: {}", e);
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), Value::String(value.to_string()));
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

/// Where the session id lives: a persistent store ("remember me") checked
/// first, then a session-scoped one
#[derive(Clone)]
pub struct SessionCredentials {
    persistent: Arc<dyn KeyValueStorage>,
    session: Arc<dyn KeyValueStorage>,
}

impl SessionCredentials {
    pub fn new(persistent: Arc<dyn KeyValueStorage>, session: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            persistent,
            session,
        }
    }

    /// Both stores in memory, handy for hosts without a disk
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    /// Get the session id, persistent store first; empty values count as absent
    pub fn get_session_id(&self) -> Option<String> {
        self.persistent
            .get_item(SESSION_ID_KEY)
            .filter(|s| !s.is_empty())
            .or_else(|| self.session.get_item(SESSION_ID_KEY))
            .filter(|s| !s.is_empty())
    }

    /// Save the session id, persistently when `remember` is set
    pub fn save_session_id(&self, session_id: &str, remember: bool) {
        let store = if remember {
            &self.persistent
        } else {
            &self.session
        };
        if let Err(e) = store.set_item(SESSION_ID_KEY, session_id) {
            tracing::warn!("Failed to save session id: {}", e);
        }
    }

    /// Clear the session id from both stores
    pub fn clear_session(&self) {
        for store in [&self.persistent, &self.session] {
            if let Err(e) = store.remove_item(SESSION_ID_KEY) {
                tracing::warn!("Failed to clear session id: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistent_store_wins() {
        let credentials = SessionCredentials::in_memory();
        credentials.save_session_id("from-session", false);
        credentials.save_session_id("from-disk", true);
        assert_eq!(credentials.get_session_id().as_deref(), Some("from-disk"));
    }

    #[test]
    fn test_falls_back_to_session_store() {
        let credentials = SessionCredentials::in_memory();
        assert_eq!(credentials.get_session_id(), None);
        credentials.save_session_id("from-session", false);
        assert_eq!(credentials.get_session_id().as_deref(), Some("from-session"));
    }

    #[test]
    fn test_empty_persistent_value_is_skipped() {
        let credentials = SessionCredentials::in_memory();
        credentials.save_session_id("", true);
        credentials.save_session_id("from-session", false);
        assert_eq!(credentials.get_session_id().as_deref(), Some("from-session"));
    }

    #[test]
    fn test_clear_session() {
        let credentials = SessionCredentials::in_memory();
        credentials.save_session_id("a", true);
        credentials.save_session_id("b", false);
        credentials.clear_session();
        assert_eq!(credentials.get_session_id(), None);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("credentials.json"));

        assert_eq!(storage.get_item(SESSION_ID_KEY), None);
        storage.set_item(SESSION_ID_KEY, "abc").unwrap();
        storage.set_item("other", "x").unwrap();

        let reopened = FileStorage::new(storage.path().to_path_buf());
        assert_eq!(reopened.get_item(SESSION_ID_KEY).as_deref(), Some("abc"));

        reopened.remove_item(SESSION_ID_KEY).unwrap();
        assert_eq!(storage.get_item(SESSION_ID_KEY), None);
        assert_eq!(storage.get_item("other").as_deref(), Some("x"));
    }

    #[test]
    fn test_file_storage_malformed_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get_item(SESSION_ID_KEY), None);
        assert!(storage.set_item(SESSION_ID_KEY, "abc").is_err());
    }
}
