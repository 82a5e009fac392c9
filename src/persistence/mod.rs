//! Key-value persistence
//!
//! Everything the game stores is a small JSON blob under a fixed key. The
//! browser build backs this with LocalStorage; native runs and tests use an
//! in-memory map.

pub mod profile;

pub use profile::Profile;

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

/// Minimal string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;

    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

/// Read and decode a JSON value. `Ok(None)` when the key is absent.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, PersistError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| PersistError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// Encode and write a JSON value
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), PersistError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// In-memory store for native runs and tests
#[derive(Debug, Clone, Default)]
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
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// Open the window's LocalStorage, if the browser allows it
    pub fn open() -> Result<Self, PersistError> {
        let storage = web_sys::window()
            .ok_or_else(|| PersistError::Unavailable("no window".to_string()))?
            .local_storage()
            .map_err(|e| PersistError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| PersistError::Unavailable("LocalStorage disabled".to_string()))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.storage
            .get_item(key)
            .map_err(|e| PersistError::Unavailable(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PersistError::Unavailable(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.storage
            .remove_item(key)
            .map_err(|e| PersistError::Unavailable(format!("{e:?}")))
    }
}
