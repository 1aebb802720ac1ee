//! Key-value persistence
//!
//! Everything the game remembers is a named string entry in a synchronous
//! store: LocalStorage in the browser, an in-memory map elsewhere. A missing
//! or unreadable entry always means "use the default".

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Storage keys
pub mod keys {
    pub const DIFFICULTY: &str = "cave_flap_difficulty";
    pub const POWERUPS: &str = "cave_flap_powerups";
    pub const SOUND: &str = "cave_flap_sound";
    pub const GOD_MODE: &str = "cave_flap_god_mode";
    pub const HIGH_SCORE: &str = "cave_flap_high_score";
    pub const LEADERBOARD: &str = "cave_flap_leaderboard";
    pub const STATS: &str = "cave_flap_stats";
    pub const ACHIEVEMENTS: &str = "cave_flap_achievements";
}

/// Why a write did not reach the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No backing store (private browsing, native build without one)
    Unavailable,
    /// The store refused the write (quota, security policy)
    Rejected(String),
    /// The value could not be serialized
    Encode(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "storage unavailable"),
            StorageError::Rejected(reason) => write!(f, "storage rejected write: {}", reason),
            StorageError::Encode(reason) => write!(f, "failed to encode value: {}", reason),
        }
    }
}

impl std::error::Error for StorageError {}

/// Synchronous string key-value store
pub trait KeyValueStore {
    /// `None` when the key is absent or the store cannot be read
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for native builds and tests
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
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable, progress will not be saved");
        }
        Self { storage }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StorageError::Rejected(format!("{:?}", e)))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage
            .remove_item(key)
            .map_err(|e| StorageError::Rejected(format!("{:?}", e)))
    }
}

/// Load a JSON blob, falling back to `T::default()` when absent or corrupt
pub fn load_json<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let Some(json) = store.get(key) else {
        return T::default();
    };
    match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Ignoring corrupt '{}' entry: {}", key, e);
            T::default()
        }
    }
}

/// Serialize and store a JSON blob
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|e| StorageError::Encode(e.to_string()))?;
    store.set(key, &json)
}

/// Parse a plain entry, falling back to `default` when absent or unparsable
pub fn load_parsed<T, S>(store: &S, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    S: KeyValueStore + ?Sized,
{
    store
        .get(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

/// Log a failed write; callers keep running on in-memory state
pub fn warn_on_error(what: &str, result: Result<(), StorageError>) {
    if let Err(e) = result {
        log::warn!("Could not save {}: {}", what, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Blob {
        count: u32,
        name: String,
    }

    /// A store whose writes always fail
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a"), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_json_blob() {
        let mut store = MemoryStore::new();
        let blob = Blob {
            count: 3,
            name: "bat".into(),
        };
        save_json(&mut store, "blob", &blob).unwrap();
        assert_eq!(load_json::<Blob, _>(&store, "blob"), blob);
    }

    #[test]
    fn test_missing_and_corrupt_load_default() {
        let mut store = MemoryStore::new();
        assert_eq!(load_json::<Blob, _>(&store, "blob"), Blob::default());
        store.set("blob", "{not json").unwrap();
        assert_eq!(load_json::<Blob, _>(&store, "blob"), Blob::default());
    }

    #[test]
    fn test_load_parsed() {
        let mut store = MemoryStore::new();
        assert_eq!(load_parsed(&store, "n", 7u32), 7);
        store.set("n", "42").unwrap();
        assert_eq!(load_parsed(&store, "n", 7u32), 42);
        store.set("n", "many").unwrap();
        assert_eq!(load_parsed(&store, "n", 7u32), 7);
    }

    #[test]
    fn test_unavailable_store_degrades() {
        let mut store = BrokenStore;
        assert_eq!(load_json::<Blob, _>(&store, "blob"), Blob::default());
        let err = save_json(&mut store, "blob", &Blob::default()).unwrap_err();
        assert_eq!(err, StorageError::Unavailable);
        assert_eq!(err.to_string(), "storage unavailable");
        warn_on_error("blob", Err(err));
    }
}
