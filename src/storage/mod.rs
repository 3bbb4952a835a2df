use crate::error::StorageError;
use leptos::logging::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub(crate) const COLLECTION_KEY: &str = "resume-collection";
pub(crate) const COLLECTION_BACKUP_KEY: &str = "resume-collection-backup";
pub(crate) const PROMPTS_KEY: &str = "resume-prompts";
pub(crate) const PLATFORMS_KEY: &str = "ai-platforms";
pub(crate) const MIGRATION_HANDLED_KEY: &str = "rich-text-migration-handled";

/// Synchronous, durable key-value persistence of JSON documents.
///
/// Every aggregate is read and written as a whole under its own key.
pub trait KvStore {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str);

    /// Missing keys and corrupt payloads both read as `None`; the latter is logged.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_item(key)?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                error!("stored `{}` is not valid: {}", key, e);
                None
            }
        }
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.set_item(key, &json)
    }

    /// Like [`KvStore::save_json`], but a failed write is only logged.
    fn persist_json<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.save_json(key, value) {
            error!("failed to persist `{}`: {}", key, e);
        }
    }
}

/// `window.localStorage`, optionally namespaced by a key prefix.
#[derive(Clone, Debug, Default)]
pub struct BrowserStorage {
    prefix: String,
}

impl BrowserStorage {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl KvStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(&self.key(key)).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(&self.key(key), value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }

    fn remove_item(&self, key: &str) {
        match Self::storage() {
            Some(storage) => {
                let _ = storage.remove_item(&self.key(key));
            }
            None => warn!("local storage unavailable, cannot remove `{}`", key),
        }
    }
}

/// In-process store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|e| StorageError::Write {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        if let Ok(mut items) = self.items.lock() {
            items.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        name: String,
        n: u32,
    }

    #[test]
    fn test_memory_store_clones_share_items() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.set_item("k", "v").unwrap();
        assert_eq!(b.get_item("k").as_deref(), Some("v"));
        b.remove_item("k");
        assert!(a.is_empty());
    }

    #[test]
    fn test_json_roundtrip() {
        let store = MemoryStore::new();
        let v = Sample {
            name: "x".to_string(),
            n: 3,
        };
        store.save_json("sample", &v).unwrap();
        assert_eq!(store.load_json::<Sample>("sample"), Some(v));
    }

    #[test]
    fn test_corrupt_json_reads_as_missing() {
        let store = MemoryStore::new();
        store.set_item("sample", "{not json").unwrap();
        assert_eq!(store.load_json::<Sample>("sample"), None);
        assert_eq!(store.load_json::<Sample>("absent"), None);
    }

    #[test]
    fn test_browser_storage_prefixes_keys() {
        let s = BrowserStorage::new("tenant-a:");
        assert_eq!(s.key(COLLECTION_KEY), "tenant-a:resume-collection");
        assert_eq!(BrowserStorage::default().key(PROMPTS_KEY), "resume-prompts");
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_browser_storage_roundtrip() {
        let s = BrowserStorage::new("wasm-test:");
        s.remove_item(MIGRATION_HANDLED_KEY);
        assert!(s.get_item(MIGRATION_HANDLED_KEY).is_none());

        s.set_item(MIGRATION_HANDLED_KEY, "true").unwrap();
        assert_eq!(s.get_item(MIGRATION_HANDLED_KEY).as_deref(), Some("true"));

        s.remove_item(MIGRATION_HANDLED_KEY);
        assert!(s.get_item(MIGRATION_HANDLED_KEY).is_none());
    }
}
