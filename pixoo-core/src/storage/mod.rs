/*!
Key-value storage adapters for the snapshot archive.

This module defines the durable storage port the archive writes through and
its concrete adapters. The archive only ever reads and overwrites whole
values under one key, so the port stays a plain string map.
*/

pub mod local;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{PixooError, Result};

pub use local::LocalFileStorage;

/// Durable string storage addressed by key
///
/// Implementations must either store the whole value or report an error;
/// a failed `set` must never leave a truncated value behind.
pub trait KeyValueStore {
    /// Read the value stored under `key`
    ///
    /// # Returns
    /// `Ok(None)` when nothing is stored under the key
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value under `key`; removing a missing key succeeds
    fn remove(&self, key: &str) -> Result<()>;

    /// Check whether a value is stored under `key`
    fn exists(&self, key: &str) -> bool;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn exists(&self, key: &str) -> bool {
        (**self).exists(key)
    }
}

/// Memory-based storage adapter
///
/// Clones share the same contents, which lets a test hand one clone to an
/// archive and inspect or reopen through another. An optional quota mimics
/// a browser storage limit: a `set` that would exceed it fails and leaves
/// the previous value in place.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total stored bytes (keys plus values)
    pub fn with_quota(quota: usize) -> Self {
        Self {
            data: Arc::default(),
            quota: Some(quota),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.data
            .lock()
            .map_err(|e| PixooError::storage(format!("Memory storage lock poisoned: {e}")))
    }

    /// Total stored bytes
    pub fn used_bytes(&self) -> usize {
        self.lock()
            .map(|data| data.iter().map(|(k, v)| k.len() + v.len()).sum())
            .unwrap_or(0)
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.lock()?;

        if let Some(quota) = self.quota {
            let others: usize = data
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(PixooError::storage(format!(
                    "Quota exceeded: {needed} bytes needed, {quota} allowed"
                )));
            }
        }

        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.lock().map(|data| data.contains_key(key)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get("images").unwrap(), None);
        assert!(storage.set("images", "[]").is_ok());
        assert!(storage.exists("images"));
        assert_eq!(storage.get("images").unwrap().as_deref(), Some("[]"));

        assert!(storage.remove("images").is_ok());
        assert!(!storage.exists("images"));
        assert!(storage.remove("images").is_ok());
    }

    #[test]
    fn test_memory_storage_clones_share_contents() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_quota_rejects_without_losing_old_value() {
        let storage = MemoryStorage::with_quota(10);
        storage.set("k", "12345").unwrap();
        assert_eq!(storage.used_bytes(), 6);

        let result = storage.set("k", "1234567890");
        assert!(matches!(result, Err(PixooError::Storage(_))));
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("12345"));

        // replacing a value only counts the new size
        assert!(storage.set("k", "123456789").is_ok());
    }

    #[test]
    fn test_boxed_store() {
        let storage: Box<dyn KeyValueStore> = Box::new(MemoryStorage::new());
        storage.set("k", "v").unwrap();
        assert!(storage.exists("k"));
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }
}
