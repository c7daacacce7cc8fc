//! In-memory secret store

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::{SecretStore, SecretStoreResult};

/// In-memory secret store for testing and ephemeral use
///
/// Entries are lost when the store is dropped.
///
/// # Example
///
/// ```
/// use awskeep_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.store("dev", "{}").unwrap();
/// assert_eq!(store.get("dev").unwrap(), Some("{}".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> SecretStoreResult<Option<String>> {
        Ok(self.secrets.read().get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        self.secrets.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        self.secrets.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Credentials;

    #[test]
    fn test_memory_store_crud() {
        let store = MemorySecretStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("test").unwrap(), None);

        store.store("test", "value").unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.has("test").unwrap());

        store.delete("test").unwrap();
        assert!(!store.has("test").unwrap());

        // Deleting again is fine
        store.delete("test").unwrap();
    }

    #[test]
    fn test_fetch_skips_incomplete_and_garbage_entries() {
        let store = MemorySecretStore::new();
        store.store("half", r#"{"access_key_id":"AKID","secret_access_key":""}"#).unwrap();
        store.store("garbage", "not json").unwrap();

        assert!(store.fetch("half").unwrap().is_none());
        assert!(store.fetch("garbage").unwrap().is_none());
        assert!(store.fetch("missing").unwrap().is_none());
    }

    #[test]
    fn test_save_then_fetch() {
        let store = MemorySecretStore::new();
        let creds = Credentials::new("AKID", "secret").unwrap().with_session_token("tok");
        store.save("dev", &creds).unwrap();

        let fetched = store.fetch("dev").unwrap().unwrap();
        assert_eq!(fetched.secret_access_key(), "secret");
        assert_eq!(fetched.session_token(), Some("tok"));
    }

    #[test]
    fn test_memory_store_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemorySecretStore::new());
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let key = format!("key_{}", i);
                    store.store(&key, "value").unwrap();
                    assert!(store.has(&key).unwrap());
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 10);
    }
}
