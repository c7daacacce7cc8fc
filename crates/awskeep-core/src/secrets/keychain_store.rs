//! System keychain secret store
//!
//! Uses the OS keychain for secure credential storage:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::Entry;
use tracing::{debug, info, warn};

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Service name entries are filed under unless overridden
pub const DEFAULT_SERVICE: &str = "awskeep";

/// Secret store backed by the system keychain
///
/// Each profile is one keychain entry: service `awskeep`, account = profile
/// name, password = the JSON encoded credentials.
///
/// # Example
///
/// ```no_run
/// use awskeep_core::secrets::{KeychainSecretStore, SecretStore};
/// use awskeep_core::types::Credentials;
///
/// let store = KeychainSecretStore::new();
/// let creds = Credentials::new("AKIDEXAMPLE", "secret").unwrap();
/// store.save("work", &creds).unwrap();
///
/// assert!(store.fetch("work").unwrap().is_some());
/// ```
pub struct KeychainSecretStore {
    service_name: String,
}

impl KeychainSecretStore {
    /// Create a keychain store with the default service name
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Create a keychain store with a custom service name
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service_name: service.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> SecretStoreResult<Entry> {
        Entry::new(&self.service_name, key)
            .map_err(|e| keychain_error("Failed to create keychain entry", e))
    }
}

impl Default for KeychainSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeychainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeychainSecretStore")
            .field("service_name", &self.service_name)
            .finish()
    }
}

impl SecretStore for KeychainSecretStore {
    fn name(&self) -> &str {
        "keychain"
    }

    fn get(&self, key: &str) -> SecretStoreResult<Option<String>> {
        debug!(service = %self.service_name, key, "keychain get");
        match self.entry(key)?.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keychain_error("Failed to read from keychain", e)),
        }
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        info!(service = %self.service_name, key, "keychain store");
        self.entry(key)?
            .set_password(value)
            .map_err(|e| keychain_error("Failed to store in keychain", e))?;

        // Read back through a fresh entry so a cached-but-unpersisted write is caught
        match self.entry(key)?.get_password() {
            Ok(retrieved) if retrieved == value => Ok(()),
            Ok(_) => Err(SecretStoreError::Other(
                "Keychain store verification failed: value mismatch".to_string(),
            )),
            Err(e) => Err(keychain_error("Keychain store verification failed: could not read back", e)),
        }
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        debug!(service = %self.service_name, key, "keychain delete");
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keychain_error("Failed to delete from keychain", e)),
        }
    }
}

/// A locked or missing keychain service is `NotAvailable`; anything else is `Other`
fn keychain_error(action: &str, e: keyring::Error) -> SecretStoreError {
    match e {
        keyring::Error::NoStorageAccess(_) | keyring::Error::PlatformFailure(_) => {
            warn!("keychain unavailable: {}", e);
            SecretStoreError::NotAvailable(format!("{}: {}", action, e))
        }
        _ => SecretStoreError::Other(format!("{}: {}", action, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Credentials;

    // These need a running keychain service and are skipped on CI

    #[test]
    #[ignore] // Requires system keychain
    fn test_save_and_fetch() {
        let store = KeychainSecretStore::with_service("awskeep-test");
        let _ = store.delete("fetch_test");

        let creds = Credentials::new("AKIDTEST", "secret").unwrap();
        store.save("fetch_test", &creds).unwrap();
        let fetched = store.fetch("fetch_test").unwrap().unwrap();
        assert_eq!(fetched.access_key_id(), "AKIDTEST");

        store.delete("fetch_test").unwrap();
        assert!(store.fetch("fetch_test").unwrap().is_none());
    }

    #[test]
    #[ignore] // Requires system keychain
    fn test_delete_missing_is_ok() {
        let store = KeychainSecretStore::with_service("awskeep-test");
        store.delete("never_stored").unwrap();
        store.delete("never_stored").unwrap();
    }

    #[test]
    fn test_keychain_errors_are_classified() {
        let locked = keyring::Error::NoStorageAccess(Box::new(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "collection is locked",
        )));
        match keychain_error("Failed to read from keychain", locked) {
            SecretStoreError::NotAvailable(message) => {
                assert!(message.starts_with("Failed to read from keychain: "))
            }
            other => panic!("unexpected: {:?}", other),
        }

        let invalid = keyring::Error::Invalid("user".to_string(), "empty".to_string());
        assert!(matches!(
            keychain_error("Failed to create keychain entry", invalid),
            SecretStoreError::Other(_)
        ));
    }

    #[test]
    fn test_name_and_service() {
        let store = KeychainSecretStore::new();
        assert_eq!(store.name(), "keychain");
        assert_eq!(store.service_name(), "awskeep");

        let custom = KeychainSecretStore::with_service("other");
        assert_eq!(custom.service_name(), "other");
    }
}
