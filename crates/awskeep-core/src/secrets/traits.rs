//! Core traits and types for secret storage

use thiserror::Error;
use tracing::warn;

use crate::types::Credentials;

/// Errors that can occur during secret store operations
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Store not available: {0}")]
    NotAvailable(String),

    #[error("Failed to encode credentials: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Secure storage for profile credentials, addressed by profile name
///
/// Implementations:
/// - System keychain (`KeychainSecretStore`)
/// - In-memory for testing (`MemorySecretStore`)
///
/// Implementations deal in raw strings; `fetch` and `save` layer the
/// credential encoding on top.
///
/// # Example
///
/// ```
/// use awskeep_core::secrets::{SecretStore, MemorySecretStore};
/// use awskeep_core::types::Credentials;
///
/// let store = MemorySecretStore::new();
/// let creds = Credentials::new("AKID", "secret").unwrap();
/// store.save("dev", &creds).unwrap();
///
/// let fetched = store.fetch("dev").unwrap().unwrap();
/// assert_eq!(fetched.access_key_id(), "AKID");
/// ```
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve the raw entry for `key`; a missing entry is `Ok(None)`
    fn get(&self, key: &str) -> SecretStoreResult<Option<String>>;

    /// Store a raw entry, replacing any previous value
    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()>;

    /// Delete an entry
    ///
    /// Deleting a missing entry is not an error.
    fn delete(&self, key: &str) -> SecretStoreResult<()>;

    /// Check if an entry exists
    fn has(&self, key: &str) -> SecretStoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Complete credentials stored for `profile`
    ///
    /// Entries that do not decode to a complete key pair are treated as absent.
    fn fetch(&self, profile: &str) -> SecretStoreResult<Option<Credentials>> {
        let raw = match self.get(profile)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        match Credentials::from_json(&raw) {
            Ok(credentials) => Ok(credentials),
            Err(e) => {
                warn!(store = self.name(), profile, "ignoring undecodable secret entry: {}", e);
                Ok(None)
            }
        }
    }

    /// Store credentials for `profile`
    fn save(&self, profile: &str, credentials: &Credentials) -> SecretStoreResult<()> {
        let encoded = credentials.to_json()?;
        self.store(profile, &encoded)
    }
}
