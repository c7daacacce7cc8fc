//! Secure credential storage
//!
//! - `SecretStore` trait for implementing custom stores
//! - `KeychainSecretStore` for the OS keychain, `MemorySecretStore` for tests

mod traits;
mod memory_store;
mod keychain_store;

pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
pub use memory_store::MemorySecretStore;
pub use keychain_store::{KeychainSecretStore, DEFAULT_SERVICE};
