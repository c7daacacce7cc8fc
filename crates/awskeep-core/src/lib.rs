//! awskeep core
//!
//! AWS-style named profiles with their access keys kept in the system
//! keychain instead of a plaintext file.
//!
//! - `profile`: the profile store (save, migrate, delete, list, lookups)
//! - `resolver`: turns a profile into credentials, following `source_profile`
//!   chains through role assumption and MFA sessions
//! - `secrets`: where access keys live (OS keychain, or memory for tests)
//! - `config`: the INI profile file, scrubbed with random bytes before each rewrite
//! - `providers`: the role assumption and MFA session seams the host fills in
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use awskeep_core::{CredentialOptions, CredentialResolver, KeychainSecretStore, ProfileStore, Settings};
//!
//! awskeep_core::logging::init();
//!
//! let resolver = CredentialResolver::new(Arc::new(sts_client), Arc::new(mfa_prompt));
//! let store = ProfileStore::from_settings(
//!     &Settings::from_env(),
//!     Arc::new(KeychainSecretStore::new()),
//!     resolver,
//! );
//!
//! if let Some(store) = store {
//!     store.save_profile("work", [
//!         ("access_key_id", "AKIDEXAMPLE"),
//!         ("secret_access_key", "wJalrXUtnFEMI"),
//!         ("region", "eu-west-1"),
//!     ])?;
//!     let creds = store.credentials(&CredentialOptions::new().with_profile("work"))?;
//! }
//! ```

pub mod types;
pub mod secrets;
pub mod config;
pub mod settings;
pub mod providers;
pub mod resolver;
pub mod profile;
pub mod logging;

// Re-export commonly used types
pub use types::{Credentials, ProfileConfig};

pub use secrets::{KeychainSecretStore, MemorySecretStore, SecretStore, SecretStoreError};

pub use config::{ConfigError, IniFileStore, MemorySectionStore, SectionStore};

pub use settings::Settings;

pub use providers::{
    AssumeRoleProvider, MfaSessionProvider, MfaSessionRequest, ProviderError, RoleAssumptionRequest,
};

pub use resolver::{CredentialResolver, CredentialSource, ResolvedCredentials};

pub use profile::{CredentialOptions, NoSourceReason, ProfileError, ProfileResult, ProfileStore};
