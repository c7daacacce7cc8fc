//! Profile store
//!
//! Profile metadata lives in an INI file; access keys live in a secret
//! store. The profile file never holds access keys once a profile has
//! been saved or migrated.

mod error;
mod store;

pub use error::{NoSourceReason, ProfileError, ProfileResult};
pub use store::{CredentialOptions, ProfileStore};
