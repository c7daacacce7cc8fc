//! Credential resolution
//!
//! Turns a profile name into credentials, deriving them through role
//! assumption and MFA sessions when the profile asks for it.

mod credential_resolver;

pub use credential_resolver::{CredentialResolver, CredentialSource, ResolvedCredentials};
