//! Credential derivation providers
//!
//! Role assumption and MFA sessions are network calls (STS) that live outside
//! this crate. The resolver only sees these traits; hosts plug in their STS
//! client and MFA code prompt.
//!
//! The mock providers are kept for testing purposes.

mod traits;
mod error;
mod mock;

pub use traits::{AssumeRoleProvider, MfaSessionProvider, RoleAssumptionRequest, MfaSessionRequest};
pub use error::{ProviderError, ProviderResult};

// Mock providers for testing
pub use mock::{MockAssumeRoleProvider, MockMfaSessionProvider, MockMode};
