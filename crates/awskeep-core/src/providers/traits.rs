//! Credential derivation provider traits

use crate::types::Credentials;
use super::error::ProviderResult;

/// Everything needed to assume a role
#[derive(Debug, Clone)]
pub struct RoleAssumptionRequest {
    /// Credentials the call is signed with (MFA session credentials when MFA applies)
    pub credentials: Credentials,
    pub role_arn: String,
    pub role_session_name: String,
    pub external_id: Option<String>,
    pub region: Option<String>,
    /// Requested session length
    pub duration_seconds: Option<u32>,
    /// The profile whose credentials sign the call (the `source_profile`)
    pub profile: String,
}

/// Everything needed to open an MFA session
#[derive(Debug, Clone)]
pub struct MfaSessionRequest {
    pub credentials: Credentials,
    pub region: Option<String>,
    /// MFA device serial number or ARN
    pub serial_number: String,
    /// Profile being resolved
    pub profile: String,
    /// Profile that supplied `credentials`
    pub source_profile: String,
}

/// Exchanges source credentials for temporary role credentials (STS AssumeRole)
///
/// Calls block until the provider answers; no retries happen above this trait.
pub trait AssumeRoleProvider: Send + Sync {
    /// Provider name, used in logs
    fn name(&self) -> &str;

    fn assume_role(&self, request: &RoleAssumptionRequest) -> ProviderResult<Credentials>;
}

/// Exchanges source credentials plus an MFA code for session credentials
///
/// Obtaining the code (prompt, OTP generator, ...) is the provider's job. The
/// resolver only calls this when the profile names an MFA device, so the
/// request always carries a serial number.
pub trait MfaSessionProvider: Send + Sync {
    /// Provider name, used in logs
    fn name(&self) -> &str;

    fn session(&self, request: &MfaSessionRequest) -> ProviderResult<Credentials>;
}
