//! Credential resolution engine
//!
//! Checks sources in priority order, first hit wins:
//! 1. Secret store entry (only for profiles present in the profile file)
//! 2. Static keys written inline in the profile's section
//! 3. Role assumption through the `source_profile` chain, with an MFA
//!    session in front of the role call when the profile names a device
//!
//! The chain is walked with an explicit loop: profiles are followed through
//! `source_profile` until one yields credentials directly, then every
//! pending role is assumed on the way back, innermost first.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Section;
use crate::profile::{NoSourceReason, ProfileError, ProfileResult, ProfileStore};
use crate::providers::{AssumeRoleProvider, MfaSessionProvider, MfaSessionRequest, RoleAssumptionRequest};
use crate::types::{
    first_value, normalize_profile, Credentials, ProfileConfig, ACCESS_KEY_ID_KEYS,
    DEFAULT_SESSION_NAME, DURATION_SECONDS, SECRET_ACCESS_KEY_KEYS, SESSION_TOKEN_KEYS,
};

/// Where resolved credentials came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// The secret store entry for the profile
    SecureStore,
    /// Keys written directly in the profile's section
    Inline,
    /// A role assumed with the credentials of `source_profile`
    AssumedRole { source_profile: String },
}

impl CredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::SecureStore => "secure-store",
            CredentialSource::Inline => "inline",
            CredentialSource::AssumedRole { .. } => "assumed-role",
        }
    }
}

/// Result of resolving a profile
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    /// The credentials
    pub credentials: Credentials,
    /// Profile the credentials belong to
    pub profile: String,
    /// Which source provided them
    pub source: CredentialSource,
}

/// A profile waiting for its source's credentials
struct RoleStep {
    profile: String,
    config: ProfileConfig,
    source_profile: String,
}

/// Resolves profiles to credentials against a `ProfileStore`
pub struct CredentialResolver {
    assume_role: Arc<dyn AssumeRoleProvider>,
    mfa: Arc<dyn MfaSessionProvider>,
}

impl CredentialResolver {
    pub fn new(assume_role: Arc<dyn AssumeRoleProvider>, mfa: Arc<dyn MfaSessionProvider>) -> Self {
        Self { assume_role, mfa }
    }

    /// Resolve `profile`
    ///
    /// `Ok(None)` means the profile has no credentials and nothing to derive
    /// them from; it is not an error.
    pub fn resolve(&self, store: &ProfileStore, profile: &str) -> ProfileResult<Option<ResolvedCredentials>> {
        let mut visited: Vec<String> = Vec::new();
        let mut pending: Vec<RoleStep> = Vec::new();
        let mut current = normalize_profile(profile).to_string();

        let base = loop {
            if visited.contains(&current) {
                visited.push(current);
                return Err(ProfileError::CyclicProfile { chain: visited });
            }
            visited.push(current.clone());

            let section = store.profile_section(&current)?;
            if let Some(section) = section.as_ref() {
                if let Some(found) = self.direct_credentials(store, &current, section)? {
                    break found;
                }
            }

            let config = section.as_ref().map(ProfileConfig::from_section).unwrap_or_default();
            match config.source_profile.clone() {
                Some(source_profile) => {
                    debug!(profile = %current, source_profile = %source_profile, "following source_profile");
                    let next = source_profile.clone();
                    pending.push(RoleStep {
                        profile: current,
                        config,
                        source_profile,
                    });
                    current = next;
                }
                None if config.role_arn.is_some() => {
                    return Err(ProfileError::no_source(current, NoSourceReason::RoleWithoutSource));
                }
                None => {
                    return match pending.last() {
                        None => {
                            debug!(profile = %current, "no credentials found");
                            Ok(None)
                        }
                        Some(step) => Err(ProfileError::no_source(
                            step.profile.clone(),
                            NoSourceReason::SourceWithoutCredentials { source_profile: current },
                        )),
                    };
                }
            }
        };

        let mut resolved = base;
        while let Some(step) = pending.pop() {
            resolved = self.assume(store, step, resolved)?;
        }
        Ok(Some(resolved))
    }

    /// Secret store entry, then inline keys
    fn direct_credentials(
        &self,
        store: &ProfileStore,
        profile: &str,
        section: &Section,
    ) -> ProfileResult<Option<ResolvedCredentials>> {
        if let Some(credentials) = store.secrets().fetch(profile)? {
            debug!(profile, store = store.secrets().name(), "credentials found in secret store");
            return Ok(Some(ResolvedCredentials {
                credentials,
                profile: profile.to_string(),
                source: CredentialSource::SecureStore,
            }));
        }

        if let Some(credentials) = inline_credentials(section) {
            debug!(profile, "inline credentials found in profile file");
            return Ok(Some(ResolvedCredentials {
                credentials,
                profile: profile.to_string(),
                source: CredentialSource::Inline,
            }));
        }

        Ok(None)
    }

    /// Derive `step.profile`'s credentials from its source's
    fn assume(
        &self,
        store: &ProfileStore,
        step: RoleStep,
        source: ResolvedCredentials,
    ) -> ProfileResult<ResolvedCredentials> {
        let RoleStep {
            profile,
            config,
            source_profile,
        } = step;
        let ProfileConfig {
            role_arn,
            mfa_serial,
            role_session_name,
            external_id,
            duration_seconds,
            ..
        } = config;

        let role_arn = role_arn.ok_or_else(|| ProfileError::MissingRoleArn {
            profile: profile.clone(),
        })?;
        let duration_seconds = parse_duration(&profile, duration_seconds)?;
        let region = store.profile_region(&profile)?;

        let mut credentials = source.credentials;
        if let Some(serial_number) = mfa_serial {
            info!(profile = %profile, provider = self.mfa.name(), "requesting MFA session");
            credentials = self.mfa.session(&MfaSessionRequest {
                credentials,
                region: region.clone(),
                serial_number,
                profile: profile.clone(),
                source_profile: source_profile.clone(),
            })?;
        }

        let request = RoleAssumptionRequest {
            credentials,
            role_arn,
            role_session_name: role_session_name.unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string()),
            external_id,
            region,
            duration_seconds,
            profile: source_profile.clone(),
        };
        info!(
            profile = %profile,
            role_arn = %request.role_arn,
            session = %request.role_session_name,
            provider = self.assume_role.name(),
            "assuming role"
        );
        let credentials = self.assume_role.assume_role(&request)?;

        Ok(ResolvedCredentials {
            credentials,
            profile,
            source: CredentialSource::AssumedRole { source_profile },
        })
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("assume_role", &self.assume_role.name())
            .field("mfa", &self.mfa.name())
            .finish()
    }
}

/// Static keys written directly in a section
fn inline_credentials(section: &Section) -> Option<Credentials> {
    let id = first_value(section, &ACCESS_KEY_ID_KEYS)?;
    let secret = first_value(section, &SECRET_ACCESS_KEY_KEYS)?;
    let credentials = Credentials::new(id, secret)?;
    Some(match first_value(section, &SESSION_TOKEN_KEYS) {
        Some(token) => credentials.with_session_token(token),
        None => credentials,
    })
}

fn parse_duration(profile: &str, value: Option<String>) -> ProfileResult<Option<u32>> {
    value
        .map(|v| {
            v.trim().parse::<u32>().map_err(|_| ProfileError::InvalidField {
                profile: profile.to_string(),
                field: DURATION_SECONDS,
                value: v.clone(),
            })
        })
        .transpose()
}
