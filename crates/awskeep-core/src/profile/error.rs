//! Profile store and resolution errors

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::providers::ProviderError;
use crate::secrets::SecretStoreError;

/// Why a derived profile has no usable source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoSourceReason {
    /// `role_arn` is set but `source_profile` is not
    RoleWithoutSource,
    /// `source_profile` resolved to nothing
    SourceWithoutCredentials { source_profile: String },
}

impl fmt::Display for NoSourceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoSourceReason::RoleWithoutSource => write!(f, "has a role_arn but no source_profile"),
            NoSourceReason::SourceWithoutCredentials { source_profile } => {
                write!(f, "source_profile '{}' does not have credentials", source_profile)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Profile '{profile}' {reason}")]
    NoSourceProfile { profile: String, reason: NoSourceReason },

    #[error("Profile '{profile}' has a source_profile but no role_arn")]
    MissingRoleArn { profile: String },

    #[error("source_profile cycle: {}", chain.join(" -> "))]
    CyclicProfile { chain: Vec<String> },

    #[error("Profile '{profile}' has an invalid {field}: '{value}'")]
    InvalidField {
        profile: String,
        field: &'static str,
        value: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    SecretStore(#[from] SecretStoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ProfileError {
    pub(crate) fn no_source(profile: impl Into<String>, reason: NoSourceReason) -> Self {
        Self::NoSourceProfile {
            profile: profile.into(),
            reason,
        }
    }
}

pub type ProfileResult<T> = Result<T, ProfileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_source_messages() {
        let err = ProfileError::no_source("dev", NoSourceReason::RoleWithoutSource);
        assert_eq!(err.to_string(), "Profile 'dev' has a role_arn but no source_profile");

        let err = ProfileError::no_source(
            "dev",
            NoSourceReason::SourceWithoutCredentials {
                source_profile: "base".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "Profile 'dev' source_profile 'base' does not have credentials"
        );
    }

    #[test]
    fn test_cycle_message() {
        let err = ProfileError::CyclicProfile {
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "source_profile cycle: a -> b -> a");
    }

    #[test]
    fn test_provider_errors_pass_through() {
        let err: ProfileError = ProviderError::rejected("sts", "AccessDenied").into();
        assert_eq!(err.to_string(), "sts rejected the request: AccessDenied");
    }
}
