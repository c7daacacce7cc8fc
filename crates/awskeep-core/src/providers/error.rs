//! Provider error types

use thiserror::Error;

/// Errors raised by role-assumption and MFA-session providers
///
/// The resolver passes these through untouched.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider refused the request (bad role, expired token, wrong MFA code, ...)
    #[error("{provider} rejected the request: {message}")]
    Rejected { provider: String, message: String },

    /// Anything else the provider wants to surface
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ProviderError {
    pub fn rejected(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
