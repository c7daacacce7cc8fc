//! Mock providers for testing
//!
//! Deterministic answers without network access. Every request is recorded
//! so tests can assert on what the resolver asked for.

use parking_lot::Mutex;

use super::error::{ProviderError, ProviderResult};
use super::traits::{AssumeRoleProvider, MfaSessionProvider, MfaSessionRequest, RoleAssumptionRequest};
use crate::types::Credentials;

/// Mock response mode
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Answer every request with these credentials
    Fixed(Credentials),
    /// Reject every request with this message
    Error(String),
}

impl MockMode {
    fn answer(&self, provider: &str) -> ProviderResult<Credentials> {
        match self {
            MockMode::Fixed(credentials) => Ok(credentials.clone()),
            MockMode::Error(message) => Err(ProviderError::rejected(provider, message.clone())),
        }
    }
}

/// Mock role-assumption provider
#[derive(Debug)]
pub struct MockAssumeRoleProvider {
    mode: MockMode,
    requests: Mutex<Vec<RoleAssumptionRequest>>,
}

impl MockAssumeRoleProvider {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always return `credentials`
    pub fn fixed(credentials: Credentials) -> Self {
        Self::new(MockMode::Fixed(credentials))
    }

    /// Always fail with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockMode::Error(message.into()))
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RoleAssumptionRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl AssumeRoleProvider for MockAssumeRoleProvider {
    fn name(&self) -> &str {
        "mock-sts"
    }

    fn assume_role(&self, request: &RoleAssumptionRequest) -> ProviderResult<Credentials> {
        self.requests.lock().push(request.clone());
        self.mode.answer(self.name())
    }
}

/// Mock MFA-session provider
#[derive(Debug)]
pub struct MockMfaSessionProvider {
    mode: MockMode,
    requests: Mutex<Vec<MfaSessionRequest>>,
}

impl MockMfaSessionProvider {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn fixed(credentials: Credentials) -> Self {
        Self::new(MockMode::Fixed(credentials))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockMode::Error(message.into()))
    }

    pub fn requests(&self) -> Vec<MfaSessionRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl MfaSessionProvider for MockMfaSessionProvider {
    fn name(&self) -> &str {
        "mock-mfa"
    }

    fn session(&self, request: &MfaSessionRequest) -> ProviderResult<Credentials> {
        self.requests.lock().push(request.clone());
        self.mode.answer(self.name())
    }
}
