//! AWS credential values

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// A complete access key pair, optionally with a session token and expiration
///
/// A `Credentials` value can only be built through [`Credentials::new`], which
/// refuses an empty key id or secret. Code that may or may not have
/// credentials works with `Option<Credentials>`; there is no half-filled
/// state.
///
/// The secret and the session token are wiped from memory on drop and never
/// shown by `Debug`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration: Option<SystemTime>,
}

/// Wire shape of a stored entry, before it is checked for completeness
#[derive(Deserialize)]
struct RawCredentials {
    #[serde(default)]
    access_key_id: Option<String>,
    #[serde(default)]
    secret_access_key: Option<String>,
    #[serde(default)]
    session_token: Option<String>,
    #[serde(default)]
    expiration: Option<SystemTime>,
}

impl Credentials {
    /// Create credentials from a key pair
    ///
    /// Returns `None` when either value is empty.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Option<Self> {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();
        if access_key_id.is_empty() || secret_access_key.is_empty() {
            return None;
        }
        Some(Self {
            access_key_id,
            secret_access_key,
            session_token: None,
            expiration: None,
        })
    }

    /// Attach a session token (an empty token is ignored)
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.session_token = if token.is_empty() { None } else { Some(token) };
        self
    }

    /// Attach an expiration time
    pub fn with_expiration(mut self, expiration: SystemTime) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub fn expiration(&self) -> Option<SystemTime> {
        self.expiration
    }

    /// Whether the credentials carry an expiration that is at or before `now`
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        self.expiration.map(|exp| exp <= now).unwrap_or(false)
    }

    /// Encode for storage in a secret store
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a stored entry
    ///
    /// Returns `Ok(None)` when the entry parses but is missing the key id or
    /// secret. Parts that are not carried over are wiped with the raw entry.
    pub fn from_json(raw: &str) -> Result<Option<Self>, serde_json::Error> {
        let mut parsed: RawCredentials = serde_json::from_str(raw)?;
        let id = parsed.access_key_id.take().unwrap_or_default();
        let secret = parsed.secret_access_key.take().unwrap_or_default();
        let credentials = Self::new(id, secret).map(|c| {
            let c = match parsed.session_token.take() {
                Some(token) => c.with_session_token(token),
                None => c,
            };
            match parsed.expiration {
                Some(exp) => c.with_expiration(exp),
                None => c,
            }
        });
        Ok(credentials)
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.secret_access_key.zeroize();
        if let Some(token) = self.session_token.as_mut() {
            token.zeroize();
        }
    }
}

impl RawCredentials {
    fn wipe(&mut self) {
        for value in [&mut self.secret_access_key, &mut self.session_token] {
            if let Some(value) = value.as_mut() {
                value.zeroize();
            }
        }
    }
}

impl Drop for RawCredentials {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .field("expiration", &self.expiration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_incomplete_pairs_are_rejected() {
        assert!(Credentials::new("", "secret").is_none());
        assert!(Credentials::new("AKID", "").is_none());
        assert!(Credentials::new("AKID", "secret").is_some());
    }

    #[test]
    fn test_empty_session_token_is_dropped() {
        let creds = Credentials::new("AKID", "secret").unwrap().with_session_token("");
        assert_eq!(creds.session_token(), None);

        let creds = creds.with_session_token("token");
        assert_eq!(creds.session_token(), Some("token"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("AKID", "very-secret")
            .unwrap()
            .with_session_token("very-token");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("AKID"));
        assert!(!shown.contains("very-secret"));
        assert!(!shown.contains("very-token"));
    }

    #[test]
    fn test_json_entry_keeps_token_and_expiration() {
        let expiration = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let creds = Credentials::new("AKID", "secret")
            .unwrap()
            .with_session_token("token")
            .with_expiration(expiration);

        let decoded = Credentials::from_json(&creds.to_json().unwrap()).unwrap().unwrap();
        assert_eq!(decoded.access_key_id(), "AKID");
        assert_eq!(decoded.secret_access_key(), "secret");
        assert_eq!(decoded.session_token(), Some("token"));
        assert_eq!(decoded.expiration(), Some(expiration));
    }

    #[test]
    fn test_incomplete_json_entry_is_absent() {
        let decoded = Credentials::from_json(r#"{"access_key_id":"AKID"}"#).unwrap();
        assert!(decoded.is_none());

        assert!(Credentials::from_json("not json").is_err());
    }

    #[test]
    fn test_raw_entry_wipes_unused_secrets() {
        let mut raw: RawCredentials =
            serde_json::from_str(r#"{"secret_access_key":"orphan-secret","session_token":"orphan-token"}"#)
                .unwrap();
        raw.wipe();
        assert_eq!(raw.secret_access_key.as_deref(), Some(""));
        assert_eq!(raw.session_token.as_deref(), Some(""));

        // Without a key id nothing is carried over
        let decoded = Credentials::from_json(r#"{"secret_access_key":"orphan-secret"}"#).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_expiry() {
        let now = SystemTime::now();
        let creds = Credentials::new("AKID", "secret").unwrap();
        assert!(!creds.is_expired_at(now));

        let creds = creds.with_expiration(now - Duration::from_secs(1));
        assert!(creds.is_expired_at(now));
    }
}
