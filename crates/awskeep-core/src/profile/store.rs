//! Profile store
//!
//! Owns the profile file and the secret store. Every mutation of the profile
//! file (`save_profile`, `migrate_profile`, `delete_profile`) runs its whole
//! read-modify-write-persist sequence under one lock. Reads take no part in
//! that lock, so a resolution running next to a writer may see the section
//! as it was just before the write.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::error::{ProfileError, ProfileResult};
use crate::config::{IniFileStore, Section, SectionStore};
use crate::resolver::{CredentialResolver, ResolvedCredentials};
use crate::secrets::SecretStore;
use crate::settings::Settings;
use crate::types::{
    normalize_profile, profile_name, section_name, Credentials, ProfileConfig,
    ACCESS_KEY_ID_KEYS, DEFAULT_PROFILE, LEGACY_SERIAL_NUMBER, MFA_SERIAL, PROFILE_FIELDS,
    SECRET_ACCESS_KEY_KEYS, SESSION_TOKEN_KEYS,
};

/// Options for a credentials lookup
#[derive(Debug, Clone, Default)]
pub struct CredentialOptions {
    /// Explicitly requested profile
    pub profile: Option<String>,
}

impl CredentialOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a specific profile
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// The requested profile, if one was named (an empty name counts as none)
    pub fn explicit_profile(&self) -> Option<&str> {
        self.profile.as_deref().filter(|p| !p.is_empty())
    }
}

/// Profile metadata plus the secrets that go with it
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use awskeep_core::config::MemorySectionStore;
/// use awskeep_core::profile::{CredentialOptions, ProfileStore};
/// use awskeep_core::providers::{MockAssumeRoleProvider, MockMfaSessionProvider};
/// use awskeep_core::resolver::CredentialResolver;
/// use awskeep_core::secrets::MemorySecretStore;
/// use awskeep_core::types::Credentials;
///
/// let assumed = Credentials::new("ASIA", "temporary").unwrap();
/// let resolver = CredentialResolver::new(
///     Arc::new(MockAssumeRoleProvider::fixed(assumed.clone())),
///     Arc::new(MockMfaSessionProvider::fixed(assumed)),
/// );
/// let store = ProfileStore::new(
///     Arc::new(MemorySectionStore::new()),
///     Arc::new(MemorySecretStore::new()),
///     resolver,
/// );
///
/// store.save_profile("base", [
///     ("access_key_id", "AKIDEXAMPLE"),
///     ("secret_access_key", "wJalrXUtnFEMI"),
///     ("region", "us-east-1"),
/// ]).unwrap();
/// store.save_profile("dev", [
///     ("role_arn", "arn:aws:iam::111:role/dev"),
///     ("source_profile", "base"),
/// ]).unwrap();
///
/// let creds = store
///     .credentials(&CredentialOptions::new().with_profile("dev"))
///     .unwrap()
///     .unwrap();
/// assert_eq!(creds.access_key_id(), "ASIA");
/// assert_eq!(store.profile_region("dev").unwrap().as_deref(), Some("us-east-1"));
/// ```
pub struct ProfileStore {
    config: Arc<dyn SectionStore>,
    secrets: Arc<dyn SecretStore>,
    resolver: CredentialResolver,
    env_profile: Option<String>,
    write_lock: Mutex<()>,
}

impl ProfileStore {
    pub fn new(
        config: Arc<dyn SectionStore>,
        secrets: Arc<dyn SecretStore>,
        resolver: CredentialResolver,
    ) -> Self {
        Self {
            config,
            secrets,
            resolver,
            env_profile: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Profile to fall back to when a lookup names none (normally `AWS_PROFILE`)
    pub fn with_env_profile(mut self, profile: Option<String>) -> Self {
        self.env_profile = profile.filter(|p| !p.is_empty());
        self
    }

    /// Open the profile file named by `settings`
    ///
    /// Returns `None` when the store is disabled.
    pub fn from_settings(
        settings: &Settings,
        secrets: Arc<dyn SecretStore>,
        resolver: CredentialResolver,
    ) -> Option<Self> {
        if !settings.enabled {
            info!("profile store disabled by environment");
            return None;
        }
        debug!(path = %settings.config_path.display(), "opening profile store");
        let config = Arc::new(IniFileStore::new(settings.config_path.clone()));
        Some(Self::new(config, secrets, resolver).with_env_profile(settings.profile.clone()))
    }

    /// Explicit option, then the environment profile, then `default`
    pub fn determine_profile(&self, options: &CredentialOptions) -> String {
        options
            .explicit_profile()
            .or(self.env_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
            .to_string()
    }

    /// Credentials for the profile selected by `options`
    ///
    /// `Ok(None)` when nothing could be resolved. An explicitly requested
    /// profile that is missing from the profile file is an error instead.
    pub fn credentials(&self, options: &CredentialOptions) -> ProfileResult<Option<Credentials>> {
        Ok(self.resolve(options)?.map(|resolved| resolved.credentials))
    }

    /// Like [`credentials`](Self::credentials), also reporting where they came from
    pub fn resolve(&self, options: &CredentialOptions) -> ProfileResult<Option<ResolvedCredentials>> {
        let profile = self.determine_profile(options);
        if options.explicit_profile().is_some() && !self.has_profile(&profile)? {
            return Err(ProfileError::ProfileNotFound(profile));
        }
        self.resolver.resolve(self, &profile)
    }

    /// Create or update a profile
    ///
    /// `fields` are merged over the existing section. Access keys among them
    /// go to the secret store; only the profile fields (`region`, `role_arn`,
    /// `mfa_serial`, `source_profile`, `role_session_name`, `external_id`,
    /// `duration_seconds`) with non-empty values reach the profile file.
    pub fn save_profile<I, K, V>(&self, name: &str, fields: I) -> ProfileResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields: Section = fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        let guard = self.write_lock.lock();
        self.save_locked(&guard, name, fields)
    }

    /// Move any access keys still written in a profile's section into the secret store
    pub fn migrate_profile(&self, name: &str) -> ProfileResult<()> {
        let name = normalize_profile(name);
        let guard = self.write_lock.lock();
        let existing = self
            .config
            .section(&section_name(name))?
            .ok_or_else(|| ProfileError::ProfileNotFound(name.to_string()))?;
        self.save_locked(&guard, name, existing)
    }

    /// Remove a profile and its secret store entry
    ///
    /// The secret store entry is removed first, outside the lock, and failures
    /// there are only logged; a missing profile is still reported.
    pub fn delete_profile(&self, name: &str) -> ProfileResult<()> {
        let name = normalize_profile(name);
        if let Err(e) = self.secrets.delete(name) {
            warn!(profile = name, store = self.secrets.name(), "failed to delete secret: {}", e);
        }

        let _guard = self.write_lock.lock();
        if !self.config.delete_section(&section_name(name))? {
            return Err(ProfileError::ProfileNotFound(name.to_string()));
        }
        self.persist_or_revert()?;
        info!(profile = name, "profile deleted");
        Ok(())
    }

    /// Profile names in file order
    pub fn profiles(&self) -> ProfileResult<Vec<String>> {
        Ok(self
            .config
            .section_names()?
            .iter()
            .map(|section| profile_name(section).to_string())
            .collect())
    }

    pub fn has_profile(&self, name: &str) -> ProfileResult<bool> {
        Ok(self.config.has_section(&section_name(name))?)
    }

    /// Typed view of a profile's section
    pub fn profile_config(&self, name: &str) -> ProfileResult<Option<ProfileConfig>> {
        Ok(self.profile_section(name)?.as_ref().map(ProfileConfig::from_section))
    }

    /// The profile's region, else its `source_profile`'s
    pub fn profile_region(&self, name: &str) -> ProfileResult<Option<String>> {
        self.inherited(name, |config| config.region)
    }

    /// The profile's role ARN, else its `source_profile`'s
    pub fn profile_role(&self, name: &str) -> ProfileResult<Option<String>> {
        self.inherited(name, |config| config.role_arn)
    }

    pub(crate) fn profile_section(&self, name: &str) -> ProfileResult<Option<Section>> {
        Ok(self.config.section(&section_name(name))?)
    }

    pub(crate) fn secrets(&self) -> &dyn SecretStore {
        self.secrets.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    /// One level of `source_profile` fallback, no further
    fn inherited<F>(&self, name: &str, pick: F) -> ProfileResult<Option<String>>
    where
        F: Fn(ProfileConfig) -> Option<String>,
    {
        let config = match self.profile_config(name)? {
            Some(config) => config,
            None => return Ok(None),
        };
        let source_profile = config.source_profile.clone();
        if let Some(value) = pick(config) {
            return Ok(Some(value));
        }
        match source_profile {
            Some(source) => Ok(self.profile_config(&source)?.and_then(|c| pick(c))),
            None => Ok(None),
        }
    }

    /// Merge, move secrets out, filter, replace and persist; the caller holds the write lock
    ///
    /// Nothing is changed unless the whole section can be written back as
    /// given. A failed persist leaves the profile file view as it was.
    fn save_locked(&self, _guard: &MutexGuard<'_, ()>, name: &str, fields: Section) -> ProfileResult<()> {
        let name = normalize_profile(name);
        if name.contains(['[', ']']) || has_line_break(name) {
            return Err(ProfileError::InvalidField {
                profile: name.to_string(),
                field: "profile name",
                value: name.to_string(),
            });
        }
        let section = section_name(name);

        let mut merged = self.config.section(&section)?.unwrap_or_default();
        rename_legacy_serial(&mut merged);
        let mut fields = fields;
        rename_legacy_serial(&mut fields);
        merged.extend(fields);

        let access_key_id = take_secret(&mut merged, &ACCESS_KEY_ID_KEYS);
        let secret_access_key = take_secret(&mut merged, &SECRET_ACCESS_KEY_KEYS);
        let session_token = take_secret(&mut merged, &SESSION_TOKEN_KEYS);
        let credentials = access_key_id
            .zip(secret_access_key)
            .and_then(|(id, secret)| Credentials::new(id, secret))
            .map(|creds| match session_token {
                Some(token) => creds.with_session_token(token),
                None => creds,
            });

        let (kept, dropped): (Section, Section) = merged
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .partition(|(key, _)| PROFILE_FIELDS.contains(&key.as_str()));
        if !dropped.is_empty() {
            debug!(profile = name, fields = ?dropped.keys().collect::<Vec<_>>(), "dropping unknown profile fields");
        }
        for field in PROFILE_FIELDS {
            if let Some(value) = kept.get(field).filter(|v| has_line_break(v)) {
                return Err(ProfileError::InvalidField {
                    profile: name.to_string(),
                    field,
                    value: value.clone(),
                });
            }
        }

        self.config.set_section(&section, kept)?;
        if let Some(credentials) = credentials {
            if let Err(e) = self.secrets.save(name, &credentials) {
                self.discard_changes();
                return Err(e.into());
            }
            info!(profile = name, store = self.secrets.name(), "access keys moved to secret store");
        }
        self.persist_or_revert()?;
        info!(profile = name, "profile saved");
        Ok(())
    }

    fn persist_or_revert(&self) -> ProfileResult<()> {
        if let Err(e) = self.config.persist() {
            self.discard_changes();
            return Err(e.into());
        }
        Ok(())
    }

    fn discard_changes(&self) {
        if let Err(e) = self.config.revert() {
            warn!("failed to drop unsaved profile changes: {}", e);
        }
    }
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore")
            .field("secrets", &self.secrets.name())
            .field("resolver", &self.resolver)
            .field("env_profile", &self.env_profile)
            .finish()
    }
}

/// `serial_number` becomes `mfa_serial` unless the map already has one
fn rename_legacy_serial(fields: &mut Section) {
    if let Some(serial) = fields.shift_remove(LEGACY_SERIAL_NUMBER) {
        let has_current = fields.get(MFA_SERIAL).map(|v| !v.is_empty()).unwrap_or(false);
        if !has_current && !serial.is_empty() {
            fields.insert(MFA_SERIAL.to_string(), serial);
        }
    }
}

fn has_line_break(value: &str) -> bool {
    value.contains(['\r', '\n'])
}

/// Remove every spelling of a secret key, returning the first non-empty value
fn take_secret(fields: &mut Section, keys: &[&str]) -> Option<String> {
    let mut found = None;
    for key in keys {
        if let Some(value) = fields.shift_remove(*key) {
            if found.is_none() && !value.is_empty() {
                found = Some(value);
            }
        }
    }
    found
}
