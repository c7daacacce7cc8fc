//! Profile names, section naming and the typed view of a profile section

use crate::config::Section;

/// Name of the implicit default profile (and of its section)
pub const DEFAULT_PROFILE: &str = "default";

/// Prefix of every non-default profile section
pub const PROFILE_SECTION_PREFIX: &str = "profile ";

/// Session name used for role assumption when a profile sets none
pub const DEFAULT_SESSION_NAME: &str = "default_session";

pub const REGION: &str = "region";
pub const ROLE_ARN: &str = "role_arn";
pub const MFA_SERIAL: &str = "mfa_serial";
pub const SOURCE_PROFILE: &str = "source_profile";
pub const ROLE_SESSION_NAME: &str = "role_session_name";
pub const EXTERNAL_ID: &str = "external_id";
pub const DURATION_SECONDS: &str = "duration_seconds";

/// Older files stored the MFA device under this key
pub const LEGACY_SERIAL_NUMBER: &str = "serial_number";

/// The only keys a persisted profile section may contain
pub const PROFILE_FIELDS: [&str; 7] = [
    REGION,
    ROLE_ARN,
    MFA_SERIAL,
    SOURCE_PROFILE,
    ROLE_SESSION_NAME,
    EXTERNAL_ID,
    DURATION_SECONDS,
];

/// Secret keys, in lookup order: the plain spelling wins over the `aws_` one
pub const ACCESS_KEY_ID_KEYS: [&str; 2] = ["access_key_id", "aws_access_key_id"];
pub const SECRET_ACCESS_KEY_KEYS: [&str; 2] = ["secret_access_key", "aws_secret_access_key"];
pub const SESSION_TOKEN_KEYS: [&str; 2] = ["session_token", "aws_session_token"];

/// Map the empty name to the default profile
pub fn normalize_profile(name: &str) -> &str {
    if name.is_empty() {
        DEFAULT_PROFILE
    } else {
        name
    }
}

/// Section that holds `profile`
///
/// ```
/// use awskeep_core::types::section_name;
///
/// assert_eq!(section_name("default"), "default");
/// assert_eq!(section_name(""), "default");
/// assert_eq!(section_name("dev"), "profile dev");
/// ```
pub fn section_name(profile: &str) -> String {
    match normalize_profile(profile) {
        DEFAULT_PROFILE => DEFAULT_PROFILE.to_string(),
        name => format!("{}{}", PROFILE_SECTION_PREFIX, name),
    }
}

/// Profile named by a section header
pub fn profile_name(section: &str) -> &str {
    section.strip_prefix(PROFILE_SECTION_PREFIX).unwrap_or(section)
}

/// Typed view of a profile section
///
/// Empty values are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub region: Option<String>,
    pub role_arn: Option<String>,
    pub mfa_serial: Option<String>,
    pub source_profile: Option<String>,
    pub role_session_name: Option<String>,
    pub external_id: Option<String>,
    pub duration_seconds: Option<String>,
}

impl ProfileConfig {
    pub fn from_section(section: &Section) -> Self {
        let field = |key: &str| section.get(key).filter(|v| !v.is_empty()).cloned();
        Self {
            region: field(REGION),
            role_arn: field(ROLE_ARN),
            // Sections written before the rename still carry `serial_number`
            mfa_serial: field(MFA_SERIAL).or_else(|| field(LEGACY_SERIAL_NUMBER)),
            source_profile: field(SOURCE_PROFILE),
            role_session_name: field(ROLE_SESSION_NAME),
            external_id: field(EXTERNAL_ID),
            duration_seconds: field(DURATION_SECONDS),
        }
    }

    /// Whether anything in this profile asks for role assumption
    pub fn is_derived(&self) -> bool {
        self.role_arn.is_some() || self.source_profile.is_some()
    }
}

/// First non-empty value among `keys`
pub(crate) fn first_value<'a>(section: &'a Section, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| section.get(*k))
        .map(String::as_str)
        .find(|v| !v.is_empty())
}
