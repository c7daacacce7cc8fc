//! Core types shared by the stores and the resolver

mod credentials;
mod profile;

pub use credentials::Credentials;
pub use profile::{
    normalize_profile, profile_name, section_name, ProfileConfig,
    DEFAULT_PROFILE, DEFAULT_SESSION_NAME, PROFILE_FIELDS, PROFILE_SECTION_PREFIX,
    REGION, ROLE_ARN, MFA_SERIAL, SOURCE_PROFILE, ROLE_SESSION_NAME, EXTERNAL_ID,
    DURATION_SECONDS, LEGACY_SERIAL_NUMBER,
    ACCESS_KEY_ID_KEYS, SECRET_ACCESS_KEY_KEYS, SESSION_TOKEN_KEYS,
};
pub(crate) use profile::first_value;
