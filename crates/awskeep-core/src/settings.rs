//! Process settings read from the environment
//!
//! Read once at startup and handed to `ProfileStore::from_settings`; nothing
//! else in the crate looks at the environment.

use std::path::PathBuf;

/// Overrides the profile file location
pub const CONFIG_FILE_ENV: &str = "AWSKEEP_CONFIG_FILE";
/// Profile used when a caller does not name one
pub const PROFILE_ENV: &str = "AWS_PROFILE";
/// Set to `1`/`true` to turn the store off
pub const DISABLE_ENV: &str = "AWSKEEP_DISABLE";
/// Log filter directives (`tracing_subscriber::EnvFilter` syntax)
pub const LOG_ENV: &str = "AWSKEEP_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Location of the profile file
    pub config_path: PathBuf,
    /// Profile to use when none is requested explicitly
    pub profile: Option<String>,
    /// Whether the profile store should be used at all
    pub enabled: bool,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            config_path: var(CONFIG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(default_config_path),
            profile: var(PROFILE_ENV),
            enabled: !var(DISABLE_ENV).map(|v| is_truthy(&v)).unwrap_or(false),
        }
    }
}

/// `<config dir>/awskeep/config` (~/.config on Linux, ~/Library/Application Support on macOS)
pub fn default_config_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
    config_dir.join("awskeep").join("config")
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert_eq!(settings.config_path, default_config_path());
        assert!(settings.config_path.ends_with("awskeep/config"));
        assert_eq!(settings.profile, None);
        assert!(settings.enabled);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            (CONFIG_FILE_ENV, "/etc/awskeep/config"),
            (PROFILE_ENV, "work"),
            (DISABLE_ENV, "TRUE"),
        ]));
        assert_eq!(settings.config_path, PathBuf::from("/etc/awskeep/config"));
        assert_eq!(settings.profile.as_deref(), Some("work"));
        assert!(!settings.enabled);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let settings = Settings::from_lookup(lookup(&[(PROFILE_ENV, ""), (DISABLE_ENV, "0")]));
        assert_eq!(settings.profile, None);
        assert!(settings.enabled);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var(PROFILE_ENV, "from-env");
        std::env::set_var(CONFIG_FILE_ENV, "/tmp/awskeep-test-config");
        let settings = Settings::from_env();
        std::env::remove_var(PROFILE_ENV);
        std::env::remove_var(CONFIG_FILE_ENV);

        assert_eq!(settings.profile.as_deref(), Some("from-env"));
        assert_eq!(settings.config_path, PathBuf::from("/tmp/awskeep-test-config"));
    }
}
