//! INI text model
//!
//! ```text
//! [default]
//! region = us-east-1
//!
//! [profile dev]
//! role_arn = arn:aws:iam::111:role/dev
//! source_profile = default
//! ```
//!
//! Comments (`#`, `;`) and blank lines are accepted but not preserved.

use std::fmt;

use indexmap::IndexMap;

use super::traits::{ConfigError, ConfigResult};

/// Key/value pairs of one section, in file order
pub type Section = IndexMap<String, String>;

/// All sections of a file, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    inner: IndexMap<String, Section>,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text
    ///
    /// A repeated header continues the earlier section. Keys before the
    /// first header and lines without `=` are errors.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let mut sections = Self::new();
        let mut current: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let (name, rest) = header
                    .split_once(']')
                    .ok_or_else(|| ConfigError::parse(line_no, "unterminated section header"))?;
                let rest = rest.trim_start();
                if !(rest.is_empty() || rest.starts_with('#') || rest.starts_with(';')) {
                    return Err(ConfigError::parse(line_no, "unexpected text after section header"));
                }
                let name = collapse_whitespace(name);
                if name.is_empty() {
                    return Err(ConfigError::parse(line_no, "empty section name"));
                }
                sections.inner.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| ConfigError::parse(line_no, format!("expected `key = value`, got `{}`", line)))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::parse(line_no, "empty key"));
            }
            let section = current
                .as_ref()
                .and_then(|name| sections.inner.get_mut(name))
                .ok_or_else(|| ConfigError::parse(line_no, format!("`{}` is outside of any section", key)))?;
            section.insert(key.to_string(), value.trim().to_string());
        }

        Ok(sections)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.inner.get(name)
    }

    /// Replace a section in place, or append it
    ///
    /// Refuses names, keys and values that would not read back as the same
    /// section, such as a value with a line break.
    pub fn set(&mut self, name: impl Into<String>, section: Section) -> ConfigResult<()> {
        let name = name.into();
        validate(&name, &section)?;
        self.inner.insert(name, section);
        Ok(())
    }

    /// Remove a section, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> bool {
        self.inner.shift_remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_line_break(text: &str) -> bool {
    text.contains(['\r', '\n'])
}

fn validate(name: &str, section: &Section) -> ConfigResult<()> {
    if name.is_empty() || name.contains(['[', ']']) || has_line_break(name) || collapse_whitespace(name) != name {
        return Err(ConfigError::invalid(name, "section name cannot be written as a header"));
    }
    for (key, value) in section {
        if key.is_empty()
            || key.trim() != key
            || key.contains('=')
            || key.starts_with(['[', '#', ';'])
            || has_line_break(key)
        {
            return Err(ConfigError::invalid(name, format!("invalid key `{}`", key.escape_debug())));
        }
        if has_line_break(value) {
            return Err(ConfigError::invalid(name, format!("value of `{}` contains a line break", key)));
        }
    }
    Ok(())
}

impl fmt::Display for Sections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (name, section)) in self.inner.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", name)?;
            for (key, value) in section {
                writeln!(f, "{} = {}", key, value)?;
            }
        }
        Ok(())
    }
}
