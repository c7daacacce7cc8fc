//! Section store trait

use super::sections::Section;

/// Named, ordered collection of string-keyed sections
///
/// Implementations:
/// - `IniFileStore`: INI file on disk, scrubbed before every rewrite
/// - `MemorySectionStore`: In-memory for testing
///
/// Mutations only change the in-memory view; `persist` writes it out and
/// `revert` throws away whatever was not written. Callers that need
/// read-modify-write atomicity serialize those calls themselves.
pub trait SectionStore: Send + Sync {
    /// Section names in file order
    fn section_names(&self) -> ConfigResult<Vec<String>>;

    /// A copy of the named section
    fn section(&self, name: &str) -> ConfigResult<Option<Section>>;

    /// Replace (or append) a section
    fn set_section(&self, name: &str, section: Section) -> ConfigResult<()>;

    /// Remove a section, returning whether it existed
    fn delete_section(&self, name: &str) -> ConfigResult<bool>;

    /// Write the current sections to the backing storage
    fn persist(&self) -> ConfigResult<()>;

    /// Drop changes made since the last load or successful `persist`
    fn revert(&self) -> ConfigResult<()>;

    fn has_section(&self, name: &str) -> ConfigResult<bool> {
        Ok(self.section(name)?.is_some())
    }
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid section '{section}': {message}")]
    Invalid { section: String, message: String },
}

impl ConfigError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn invalid(section: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            section: section.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
