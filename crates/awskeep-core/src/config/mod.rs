//! Profile file storage
//!
//! - `SectionStore`: section-scoped get/set/delete plus `persist`
//! - `IniFileStore`: INI file on disk, scrubbed before every rewrite
//! - `MemorySectionStore`: In-memory for testing

mod traits;
mod sections;
mod memory;
mod file;

pub use traits::{SectionStore, ConfigError, ConfigResult};
pub use sections::{Section, Sections};
pub use memory::MemorySectionStore;
pub use file::IniFileStore;
