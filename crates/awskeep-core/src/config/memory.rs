//! In-memory section store

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::sections::{Section, Sections};
use super::traits::{ConfigResult, SectionStore};

/// In-memory section store for testing
///
/// `persist` only counts calls and remembers what was "written", so `revert`
/// behaves as it would against a file. [`fail_persist`](Self::fail_persist)
/// makes later persists fail.
#[derive(Debug, Default)]
pub struct MemorySectionStore {
    sections: RwLock<Sections>,
    saved: RwLock<Sections>,
    persisted: AtomicUsize,
    failing: AtomicBool,
}

impl MemorySectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from INI text
    pub fn from_ini(text: &str) -> ConfigResult<Self> {
        let sections = Sections::parse(text)?;
        Ok(Self {
            saved: RwLock::new(sections.clone()),
            sections: RwLock::new(sections),
            ..Self::default()
        })
    }

    /// How many times `persist` has succeeded
    pub fn persist_count(&self) -> usize {
        self.persisted.load(Ordering::SeqCst)
    }

    /// Make every later `persist` fail (or succeed again)
    pub fn fail_persist(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Current contents rendered as INI text
    pub fn to_ini(&self) -> String {
        self.sections.read().to_string()
    }
}

impl SectionStore for MemorySectionStore {
    fn section_names(&self) -> ConfigResult<Vec<String>> {
        Ok(self.sections.read().names().map(str::to_string).collect())
    }

    fn section(&self, name: &str) -> ConfigResult<Option<Section>> {
        Ok(self.sections.read().get(name).cloned())
    }

    fn set_section(&self, name: &str, section: Section) -> ConfigResult<()> {
        self.sections.write().set(name, section)
    }

    fn delete_section(&self, name: &str) -> ConfigResult<bool> {
        Ok(self.sections.write().remove(name))
    }

    fn persist(&self) -> ConfigResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "persist disabled").into());
        }
        *self.saved.write() = self.sections.read().clone();
        self.persisted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn revert(&self) -> ConfigResult<()> {
        *self.sections.write() = self.saved.read().clone();
        Ok(())
    }
}
