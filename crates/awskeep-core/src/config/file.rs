//! INI file section store
//!
//! Every persist overwrites the whole existing file with random bytes before
//! the new content goes down, so rotated or removed values do not linger in
//! the old blocks.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info};

use super::sections::{Section, Sections};
use super::traits::{ConfigResult, SectionStore};

const SCRUB_CHUNK: usize = 4096;

/// File-backed section store
///
/// The file is read on first access and cached for the life of the store;
/// later changes made by other processes are not picked up. The cache keeps
/// the last content known to be on disk so `revert` can return to it.
///
/// # Example
///
/// ```no_run
/// use awskeep_core::config::{IniFileStore, SectionStore, Section};
///
/// let store = IniFileStore::new("/tmp/awskeep/config");
/// let mut section = Section::new();
/// section.insert("region".to_string(), "eu-west-1".to_string());
/// store.set_section("profile dev", section).unwrap();
/// store.persist().unwrap();
/// ```
pub struct IniFileStore {
    path: PathBuf,
    cache: OnceCell<RwLock<Cache>>,
}

struct Cache {
    current: Sections,
    on_disk: Sections,
}

impl IniFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> ConfigResult<Sections> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "config file missing, starting empty");
            return Ok(Sections::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let sections = Sections::parse(&content)?;
        debug!(path = %self.path.display(), sections = sections.len(), "config file loaded");
        Ok(sections)
    }

    fn cache(&self) -> ConfigResult<&RwLock<Cache>> {
        self.cache.get_or_try_init(|| {
            let sections = self.load()?;
            Ok(RwLock::new(Cache {
                on_disk: sections.clone(),
                current: sections,
            }))
        })
    }

    fn open_for_rewrite(&self) -> io::Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options.open(&self.path)
    }
}

impl std::fmt::Debug for IniFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IniFileStore")
            .field("path", &self.path)
            .field("loaded", &self.cache.get().is_some())
            .finish()
    }
}

impl SectionStore for IniFileStore {
    fn section_names(&self) -> ConfigResult<Vec<String>> {
        Ok(self.cache()?.read().current.names().map(str::to_string).collect())
    }

    fn section(&self, name: &str) -> ConfigResult<Option<Section>> {
        Ok(self.cache()?.read().current.get(name).cloned())
    }

    fn set_section(&self, name: &str, section: Section) -> ConfigResult<()> {
        self.cache()?.write().current.set(name, section)
    }

    fn delete_section(&self, name: &str) -> ConfigResult<bool> {
        Ok(self.cache()?.write().current.remove(name))
    }

    fn persist(&self) -> ConfigResult<()> {
        let cache = self.cache()?;
        let snapshot = cache.read().current.clone();
        let content = snapshot.to_string();
        let mut file = self.open_for_rewrite()?;
        scrub_then_write(&mut file, &mut OsRng, content.as_bytes())?;
        cache.write().on_disk = snapshot;
        info!(path = %self.path.display(), bytes = content.len(), "config file written");
        Ok(())
    }

    fn revert(&self) -> ConfigResult<()> {
        let mut cache = self.cache()?.write();
        let on_disk = cache.on_disk.clone();
        cache.current = on_disk;
        debug!(path = %self.path.display(), "unsaved config changes dropped");
        Ok(())
    }
}

/// A rewritable file-like target
pub(crate) trait ScrubTarget: Write + Seek {
    fn current_len(&self) -> io::Result<u64>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl ScrubTarget for File {
    fn current_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Fill the target's current length with random bytes, then replace it with `content`
///
/// Each phase is synced to disk before the next begins. An empty target skips
/// the fill.
pub(crate) fn scrub_then_write<T, R>(target: &mut T, rng: &mut R, content: &[u8]) -> io::Result<()>
where
    T: ScrubTarget,
    R: RngCore,
{
    let len = target.current_len()?;
    if len > 0 {
        target.seek(SeekFrom::Start(0))?;
        let mut chunk = [0u8; SCRUB_CHUNK];
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(SCRUB_CHUNK as u64) as usize;
            rng.fill_bytes(&mut chunk[..n]);
            target.write_all(&chunk[..n])?;
            remaining -= n as u64;
        }
        target.flush()?;
        target.sync()?;
        debug!(bytes = len, "scrubbed previous config content");
    }

    target.seek(SeekFrom::Start(0))?;
    target.truncate(0)?;
    target.write_all(content)?;
    target.flush()?;
    target.sync()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// In-memory target that snapshots its contents at every sync
    #[derive(Default)]
    struct RecordingTarget {
        data: Vec<u8>,
        pos: usize,
        snapshots: Vec<Vec<u8>>,
    }

    impl Write for RecordingTarget {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let end = self.pos + buf.len();
            if end > self.data.len() {
                self.data.resize(end, 0);
            }
            self.data[self.pos..end].copy_from_slice(buf);
            self.pos = end;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for RecordingTarget {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.pos = match pos {
                SeekFrom::Start(n) => n as usize,
                SeekFrom::End(n) => (self.data.len() as i64 + n) as usize,
                SeekFrom::Current(n) => (self.pos as i64 + n) as usize,
            };
            Ok(self.pos as u64)
        }
    }

    impl ScrubTarget for RecordingTarget {
        fn current_len(&self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn truncate(&mut self, len: u64) -> io::Result<()> {
            self.data.truncate(len as usize);
            Ok(())
        }

        fn sync(&mut self) -> io::Result<()> {
            self.snapshots.push(self.data.clone());
            Ok(())
        }
    }

    #[test]
    fn test_scrub_precedes_new_content() {
        let old = b"[profile dev]\naws_secret_access_key = hunter2hunter2hunter2\n".to_vec();
        let new = b"[profile dev]\nregion = us-east-1\n".to_vec();
        let mut target = RecordingTarget {
            data: old.clone(),
            ..Default::default()
        };

        scrub_then_write(&mut target, &mut OsRng, &new).unwrap();

        assert_eq!(target.snapshots.len(), 2);
        let scrubbed = &target.snapshots[0];
        assert_eq!(scrubbed.len(), old.len());
        assert_ne!(scrubbed, &old);
        assert_ne!(&scrubbed[..new.len()], &new[..]);
        assert_eq!(target.snapshots[1], new);
        assert_eq!(target.data, new);
    }

    #[test]
    fn test_empty_target_skips_scrub() {
        let mut target = RecordingTarget::default();
        scrub_then_write(&mut target, &mut OsRng, b"[default]\n").unwrap();

        assert_eq!(target.snapshots.len(), 1);
        assert_eq!(target.data, b"[default]\n");
    }

    #[test]
    fn test_scrub_covers_files_larger_than_one_chunk() {
        let old = vec![b'a'; SCRUB_CHUNK * 2 + 17];
        let mut target = RecordingTarget {
            data: old.clone(),
            ..Default::default()
        };

        scrub_then_write(&mut target, &mut OsRng, b"x").unwrap();

        let scrubbed = &target.snapshots[0];
        assert_eq!(scrubbed.len(), old.len());
        // Each chunk was rewritten
        for chunk in scrubbed.chunks(SCRUB_CHUNK) {
            assert!(chunk.iter().any(|b| *b != b'a'));
        }
        assert_eq!(target.data, b"x");
    }

    #[test]
    fn test_file_store_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let store = IniFileStore::new(&path);

        assert!(!store.exists());
        assert!(store.section_names().unwrap().is_empty());

        let mut section = Section::new();
        section.insert("region".to_string(), "eu-west-1".to_string());
        store.set_section("profile dev", section).unwrap();
        store.persist().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[profile dev]\nregion = eu-west-1\n");

        let reopened = IniFileStore::new(&path);
        let section = reopened.section("profile dev").unwrap().unwrap();
        assert_eq!(section.get("region").unwrap(), "eu-west-1");
    }

    #[test]
    fn test_shrinking_file_leaves_no_tail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "[default]\nregion = us-east-1\n\n[profile old]\nregion = ap-south-1\n").unwrap();

        let store = IniFileStore::new(&path);
        assert!(store.delete_section("profile old").unwrap());
        store.persist().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[default]\nregion = us-east-1\n");
    }

    #[test]
    fn test_store_caches_first_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "[default]\n").unwrap();

        let store = IniFileStore::new(&path);
        assert!(store.has_section("default").unwrap());

        fs::write(&path, "[other]\n").unwrap();
        assert!(store.has_section("default").unwrap());
        assert!(!store.has_section("other").unwrap());
    }

    #[test]
    fn test_parse_error_surfaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "orphan = 1\n").unwrap();

        let store = IniFileStore::new(&path);
        assert!(store.section_names().is_err());
    }

    #[test]
    fn test_failed_persist_can_be_reverted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("config");
        let store = IniFileStore::new(&path);
        assert!(store.section_names().unwrap().is_empty());

        // The parent directory can no longer be created
        fs::write(dir.path().join("sub"), "not a directory").unwrap();

        store.set_section("profile p", Section::new()).unwrap();
        assert!(store.persist().is_err());
        store.revert().unwrap();
        assert!(store.section_names().unwrap().is_empty());
    }

    #[test]
    fn test_revert_keeps_persisted_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "[default]\n[profile old]\n").unwrap();

        let store = IniFileStore::new(&path);
        store.set_section("profile new", Section::new()).unwrap();
        store.persist().unwrap();
        store.delete_section("default").unwrap();
        store.delete_section("profile old").unwrap();
        store.revert().unwrap();

        assert_eq!(
            store.section_names().unwrap(),
            vec!["default", "profile old", "profile new"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        let store = IniFileStore::new(&path);
        store.set_section("default", Section::new()).unwrap();
        store.persist().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
