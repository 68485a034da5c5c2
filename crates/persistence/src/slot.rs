use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised by save slots.
#[derive(Debug, Error)]
pub enum SlotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A single-record key-value slot holding the encoded save.
pub trait SaveSlot {
    /// The stored record, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<String>, SlotError>;
    /// Replace the stored record.
    fn store(&mut self, contents: &str) -> Result<(), SlotError>;
}

impl<S: SaveSlot + ?Sized> SaveSlot for Box<S> {
    fn load(&self) -> Result<Option<String>, SlotError> {
        (**self).load()
    }

    fn store(&mut self, contents: &str) -> Result<(), SlotError> {
        (**self).store(contents)
    }
}

/// In-memory slot for tests and ephemeral sessions.
#[derive(Clone, Debug, Default)]
pub struct MemorySlot {
    contents: Option<String>,
    writes: usize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with a record.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            writes: 0,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Number of successful `store` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SaveSlot for MemorySlot {
    fn load(&self) -> Result<Option<String>, SlotError> {
        Ok(self.contents.clone())
    }

    fn store(&mut self, contents: &str) -> Result<(), SlotError> {
        self.contents = Some(contents.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// File-backed slot. Writes go to a sibling temp file first and are renamed
/// into place, so a crash mid-write leaves the previous save intact.
#[derive(Clone, Debug)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SaveSlot for FileSlot {
    fn load(&self) -> Result<Option<String>, SlotError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&mut self, contents: &str) -> Result<(), SlotError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), bytes = contents.len(), "save written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "planetfall-slot-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn memory_slot_stores_last_write() {
        let mut slot = MemorySlot::new();
        assert_eq!(slot.load().unwrap(), None);
        slot.store("a").unwrap();
        slot.store("b").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("b"));
        assert_eq!(slot.writes(), 2);
    }

    #[test]
    fn file_slot_creates_directories_and_replaces() {
        let dir = scratch_dir("replace");
        let path = dir.join("nested").join("save.json");
        let mut slot = FileSlot::new(&path);
        assert_eq!(slot.load().unwrap(), None);
        slot.store("{\"rollCount\":1}").unwrap();
        slot.store("{\"rollCount\":2}").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("{\"rollCount\":2}"));
        assert!(!path.with_file_name("save.json.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn boxed_slot_delegates() {
        let mut slot: Box<dyn SaveSlot> = Box::new(MemorySlot::with_contents("x"));
        assert_eq!(slot.load().unwrap().as_deref(), Some("x"));
        slot.store("y").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("y"));
    }
}
