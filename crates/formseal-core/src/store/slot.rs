//! Slot backends: where the single stored record's bytes live.
//!
//! A backend only moves whole byte strings in and out. Parsing, expiry and
//! locking are the store's job.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Storage for exactly one serialized record.
///
/// Implementations must replace the content as a whole on `write`, so a
/// reader sees either the previous or the new bytes and never a mix.
pub trait SlotBackend: Send {
    /// Read the slot's bytes, or `Ok(None)` if nothing has been written.
    fn read(&self) -> io::Result<Option<Vec<u8>>>;

    /// Overwrite the slot's bytes.
    fn write(&mut self, contents: &[u8]) -> io::Result<()>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// A slot kept in one JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SlotBackend for FileSlot {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, contents: &[u8]) -> io::Result<()> {
        crate::fs::write_atomic(&self.path, contents)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A slot held in process memory.
#[derive(Default, Clone)]
pub struct MemorySlot {
    contents: Option<Vec<u8>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing bytes, e.g. a slot file captured elsewhere.
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: Some(contents.into()),
        }
    }
}

impl fmt::Debug for MemorySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySlot")
            .field("bytes", &self.contents.as_ref().map(Vec::len))
            .finish()
    }
}

impl SlotBackend for MemorySlot {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &[u8]) -> io::Result<()> {
        self.contents = Some(contents.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
