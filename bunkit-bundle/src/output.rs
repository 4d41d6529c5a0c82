//! Where extracted resources go.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Sink for files produced while walking a bundle.
///
/// Paths use forward slashes relative to the extraction root.
pub trait Filestore {
    fn store(&mut self, path: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Collects stored files in memory. Mostly useful in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilestore {
    pub files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFilestore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Filestore for MemoryFilestore {
    fn store(&mut self, path: &str, bytes: &[u8]) -> io::Result<()> {
        self.files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Writes stored files under a root directory, creating parents as needed.
#[derive(Debug, Clone)]
pub struct DirectoryFilestore {
    root: PathBuf,
}

impl DirectoryFilestore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Filestore for DirectoryFilestore {
    fn store(&mut self, path: &str, bytes: &[u8]) -> io::Result<()> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, bytes)
    }
}
