//! Sources for the bundled server payload.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Something that can produce the tar stream of the bundled server.
///
/// The supervisor opens the payload lazily, only when the installation root
/// is missing.
pub trait PayloadSource: Send {
    /// Human-readable description used in logs and errors.
    fn describe(&self) -> String;

    /// Opens a fresh stream over the payload.
    fn open(&self) -> io::Result<Box<dyn Read + Send>>;
}

/// Payload stored as a tar file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    path: PathBuf,
}

impl FilePayload {
    /// Creates a payload backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the payload file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PayloadSource for FilePayload {
    fn describe(&self) -> String {
        format!("'{}'", self.path.display())
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}
