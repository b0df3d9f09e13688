//! Shared fixtures for launcher tests.

mod archive;
mod world;

use std::io::{self, Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rstest::fixture;
use tempfile::TempDir;

use crate::payload::PayloadSource;
use crate::restore::{PreLaunch, RestoreOutcome};

pub use archive::{ArchiveFixture, echo_server_archive};
pub use world::SupervisorWorld;

/// Installation root inside a fresh temporary directory. The root itself
/// does not exist yet.
#[fixture]
pub fn install_root() -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("temp dir");
    let root = temp.path().join("omnisharp-roslyn");
    (temp, root)
}

/// In-memory writer whose clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Snapshot of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().expect("buffer lock").clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Payload served from memory that records how often it was opened.
#[derive(Debug, Clone)]
pub struct BytesPayload {
    bytes: Arc<Vec<u8>>,
    opens: Arc<AtomicUsize>,
}

impl BytesPayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of times [`PayloadSource::open`] was called on any clone.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl PayloadSource for BytesPayload {
    fn describe(&self) -> String {
        String::from("in-memory payload")
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Cursor::new(self.bytes.as_ref().clone())))
    }
}

/// Pre-launch step that reports the restore tool as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipRestore;

impl PreLaunch for SkipRestore {
    fn run(&mut self) -> RestoreOutcome {
        RestoreOutcome::ToolUnavailable
    }
}
