//! In-memory tar payloads for extraction tests.

use std::io;

use tar::{Builder, EntryType, Header};

/// Builds tar archives entry by entry.
pub struct ArchiveFixture {
    builder: Builder<Vec<u8>>,
}

impl ArchiveFixture {
    pub fn new() -> Self {
        Self {
            builder: Builder::new(Vec::new()),
        }
    }

    /// Appends a regular file with the given mode bits.
    pub fn file(mut self, path: &str, mode: u32, contents: &[u8]) -> Self {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(contents.len() as u64);
        header.set_mode(mode);
        self.builder
            .append_data(&mut header, path, contents)
            .unwrap_or_else(|error| panic!("failed to append {path}: {error}"));
        self
    }

    /// Appends a directory entry.
    pub fn directory(mut self, path: &str) -> Self {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Directory);
        header.set_size(0);
        header.set_mode(0o755);
        self.builder
            .append_data(&mut header, path, io::empty())
            .unwrap_or_else(|error| panic!("failed to append {path}: {error}"));
        self
    }

    /// Appends a symbolic link pointing at `target`.
    pub fn symlink(mut self, path: &str, target: &str) -> Self {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);
        header.set_mode(0o777);
        header
            .set_link_name(target)
            .unwrap_or_else(|error| panic!("failed to set link name {target}: {error}"));
        self.builder
            .append_data(&mut header, path, io::empty())
            .unwrap_or_else(|error| panic!("failed to append {path}: {error}"));
        self
    }

    /// Appends a regular file whose name bypasses the builder's validation.
    pub fn raw_name_file(mut self, name: &str, contents: &[u8]) -> Self {
        let mut header = Header::new_gnu();
        {
            let gnu = header
                .as_gnu_mut()
                .unwrap_or_else(|| panic!("expected a GNU header"));
            let bytes = name.as_bytes();
            gnu.name[..bytes.len()].copy_from_slice(bytes);
        }
        header.set_entry_type(EntryType::Regular);
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        self.builder
            .append(&header, contents)
            .unwrap_or_else(|error| panic!("failed to append {name}: {error}"));
        self
    }

    /// Finishes the archive and returns its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.builder
            .into_inner()
            .unwrap_or_else(|error| panic!("failed to finish archive: {error}"))
    }
}

/// Payload used by the end-to-end scenarios: a launcher script that echoes
/// stdin back on stdout, plus the Windows layout it is never run from.
pub fn echo_server_archive() -> Vec<u8> {
    ArchiveFixture::new()
        .directory("server/")
        .file("server/Omnisharp.exe", 0o755, b"MZ")
        .file("OmniSharp", 0o755, b"#!/bin/sh\nexec cat\n")
        .into_bytes()
}
