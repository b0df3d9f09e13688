//! Error types surfaced by the launcher.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::supervisor::{StreamKind, SupervisorStatus};

/// Errors raised while materialising the bundled server on disk.
///
/// Extraction stops at the first failure and leaves whatever it already wrote
/// in place.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A directory inside the installation root could not be created.
    #[error("failed to create directory '{}': {source}", path.display())]
    CreateDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The archive stream could not be read or decoded.
    #[error("failed to read server archive: {source}")]
    ReadArchive {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// An entry's content could not be written.
    #[error("failed to write '{}': {source}", path.display())]
    WriteFile {
        /// File being written.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Permission bits could not be applied to an extracted file.
    #[error("failed to set permissions on '{}': {source}", path.display())]
    SetPermissions {
        /// File whose mode was being changed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// An entry name would resolve outside the installation root.
    #[error("archive entry '{}' escapes the installation root", path.display())]
    UnsafeEntryPath {
        /// Entry name as recorded in the archive.
        path: PathBuf,
    },
}

/// Errors surfaced by [`crate::ServerSupervisor`].
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The bundled payload could not be opened.
    #[error("failed to open server payload {payload}: {source}")]
    OpenPayload {
        /// Description of the payload source.
        payload: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Extracting the payload failed.
    #[error("failed to extract server payload: {0}")]
    Extraction(#[from] ExtractError),

    /// The server executable was not found when spawning.
    #[error("language server binary not found: {command}")]
    BinaryNotFound {
        /// The command that was not found.
        command: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Spawning the server process failed.
    #[error("failed to spawn language server process {command}: {source}")]
    Spawn {
        /// The command being spawned.
        command: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The launch command contained no program.
    #[error("language server command is empty")]
    EmptyCommand,

    /// `start` was called while a server is already running.
    #[error("language server is already running (pid {pid})")]
    AlreadyRunning {
        /// Process identifier of the running server.
        pid: u32,
    },

    /// A stream was requested while no server is running.
    #[error("language server is not running (state: {status})")]
    NotRunning {
        /// State observed when the stream was requested.
        status: SupervisorStatus,
    },

    /// The requested stream was already handed out.
    #[error("language server {stream} was already taken")]
    StreamTaken {
        /// Stream that was requested.
        stream: StreamKind,
    },
}
