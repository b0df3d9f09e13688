//! Derives the on-disk locations used by the launcher.
//!
//! The installation root lives below the private state directory and its
//! existence is the only marker the extractor consults. The bundled payload
//! sits next to the running executable unless configured otherwise.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::Config;
use crate::defaults::{INSTALL_DIR_NAME, PAYLOAD_FILE_NAME, default_state_directory};

/// Canonical paths for the server installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    state_dir: PathBuf,
    install_root: PathBuf,
    payload_path: PathBuf,
}

impl InstallPaths {
    /// Derives installation paths from the shared configuration.
    ///
    /// Nothing is created on disk.
    pub fn from_config(config: &Config) -> Result<Self, InstallPathsError> {
        let state_dir = config
            .state_dir
            .clone()
            .unwrap_or_else(default_state_directory);
        let payload_path = match &config.payload_path {
            Some(path) => path.clone(),
            None => default_payload_path()?,
        };
        Ok(Self {
            install_root: state_dir.join(INSTALL_DIR_NAME),
            state_dir,
            payload_path,
        })
    }

    /// Private state directory.
    pub fn state_dir(&self) -> &Path {
        self.state_dir.as_path()
    }

    /// Directory receiving the extracted server.
    pub fn install_root(&self) -> &Path {
        self.install_root.as_path()
    }

    /// Location of the bundled tar payload.
    pub fn payload_path(&self) -> &Path {
        self.payload_path.as_path()
    }
}

fn default_payload_path() -> Result<PathBuf, InstallPathsError> {
    let executable =
        env::current_exe().map_err(|source| InstallPathsError::ExecutableLocation { source })?;
    match executable.parent() {
        Some(dir) => Ok(dir.join(PAYLOAD_FILE_NAME)),
        None => Err(InstallPathsError::MissingExecutableParent { path: executable }),
    }
}

/// Errors raised while deriving installation paths.
#[derive(Debug, Error)]
pub enum InstallPathsError {
    /// The running executable could not be located.
    #[error("failed to locate the running executable: {source}")]
    ExecutableLocation {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The running executable path lacked a parent directory.
    #[error("executable path '{}' has no parent directory", path.display())]
    MissingExecutableParent {
        /// Path reported for the running executable.
        path: PathBuf,
    },
}
