//! Determines the command line that launches the language server.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error};

use crate::errors::SupervisorError;
use crate::platform::Platform;

/// Log target for command resolution.
const RESOLVER_TARGET: &str = "acute_launcher::resolver";

/// Argument that switches the server into language server protocol mode.
pub const PROTOCOL_FLAG: &str = "-lsp";

/// Command line used to spawn the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchCommand {
    /// A literal command line supplied by the environment. Never validated.
    Override(String),
    /// The bundled server executable and its arguments.
    Resolved {
        /// Absolute path of the executable.
        executable: PathBuf,
        /// Arguments passed to the executable.
        args: Vec<String>,
    },
}

impl LaunchCommand {
    /// Builds the process command, splitting overrides on whitespace.
    pub fn to_command(&self) -> Result<Command, SupervisorError> {
        match self {
            Self::Override(line) => {
                let mut tokens = line.split_whitespace();
                let program = tokens.next().ok_or(SupervisorError::EmptyCommand)?;
                let mut command = Command::new(program);
                command.args(tokens);
                Ok(command)
            }
            Self::Resolved { executable, args } => {
                let mut command = Command::new(executable);
                command.args(args);
                Ok(command)
            }
        }
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override(line) => formatter.write_str(line),
            Self::Resolved { executable, args } => {
                write!(formatter, "{}", executable.display())?;
                for arg in args {
                    write!(formatter, " {arg}")?;
                }
                Ok(())
            }
        }
    }
}

/// Resolves the launch command from an override or the installation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResolver {
    platform: Platform,
    override_command: Option<String>,
}

impl CommandResolver {
    /// Creates a resolver for `platform` with no override.
    #[must_use]
    pub const fn new(platform: Platform) -> Self {
        Self {
            platform,
            override_command: None,
        }
    }

    /// Sets the override command. Blank values count as unset.
    #[must_use]
    pub fn with_override(mut self, command: Option<String>) -> Self {
        self.override_command = command.filter(|line| !line.trim().is_empty());
        self
    }

    /// Platform whose layout is resolved.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// The override command, if one is configured.
    #[must_use]
    pub fn override_command(&self) -> Option<LaunchCommand> {
        self.override_command.clone().map(LaunchCommand::Override)
    }

    /// Default executable location below `install_root`.
    #[must_use]
    pub fn default_executable(&self, install_root: &Path) -> PathBuf {
        install_root.join(self.platform.server_subpath())
    }

    /// Determines the launch command.
    ///
    /// An override wins unconditionally. Otherwise the platform executable
    /// must exist; a missing executable bit is logged but tolerated.
    #[must_use]
    pub fn resolve(&self, install_root: &Path) -> Option<LaunchCommand> {
        if let Some(command) = self.override_command() {
            debug!(
                target: RESOLVER_TARGET,
                %command,
                "using language server command override"
            );
            return Some(command);
        }

        let executable = self.default_executable(install_root);
        if !executable.exists() {
            error!(
                target: RESOLVER_TARGET,
                path = %executable.display(),
                root = %install_root.display(),
                "language server executable not found in installation"
            );
            return None;
        }
        if !is_executable(&executable) {
            error!(
                target: RESOLVER_TARGET,
                path = %executable.display(),
                "language server file is not executable; launching anyway"
            );
        }

        let executable = std::path::absolute(&executable).unwrap_or(executable);
        Some(LaunchCommand::Resolved {
            executable,
            args: vec![PROTOCOL_FLAG.to_owned()],
        })
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}
