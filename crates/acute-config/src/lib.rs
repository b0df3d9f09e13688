//! Shared configuration for the OmniSharp launcher crates.
//!
//! [`Config`] is assembled by `ortho_config` from defaults, an optional
//! configuration file, `OMNISHARP_*` environment variables and command-line
//! flags, in increasing order of precedence. The launcher converts it into
//! explicit construction-time settings, so nothing downstream reads ambient
//! state again.

mod defaults;
mod logging;
mod paths;

use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, ENV_PREFIX, INSTALL_DIR_NAME, LANGUAGE_SERVER_COMMAND_ENV,
    PAYLOAD_FILE_NAME, default_log_filter, default_log_filter_string, default_log_format,
    default_state_directory,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use paths::{InstallPaths, InstallPathsError};

/// Launcher configuration shared by the library and the stdio bridge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "OMNISHARP")]
pub struct Config {
    /// Literal command line used instead of the bundled server.
    #[serde(default)]
    pub language_server_command: Option<String>,
    /// Mirrors every byte exchanged with the server to stderr.
    #[serde(default)]
    #[ortho_config(default = false)]
    pub lsp_debug: bool,
    /// Tool used for the pre-launch `restore` step.
    #[serde(default)]
    pub dotnet_path: Option<PathBuf>,
    /// Private state location holding the extracted server.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
    /// Bundled tar payload containing the server.
    #[serde(default)]
    pub payload_path: Option<PathBuf>,
    /// Working directory for the restore step and the server process.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language_server_command: None,
            lsp_debug: false,
            dotnet_path: None,
            state_dir: None,
            payload_path: None,
            working_dir: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// The override command, ignoring values that are blank.
    #[must_use]
    pub fn language_server_command(&self) -> Option<&str> {
        self.language_server_command
            .as_deref()
            .map(str::trim)
            .filter(|command| !command.is_empty())
    }

    /// Whether stream traffic is mirrored to the diagnostic sink.
    #[must_use]
    pub const fn lsp_debug(&self) -> bool {
        self.lsp_debug
    }

    /// Configured restore tool, if any.
    #[must_use]
    pub fn dotnet_path(&self) -> Option<&Path> {
        self.dotnet_path.as_deref()
    }

    /// Configured working directory, if any.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Filter expression applied to the telemetry subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
