//! Names and fallback values shared by the configuration layers.
//!
//! The installation directory and payload names are fixed by the bundled
//! server; the state directory and logging defaults apply only when nothing
//! else is configured.

use std::env;
use std::path::PathBuf;

/// Environment prefix shared by every configuration key.
pub const ENV_PREFIX: &str = "OMNISHARP";

/// Environment variable holding a literal language server command line.
///
/// `ortho_config` derives it from [`ENV_PREFIX`] and the
/// `language_server_command` field; the name is spelled out here for callers
/// that set it on a child process.
pub const LANGUAGE_SERVER_COMMAND_ENV: &str = "OMNISHARP_LANGUAGE_SERVER_COMMAND";

/// Directory, below the state location, that receives the extracted server.
pub const INSTALL_DIR_NAME: &str = "omnisharp-roslyn";

/// Logical name of the bundled server payload.
pub const PAYLOAD_FILE_NAME: &str = "omnisharp-roslyn.tar";

/// Name of the state directory created below the platform data directory.
const STATE_DIR_NAME: &str = "acute";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Computes the private state directory used when none is configured.
///
/// Prefers the platform's local data directory and falls back to the system
/// temporary directory when the platform does not define one.
pub fn default_state_directory() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join(STATE_DIR_NAME),
        None => env::temp_dir().join(STATE_DIR_NAME),
    }
}
