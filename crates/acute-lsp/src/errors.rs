//! Errors that stop the bridge before or while serving.

use std::io;
use std::sync::Arc;

use acute_config::InstallPathsError;
use acute_launcher::SupervisorError;
use ortho_config::OrthoError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Failures surfaced by [`crate::run`].
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry could not be initialised.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Installation paths could not be derived.
    #[error("failed to resolve installation paths: {source}")]
    Paths {
        /// Underlying path error.
        #[source]
        source: InstallPathsError,
    },
    /// The supervisor failed to start the server.
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
    /// No launch command could be determined.
    #[error("no language server available; see the log for details")]
    NoServer,
    /// Forwarding the server's output failed.
    #[error("failed to forward language server output: {source}")]
    Bridge {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
