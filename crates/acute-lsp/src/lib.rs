//! Runs the bundled OmniSharp server behind this process's stdio.
//!
//! An editor launches `acute-lsp` as its language server. The bridge loads
//! configuration, installs telemetry on standard error, starts the server
//! through [`acute_launcher::ServerSupervisor`], then forwards standard
//! input to the server and the server's output back until the server closes
//! its standard output.

mod bridge;
mod config;
mod errors;
mod telemetry;

use std::io;
use std::process::ExitStatus;
use std::thread;
use std::time::{Duration, Instant};

use acute_launcher::{LauncherSettings, ServerSupervisor, SupervisorStatus};
use tracing::{debug, info, warn};

pub use bridge::pump;
pub use config::{ConfigLoader, SystemConfigLoader, config_arguments};
pub use errors::LaunchError;
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};

/// Log target for the bridge lifecycle.
const LSP_TARGET: &str = "acute_lsp";

/// How long to wait for the server to exit once it closes its output.
const EXIT_GRACE: Duration = Duration::from_secs(5);

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Serves the language server until it exits.
///
/// Returns the server's exit status, or `None` when it had to be killed.
pub fn run(loader: &dyn ConfigLoader) -> Result<Option<ExitStatus>, LaunchError> {
    let config = loader
        .load()
        .map_err(|source| LaunchError::Configuration { source })?;
    telemetry::initialise(&config).map_err(|source| LaunchError::Telemetry { source })?;

    let settings =
        LauncherSettings::from_config(&config).map_err(|source| LaunchError::Paths { source })?;
    debug!(
        target: LSP_TARGET,
        install_root = %settings.install_root.display(),
        payload = %settings.payload_path.display(),
        mirroring = settings.mirror_streams,
        "launcher settings resolved"
    );

    let mut supervisor = ServerSupervisor::new(settings);
    if supervisor.start()? != SupervisorStatus::Running {
        return Err(LaunchError::NoServer);
    }
    serve(&mut supervisor)
}

fn serve(supervisor: &mut ServerSupervisor) -> Result<Option<ExitStatus>, LaunchError> {
    let server_stdin = supervisor.take_stdin()?;
    let server_stdout = supervisor.take_stdout()?;
    let server_stderr = supervisor.take_stderr()?;

    // The input pump blocks on our stdin and is left behind when the server
    // goes away first.
    thread::spawn(move || {
        if let Err(error) = pump(io::stdin().lock(), server_stdin) {
            warn!(target: LSP_TARGET, %error, "failed to forward input to language server");
        }
    });
    let stderr_pump = thread::spawn(move || pump(server_stderr, io::stderr()));

    let forwarded = pump(server_stdout, io::stdout().lock())
        .map_err(|source| LaunchError::Bridge { source })?;
    debug!(target: LSP_TARGET, bytes = forwarded, "language server closed its output");

    let status = wait_for_exit(supervisor);
    if let Ok(Err(error)) = stderr_pump.join() {
        warn!(target: LSP_TARGET, %error, "failed to forward language server diagnostics");
    }
    Ok(status)
}

fn wait_for_exit(supervisor: &mut ServerSupervisor) -> Option<ExitStatus> {
    let deadline = Instant::now() + EXIT_GRACE;
    while Instant::now() < deadline {
        if let Some(status) = supervisor.poll_exit() {
            info!(target: LSP_TARGET, ?status, "language server exited");
            return Some(status);
        }
        thread::sleep(EXIT_POLL_INTERVAL);
    }
    warn!(
        target: LSP_TARGET,
        "language server kept running after closing its output; killing it"
    );
    supervisor.stop();
    None
}

/// Maps a server exit status onto this process's exit code.
#[must_use]
pub fn exit_code(status: Option<ExitStatus>) -> u8 {
    status
        .and_then(|exit| exit.code())
        .and_then(|code| u8::try_from(code).ok())
        .unwrap_or(1)
}
