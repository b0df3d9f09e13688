//! Owns the language server process from extraction to termination.
//!
//! [`ServerSupervisor::start`] walks `Idle → Starting → Running`, or ends in
//! `Failed` when no launch command can be determined:
//!
//! 1. run the pre-launch restore step; its failures are logged and ignored
//! 2. use the override command, or extract the bundled payload on first use
//!    and resolve the platform executable
//! 3. spawn the server with piped stdio
//!
//! [`ServerSupervisor::stop`] kills the process without a grace period and
//! reaps it later, from [`ServerSupervisor::poll_exit`], the next `start` or
//! drop. It is a no-op when nothing is running. Streams are available only
//! while `Running`.

mod state;

use std::fmt;
use std::io;
use std::mem;
use std::path::PathBuf;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, ExitStatus, Stdio};

use tracing::{debug, error, info, warn};

pub use state::{StreamKind, SupervisorStatus};

use self::state::{ServerProcess, SupervisorState};
use crate::archive::{ArchiveExtractor, InstallationState};
use crate::errors::SupervisorError;
use crate::payload::{FilePayload, PayloadSource};
use crate::resolver::{CommandResolver, LaunchCommand};
use crate::restore::{DotnetRestore, PreLaunch, RestoreOutcome};
use crate::settings::LauncherSettings;
use crate::tee::{DiagnosticSink, Tee};

/// Log target for supervisor operations.
pub(crate) const SUPERVISOR_TARGET: &str = "acute_launcher::supervisor";

/// Supervises a single language server process.
///
/// The supervisor is driven by one owner; it holds at most one process at a
/// time and kills it when dropped.
///
/// # Example
///
/// ```no_run
/// use acute_launcher::{LauncherSettings, ServerSupervisor, SupervisorStatus};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = LauncherSettings::new(
///     "/var/lib/acute/omnisharp-roslyn",
///     "/opt/acute/omnisharp-roslyn.tar",
/// );
/// let mut supervisor = ServerSupervisor::new(settings);
/// if supervisor.start()? == SupervisorStatus::Running {
///     let _stdin = supervisor.take_stdin()?;
///     let _stdout = supervisor.take_stdout()?;
/// }
/// supervisor.stop();
/// # Ok(())
/// # }
/// ```
pub struct ServerSupervisor {
    resolver: CommandResolver,
    extractor: ArchiveExtractor,
    payload: Box<dyn PayloadSource>,
    install_root: PathBuf,
    pre_launch: Box<dyn PreLaunch>,
    working_dir: Option<PathBuf>,
    sink: Option<DiagnosticSink>,
    state: SupervisorState,
    restore_tool_reported: bool,
}

impl ServerSupervisor {
    /// Creates a supervisor from explicit settings.
    #[must_use]
    pub fn new(settings: LauncherSettings) -> Self {
        let LauncherSettings {
            install_root,
            payload_path,
            command_override,
            restore_tool,
            working_dir,
            mirror_streams,
            platform,
        } = settings;

        Self {
            resolver: CommandResolver::new(platform).with_override(command_override),
            extractor: ArchiveExtractor::new(),
            payload: Box::new(FilePayload::new(payload_path)),
            install_root,
            pre_launch: Box::new(DotnetRestore::new(restore_tool, working_dir.clone())),
            working_dir,
            sink: mirror_streams.then(DiagnosticSink::stderr),
            state: SupervisorState::Idle,
            restore_tool_reported: false,
        }
    }

    /// Replaces the pre-launch step.
    #[must_use]
    pub fn with_pre_launch(mut self, step: impl PreLaunch + 'static) -> Self {
        self.pre_launch = Box::new(step);
        self
    }

    /// Replaces the payload source.
    #[must_use]
    pub fn with_payload(mut self, payload: impl PayloadSource + 'static) -> Self {
        self.payload = Box::new(payload);
        self
    }

    /// Replaces the extractor.
    #[must_use]
    pub const fn with_extractor(mut self, extractor: ArchiveExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replaces the diagnostic sink; `None` disables mirroring.
    #[must_use]
    pub fn with_diagnostic_sink(mut self, sink: Option<DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> SupervisorStatus {
        self.state.status()
    }

    /// Process identifier while running.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        match &self.state {
            SupervisorState::Running(process) => Some(process.pid()),
            _ => None,
        }
    }

    /// Command the running server was launched with.
    #[must_use]
    pub fn launch_command(&self) -> Option<&LaunchCommand> {
        match &self.state {
            SupervisorState::Running(process) => Some(process.command()),
            _ => None,
        }
    }

    /// Starts the server.
    ///
    /// Returns [`SupervisorStatus::Failed`] when no command could be
    /// determined; the reason has already been logged. Extraction and spawn
    /// failures are returned as errors and also leave the supervisor in
    /// `Failed`.
    pub fn start(&mut self) -> Result<SupervisorStatus, SupervisorError> {
        match mem::replace(&mut self.state, SupervisorState::Starting) {
            SupervisorState::Running(process) => {
                let pid = process.pid();
                self.state = SupervisorState::Running(process);
                return Err(SupervisorError::AlreadyRunning { pid });
            }
            SupervisorState::Stopped(Some(child)) => wait_for_killed(child),
            _ => {}
        }

        info!(target: SUPERVISOR_TARGET, "starting language server");
        self.run_pre_launch();

        match self.prepare_and_spawn() {
            Ok(Some(process)) => {
                info!(
                    target: SUPERVISOR_TARGET,
                    pid = process.pid(),
                    command = %process.command(),
                    "language server started"
                );
                self.state = SupervisorState::Running(process);
            }
            Ok(None) => {
                error!(
                    target: SUPERVISOR_TARGET,
                    "no language server command available; server not started"
                );
                self.state = SupervisorState::Failed;
            }
            Err(error) => {
                self.state = SupervisorState::Failed;
                return Err(error);
            }
        }
        Ok(self.status())
    }

    /// Kills the server and moves to `Stopped`.
    ///
    /// From `Running` the process is killed without waiting for it; the
    /// handle is kept so a later call can reap it. `Failed` becomes `Stopped`.
    /// In every other state this is a no-op, so repeated calls are safe.
    pub fn stop(&mut self) {
        match mem::replace(&mut self.state, SupervisorState::Idle) {
            SupervisorState::Running(mut process) => {
                debug!(
                    target: SUPERVISOR_TARGET,
                    pid = process.pid(),
                    "killing language server"
                );
                if let Err(error) = process.kill() {
                    warn!(
                        target: SUPERVISOR_TARGET,
                        pid = process.pid(),
                        %error,
                        "failed to kill language server"
                    );
                }
                self.state = SupervisorState::Stopped(reap(Some(process.into_child())));
            }
            SupervisorState::Failed => self.state = SupervisorState::Stopped(None),
            previous => self.state = previous,
        }
    }

    /// Checks, without blocking, whether the server exited on its own.
    ///
    /// An exited server moves the supervisor to `Stopped`. Once stopped, each
    /// call also tries to reap a killed server and returns `None`.
    pub fn poll_exit(&mut self) -> Option<ExitStatus> {
        let process = match &mut self.state {
            SupervisorState::Running(process) => process,
            SupervisorState::Stopped(pending) => {
                *pending = reap(pending.take());
                return None;
            }
            _ => return None,
        };
        match process.try_wait() {
            Ok(Some(status)) => {
                info!(target: SUPERVISOR_TARGET, ?status, "language server exited");
                self.state = SupervisorState::Stopped(None);
                Some(status)
            }
            Ok(None) => None,
            Err(error) => {
                warn!(
                    target: SUPERVISOR_TARGET,
                    %error,
                    "failed to query language server status"
                );
                None
            }
        }
    }

    /// Takes the server's standard input, mirrored when debugging.
    pub fn take_stdin(&mut self) -> Result<Tee<ChildStdin>, SupervisorError> {
        self.running_process()?
            .stdin
            .take()
            .ok_or(SupervisorError::StreamTaken {
                stream: StreamKind::Stdin,
            })
    }

    /// Takes the server's standard output, mirrored when debugging.
    pub fn take_stdout(&mut self) -> Result<Tee<ChildStdout>, SupervisorError> {
        self.running_process()?
            .stdout
            .take()
            .ok_or(SupervisorError::StreamTaken {
                stream: StreamKind::Stdout,
            })
    }

    /// Takes the server's standard error. It is never mirrored.
    pub fn take_stderr(&mut self) -> Result<ChildStderr, SupervisorError> {
        self.running_process()?
            .stderr
            .take()
            .ok_or(SupervisorError::StreamTaken {
                stream: StreamKind::Stderr,
            })
    }

    #[cfg(test)]
    pub(crate) const fn restore_tool_reported(&self) -> bool {
        self.restore_tool_reported
    }

    fn running_process(&mut self) -> Result<&mut ServerProcess, SupervisorError> {
        let status = self.status();
        match &mut self.state {
            SupervisorState::Running(process) => Ok(process),
            _ => Err(SupervisorError::NotRunning { status }),
        }
    }

    fn run_pre_launch(&mut self) {
        match self.pre_launch.run() {
            RestoreOutcome::Completed(status) => {
                self.restore_tool_reported = false;
                debug!(target: SUPERVISOR_TARGET, ?status, "restore step finished");
            }
            RestoreOutcome::ToolUnavailable => {
                if self.restore_tool_reported {
                    debug!(
                        target: SUPERVISOR_TARGET,
                        "restore tool still unavailable; skipping restore"
                    );
                } else {
                    error!(
                        target: SUPERVISOR_TARGET,
                        "restore tool not found; configure dotnet_path or add dotnet to PATH"
                    );
                    self.restore_tool_reported = true;
                }
            }
            RestoreOutcome::LaunchFailed { tool, source } => {
                self.restore_tool_reported = false;
                warn!(
                    target: SUPERVISOR_TARGET,
                    tool = %tool.display(),
                    error = %source,
                    "failed to launch restore step; continuing"
                );
            }
            RestoreOutcome::WaitFailed { tool, source } => {
                self.restore_tool_reported = false;
                warn!(
                    target: SUPERVISOR_TARGET,
                    tool = %tool.display(),
                    error = %source,
                    "interrupted while waiting for restore step; continuing"
                );
            }
        }
    }

    fn prepare_and_spawn(&self) -> Result<Option<ServerProcess>, SupervisorError> {
        let command = match self.resolver.override_command() {
            Some(command) => command,
            None => {
                let installation = self.ensure_installation()?;
                match self.resolver.resolve(installation.root()) {
                    Some(command) => command,
                    None => return Ok(None),
                }
            }
        };
        self.spawn(command).map(Some)
    }

    fn ensure_installation(&self) -> Result<InstallationState, SupervisorError> {
        let state = InstallationState::inspect(&self.install_root);
        if state.is_present() {
            return Ok(state);
        }

        let archive = self
            .payload
            .open()
            .map_err(|source| SupervisorError::OpenPayload {
                payload: self.payload.describe(),
                source,
            })?;
        Ok(self
            .extractor
            .ensure_extracted(archive, &self.install_root)?)
    }

    fn spawn(&self, launch: LaunchCommand) -> Result<ServerProcess, SupervisorError> {
        let mut command = launch.to_command()?;
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        debug!(
            target: SUPERVISOR_TARGET,
            command = %launch,
            "spawning language server process"
        );
        let child = command.spawn().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                SupervisorError::BinaryNotFound {
                    command: launch.to_string(),
                    source,
                }
            } else {
                SupervisorError::Spawn {
                    command: launch.to_string(),
                    source,
                }
            }
        })?;

        Ok(ServerProcess::new(child, launch, self.sink.as_ref()))
    }
}

impl Drop for ServerSupervisor {
    fn drop(&mut self) {
        match mem::replace(&mut self.state, SupervisorState::Idle) {
            SupervisorState::Running(mut process) => {
                if let Err(error) = process.kill_and_wait() {
                    warn!(
                        target: SUPERVISOR_TARGET,
                        %error,
                        "failed to kill language server on drop"
                    );
                }
            }
            SupervisorState::Stopped(Some(child)) => wait_for_killed(child),
            _ => {}
        }
    }
}

/// Reaps a killed server if it has already exited, otherwise hands it back.
fn reap(pending: Option<Child>) -> Option<Child> {
    let mut child = pending?;
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!(target: SUPERVISOR_TARGET, ?status, "language server reaped");
            None
        }
        Ok(None) => Some(child),
        Err(error) => {
            warn!(
                target: SUPERVISOR_TARGET,
                %error,
                "failed to reap language server"
            );
            None
        }
    }
}

/// Blocks until a killed server has been reaped.
fn wait_for_killed(mut child: Child) {
    match child.wait() {
        Ok(status) => debug!(target: SUPERVISOR_TARGET, ?status, "language server reaped"),
        Err(error) => warn!(
            target: SUPERVISOR_TARGET,
            %error,
            "failed to reap language server"
        ),
    }
}

impl fmt::Debug for ServerSupervisor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ServerSupervisor")
            .field("status", &self.status())
            .field("pid", &self.pid())
            .field("install_root", &self.install_root)
            .field("platform", &self.resolver.platform())
            .field("mirroring", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}
