//! Lifecycle state of the supervised server.

use std::io;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, ExitStatus};

use strum::Display;

use crate::resolver::LaunchCommand;
use crate::tee::{DiagnosticSink, Tee};

/// Externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SupervisorStatus {
    /// Nothing has been started yet.
    Idle,
    /// `start` is in progress.
    Starting,
    /// The server process is alive and owned by the supervisor.
    Running,
    /// The last `start` produced no process.
    Failed,
    /// The server was stopped or exited on its own.
    Stopped,
}

/// One of the server's standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StreamKind {
    /// Standard input.
    #[strum(serialize = "standard input")]
    Stdin,
    /// Standard output.
    #[strum(serialize = "standard output")]
    Stdout,
    /// Standard error.
    #[strum(serialize = "standard error")]
    Stderr,
}

/// Internal state; `Running` owns the only process handle.
///
/// `Stopped` keeps a killed child until it has been reaped.
pub(crate) enum SupervisorState {
    Idle,
    Starting,
    Running(ServerProcess),
    Failed,
    Stopped(Option<Child>),
}

impl SupervisorState {
    pub(crate) const fn status(&self) -> SupervisorStatus {
        match self {
            Self::Idle => SupervisorStatus::Idle,
            Self::Starting => SupervisorStatus::Starting,
            Self::Running(_) => SupervisorStatus::Running,
            Self::Failed => SupervisorStatus::Failed,
            Self::Stopped(_) => SupervisorStatus::Stopped,
        }
    }
}

/// A running server and the streams not yet handed to the caller.
pub(crate) struct ServerProcess {
    child: Child,
    command: LaunchCommand,
    pub(crate) stdin: Option<Tee<ChildStdin>>,
    pub(crate) stdout: Option<Tee<ChildStdout>>,
    pub(crate) stderr: Option<ChildStderr>,
}

impl ServerProcess {
    /// Takes the piped streams out of `child`, wrapping stdin and stdout.
    pub(crate) fn new(
        mut child: Child,
        command: LaunchCommand,
        sink: Option<&DiagnosticSink>,
    ) -> Self {
        let stdin = child
            .stdin
            .take()
            .map(|stream| Tee::new(stream, sink.cloned()));
        let stdout = child
            .stdout
            .take()
            .map(|stream| Tee::new(stream, sink.cloned()));
        let stderr = child.stderr.take();
        Self {
            child,
            command,
            stdin,
            stdout,
            stderr,
        }
    }

    pub(crate) fn pid(&self) -> u32 {
        self.child.id()
    }

    pub(crate) const fn command(&self) -> &LaunchCommand {
        &self.command
    }

    pub(crate) fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Sends the kill signal without waiting for the process to go away.
    pub(crate) fn kill(&mut self) -> io::Result<()> {
        self.child.kill()
    }

    /// Gives up the streams and keeps only the process handle.
    pub(crate) fn into_child(self) -> Child {
        self.child
    }

    /// Kills the process and reaps it.
    pub(crate) fn kill_and_wait(&mut self) -> io::Result<ExitStatus> {
        self.child.kill()?;
        self.child.wait()
    }
}
