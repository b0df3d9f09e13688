//! Best-effort pre-launch step run before every server start.
//!
//! The server misbehaves on projects whose packages were never restored, so
//! the supervisor runs `<tool> restore` and waits for it. Nothing about this
//! step can stop the server from launching.

use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

/// Subcommand passed to the restore tool.
pub const RESTORE_SUBCOMMAND: &str = "restore";

/// Name looked up on `PATH` when no restore tool is configured.
pub const DEFAULT_RESTORE_TOOL: &str = "dotnet";

/// What happened when the pre-launch step ran.
#[derive(Debug)]
pub enum RestoreOutcome {
    /// The tool ran to completion. Its exit status is informational only.
    Completed(ExitStatus),
    /// No tool is configured and none was found on `PATH`.
    ToolUnavailable,
    /// The tool could not be started.
    LaunchFailed {
        /// Tool that failed to start.
        tool: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Waiting for the tool to finish failed.
    WaitFailed {
        /// Tool being waited on.
        tool: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

/// A step executed synchronously before the server is spawned.
pub trait PreLaunch: Send {
    /// Runs the step to completion. Must not panic on failure.
    fn run(&mut self) -> RestoreOutcome;
}

/// Runs `dotnet restore` with all output discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DotnetRestore {
    tool: Option<PathBuf>,
    working_dir: Option<PathBuf>,
}

impl DotnetRestore {
    /// Creates the step. Without `tool`, `dotnet` is located on `PATH` at run
    /// time.
    #[must_use]
    pub const fn new(tool: Option<PathBuf>, working_dir: Option<PathBuf>) -> Self {
        Self { tool, working_dir }
    }

    fn locate_tool(&self) -> Option<PathBuf> {
        self.tool
            .clone()
            .or_else(|| which::which(DEFAULT_RESTORE_TOOL).ok())
    }
}

impl PreLaunch for DotnetRestore {
    fn run(&mut self) -> RestoreOutcome {
        let Some(tool) = self.locate_tool() else {
            return RestoreOutcome::ToolUnavailable;
        };

        let mut command = Command::new(&tool);
        command
            .arg(RESTORE_SUBCOMMAND)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(source) => return RestoreOutcome::LaunchFailed { tool, source },
        };
        match child.wait() {
            Ok(status) => RestoreOutcome::Completed(status),
            Err(source) => RestoreOutcome::WaitFailed { tool, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn missing_tool_fails_to_launch() {
        let mut step = DotnetRestore::new(Some(PathBuf::from("/nonexistent/dotnet")), None);

        match step.run() {
            RestoreOutcome::LaunchFailed { tool, source } => {
                assert_eq!(tool, PathBuf::from("/nonexistent/dotnet"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected launch failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[rstest]
    fn waits_for_tool_and_ignores_exit_code() {
        let mut step = DotnetRestore::new(Some(PathBuf::from("/bin/sh")), None);

        // `sh restore` fails because no such script exists; the outcome still
        // reports completion.
        match step.run() {
            RestoreOutcome::Completed(status) => assert!(!status.success()),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[rstest]
    fn runs_in_configured_working_directory() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join(RESTORE_SUBCOMMAND), "exit 0\n").expect("write script");
        let mut step = DotnetRestore::new(
            Some(PathBuf::from("/bin/sh")),
            Some(temp.path().to_path_buf()),
        );

        match step.run() {
            RestoreOutcome::Completed(status) => assert!(status.success()),
            other => panic!("expected completion, got {other:?}"),
        }
    }
}
