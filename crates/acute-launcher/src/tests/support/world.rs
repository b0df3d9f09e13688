//! Scenario state for supervisor behaviour tests.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use tempfile::TempDir;

use super::{BytesPayload, SharedBuffer, SkipRestore};
use crate::errors::SupervisorError;
use crate::platform::Platform;
use crate::settings::LauncherSettings;
use crate::supervisor::{ServerSupervisor, SupervisorStatus};
use crate::tee::DiagnosticSink;

/// Everything a scenario accumulates between steps.
pub struct SupervisorWorld {
    temp: TempDir,
    payload: BytesPayload,
    command_override: Option<String>,
    mirror: SharedBuffer,
    supervisor: Option<ServerSupervisor>,
    last_start: Option<Result<SupervisorStatus, SupervisorError>>,
}

impl SupervisorWorld {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("temp dir"),
            payload: BytesPayload::new(Vec::new()),
            command_override: None,
            mirror: SharedBuffer::default(),
            supervisor: None,
            last_start: None,
        }
    }

    pub fn install_root(&self) -> PathBuf {
        self.temp.path().join("omnisharp-roslyn")
    }

    pub fn set_payload(&mut self, bytes: Vec<u8>) {
        self.payload = BytesPayload::new(bytes);
    }

    pub fn set_override(&mut self, command: Option<&str>) {
        self.command_override = command.map(str::to_owned);
    }

    pub const fn payload(&self) -> &BytesPayload {
        &self.payload
    }

    pub fn mirrored(&self) -> String {
        String::from_utf8(self.mirror.contents()).expect("mirrored text")
    }

    /// Builds the supervisor on first use so `Given` steps can adjust inputs.
    pub fn supervisor(&mut self, mirroring: bool) -> &mut ServerSupervisor {
        if self.supervisor.is_none() {
            let mut settings =
                LauncherSettings::new(self.install_root(), self.temp.path().join("unused.tar"))
                    .with_platform(Platform::Posix);
            if let Some(command) = &self.command_override {
                settings = settings.with_override(command.clone());
            }
            let sink = mirroring.then(|| DiagnosticSink::new(self.mirror.clone()));
            let supervisor = ServerSupervisor::new(settings)
                .with_pre_launch(SkipRestore)
                .with_payload(self.payload.clone())
                .with_diagnostic_sink(sink);
            self.supervisor = Some(supervisor);
        }
        self.supervisor.as_mut().expect("supervisor initialised")
    }

    pub fn start(&mut self, mirroring: bool) {
        let result = self.supervisor(mirroring).start();
        self.last_start = Some(result);
    }

    pub fn stop(&mut self) {
        self.supervisor(false).stop();
    }

    pub fn status(&mut self) -> SupervisorStatus {
        self.supervisor(false).status()
    }

    pub fn last_start(&self) -> &Result<SupervisorStatus, SupervisorError> {
        self.last_start.as_ref().expect("supervisor was started")
    }

    /// Sends `line` through the server and returns the first line it answers
    /// with.
    pub fn round_trip(&mut self, line: &str) -> String {
        let supervisor = self.supervisor(false);
        let mut stdin = supervisor.take_stdin().expect("stdin");
        let stdout = supervisor.take_stdout().expect("stdout");
        stdin.write_all(line.as_bytes()).expect("write to server");
        stdin.flush().expect("flush server input");
        drop(stdin);

        let mut echoed = String::new();
        BufReader::new(stdout)
            .read_line(&mut echoed)
            .expect("read from server");
        echoed
    }

    pub fn root_exists(&self) -> bool {
        self.install_root().exists()
    }
}
