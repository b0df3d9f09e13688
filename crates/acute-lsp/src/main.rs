//! Entry point for the `acute-lsp` stdio bridge.

use std::io::{self, Write};
use std::process::ExitCode;

use acute_lsp::{SystemConfigLoader, exit_code, run};

fn main() -> ExitCode {
    match run(&SystemConfigLoader) {
        Ok(status) => ExitCode::from(exit_code(status)),
        Err(error) => {
            // Telemetry may not be installed yet, so report directly.
            let _reported = writeln!(io::stderr().lock(), "acute-lsp: {error}");
            ExitCode::FAILURE
        }
    }
}
