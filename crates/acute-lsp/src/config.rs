//! Configuration loading for the bridge.
//!
//! Editors launch language servers with their own flags (`--stdio` is
//! common). Only the flags `ortho_config` understands are forwarded to the
//! loader; everything else is dropped.

use std::env;
use std::ffi::OsString;
use std::sync::Arc;

use acute_config::Config;
use ortho_config::{OrthoConfig, OrthoError};

/// Flags that take a value, either inline (`--flag=value`) or as the next
/// argument.
const VALUE_FLAGS: &[&str] = &[
    "--config-path",
    "--language-server-command",
    "--dotnet-path",
    "--state-dir",
    "--payload-path",
    "--working-dir",
    "--log-filter",
    "--log-format",
];

/// Flags that stand alone.
const SWITCH_FLAGS: &[&str] = &["--lsp-debug"];

/// Abstracts configuration loading so callers can inject fixed settings.
pub trait ConfigLoader {
    /// Loads the launcher configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that reads the process arguments and environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter(config_arguments(env::args_os()))
    }
}

/// Keeps the program name and every recognised configuration flag.
pub fn config_arguments(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut args = args.into_iter();
    let mut kept: Vec<OsString> = args.next().into_iter().collect();
    while let Some(argument) = args.next() {
        let text = argument.to_string_lossy();
        let (flag, has_inline_value) = match text.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (&*text, false),
        };
        if SWITCH_FLAGS.contains(&flag) {
            kept.push(argument.clone());
        } else if VALUE_FLAGS.contains(&flag) {
            let needs_value = !has_inline_value;
            kept.push(argument.clone());
            if needs_value && let Some(value) = args.next() {
                kept.push(value);
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn os(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case(&["acute-lsp"], &["acute-lsp"])]
    #[case(&["acute-lsp", "--stdio"], &["acute-lsp"])]
    #[case(
        &["acute-lsp", "--stdio", "--log-filter", "debug"],
        &["acute-lsp", "--log-filter", "debug"]
    )]
    #[case(
        &["acute-lsp", "--log-format=compact", "--clientProcessId", "42"],
        &["acute-lsp", "--log-format=compact"]
    )]
    #[case(&["acute-lsp", "--lsp-debug", "--stdio"], &["acute-lsp", "--lsp-debug"])]
    fn keeps_only_configuration_flags(#[case] input: &[&str], #[case] expected: &[&str]) {
        assert_eq!(config_arguments(os(input)), os(expected));
    }

    #[rstest]
    fn trailing_value_flag_without_value_is_kept() {
        assert_eq!(
            config_arguments(os(&["acute-lsp", "--state-dir"])),
            os(&["acute-lsp", "--state-dir"])
        );
    }

    #[rstest]
    fn empty_arguments_stay_empty() {
        assert!(config_arguments(Vec::new()).is_empty());
    }
}
