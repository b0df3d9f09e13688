//! Output formats accepted by `log_format`.
//!
//! The value arrives from a configuration file, an `OMNISHARP_LOG_FORMAT`
//! variable or `--log-format`, so it parses case-insensitively.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the bridge renders telemetry on standard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, with fields flattened.
    #[default]
    Json,
    /// Single-line text for reading in an editor's output pane.
    Compact,
}

/// Returned when text names no known [`LogFormat`].
pub type LogFormatParseError = strum::ParseError;
