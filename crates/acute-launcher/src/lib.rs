//! Bundled language server supervision.
//!
//! The crate materialises a tar payload containing the OmniSharp server on
//! first use, determines the command line that launches it, runs a
//! best-effort `dotnet restore`, and owns the resulting process. The
//! [`ServerSupervisor`] hands the server's standard streams to the caller,
//! optionally wrapped in a [`Tee`] that mirrors protocol traffic to a
//! [`DiagnosticSink`].
//!
//! Filesystem layout and override rules are described on
//! [`CommandResolver`]; extraction rules on [`ArchiveExtractor`].

mod archive;
mod errors;
mod payload;
mod permissions;
mod platform;
mod resolver;
mod restore;
mod settings;
mod supervisor;
mod tee;

#[cfg(test)]
mod tests;

pub use archive::{ArchiveExtractor, InstallationState};
pub use errors::{ExtractError, SupervisorError};
pub use payload::{FilePayload, PayloadSource};
pub use permissions::{PermissionBits, PermissionTriplet};
pub use platform::Platform;
pub use resolver::{CommandResolver, LaunchCommand, PROTOCOL_FLAG};
pub use restore::{
    DEFAULT_RESTORE_TOOL, DotnetRestore, PreLaunch, RESTORE_SUBCOMMAND, RestoreOutcome,
};
pub use settings::LauncherSettings;
pub use supervisor::{ServerSupervisor, StreamKind, SupervisorStatus};
pub use tee::{DiagnosticSink, Tee};
