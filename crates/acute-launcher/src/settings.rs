//! Construction-time settings for the supervisor.

use std::path::PathBuf;

use acute_config::{Config, InstallPaths, InstallPathsError};

use crate::platform::Platform;

/// Everything the supervisor needs, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSettings {
    /// Directory receiving the extracted server.
    pub install_root: PathBuf,
    /// Bundled tar payload.
    pub payload_path: PathBuf,
    /// Literal launch command bypassing extraction and resolution.
    pub command_override: Option<String>,
    /// Tool used for the pre-launch restore step.
    pub restore_tool: Option<PathBuf>,
    /// Working directory for the restore step and the server.
    pub working_dir: Option<PathBuf>,
    /// Mirror stream traffic to stderr.
    pub mirror_streams: bool,
    /// Layout of the bundled server.
    pub platform: Platform,
}

impl LauncherSettings {
    /// Settings for the host platform with every optional value unset.
    #[must_use]
    pub fn new(install_root: impl Into<PathBuf>, payload_path: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            payload_path: payload_path.into(),
            command_override: None,
            restore_tool: None,
            working_dir: None,
            mirror_streams: false,
            platform: Platform::current(),
        }
    }

    /// Derives settings from the layered configuration.
    pub fn from_config(config: &Config) -> Result<Self, InstallPathsError> {
        let paths = InstallPaths::from_config(config)?;
        Ok(Self {
            install_root: paths.install_root().to_path_buf(),
            payload_path: paths.payload_path().to_path_buf(),
            command_override: config.language_server_command().map(str::to_owned),
            restore_tool: config.dotnet_path().map(PathBuf::from),
            working_dir: config.working_dir().map(PathBuf::from),
            mirror_streams: config.lsp_debug(),
            platform: Platform::current(),
        })
    }

    /// Sets the launch command override.
    #[must_use]
    pub fn with_override(mut self, command: impl Into<String>) -> Self {
        self.command_override = Some(command.into());
        self
    }

    /// Sets the platform layout.
    #[must_use]
    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Enables or disables stream mirroring.
    #[must_use]
    pub const fn with_mirroring(mut self, enabled: bool) -> Self {
        self.mirror_streams = enabled;
        self
    }

    /// Sets the restore tool.
    #[must_use]
    pub fn with_restore_tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.restore_tool = Some(tool.into());
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn from_config_carries_explicit_values() {
        let config = Config {
            language_server_command: Some(String::from("omnisharp -lsp")),
            lsp_debug: true,
            dotnet_path: Some(PathBuf::from("/usr/share/dotnet/dotnet")),
            state_dir: Some(PathBuf::from("/var/lib/acute")),
            payload_path: Some(PathBuf::from("/opt/acute/omnisharp-roslyn.tar")),
            working_dir: Some(PathBuf::from("/work/project")),
            ..Config::default()
        };

        let settings = LauncherSettings::from_config(&config).expect("settings");

        assert_eq!(
            settings.install_root,
            Path::new("/var/lib/acute/omnisharp-roslyn")
        );
        assert_eq!(
            settings.payload_path,
            Path::new("/opt/acute/omnisharp-roslyn.tar")
        );
        assert_eq!(settings.command_override.as_deref(), Some("omnisharp -lsp"));
        assert_eq!(
            settings.restore_tool.as_deref(),
            Some(Path::new("/usr/share/dotnet/dotnet"))
        );
        assert_eq!(settings.working_dir.as_deref(), Some(Path::new("/work/project")));
        assert!(settings.mirror_streams);
        assert_eq!(settings.platform, Platform::current());
    }

    #[rstest]
    fn blank_config_override_is_dropped() {
        let config = Config {
            language_server_command: Some(String::from("  ")),
            state_dir: Some(PathBuf::from("/var/lib/acute")),
            ..Config::default()
        };

        let settings = LauncherSettings::from_config(&config).expect("settings");

        assert!(settings.command_override.is_none());
    }

    #[rstest]
    fn builders_override_defaults() {
        let settings = LauncherSettings::new("/install", "/payload.tar")
            .with_override("cat")
            .with_platform(Platform::Windows)
            .with_mirroring(true)
            .with_restore_tool("/bin/true")
            .with_working_dir("/work");

        assert_eq!(settings.command_override.as_deref(), Some("cat"));
        assert_eq!(settings.platform, Platform::Windows);
        assert!(settings.mirror_streams);
        assert_eq!(settings.restore_tool, Some(PathBuf::from("/bin/true")));
        assert_eq!(settings.working_dir, Some(PathBuf::from("/work")));
    }
}
