//! Host platform tags that select the bundled server layout.

use strum::{Display, EnumString};

/// Platform family the server payload is laid out for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Platform {
    /// Windows hosts, which run the server through `server/Omnisharp.exe`.
    Windows,
    /// Every other host, which runs the `OmniSharp` launcher script.
    Posix,
}

impl Platform {
    /// Platform the current binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// Server executable, relative to the installation root.
    #[must_use]
    pub const fn server_subpath(self) -> &'static str {
        match self {
            Self::Windows => "server/Omnisharp.exe",
            Self::Posix => "OmniSharp",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("windows", Platform::Windows)]
    #[case("Posix", Platform::Posix)]
    fn parses_platform_tags(#[case] tag: &str, #[case] expected: Platform) {
        assert_eq!(Platform::from_str(tag), Ok(expected));
    }

    #[rstest]
    fn current_platform_matches_target_family() {
        assert_eq!(Platform::current() == Platform::Windows, cfg!(windows));
    }
}
