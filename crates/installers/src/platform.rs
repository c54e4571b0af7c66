//! Host platform detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variables set inside every WSL session.
const WSL_ENV_VARS: [&str; 2] = ["WSL_DISTRO_NAME", "WSL_INTEROP"];

const OSRELEASE_PATH: &str = "/proc/sys/kernel/osrelease";

/// Platforms an installer can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Native Linux.
    Linux,
    /// Linux running under the Windows Subsystem for Linux.
    Wsl,
    /// Windows.
    Windows,
}

impl Platform {
    /// Every known platform.
    pub const ALL: [Self; 3] = [Self::Linux, Self::Wsl, Self::Windows];

    /// Detect the platform devkit is running on.
    ///
    /// Returns `None` on hosts that are neither Linux nor Windows.
    #[must_use]
    pub fn detect() -> Option<Self> {
        let osrelease = std::fs::read_to_string(OSRELEASE_PATH).ok();
        Self::detect_for(std::env::consts::OS, osrelease.as_deref())
    }

    /// Detection for a given OS name and kernel release string.
    ///
    /// WSL is recognized by its session environment variables or a
    /// `microsoft` kernel release.
    #[must_use]
    pub fn detect_for(os: &str, osrelease: Option<&str>) -> Option<Self> {
        match os {
            "linux" if is_wsl(osrelease) => Some(Self::Wsl),
            "linux" => Some(Self::Linux),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }

    /// Lowercase name, as used in manifests and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Wsl => "wsl",
            Self::Windows => "windows",
        }
    }
}

fn is_wsl(osrelease: Option<&str>) -> bool {
    WSL_ENV_VARS
        .iter()
        .any(|var| std::env::var_os(var).is_some_and(|value| !value.is_empty()))
        || osrelease.is_some_and(|release| release.to_ascii_lowercase().contains("microsoft"))
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown platform '{s}', expected one of: linux, wsl, windows"))
    }
}
