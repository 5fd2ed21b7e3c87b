//! Target operating system and CPU architecture.

use crate::error::{InstallerError, Result};
use crate::naming::platform_string;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Darwin,
    Windows,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Os::Linux),
            "darwin" | "macos" => Ok(Os::Darwin),
            "windows" | "win32" => Ok(Os::Windows),
            other => Err(InstallerError::UnsupportedPlatform(format!(
                "unknown operating system '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Amd64,
    Arm64,
    I686,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
            Arch::I686 => "i686",
        }
    }

    /// Label used for the architecture segment of the on-disk tool cache.
    pub fn cache_label(&self) -> &'static str {
        match self {
            Arch::Amd64 => "x64",
            Arch::Arm64 => "arm64",
            Arch::I686 => "x86",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "amd64" | "x86_64" | "x64" => Ok(Arch::Amd64),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            "i686" | "x86" | "ia32" => Ok(Arch::I686),
            other => Err(InstallerError::UnsupportedPlatform(format!(
                "unknown architecture '{}'",
                other
            ))),
        }
    }
}

/// An operating system and architecture pair with a known archive label.
///
/// Construction fails for combinations that have no Chrome for Testing build,
/// so every `Platform` value can be named by [`platform_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Platform {
    os: Os,
    arch: Arch,
}

impl Platform {
    pub fn new(os: Os, arch: Arch) -> Result<Self> {
        let platform = Platform { os, arch };
        platform_string(&platform)?;
        Ok(platform)
    }

    /// Parses loosely spelled names such as `("linux", "x86_64")`.
    pub fn parse(os: &str, arch: &str) -> Result<Self> {
        Platform::new(os.parse()?, arch.parse()?)
    }

    /// Detects the platform this process is running on.
    pub fn detect() -> Result<Self> {
        Platform::parse(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn os(&self) -> Os {
        self.os
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
