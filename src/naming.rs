//! Mapping from platform and artifact kind to archive folder and executable names.
//!
//! Archive labels come from an explicit table; a platform missing from
//! [`PLATFORM_LABELS`] is unsupported. Executable names are an exhaustive
//! match over every `(Os, ArtifactKind)` pair.

use crate::error::{InstallerError, Result};
use crate::platform::{Arch, Os, Platform};

/// The two tools managed by the installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Browser,
    Driver,
}

impl ArtifactKind {
    /// Tool name used as the first component of the cache key.
    pub fn tool_name(&self) -> &'static str {
        match self {
            ArtifactKind::Browser => "chromium",
            ArtifactKind::Driver => "chromedriver",
        }
    }

    /// Prefix of the top-level folder inside the downloaded zip.
    pub fn archive_prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Browser => "chrome",
            ArtifactKind::Driver => "chromedriver",
        }
    }
}

/// Platform labels used by the Chrome for Testing archives.
const PLATFORM_LABELS: &[(Os, Arch, &str)] = &[
    (Os::Linux, Arch::Amd64, "linux64"),
    (Os::Darwin, Arch::Amd64, "mac-x64"),
    (Os::Darwin, Arch::Arm64, "mac-arm64"),
    (Os::Windows, Arch::Amd64, "win64"),
    (Os::Windows, Arch::I686, "win32"),
];

/// Returns the archive label for a platform, e.g. `linux64` or `mac-arm64`.
pub fn platform_string(platform: &Platform) -> Result<&'static str> {
    PLATFORM_LABELS
        .iter()
        .find(|(os, arch, _)| *os == platform.os() && *arch == platform.arch())
        .map(|(_, _, label)| *label)
        .ok_or_else(|| InstallerError::UnsupportedPlatform(platform.to_string()))
}

/// Name of the top-level folder inside the archive, e.g. `chrome-linux64`.
pub fn archive_root_name(platform: &Platform, kind: ArtifactKind) -> Result<String> {
    Ok(format!("{}-{}", kind.archive_prefix(), platform_string(platform)?))
}

/// Executable path relative to the archive root folder.
pub fn executable_name(os: Os, kind: ArtifactKind) -> &'static str {
    match (os, kind) {
        (Os::Linux, ArtifactKind::Browser) => "chrome",
        (Os::Windows, ArtifactKind::Browser) => "chrome.exe",
        (Os::Darwin, ArtifactKind::Browser) => {
            "Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"
        }
        (Os::Linux | Os::Darwin, ArtifactKind::Driver) => "chromedriver",
        (Os::Windows, ArtifactKind::Driver) => "chromedriver.exe",
    }
}
