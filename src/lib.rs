//! Downloads Chrome for Testing and chromedriver archives by URL and keeps the
//! extracted trees in a tool cache so repeated runs skip the download.

// Top-level public modules
pub mod cache_key;
pub mod config;
pub mod downloader;
pub mod error;
pub mod installers;
pub mod naming;
pub mod platform;
pub mod tool_cache;

pub use cache_key::cache_key;
pub use config::InstallerConfig;
pub use error::{InstallerError, Result};
pub use installers::url::{InstallerOptions, UrlInstaller};
pub use naming::ArtifactKind;
pub use platform::{Arch, Os, Platform};

// Main public trait
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A downloaded archive waiting to be installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub archive: PathBuf,
}

/// Location of an installed tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallResult {
    /// Cache entry directory.
    pub root: PathBuf,
    /// Executable path relative to `root`.
    pub bin: PathBuf,
}

impl InstallResult {
    pub fn executable_path(&self) -> PathBuf {
        self.root.join(&self.bin)
    }
}

#[async_trait]
pub trait Installer: Send + Sync {
    /// Returns the cached browser for `url`, if any.
    async fn check_installed_browser(&self, url: &str) -> Result<Option<InstallResult>>;

    /// Downloads the browser archive.
    async fn download_browser(&self, url: &str) -> Result<DownloadResult>;

    /// Extracts `archive` and registers the browser under the key for `url`.
    async fn install_browser(&self, url: &str, archive: &Path) -> Result<InstallResult>;

    /// Returns the cached driver for `url`, if any.
    async fn check_installed_driver(&self, url: &str) -> Result<Option<InstallResult>>;

    /// Downloads the driver archive.
    async fn download_driver(&self, url: &str) -> Result<DownloadResult>;

    /// Extracts `archive` and registers the driver under the key for `url`.
    async fn install_driver(&self, url: &str, archive: &Path) -> Result<InstallResult>;

    /// Returns the cached browser or downloads and installs it.
    async fn ensure_browser(&self, url: &str) -> Result<InstallResult> {
        if let Some(installed) = self.check_installed_browser(url).await? {
            return Ok(installed);
        }
        let downloaded = self.download_browser(url).await?;
        self.install_browser(url, &downloaded.archive).await
    }

    /// Returns the cached driver or downloads and installs it.
    async fn ensure_driver(&self, url: &str) -> Result<InstallResult> {
        if let Some(installed) = self.check_installed_driver(url).await? {
            return Ok(installed);
        }
        let downloaded = self.download_driver(url).await?;
        self.install_driver(url, &downloaded.archive).await
    }
}
