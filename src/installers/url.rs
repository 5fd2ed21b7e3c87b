//! Installs Chrome for Testing archives identified by their download URL.

use crate::cache_key::cache_key;
use crate::config::InstallerConfig;
use crate::downloader::{Downloader, Extractor, HttpDownloader, ZipExtractor};
use crate::error::{InstallerError, Result};
use crate::naming::{archive_root_name, executable_name, ArtifactKind};
use crate::platform::Platform;
use crate::tool_cache::{LocalToolCache, ToolCache};
use crate::{DownloadResult, InstallResult, Installer};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallerOptions {
    /// Only the browser is managed; driver downloads and installs are errors.
    pub resolve_browser_version_only: bool,
}

/// [`Installer`] keyed on the hash of the download URL.
pub struct UrlInstaller {
    platform: Platform,
    options: InstallerOptions,
    cache: Arc<dyn ToolCache>,
    downloader: Arc<dyn Downloader>,
    extractor: Arc<dyn Extractor>,
}

impl UrlInstaller {
    /// Creates an installer using the locations from [`InstallerConfig::from_env`].
    pub fn new(platform: Platform, options: InstallerOptions) -> Self {
        UrlInstaller::from_config(platform, options, &InstallerConfig::from_env())
    }

    pub fn from_config(
        platform: Platform,
        options: InstallerOptions,
        config: &InstallerConfig,
    ) -> Self {
        UrlInstaller::with_collaborators(
            platform,
            options,
            Arc::new(LocalToolCache::new(
                &config.tool_cache_root,
                platform.arch().cache_label(),
            )),
            Arc::new(HttpDownloader::new(&config.temp_dir)),
            Arc::new(ZipExtractor::new(&config.temp_dir)),
        )
    }

    pub fn with_collaborators(
        platform: Platform,
        options: InstallerOptions,
        cache: Arc<dyn ToolCache>,
        downloader: Arc<dyn Downloader>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        UrlInstaller {
            platform,
            options,
            cache,
            downloader,
            extractor,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn options(&self) -> InstallerOptions {
        self.options
    }

    fn ensure_driver_allowed(&self, operation: &'static str) -> Result<()> {
        if self.options.resolve_browser_version_only {
            return Err(InstallerError::UnexpectedDriverOperation { operation });
        }
        Ok(())
    }

    fn install_result(&self, root: PathBuf, kind: ArtifactKind) -> InstallResult {
        InstallResult {
            root,
            bin: PathBuf::from(executable_name(self.platform.os(), kind)),
        }
    }

    async fn check_installed(&self, url: &str, kind: ArtifactKind) -> Result<Option<InstallResult>> {
        let root = self.cache.find(kind.tool_name(), &cache_key(url)).await?;
        Ok(root.map(|root| self.install_result(root, kind)))
    }

    async fn download(&self, url: &str, kind: ArtifactKind) -> Result<DownloadResult> {
        info!("Acquiring {} from {}", kind.archive_prefix(), url);
        let archive = self.downloader.download_tool(url).await?;
        Ok(DownloadResult { archive })
    }

    async fn install(&self, url: &str, archive: &Path, kind: ArtifactKind) -> Result<InstallResult> {
        let extracted = self.extractor.extract_zip(archive).await?;
        let app_root = extracted.join(archive_root_name(&self.platform, kind)?);

        let is_dir = tokio::fs::metadata(&app_root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(InstallerError::ArchiveLayoutMismatch { path: app_root });
        }
        debug!("Registering {} from {}", kind.tool_name(), app_root.display());

        let root = self
            .cache
            .cache_dir(&app_root, kind.tool_name(), &cache_key(url))
            .await?;
        info!("Successfully installed {} to {}", kind.tool_name(), root.display());

        Ok(self.install_result(root, kind))
    }
}

#[async_trait]
impl Installer for UrlInstaller {
    async fn check_installed_browser(&self, url: &str) -> Result<Option<InstallResult>> {
        self.check_installed(url, ArtifactKind::Browser).await
    }

    async fn download_browser(&self, url: &str) -> Result<DownloadResult> {
        self.download(url, ArtifactKind::Browser).await
    }

    async fn install_browser(&self, url: &str, archive: &Path) -> Result<InstallResult> {
        self.install(url, archive, ArtifactKind::Browser).await
    }

    async fn check_installed_driver(&self, url: &str) -> Result<Option<InstallResult>> {
        self.check_installed(url, ArtifactKind::Driver).await
    }

    async fn download_driver(&self, url: &str) -> Result<DownloadResult> {
        self.ensure_driver_allowed("download")?;
        self.download(url, ArtifactKind::Driver).await
    }

    async fn install_driver(&self, url: &str, archive: &Path) -> Result<InstallResult> {
        self.ensure_driver_allowed("install")?;
        self.install(url, archive, ArtifactKind::Driver).await
    }
}

// --- Tests ---
