//! Download and zip extraction primitives.
//!
//! Both write into uniquely named locations under a scratch directory and
//! leave their output in place; the tool cache copies what it needs.

use crate::error::{InstallerError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Fetches a URL to a local file.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Downloads `url` and returns the path of the local file.
    async fn download_tool(&self, url: &str) -> Result<PathBuf>;
}

/// Unpacks a zip archive.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extracts `archive` and returns the directory it was extracted into.
    async fn extract_zip(&self, archive: &Path) -> Result<PathBuf>;
}

/// Downloads over HTTP(S) with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: reqwest::Client,
    temp_dir: PathBuf,
}

impl HttpDownloader {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        HttpDownloader {
            client: reqwest::Client::new(),
            temp_dir: temp_dir.into(),
        }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download_tool(&self, url: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.temp_dir)
            .await
            .map_err(|e| InstallerError::io(&self.temp_dir, e))?;

        let dest_path = tempfile::Builder::new()
            .prefix("chrome-download-")
            .suffix(".zip")
            .tempfile_in(&self.temp_dir)
            .map_err(|e| InstallerError::io(&self.temp_dir, e))?
            .into_temp_path()
            .keep()
            .map_err(|e| InstallerError::io(e.path.to_path_buf(), e.error))?;

        if let Err(e) = download_file(&self.client, url, &dest_path).await {
            let _ = fs::remove_file(&dest_path).await;
            return Err(e);
        }
        Ok(dest_path)
    }
}

/// Streams the body of `url` into `dest_path` chunk by chunk.
///
/// A non-success status is returned as [`InstallerError::NetworkError`]
/// before `dest_path` is touched.
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest_path: &Path,
) -> Result<()> {
    let mut response = client.get(url).send().await?.error_for_status()?;

    let mut dest_file = File::create(dest_path)
        .await
        .map_err(|e| InstallerError::io(dest_path, e))?;

    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        dest_file
            .write_all(&chunk)
            .await
            .map_err(|e| InstallerError::io(dest_path, e))?;
        written += chunk.len() as u64;
    }
    dest_file
        .flush()
        .await
        .map_err(|e| InstallerError::io(dest_path, e))?;

    debug!("Downloaded {} bytes to {}", written, dest_path.display());
    Ok(())
}

/// Extracts zip archives with the `zip` crate.
#[derive(Debug, Clone)]
pub struct ZipExtractor {
    temp_dir: PathBuf,
}

impl ZipExtractor {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        ZipExtractor {
            temp_dir: temp_dir.into(),
        }
    }
}

#[async_trait]
impl Extractor for ZipExtractor {
    async fn extract_zip(&self, archive: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.temp_dir)
            .await
            .map_err(|e| InstallerError::io(&self.temp_dir, e))?;

        let extract_to = tempfile::Builder::new()
            .prefix("chrome-extract-")
            .tempdir_in(&self.temp_dir)
            .map_err(|e| InstallerError::io(&self.temp_dir, e))?
            .keep();

        unzip_file(archive, &extract_to).await?;
        Ok(extract_to)
    }
}

/// Unpacks every entry of `archive_path` below `extract_to` on a blocking thread.
///
/// Entry names that leave `extract_to` are skipped, as are symlinks whose
/// target would resolve outside it.
pub async fn unzip_file(archive_path: &Path, extract_to: &Path) -> Result<()> {
    let archive_path_buf = archive_path.to_path_buf();
    let extract_to_buf = extract_to.to_path_buf();

    tokio::task::spawn_blocking(move || unzip_blocking(&archive_path_buf, &extract_to_buf))
        .await?
}

fn unzip_blocking(archive_path: &Path, extract_to: &Path) -> Result<()> {
    let file = std::fs::File::open(archive_path)
        .map_err(|e| InstallerError::io(archive_path, e))?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| InstallerError::ZipError {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    std::fs::create_dir_all(extract_to).map_err(|e| InstallerError::io(extract_to, e))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| InstallerError::ZipError {
            path: archive_path.to_path_buf(),
            source: e,
        })?;

        let outpath = match entry.enclosed_name() {
            Some(path) => extract_to.join(path),
            None => {
                debug!("Skipping unsafe zip entry '{}'", entry.name());
                continue;
            }
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|e| InstallerError::io(&outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| InstallerError::io(parent, e))?;
        }

        // Framework bundles in the mac archives link `Versions/Current`.
        #[cfg(unix)]
        if is_symlink_mode(entry.unix_mode()) {
            let mut target = String::new();
            std::io::Read::read_to_string(&mut entry, &mut target)
                .map_err(|e| InstallerError::io(&outpath, e))?;
            if !link_stays_inside(extract_to, &outpath, Path::new(&target)) {
                warn!("Skipping zip symlink '{}' -> '{}'", entry.name(), target);
                continue;
            }
            std::os::unix::fs::symlink(&target, &outpath)
                .map_err(|e| InstallerError::io(&outpath, e))?;
            continue;
        }

        let mut outfile =
            std::fs::File::create(&outpath).map_err(|e| InstallerError::io(&outpath, e))?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| InstallerError::io(&outpath, e))?;

        // Chrome and chromedriver must stay executable.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                    .map_err(|e| InstallerError::io(&outpath, e))?;
            }
        }
    }

    debug!(
        "Extracted {} entries from {} to {}",
        archive.len(),
        archive_path.display(),
        extract_to.display()
    );
    Ok(())
}

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

#[cfg_attr(not(unix), allow(dead_code))]
fn is_symlink_mode(mode: Option<u32>) -> bool {
    mode.is_some_and(|mode| mode & S_IFMT == S_IFLNK)
}

/// Resolves `target` lexically against the directory holding `link`.
#[cfg_attr(not(unix), allow(dead_code))]
fn link_stays_inside(root: &Path, link: &Path, target: &Path) -> bool {
    if target.is_absolute() {
        return false;
    }
    let mut resolved = link.parent().unwrap_or(root).to_path_buf();
    for component in target.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::ParentDir => {
                if !resolved.pop() {
                    return false;
                }
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    resolved.starts_with(root)
}
