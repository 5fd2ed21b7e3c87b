//! Keyed directory store shared across runs.
//!
//! Entries live at `<root>/<tool>/<key>/<arch>` and are only visible once the
//! sibling `<arch>.complete` marker has been written.

use crate::error::{InstallerError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[async_trait]
pub trait ToolCache: Send + Sync {
    /// Looks up the entry registered for `(tool, key)`.
    async fn find(&self, tool: &str, key: &str) -> Result<Option<PathBuf>>;

    /// Copies `source_dir` into the cache as the entry for `(tool, key)` and
    /// returns the managed path.
    async fn cache_dir(&self, source_dir: &Path, tool: &str, key: &str) -> Result<PathBuf>;
}

/// [`ToolCache`] backed by a directory tree on the local filesystem.
///
/// Registration replaces any previous entry for the same key; concurrent
/// writers are not coordinated.
#[derive(Debug, Clone)]
pub struct LocalToolCache {
    root: PathBuf,
    arch: String,
}

impl LocalToolCache {
    pub fn new(root: impl Into<PathBuf>, arch: impl Into<String>) -> Self {
        LocalToolCache {
            root: root.into(),
            arch: arch.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, tool: &str, key: &str) -> PathBuf {
        self.root.join(tool).join(key).join(&self.arch)
    }

    fn marker_path(&self, tool: &str, key: &str) -> PathBuf {
        self.root
            .join(tool)
            .join(key)
            .join(format!("{}.complete", self.arch))
    }
}

#[async_trait]
impl ToolCache for LocalToolCache {
    async fn find(&self, tool: &str, key: &str) -> Result<Option<PathBuf>> {
        let entry = self.entry_path(tool, key);
        let marker = self.marker_path(tool, key);

        if is_dir(&entry).await && fs::try_exists(&marker).await.unwrap_or(false) {
            debug!("Found cached {} at {}", tool, entry.display());
            Ok(Some(entry))
        } else {
            debug!("No cached {} for key {}", tool, key);
            Ok(None)
        }
    }

    async fn cache_dir(&self, source_dir: &Path, tool: &str, key: &str) -> Result<PathBuf> {
        if !is_dir(source_dir).await {
            return Err(InstallerError::io(
                source_dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "source is not a directory"),
            ));
        }

        let entry = self.entry_path(tool, key);
        let marker = self.marker_path(tool, key);

        if fs::try_exists(&marker).await.unwrap_or(false) {
            fs::remove_file(&marker)
                .await
                .map_err(|e| InstallerError::io(&marker, e))?;
        }
        if fs::try_exists(&entry).await.unwrap_or(false) {
            warn!("Replacing existing cache entry at {}", entry.display());
            fs::remove_dir_all(&entry)
                .await
                .map_err(|e| InstallerError::io(&entry, e))?;
        }

        let (from, to) = (source_dir.to_path_buf(), entry.clone());
        tokio::task::spawn_blocking(move || copy_tree(&from, &to)).await??;

        fs::write(&marker, b"")
            .await
            .map_err(|e| InstallerError::io(&marker, e))?;

        dunce::canonicalize(&entry).map_err(|e| InstallerError::io(&entry, e))
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// Recursively copies `from` into `to`, keeping file permissions.
fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            InstallerError::io(path, source)
        })?;

        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| InstallerError::io(&target, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| InstallerError::io(&target, e))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let points_to = std::fs::read_link(link).map_err(|e| InstallerError::io(link, e))?;
    std::os::unix::fs::symlink(points_to, target).map_err(|e| InstallerError::io(target, e))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    std::fs::copy(link, target)
        .map(|_| ())
        .map_err(|e| InstallerError::io(target, e))
}
