use thiserror::Error;
use std::path::PathBuf;

/// Error type for all possible failures in the library.
#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("I/O error accessing path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decompress zip file '{path}': {source}")]
    ZipError {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Expected directory '{path}' not found in the extracted archive")]
    ArchiveLayoutMismatch {
        path: PathBuf,
    },

    #[error("Unexpectedly trying to {operation} chromedriver")]
    UnexpectedDriverOperation {
        operation: &'static str,
    },

    #[error("Blocking task failed: {0}")]
    TaskJoinError(#[from] tokio::task::JoinError),
}

impl InstallerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstallerError::IoError {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = InstallerError> = std::result::Result<T, E>;
