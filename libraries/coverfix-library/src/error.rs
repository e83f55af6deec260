//! Error types for library processing

use coverfix_image::NormalizeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Library root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Library root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Staging failed for {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("Metadata error for {}: {reason}", path.display())]
    Metadata { path: PathBuf, reason: String },

    #[error("Invalid file path: {}", .0.display())]
    InvalidPath(PathBuf),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
