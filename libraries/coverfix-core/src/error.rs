/// Core error types for coverfix
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `CoverError`
pub type Result<T> = std::result::Result<T, CoverError>;

/// Core error type for coverfix
#[derive(Error, Debug)]
pub enum CoverError {
    /// File name does not end in one of the supported audio suffixes
    #[error("Unsupported audio format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Path has no usable (UTF-8) file name
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
}
