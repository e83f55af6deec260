use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while normalizing a cover image
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// I/O error reading or rewriting the file
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image bytes are corrupt or in an unsupported format
    #[error("Cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// JPEG encoding failed
    #[error("Cannot encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Profile values outside what the encoder accepts
    #[error("Invalid normalize profile: {0}")]
    InvalidProfile(String),
}

/// Result type for normalize operations
pub type Result<T> = std::result::Result<T, NormalizeError>;
