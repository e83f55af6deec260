use coverfix_core::AudioFormat;
use thiserror::Error;

/// Errors that can occur during artwork extraction
///
/// Every variant means "the container or its picture is unusable". A file
/// that parses fine but carries no picture is `Ok(None)`, never an error.
#[derive(Debug, Error)]
pub enum ArtworkError {
    /// ID3 tag could not be parsed
    #[error("ID3 error: {0}")]
    Id3(#[from] id3::Error),

    /// FLAC, Ogg or MP4 tags could not be read
    #[error("Unreadable {format} tags: {source}")]
    Tag {
        format: AudioFormat,
        #[source]
        source: lofty::error::LoftyError,
    },
}

/// Result type for artwork operations
pub type Result<T> = std::result::Result<T, ArtworkError>;
