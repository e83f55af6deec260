//! coverfix Artwork - embedded picture extraction
//!
//! Pulls the first embedded picture out of an audio file:
//!
//! - MP3: first ID3v2 `APIC` frame (id3)
//! - FLAC: first `PICTURE` metadata block (lofty)
//! - Ogg Vorbis / Opus: first decodable `METADATA_BLOCK_PICTURE` comment (lofty)
//! - M4A: first `covr` data atom, typed by its declared format (lofty)
//!
//! # Example
//!
//! ```no_run
//! use coverfix_artwork::{ArtworkExtractor, PictureDecoder};
//! use coverfix_core::AudioFile;
//!
//! let extractor = ArtworkExtractor::new();
//! let file = AudioFile::new("music/track.flac").unwrap();
//!
//! match extractor.decode(&file) {
//!     Ok(Some(picture)) => {
//!         println!("Found artwork: {} bytes, type: {}", picture.len(), picture.mime);
//!     }
//!     Ok(None) => println!("No artwork found"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

mod error;
mod extractor;

pub mod decoder;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-export public API
pub use decoder::{Container, PictureDecoder};
pub use error::{ArtworkError, Result};
pub use extractor::ArtworkExtractor;
