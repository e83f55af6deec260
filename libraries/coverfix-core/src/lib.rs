//! coverfix Core
//!
//! Shared domain types and error handling for the coverfix workspace.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `AudioFormat`, `AudioFile`, `PictureRecord`
//! - **Error Handling**: `CoverError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use coverfix_core::{AudioFile, AudioFormat, PictureRecord};
//!
//! let file = AudioFile::new("/music/Album/01 - Intro.flac").unwrap();
//! assert_eq!(file.format(), AudioFormat::Flac);
//!
//! let picture = PictureRecord::new(vec![0x89, b'P', b'N', b'G'], "image/png");
//! assert_eq!(picture.extension(), "png");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod types;

pub use error::{CoverError, Result};
pub use types::{extension_for_mime, AudioFile, AudioFormat, PictureRecord};
