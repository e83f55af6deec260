//! Per-container picture decoders
//!
//! MP3 goes through the id3 crate, everything else through lofty.
//! [`Container`] is the closed set of layouts and picks one from an
//! [`AudioFormat`].

use crate::error::Result;
use coverfix_core::{AudioFile, AudioFormat, PictureRecord};
use std::path::Path;

pub mod id3v2;
pub mod tagged;

/// Extracts at most one embedded picture from an audio file
///
/// `Ok(Some(_))` when a picture was found, `Ok(None)` when the file parsed
/// but holds no picture, `Err(_)` when the file or picture is malformed.
pub trait PictureDecoder {
    fn decode(&self, file: &AudioFile) -> Result<Option<PictureRecord>>;
}

/// Metadata container layouts understood by coverfix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// ID3v2 tag at the head of an MPEG stream
    Id3v2,
    /// FLAC metadata blocks
    Flac,
    /// Vorbis/Opus comment header inside an Ogg bitstream
    Ogg,
    /// ISO base media atoms (`moov/udta/meta/ilst`)
    Mp4,
}

impl Container {
    pub fn for_format(format: AudioFormat) -> Self {
        match format {
            AudioFormat::Mp3 => Self::Id3v2,
            AudioFormat::Flac => Self::Flac,
            AudioFormat::Ogg | AudioFormat::Opus => Self::Ogg,
            AudioFormat::M4a => Self::Mp4,
        }
    }

    /// Read the first embedded picture stored in this layout
    pub fn read_picture(&self, path: &Path, format: AudioFormat) -> Result<Option<PictureRecord>> {
        match self {
            Self::Id3v2 => id3v2::read_picture(path),
            Self::Flac | Self::Ogg | Self::Mp4 => tagged::read_picture(path, format),
        }
    }
}
