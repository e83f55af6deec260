//! Audio container types
use crate::error::{CoverError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Audio container formats that can carry embedded artwork
///
/// Detection is a case-sensitive suffix match on the file name, so
/// `track.MP3` is not picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    /// MPEG audio with an ID3v2 tag
    Mp3,
    /// Native FLAC stream
    Flac,
    /// Ogg Vorbis
    Ogg,
    /// Ogg Opus
    Opus,
    /// MPEG-4 audio (iTunes-style metadata)
    M4a,
}

impl AudioFormat {
    /// Every supported format, in suffix-matching order
    pub const ALL: [Self; 5] = [Self::Mp3, Self::Flac, Self::Opus, Self::Ogg, Self::M4a];

    /// File name suffix including the leading dot
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Mp3 => ".mp3",
            Self::Flac => ".flac",
            Self::Ogg => ".ogg",
            Self::Opus => ".opus",
            Self::M4a => ".m4a",
        }
    }

    /// Detect the format from a bare file name
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| name.ends_with(format.suffix()))
    }

    /// Detect the format from the final component of a path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(Self::from_file_name)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.suffix()[1..])
    }
}

/// An audio file identified by path and container format
///
/// Read-only: nothing in coverfix writes to audio files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    path: PathBuf,
    format: AudioFormat,
}

impl AudioFile {
    /// Create an audio file handle, detecting the format from the file name
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| CoverError::InvalidPath(path.clone()))?;

        match AudioFormat::from_file_name(name) {
            Some(format) => Ok(Self { path, format }),
            None => Err(CoverError::UnsupportedFormat(path)),
        }
    }

    /// Path to the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detected container format
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// File name without its final extension
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
    }
}
