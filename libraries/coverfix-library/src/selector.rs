//! Picks the picture that represents a folder
//!
//! Audio files directly inside the folder are tried in file name order and
//! the first embedded picture wins. Files that fail to decode are recorded
//! and skipped.

use crate::error::Result;
use coverfix_artwork::{ArtworkError, ArtworkExtractor, PictureDecoder};
use coverfix_core::{AudioFile, PictureRecord};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// A picture together with the audio file it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub picture: PictureRecord,
    pub source: PathBuf,
}

/// An audio file skipped because its container or picture is malformed
#[derive(Debug)]
pub struct Rejected {
    pub path: PathBuf,
    pub error: ArtworkError,
}

/// Outcome of picking a folder's picture
#[derive(Debug)]
pub enum Selection {
    /// First audio file carrying a usable picture
    Found {
        candidate: Candidate,
        rejected: Vec<Rejected>,
    },
    /// Audio files exist but none carries a usable picture
    NoPicture { rejected: Vec<Rejected> },
    /// The folder holds no supported audio files
    NoAudio,
    /// Cancelled before a picture was found
    Interrupted,
}

impl Selection {
    pub fn rejected(&self) -> &[Rejected] {
        match self {
            Self::Found { rejected, .. } | Self::NoPicture { rejected } => rejected,
            Self::NoAudio | Self::Interrupted => &[],
        }
    }
}

pub struct CandidateSelector<D = ArtworkExtractor> {
    decoder: D,
}

impl CandidateSelector<ArtworkExtractor> {
    pub fn new() -> Self {
        Self::with_decoder(ArtworkExtractor::new())
    }
}

impl Default for CandidateSelector<ArtworkExtractor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: PictureDecoder> CandidateSelector<D> {
    pub fn with_decoder(decoder: D) -> Self {
        Self { decoder }
    }

    /// Supported audio files directly inside `folder`, sorted by file name
    pub fn audio_files(&self, folder: &Path) -> Result<Vec<AudioFile>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(folder)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            // names that are not UTF-8 or lack a supported suffix are not audio
            if let Ok(file) = AudioFile::new(path) {
                files.push(file);
            }
        }

        files.sort_by(|a, b| a.path().file_name().cmp(&b.path().file_name()));
        Ok(files)
    }

    /// Pick the folder's picture, checking `cancel` before each file
    pub fn select(&self, folder: &Path, cancel: &AtomicBool) -> Result<Selection> {
        let files = self.audio_files(folder)?;
        if files.is_empty() {
            return Ok(Selection::NoAudio);
        }

        let mut rejected = Vec::new();
        for file in files {
            if cancel.load(Ordering::Relaxed) {
                return Ok(Selection::Interrupted);
            }

            match self.decoder.decode(&file) {
                Ok(Some(picture)) => {
                    return Ok(Selection::Found {
                        candidate: Candidate {
                            picture,
                            source: file.path().to_path_buf(),
                        },
                        rejected,
                    });
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!("Skipping {}: {}", file.path().display(), error);
                    rejected.push(Rejected {
                        path: file.path().to_path_buf(),
                        error,
                    });
                }
            }
        }

        Ok(Selection::NoPicture { rejected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use tempfile::TempDir;

    /// Decoder answering from a table keyed by file name
    #[derive(Default)]
    struct Scripted {
        pictures: HashMap<&'static str, &'static str>,
        broken: Vec<&'static str>,
    }

    impl PictureDecoder for Scripted {
        fn decode(&self, file: &AudioFile) -> coverfix_artwork::Result<Option<PictureRecord>> {
            let name = file.path().file_name().unwrap().to_str().unwrap();
            if self.broken.contains(&name) {
                let source = io::Error::new(io::ErrorKind::InvalidData, format!("{} is broken", name));
                return Err(ArtworkError::Tag {
                    format: file.format(),
                    source: source.into(),
                });
            }
            Ok(self
                .pictures
                .get(name)
                .map(|mime| PictureRecord::new(name.as_bytes().to_vec(), *mime)))
        }
    }

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
    }

    #[test]
    fn lists_supported_files_sorted() {
        let temp = TempDir::new().unwrap();
        touch(
            temp.path(),
            &["b.flac", "a.mp3", "notes.txt", "c.MP3", "cover.jpg", "d.opus"],
        );
        fs::create_dir(temp.path().join("e.ogg")).unwrap();

        let files = CandidateSelector::new().audio_files(temp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path().file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["a.mp3", "b.flac", "d.opus"]);
    }

    #[test]
    fn empty_folder_has_no_audio() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), &["readme.txt"]);

        let selection = CandidateSelector::new()
            .select(temp.path(), &AtomicBool::new(false))
            .unwrap();
        assert!(matches!(selection, Selection::NoAudio));
    }

    #[test]
    fn first_picture_in_name_order_wins() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), &["01.mp3", "02.flac", "03.m4a"]);

        let mut decoder = Scripted::default();
        decoder.pictures.insert("02.flac", "image/png");
        decoder.pictures.insert("03.m4a", "image/jpeg");

        let selection = CandidateSelector::with_decoder(decoder)
            .select(temp.path(), &AtomicBool::new(false))
            .unwrap();

        match selection {
            Selection::Found { candidate, rejected } => {
                assert_eq!(candidate.source, temp.path().join("02.flac"));
                assert_eq!(candidate.picture.mime, "image/png");
                assert!(rejected.is_empty());
            }
            other => panic!("unexpected selection: {:?}", other),
        }
    }

    #[test]
    fn malformed_files_are_skipped_and_recorded() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), &["01.ogg", "02.ogg"]);

        let mut decoder = Scripted::default();
        decoder.broken.push("01.ogg");
        decoder.pictures.insert("02.ogg", "image/jpeg");

        let selection = CandidateSelector::with_decoder(decoder)
            .select(temp.path(), &AtomicBool::new(false))
            .unwrap();

        assert_eq!(selection.rejected().len(), 1);
        assert_eq!(selection.rejected()[0].path, temp.path().join("01.ogg"));
        assert!(matches!(selection, Selection::Found { .. }));
    }

    #[test]
    fn no_picture_when_every_file_is_empty_or_broken() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), &["01.mp3", "02.mp3"]);

        let mut decoder = Scripted::default();
        decoder.broken.push("02.mp3");

        let selection = CandidateSelector::with_decoder(decoder)
            .select(temp.path(), &AtomicBool::new(false))
            .unwrap();

        match selection {
            Selection::NoPicture { rejected } => assert_eq!(rejected.len(), 1),
            other => panic!("unexpected selection: {:?}", other),
        }
    }

    #[test]
    fn cancelled_before_first_file() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), &["01.mp3"]);

        let mut decoder = Scripted::default();
        decoder.pictures.insert("01.mp3", "image/jpeg");

        let selection = CandidateSelector::with_decoder(decoder)
            .select(temp.path(), &AtomicBool::new(true))
            .unwrap();
        assert!(matches!(selection, Selection::Interrupted));
    }

    #[test]
    fn missing_folder_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = CandidateSelector::new().select(&temp.path().join("gone"), &AtomicBool::new(false));
        assert!(matches!(result, Err(crate::LibraryError::Io(_))));
    }
}
