use crate::decoder::{Container, PictureDecoder};
use crate::error::Result;
use coverfix_core::{AudioFile, PictureRecord};

/// Extracts artwork from audio files, dispatching on the container format
#[derive(Debug, Default, Clone, Copy)]
pub struct ArtworkExtractor;

impl ArtworkExtractor {
    /// Create a new artwork extractor
    pub fn new() -> Self {
        Self
    }
}

impl PictureDecoder for ArtworkExtractor {
    fn decode(&self, file: &AudioFile) -> Result<Option<PictureRecord>> {
        let container = Container::for_format(file.format());
        let result = container.read_picture(file.path(), file.format());

        match &result {
            Ok(Some(picture)) => tracing::debug!(
                "{}: {} picture, {} bytes",
                file.path().display(),
                picture.mime,
                picture.len()
            ),
            Ok(None) => tracing::debug!("{}: no embedded picture", file.path().display()),
            Err(e) => tracing::debug!("{}: unreadable ({})", file.path().display(), e),
        }

        result
    }
}
