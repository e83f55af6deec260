//! FLAC, Ogg and MP4 pictures through lofty
//!
//! Best-attempt parsing drops picture entries lofty cannot decode (bad
//! base64 in a `METADATA_BLOCK_PICTURE` comment, a truncated picture block)
//! and keeps going, so the first usable picture wins.

use crate::error::{ArtworkError, Result};
use coverfix_core::{AudioFormat, PictureRecord};
use lofty::{ParseOptions, ParsingMode, Probe, TaggedFileExt};
use std::path::Path;

/// Assumed when a picture carries no mime type
const FALLBACK_MIME: &str = "image/jpeg";

/// Read the first picture of the primary tag, or of the first tag present
pub fn read_picture(path: &Path, format: AudioFormat) -> Result<Option<PictureRecord>> {
    let tag_error = |source| ArtworkError::Tag { format, source };

    let options = ParseOptions::new()
        .read_properties(false)
        .parsing_mode(ParsingMode::BestAttempt);

    let tagged_file = Probe::open(path)
        .map_err(tag_error)?
        .options(options)
        .read()
        .map_err(tag_error)?;

    let Some(tag) = tagged_file.primary_tag().or(tagged_file.first_tag()) else {
        return Ok(None);
    };

    Ok(tag.pictures().first().map(|picture| {
        let mime = picture
            .mime_type()
            .map_or(FALLBACK_MIME, |mime| mime.as_str());
        PictureRecord::new(picture.data().to_vec(), mime)
    }))
}
