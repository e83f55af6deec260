//! ID3v2 `APIC` frame extraction for MP3 files

use crate::error::Result;
use coverfix_core::PictureRecord;
use id3::{ErrorKind, Tag};
use std::path::Path;

/// Read the first attached-picture frame of an MP3's ID3v2 tag
///
/// A file without any ID3v2 tag has no picture; that is not an error.
pub fn read_picture(path: &Path) -> Result<Option<PictureRecord>> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(first_attached_picture(&tag)),
        Err(err) if matches!(err.kind, ErrorKind::NoTag) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// First `APIC` frame in tag order; later pictures are ignored
pub fn first_attached_picture(tag: &Tag) -> Option<PictureRecord> {
    tag.frames()
        .filter(|frame| matches!(frame.id(), "APIC" | "PIC"))
        .find_map(|frame| frame.content().picture())
        .map(|picture| PictureRecord::new(picture.data.clone(), picture.mime_type.clone()))
}
