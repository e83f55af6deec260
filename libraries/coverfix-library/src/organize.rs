//! Album folder organizer
//!
//! Moves loose audio files at the top of a library into one folder per
//! album tag. Never run as part of cover fixing.

use crate::error::{LibraryError, Result};
use coverfix_core::AudioFormat;
use lofty::{Accessor, ParseOptions, Probe, TaggedFileExt};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct MovedFile {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Default)]
pub struct OrganizeSummary {
    pub moved: Vec<MovedFile>,
    /// Audio files left in place because they have no usable album tag
    pub untagged: Vec<PathBuf>,
    pub failures: Vec<LibraryError>,
}

/// Move audio files directly inside `root` into `root/<album>/`
pub fn organize_by_album(root: &Path) -> Result<OrganizeSummary> {
    organize_with(root, |path| match read_album(path) {
        Ok(album) => album,
        Err(e) => {
            tracing::debug!("{}", e);
            None
        }
    })
}

/// Same as [`organize_by_album`] with a custom album lookup
pub fn organize_with<F>(root: &Path, mut album_of: F) -> Result<OrganizeSummary>
where
    F: FnMut(&Path) -> Option<String>,
{
    let mut files = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_file() && AudioFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();

    let mut summary = OrganizeSummary::default();
    for path in files {
        let Some(folder_name) = album_of(&path).map(|album| sanitize_album_name(&album)).filter(|name| is_usable(name))
        else {
            summary.untagged.push(path);
            continue;
        };

        let Some(file_name) = path.file_name() else {
            continue;
        };
        let album_dir = root.join(&folder_name);
        let target = album_dir.join(file_name);

        let moved = fs::create_dir_all(&album_dir).and_then(|()| fs::rename(&path, &target));
        match moved {
            Ok(()) => {
                tracing::info!("Moved {} to {}", path.display(), album_dir.display());
                summary.moved.push(MovedFile { from: path, to: target });
            }
            Err(source) => {
                let error = LibraryError::Move {
                    from: path,
                    to: target,
                    source,
                };
                tracing::warn!("{}", error);
                summary.failures.push(error);
            }
        }
    }

    Ok(summary)
}

/// Album tag of an audio file, from its primary tag or first tag found
pub fn read_album(path: &Path) -> Result<Option<String>> {
    let metadata_error = |reason: String| LibraryError::Metadata {
        path: path.to_path_buf(),
        reason,
    };

    let tagged_file = Probe::open(path)
        .map_err(|e| metadata_error(format!("Failed to open file: {}", e)))?
        .options(ParseOptions::new().read_properties(false))
        .read()
        .map_err(|e| metadata_error(format!("Failed to read file: {}", e)))?;

    let tag = tagged_file.primary_tag().or(tagged_file.first_tag());
    Ok(tag.and_then(|tag| tag.album().map(|album| album.to_string())))
}

/// Replace everything except alphanumerics, `.`, `_`, `-` and space with `_`
pub fn sanitize_album_name(album: &str) -> String {
    album
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() => c,
            '.' | '_' | '-' | ' ' => c,
            _ => '_',
        })
        .collect()
}

fn is_usable(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".."
}
