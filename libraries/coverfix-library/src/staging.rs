//! Scratch directory for extracted pictures
//!
//! Extracted pictures are written here, normalized, then moved into their
//! album folder. The directory is created on first use and removed once
//! when the run ends, including early returns and unwinding.

use crate::error::{LibraryError, Result};
use coverfix_core::PictureRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Fixed name of the staging directory under the temp root
pub const STAGING_DIR_NAME: &str = "cover_extraction_temp_extract";

#[derive(Debug)]
pub struct StagingArea {
    dir: PathBuf,
    /// Set once the directory has been removed and nothing was staged since
    cleared: bool,
}

impl StagingArea {
    /// Staging area under the platform temp directory
    pub fn new() -> Self {
        Self::in_dir(std::env::temp_dir())
    }

    /// Staging area under `root` with the default directory name
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        Self::with_name(root, STAGING_DIR_NAME)
    }

    pub fn with_name(root: impl AsRef<Path>, name: &str) -> Self {
        Self {
            dir: root.as_ref().join(name),
            cleared: false,
        }
    }

    /// Directory staged files are written to (may not exist yet)
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Write `picture` as `<dir>/<source stem>.<ext>`
    ///
    /// A file staged earlier under the same name is overwritten.
    pub fn stage(&mut self, picture: &PictureRecord, source: &Path) -> Result<PathBuf> {
        let stem = source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| LibraryError::InvalidPath(source.to_path_buf()))?;

        fs::create_dir_all(&self.dir).map_err(|source| LibraryError::Staging {
            path: self.dir.clone(),
            source,
        })?;
        self.cleared = false;

        let staged = self.dir.join(format!("{}.{}", stem, picture.extension()));
        fs::write(&staged, &picture.data).map_err(|source| LibraryError::Staging {
            path: staged.clone(),
            source,
        })?;

        tracing::debug!("Staged {} bytes at {}", picture.len(), staged.display());
        Ok(staged)
    }

    /// Remove the staging directory and everything in it
    ///
    /// A missing directory is not an error.
    pub fn clear(&mut self) -> Result<()> {
        if self.cleared {
            return Ok(());
        }
        self.cleared = true;

        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {
                tracing::debug!("Removed staging directory {}", self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(LibraryError::Staging {
                path: self.dir.clone(),
                source,
            }),
        }
    }

    /// Clear and release the staging area
    pub fn finish(mut self) -> Result<()> {
        self.clear()
    }
}

impl Default for StagingArea {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if let Err(e) = self.clear() {
            tracing::warn!("{}", e);
        }
    }
}
