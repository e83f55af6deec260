//! Library walker
//!
//! Visits every folder under a root once, top-down, and leaves each one
//! with a normalized cover image when any art is available.

use crate::error::{LibraryError, Result};
use crate::selector::{Candidate, CandidateSelector, Rejected, Selection};
use crate::staging::StagingArea;
use coverfix_artwork::{ArtworkExtractor, PictureDecoder};
use coverfix_image::{ImageNormalizer, NormalizeProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use walkdir::WalkDir;

/// Canonical per-folder cover file name
pub const COVER_FILE_NAME: &str = "cover.jpg";

/// Directory reserved by Rockbox firmware
pub const ROCKBOX_DIR: &str = ".rockbox";

/// What to do with a folder that already has a cover
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingCoverPolicy {
    /// Re-normalize on every run
    #[default]
    Always,
    /// Leave covers that are already canonical alone
    SkipCanonical,
}

#[derive(Debug, Clone)]
pub struct FixerConfig {
    pub cover_file_name: String,
    /// Directory names never visited or descended into
    pub reserved_dirs: Vec<String>,
    pub existing_cover_policy: ExistingCoverPolicy,
    pub profile: NormalizeProfile,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            cover_file_name: COVER_FILE_NAME.to_string(),
            reserved_dirs: vec![ROCKBOX_DIR.to_string()],
            existing_cover_policy: ExistingCoverPolicy::default(),
            profile: NormalizeProfile::default(),
        }
    }
}

/// Per-folder decision, recomputed on every run
#[derive(Debug)]
pub enum FolderVisitState {
    /// A non-empty cover file is already present
    HasValidCover,
    /// No cover yet, but an audio file carries one
    NeedsExtraction(Candidate),
    /// Nothing to produce a cover from
    NoAudioNoArt,
}

/// What happened to one folder
#[derive(Debug)]
pub enum FolderOutcome {
    /// Existing cover rewritten to the canonical profile
    Renormalized,
    /// Existing cover already canonical and left alone
    SkippedCanonical,
    /// Cover extracted from `source` and written
    Extracted { source: PathBuf },
    /// No cover and no embedded art
    NoArt,
    /// The folder's work was abandoned
    Failed(LibraryError),
}

/// Progress event, one per visited folder
#[derive(Debug)]
pub struct FolderReport {
    pub folder: PathBuf,
    pub cover: PathBuf,
    pub outcome: FolderOutcome,
    /// Audio files skipped because they could not be decoded
    pub rejected: Vec<Rejected>,
}

#[derive(Debug)]
pub struct FolderFailure {
    pub folder: PathBuf,
    pub error: LibraryError,
}

/// Totals for one walk
#[derive(Debug, Default)]
pub struct WalkSummary {
    /// Folders visited, including ones that produced nothing
    pub visited: usize,
    pub extracted: usize,
    pub renormalized: usize,
    pub skipped_canonical: usize,
    pub no_art: usize,
    pub failures: Vec<FolderFailure>,
    pub interrupted: bool,
    /// Set when the staging directory could not be removed
    pub cleanup_error: Option<LibraryError>,
}

impl WalkSummary {
    fn record(&mut self, report: FolderReport) {
        self.visited += 1;
        match report.outcome {
            FolderOutcome::Renormalized => self.renormalized += 1,
            FolderOutcome::SkippedCanonical => self.skipped_canonical += 1,
            FolderOutcome::Extracted { .. } => self.extracted += 1,
            FolderOutcome::NoArt => self.no_art += 1,
            FolderOutcome::Failed(error) => self.failures.push(FolderFailure {
                folder: report.folder,
                error,
            }),
        }
    }
}

/// Fixes cover art across a library tree
pub struct CoverFixer<D = ArtworkExtractor> {
    config: FixerConfig,
    selector: CandidateSelector<D>,
    normalizer: ImageNormalizer,
    cancel: Arc<AtomicBool>,
}

impl CoverFixer<ArtworkExtractor> {
    pub fn new(config: FixerConfig) -> Result<Self> {
        Self::with_decoder(config, ArtworkExtractor::new())
    }
}

impl<D: PictureDecoder> CoverFixer<D> {
    pub fn with_decoder(config: FixerConfig, decoder: D) -> Result<Self> {
        let normalizer = ImageNormalizer::with_profile(config.profile)?;
        Ok(Self {
            config,
            selector: CandidateSelector::with_decoder(decoder),
            normalizer,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Share an externally owned cancellation flag
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag that stops the walk before the next folder or file when set
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn config(&self) -> &FixerConfig {
        &self.config
    }

    /// Walk `root`, then remove the staging area
    pub fn run(&self, root: &Path, staging: StagingArea) -> Result<WalkSummary> {
        self.run_with_progress(root, staging, |_| {})
    }

    /// Walk `root`, reporting every visited folder to `progress`
    ///
    /// Only an inaccessible root is fatal. The staging area is removed before
    /// returning on every path, including errors and interruption.
    pub fn run_with_progress<F>(&self, root: &Path, mut staging: StagingArea, mut progress: F) -> Result<WalkSummary>
    where
        F: FnMut(&FolderReport),
    {
        check_root(root)?;

        let mut summary = WalkSummary::default();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut entries = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        tracing::info!("Fixing cover art under {}", root.display());

        loop {
            if self.cancel.load(Ordering::Relaxed) {
                summary.interrupted = true;
                break;
            }

            let entry = match entries.next() {
                None => break,
                Some(Ok(entry)) => entry,
                Some(Err(e)) if e.depth() == 0 => return Err(e.into()),
                Some(Err(e)) => {
                    tracing::warn!("{}", e);
                    let folder = e.path().map(Path::to_path_buf).unwrap_or_default();
                    summary.failures.push(FolderFailure {
                        folder,
                        error: e.into(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }
            if entry.depth() > 0 && self.is_reserved(entry.file_name()) {
                tracing::debug!("Pruning reserved directory {}", entry.path().display());
                entries.skip_current_dir();
                continue;
            }

            let folder = entry.into_path();
            if !seen.insert(folder.clone()) {
                continue;
            }

            let Some(report) = self.visit(&folder, &mut staging) else {
                summary.interrupted = true;
                break;
            };
            progress(&report);
            summary.record(report);
        }

        if summary.interrupted {
            tracing::info!("Walk interrupted after {} folder(s)", summary.visited);
        }

        if let Err(e) = staging.finish() {
            tracing::warn!("Could not clear staging directory: {}", e);
            summary.cleanup_error = Some(e);
        }

        Ok(summary)
    }

    /// Decide what a folder needs; `None` when cancelled mid-way
    pub fn assess(&self, folder: &Path, rejected: &mut Vec<Rejected>) -> Result<Option<FolderVisitState>> {
        if has_cover(&folder.join(&self.config.cover_file_name)) {
            return Ok(Some(FolderVisitState::HasValidCover));
        }

        let state = match self.selector.select(folder, &self.cancel)? {
            Selection::Interrupted => return Ok(None),
            Selection::Found {
                candidate,
                rejected: skipped,
            } => {
                rejected.extend(skipped);
                FolderVisitState::NeedsExtraction(candidate)
            }
            Selection::NoPicture { rejected: skipped } => {
                rejected.extend(skipped);
                FolderVisitState::NoAudioNoArt
            }
            Selection::NoAudio => FolderVisitState::NoAudioNoArt,
        };
        Ok(Some(state))
    }

    fn visit(&self, folder: &Path, staging: &mut StagingArea) -> Option<FolderReport> {
        let cover = folder.join(&self.config.cover_file_name);
        let mut rejected = Vec::new();

        let outcome = match self.assess(folder, &mut rejected) {
            Ok(None) => return None,
            Ok(Some(FolderVisitState::HasValidCover)) => self.refresh_cover(&cover),
            Ok(Some(FolderVisitState::NeedsExtraction(candidate))) => {
                match self.extract(&candidate, &cover, staging) {
                    Ok(()) => FolderOutcome::Extracted {
                        source: candidate.source,
                    },
                    Err(e) => FolderOutcome::Failed(e),
                }
            }
            Ok(Some(FolderVisitState::NoAudioNoArt)) => FolderOutcome::NoArt,
            Err(e) => FolderOutcome::Failed(e),
        };

        match &outcome {
            FolderOutcome::Renormalized => tracing::info!("Normalized {}", cover.display()),
            FolderOutcome::Extracted { source } => {
                tracing::info!("Extracted {} from {}", cover.display(), source.display());
            }
            FolderOutcome::Failed(e) => tracing::warn!("{}: {}", folder.display(), e),
            FolderOutcome::SkippedCanonical | FolderOutcome::NoArt => {
                tracing::debug!("{}: nothing to do", folder.display());
            }
        }

        Some(FolderReport {
            folder: folder.to_path_buf(),
            cover,
            outcome,
            rejected,
        })
    }

    fn refresh_cover(&self, cover: &Path) -> FolderOutcome {
        if self.config.existing_cover_policy == ExistingCoverPolicy::SkipCanonical {
            if let Ok(true) = self.normalizer.is_canonical(cover) {
                return FolderOutcome::SkippedCanonical;
            }
        }

        match self.normalizer.normalize_in_place(cover) {
            Ok(_) => FolderOutcome::Renormalized,
            Err(e) => FolderOutcome::Failed(e.into()),
        }
    }

    /// Stage, normalize, then move the picture into the folder
    fn extract(&self, candidate: &Candidate, cover: &Path, staging: &mut StagingArea) -> Result<()> {
        let staged = staging.stage(&candidate.picture, &candidate.source)?;
        self.normalizer.normalize_in_place(&staged)?;
        move_into_place(&staged, cover)
    }

    fn is_reserved(&self, name: &OsStr) -> bool {
        self.config.reserved_dirs.iter().any(|reserved| name == reserved.as_str())
    }
}

fn check_root(root: &Path) -> Result<()> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(LibraryError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LibraryError::RootNotFound(root.to_path_buf())),
        Err(e) => Err(e.into()),
    }
}

fn has_cover(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() > 0)
}

/// Move `from` onto `to`, replacing any existing file
///
/// Renames when possible. Otherwise (e.g. across filesystems) copies into a
/// sibling `.part` file, renames that over `to` and removes `from`.
pub fn move_into_place(from: &Path, to: &Path) -> Result<()> {
    let Err(rename_error) = fs::rename(from, to) else {
        return Ok(());
    };
    tracing::debug!("rename {} failed ({}), copying", from.display(), rename_error);

    let move_error = |source| LibraryError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let mut part_name = to.file_name().map(OsStr::to_os_string).unwrap_or_default();
    part_name.push(".part");
    let part = to.with_file_name(part_name);

    if let Err(source) = fs::copy(from, &part) {
        let _ = fs::remove_file(&part);
        return Err(move_error(source));
    }
    if let Err(source) = fs::rename(&part, to) {
        let _ = fs::remove_file(&part);
        return Err(move_error(source));
    }
    if let Err(e) = fs::remove_file(from) {
        tracing::warn!("Could not remove staged file {}: {}", from.display(), e);
    }
    Ok(())
}
