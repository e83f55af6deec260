//! coverfix Library - folder-level cover fixing
//!
//! Ties artwork extraction and image normalization together over a music
//! library tree:
//!
//! - [`StagingArea`]: scratch directory for extracted pictures
//! - [`CandidateSelector`]: picks one embedded picture per folder
//! - [`CoverFixer`]: walks the tree and writes `cover.jpg` per folder
//! - [`organize`]: optional album folder organizer
//!
//! # Example
//!
//! ```no_run
//! use coverfix_library::{CoverFixer, FixerConfig, StagingArea};
//! use std::path::Path;
//!
//! let fixer = CoverFixer::new(FixerConfig::default()).unwrap();
//! let summary = fixer.run(Path::new("/music"), StagingArea::new()).unwrap();
//! println!("{} folder(s) processed.", summary.visited);
//! ```

mod error;
pub mod organize;
pub mod selector;
pub mod staging;
pub mod walker;

pub use error::{LibraryError, Result};
pub use organize::{organize_by_album, OrganizeSummary};
pub use selector::{Candidate, CandidateSelector, Rejected, Selection};
pub use staging::{StagingArea, STAGING_DIR_NAME};
pub use walker::{
    move_into_place, CoverFixer, ExistingCoverPolicy, FixerConfig, FolderFailure, FolderOutcome,
    FolderReport, FolderVisitState, WalkSummary, COVER_FILE_NAME, ROCKBOX_DIR,
};
