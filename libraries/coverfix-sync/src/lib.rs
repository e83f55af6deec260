//! coverfix Sync - library mirroring
//!
//! Copies a music library onto a player or SD card with rsync before covers
//! are fixed on the target. Files are compared by size only, so tracks
//! whose tags were touched on the target are not re-sent, and generated
//! `cover.jpg` files are protected from `--delete`.

mod error;
mod mirror;

pub use error::{Result, SyncError};
pub use mirror::{LibraryMirror, MirrorOptions};
