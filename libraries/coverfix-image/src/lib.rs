//! coverfix Image - cover normalization
//!
//! Rewrites any JPEG, PNG or GIF cover into the canonical form expected by
//! car stereos and portable players: 300x300 RGB baseline JPEG at quality 85
//! with full-resolution (4:4:4) chroma.

mod error;
mod normalizer;

pub use error::{NormalizeError, Result};
pub use normalizer::{ImageNormalizer, NormalizeProfile, NormalizedImage};
