//! In-place cover normalization

use crate::error::{NormalizeError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Canonical cover edge length in pixels
pub const DEFAULT_SIZE: u32 = 300;

/// Canonical JPEG quality
pub const DEFAULT_QUALITY: u8 = 85;

/// Bicubic resampling
const RESAMPLE_FILTER: FilterType = FilterType::CatmullRom;

/// Target shape of a normalized cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeProfile {
    /// Output width and height; the source is stretched, not letterboxed
    pub size: u32,
    /// JPEG quality (1-100)
    pub quality: u8,
}

impl Default for NormalizeProfile {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl NormalizeProfile {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(NormalizeError::InvalidProfile(
                "size must be greater than zero".to_string(),
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(NormalizeError::InvalidProfile(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Outcome of a successful normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedImage {
    pub width: u32,
    pub height: u32,
    /// Size of the written JPEG in bytes
    pub bytes: usize,
}

/// Rewrites cover images to the canonical profile
///
/// The image crate's baseline JPEG encoder writes every component at 1x1
/// sampling, which is the 4:4:4 layout the profile requires.
#[derive(Debug, Clone, Default)]
pub struct ImageNormalizer {
    profile: NormalizeProfile,
}

impl ImageNormalizer {
    /// Create a normalizer with the canonical 300x300 / q85 profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with a custom profile
    pub fn with_profile(profile: NormalizeProfile) -> Result<Self> {
        profile.validate()?;
        Ok(Self { profile })
    }

    pub fn profile(&self) -> &NormalizeProfile {
        &self.profile
    }

    /// Decode `path`, resize to the profile and overwrite it with a JPEG
    ///
    /// The replacement is fully encoded before anything is written, and is
    /// swapped in with a rename, so a decode or encode failure leaves the
    /// original file untouched.
    pub fn normalize_in_place(&self, path: &Path) -> Result<NormalizedImage> {
        let original = fs::read(path).map_err(|source| NormalizeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let decoded = image::load_from_memory(&original).map_err(|source| NormalizeError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let encoded = self.encode(&decoded).map_err(|source| NormalizeError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

        replace_file(path, &encoded)?;

        tracing::debug!(
            "Normalized {} ({}x{} -> {}x{}, {} bytes)",
            path.display(),
            decoded.width(),
            decoded.height(),
            self.profile.size,
            self.profile.size,
            encoded.len()
        );

        Ok(NormalizedImage {
            width: self.profile.size,
            height: self.profile.size,
            bytes: encoded.len(),
        })
    }

    /// Resize and encode an already decoded image
    pub fn encode(&self, decoded: &DynamicImage) -> image::ImageResult<Vec<u8>> {
        let rgb: RgbImage = decoded.to_rgb8();
        let resized = image::imageops::resize(&rgb, self.profile.size, self.profile.size, RESAMPLE_FILTER);

        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.profile.quality);
        encoder.encode_image(&resized)?;
        Ok(buffer)
    }

    /// Whether `path` is already an RGB JPEG with the profile's dimensions
    pub fn is_canonical(&self, path: &Path) -> Result<bool> {
        let bytes = fs::read(path).map_err(|source| NormalizeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if !matches!(image::guess_format(&bytes), Ok(ImageFormat::Jpeg)) {
            return Ok(false);
        }

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).map_err(|source| {
            NormalizeError::Decode {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Ok(decoded.width() == self.profile.size
            && decoded.height() == self.profile.size
            && decoded.color() == ColorType::Rgb8)
    }
}

/// Write `contents` next to `path`, then rename over it
fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let part = part_path(path);
    let io_err = |source| NormalizeError::Io {
        path: path.to_path_buf(),
        source,
    };

    fs::write(&part, contents).map_err(io_err)?;
    if let Err(source) = fs::rename(&part, path) {
        let _ = fs::remove_file(&part);
        return Err(io_err(source));
    }
    Ok(())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
