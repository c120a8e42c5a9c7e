//! # Image Loading and Scaling
//!
//! Decodes the source image, drops any alpha channel, and resamples it by a
//! uniform scale factor.
//!
//! ## Output Size
//!
//! Each axis is computed independently:
//!
//! ```text
//! scaled_width  = round_half_even(width  × scale)
//! scaled_height = round_half_even(height × scale)
//! ```
//!
//! A scale that leaves both dimensions unchanged returns the decoded pixels
//! as-is; otherwise the image is resampled with a bilinear filter.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage, imageops::FilterType};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Where the pixels of a conversion come from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// An image file on disk (any format the `image` crate decodes).
    Path(PathBuf),
    /// An encoded image held in memory, e.g. an upload.
    Bytes(Vec<u8>),
    /// An image that was already decoded by the caller.
    Decoded(DynamicImage),
}

impl ImageSource {
    /// Human-readable name used in error messages.
    pub fn name(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(_) => "<memory>".to_string(),
            ImageSource::Decoded(_) => "<decoded image>".to_string(),
        }
    }

    /// Decode the source into an image.
    pub fn decode(self) -> Result<DynamicImage> {
        let source_name = self.name();
        let decoded = match self {
            ImageSource::Path(path) => image::open(&path),
            ImageSource::Bytes(bytes) => image::load_from_memory(&bytes),
            ImageSource::Decoded(img) => Ok(img),
        };
        decoded.map_err(|e| Error::Decode {
            source_name,
            reason: e.to_string(),
        })
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(img: DynamicImage) -> Self {
        ImageSource::Decoded(img)
    }
}

/// Replace an unusable scale factor with 1.0.
///
/// Absent, non-finite, zero and negative values are not errors; a warning
/// is logged and the conversion continues at the original size.
///
/// ```
/// use pixgds::render::load::normalize_scale;
///
/// assert_eq!(normalize_scale(Some(0.5)), 0.5);
/// assert_eq!(normalize_scale(Some(-5.0)), 1.0);
/// assert_eq!(normalize_scale(None), 1.0);
/// ```
pub fn normalize_scale(scale: Option<f64>) -> f64 {
    match scale {
        Some(s) if s.is_finite() && s > 0.0 => s,
        Some(s) => {
            warn!(scale = s, "Invalid scale, using 1.0 instead");
            1.0
        }
        None => 1.0,
    }
}

/// Size of one axis after scaling.
pub fn scaled_dimension(dim: u32, scale: f64) -> Result<u32> {
    let scaled = (f64::from(dim) * scale).round_ties_even();
    if scaled > f64::from(u32::MAX) {
        return Err(Error::invalid(
            "scale",
            format!("{} × {} does not fit in an image dimension", dim, scale),
        ));
    }
    Ok(scaled as u32)
}

/// Resample an image by `scale` (already normalized).
pub fn scale_image(img: RgbImage, scale: f64) -> Result<RgbImage> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage);
    }

    let new_width = scaled_dimension(width, scale)?;
    let new_height = scaled_dimension(height, scale)?;
    if new_width == 0 || new_height == 0 {
        return Err(Error::EmptyImage);
    }

    if (new_width, new_height) == (width, height) {
        return Ok(img);
    }

    debug!(width, height, new_width, new_height, scale, "Resampling image");
    Ok(image::imageops::resize(
        &img,
        new_width,
        new_height,
        FilterType::Triangle,
    ))
}

/// Decode `source` and scale it, returning three-channel pixels.
pub fn load(source: ImageSource, scale: Option<f64>) -> Result<RgbImage> {
    let scale = normalize_scale(scale);
    let decoded = source.decode()?;
    debug!(
        width = decoded.width(),
        height = decoded.height(),
        "Decoded source image"
    );
    scale_image(decoded.to_rgb8(), scale)
}

// ============================================================================
// TESTS
// ============================================================================
