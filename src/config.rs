//! # Conversion Configuration
//!
//! Typed parameters for one image-to-layout conversion. A [`ConvertConfig`]
//! is built once at the boundary (CLI, tests, or an embedding application)
//! and checked with [`ConvertConfig::validate`] before any pixel is touched.
//!
//! ## Defaults
//!
//! | Field | Default | Range |
//! |-------|---------|-------|
//! | `cell_size_um` | 2.0 | finite, > 0 |
//! | `layer` | 4 | 0..=32767 |
//! | `scale` | 1.0 | anything; invalid values fall back to 1.0 |
//! | `dither` | false | |
//! | `threshold_offset` | 0.0 | finite |
//! | `invert` | false | |
//! | `library_name` | `LIBRARY` | 1..=32 printable ASCII chars |
//!
//! ## Usage
//!
//! ```
//! use pixgds::config::ConvertConfig;
//!
//! let config = ConvertConfig {
//!     cell_size_um: 0.5,
//!     layer: 10,
//!     dither: true,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use chrono::NaiveDateTime;

use crate::error::{Error, Result};

/// Largest layer number representable in a GDSII LAYER record.
pub const MAX_LAYER: i64 = i16::MAX as i64;

/// Longest library name accepted in the LIBNAME record.
pub const MAX_LIBRARY_NAME: usize = 32;

/// Parameters for a single conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    /// Physical edge length of one pixel cell, in micrometers.
    ///
    /// Applied as the magnification of the top-level reference.
    pub cell_size_um: f64,

    /// GDSII layer of the unit square.
    ///
    /// Kept wide so that out-of-range input (negative or above
    /// [`MAX_LAYER`]) is reported by [`ConvertConfig::validate`].
    pub layer: i64,

    /// Uniform resampling factor. `None`, non-finite, or non-positive
    /// values are replaced by 1.0 with a warning.
    pub scale: Option<f64>,

    /// Apply Floyd-Steinberg error diffusion before thresholding.
    pub dither: bool,

    /// Added to the Otsu threshold; negative values make fewer pixels white.
    pub threshold_offset: f64,

    /// Swap black and white after corner correction.
    pub invert: bool,

    /// Name written to the LIBNAME record.
    pub library_name: String,

    /// Fixed modification/access time for BGNLIB/BGNSTR.
    ///
    /// `None` stamps the file with the local time of the conversion.
    pub timestamp: Option<NaiveDateTime>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            cell_size_um: 2.0,
            layer: 4,
            scale: Some(1.0),
            dither: false,
            threshold_offset: 0.0,
            invert: false,
            library_name: "LIBRARY".to_string(),
            timestamp: None,
        }
    }
}

impl ConvertConfig {
    /// Create a configuration with the required parameters and defaults
    /// for everything else, validating it immediately.
    ///
    /// ```
    /// use pixgds::config::ConvertConfig;
    ///
    /// assert!(ConvertConfig::new(2.0, 4).is_ok());
    /// assert!(ConvertConfig::new(0.0, 4).is_err());
    /// ```
    pub fn new(cell_size_um: f64, layer: i64) -> Result<Self> {
        let config = Self {
            cell_size_um,
            layer,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter that would make the conversion fail.
    ///
    /// The scale factor is deliberately not checked here.
    pub fn validate(&self) -> Result<()> {
        if !self.cell_size_um.is_finite() || self.cell_size_um <= 0.0 {
            return Err(Error::invalid(
                "cell_size_um",
                format!("must be a positive number, got {}", self.cell_size_um),
            ));
        }

        self.gds_layer()?;

        if !self.threshold_offset.is_finite() {
            return Err(Error::invalid(
                "threshold_offset",
                format!("must be finite, got {}", self.threshold_offset),
            ));
        }

        validate_library_name(&self.library_name)
    }

    /// The layer as written to the LAYER record.
    pub fn gds_layer(&self) -> Result<i16> {
        if !(0..=MAX_LAYER).contains(&self.layer) {
            return Err(Error::invalid(
                "layer",
                format!("must be in 0..={}, got {}", MAX_LAYER, self.layer),
            ));
        }
        i16::try_from(self.layer).map_err(|e| Error::invalid("layer", e.to_string()))
    }
}

/// LIBNAME must be non-empty printable ASCII without spaces.
fn validate_library_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_LIBRARY_NAME {
        return Err(Error::invalid(
            "library_name",
            format!("must be 1..={} characters", MAX_LIBRARY_NAME),
        ));
    }
    if !name.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(Error::invalid(
            "library_name",
            format!("'{}' contains non-printable or non-ASCII characters", name),
        ));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
