//! # Conversion Pipeline
//!
//! Runs every stage in order and produces the two artifacts.
//!
//! ```text
//! ImageSource ─► load/scale ─► grayscale ─► [dither] ─► Otsu + offset
//!      ─► binarize ─► corner correction ─► [invert] ─► layout + preview
//! ```
//!
//! The pipeline is synchronous and owns its buffers for the duration of
//! the call. Either both artifacts are produced or an error is returned.
//!
//! ## Example
//!
//! ```
//! use image::{DynamicImage, RgbImage, Rgb};
//! use pixgds::config::ConvertConfig;
//! use pixgds::convert::convert_in_memory;
//!
//! let mut img = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
//! img.put_pixel(1, 1, Rgb([0, 0, 0]));
//!
//! let artifacts = convert_in_memory(
//!     DynamicImage::ImageRgb8(img).into(),
//!     &ConvertConfig::default(),
//! )?;
//! assert_eq!(artifacts.report.references, 1);
//! # Ok::<(), pixgds::Error>(())
//! ```

use tracing::{debug, info};

use crate::config::ConvertConfig;
use crate::error::Result;
use crate::layout::{LayoutParams, emit_layout, encode_layout};
use crate::output::{OutputPaths, encode_preview, write_artifacts};
use crate::render::bitmap::BinaryBitmap;
use crate::render::corner::correct_corners;
use crate::render::dither::floyd_steinberg;
use crate::render::gray::to_gray;
use crate::render::load::{ImageSource, load};
use crate::render::threshold::{Threshold, binarize};

/// What a conversion did.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Width and height of the scaled image (and of the preview).
    pub dimensions: (u32, u32),
    pub threshold: Threshold,
    /// Cells filled by corner correction.
    pub corner_fills: usize,
    /// Unit-cell references placed in the grid.
    pub references: usize,
}

/// Both artifacts, encoded in memory.
#[derive(Debug, Clone)]
pub struct Artifacts {
    /// GDSII stream.
    pub layout: Vec<u8>,
    /// BMP preview.
    pub preview: Vec<u8>,
    /// Final bitmap the artifacts were built from.
    pub bitmap: BinaryBitmap,
    pub report: Report,
}

/// Run the image-processing stages and return the final bitmap.
pub fn process(source: ImageSource, config: &ConvertConfig) -> Result<(BinaryBitmap, Report)> {
    config.validate()?;

    let rgb = load(source, config.scale)?;
    let (width, height) = rgb.dimensions();
    info!(width, height, "Loaded image");

    let mut gray = to_gray(&rgb)?;
    if config.dither {
        floyd_steinberg(&mut gray);
    }

    let threshold = Threshold::compute(&gray, config.threshold_offset);
    let mut bitmap = binarize(&gray, threshold.effective);

    let corner_fills = correct_corners(&mut bitmap);
    if config.invert {
        debug!("Inverting bitmap");
        bitmap.invert();
    }

    let report = Report {
        dimensions: (width, height),
        threshold,
        corner_fills,
        references: bitmap.count_black(),
    };
    Ok((bitmap, report))
}

/// Convert an image into encoded layout and preview bytes.
pub fn convert_in_memory(source: ImageSource, config: &ConvertConfig) -> Result<Artifacts> {
    let (bitmap, report) = process(source, config)?;

    let params = LayoutParams {
        layer: config.gds_layer()?,
        datatype: 0,
        cell_size_um: config.cell_size_um,
        library_name: config.library_name.clone(),
        timestamp: config.timestamp,
    };
    let layout = encode_layout(&emit_layout(&bitmap, &params)?)?;
    let preview = encode_preview(&bitmap)?;

    Ok(Artifacts {
        layout,
        preview,
        bitmap,
        report,
    })
}

/// Convert an image and write `<layout>.gds` and `<preview>.bmp`.
pub fn convert(source: ImageSource, config: &ConvertConfig, paths: &OutputPaths) -> Result<Report> {
    let artifacts = convert_in_memory(source, config)?;
    write_artifacts(&artifacts.layout, &artifacts.preview, paths)?;
    info!(
        layout = %paths.layout.display(),
        preview = %paths.preview.display(),
        "Conversion complete"
    );
    Ok(artifacts.report)
}
