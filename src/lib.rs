//! # pixgds - Raster Images to GDSII Layouts
//!
//! pixgds turns a picture into a chip layout: every dark pixel becomes one
//! unit square, and the whole grid is scaled to a physical cell size. It
//! provides:
//!
//! - **Image processing**: grayscale, Floyd-Steinberg dithering, Otsu
//!   thresholding with an offset, and diagonal corner correction
//! - **Layout**: a three-cell GDSII library (unit, grid, top) built with
//!   [`gds21`]
//! - **Preview**: the final bitmap as an uncompressed BMP
//!
//! ## Quick Start
//!
//! ```no_run
//! use pixgds::{ConvertConfig, convert::convert, output::OutputPaths};
//! use std::path::Path;
//!
//! let config = ConvertConfig {
//!     cell_size_um: 2.0,
//!     layer: 4,
//!     dither: true,
//!     ..Default::default()
//! };
//!
//! let report = convert(
//!     Path::new("logo.png").into(),
//!     &config,
//!     &OutputPaths::in_dir(".", "logo"),
//! )?;
//! println!("{} cells placed", report.references);
//!
//! # Ok::<(), pixgds::Error>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`render`] | Loading, grayscale, dithering, thresholding, corners |
//! | [`layout`] | Cell hierarchy, GDSII encoding and reading |
//! | [`output`] | Preview encoding and artifact writing |
//! | [`convert`] | The end-to-end pipeline |
//! | [`config`] | Conversion parameters |
//! | [`error`] | Error types |

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod output;
pub mod render;

// Re-exports for convenience
pub use config::ConvertConfig;
pub use error::{Error, Result};
pub use render::load::ImageSource;
