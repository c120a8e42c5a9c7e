//! # Image Processing
//!
//! The raster half of the pipeline, from encoded image to binary bitmap.
//!
//! ## Modules
//!
//! - [`load`]: decoding and uniform scaling
//! - [`gray`]: BT.601 luma conversion
//! - [`dither`]: Floyd-Steinberg error diffusion
//! - [`threshold`]: Otsu threshold, offset, binarization
//! - [`corner`]: diagonal checkerboard repair
//! - [`bitmap`]: the black/white pixel grid
//!
//! ## Usage Example
//!
//! ```
//! use image::{GrayImage, Luma};
//! use pixgds::render::{corner, threshold::{Threshold, binarize}};
//!
//! let gray = GrayImage::from_fn(8, 8, |x, y| Luma([if (x + y) % 2 == 0 { 20 } else { 230 }]));
//! let t = Threshold::compute(&gray, 0.0);
//! let mut bitmap = binarize(&gray, t.effective);
//! corner::correct_corners(&mut bitmap);
//! assert!(corner::remaining_diagonals(&bitmap).is_empty());
//! ```

pub mod bitmap;
pub mod corner;
pub mod dither;
pub mod gray;
pub mod load;
pub mod threshold;
