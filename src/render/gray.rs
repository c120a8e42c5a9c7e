//! # Grayscale Conversion
//!
//! Reduces RGB pixels to a single luma channel using ITU-R BT.601 weights
//! in 14-bit fixed point:
//!
//! ```text
//! Y = (4899·R + 9617·G + 1868·B + 8192) >> 14
//! ```
//!
//! The weights sum to 2^14, so pure white maps to exactly 255 and every
//! gray input `(v, v, v)` maps back to `v`.

use image::{GrayImage, Luma, RgbImage};

use crate::error::{Error, Result};

const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// Luma of a single RGB sample.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let sum = R_WEIGHT * u32::from(r) + G_WEIGHT * u32::from(g) + B_WEIGHT * u32::from(b);
    ((sum + (1 << (SHIFT - 1))) >> SHIFT) as u8
}

/// Convert an RGB image to grayscale.
pub fn to_gray(img: &RgbImage) -> Result<GrayImage> {
    if img.width() == 0 || img.height() == 0 {
        return Err(Error::EmptyImage);
    }
    Ok(GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b] = img.get_pixel(x, y).0;
        Luma([luma(r, g, b)])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_weights_sum_to_one() {
        assert_eq!(R_WEIGHT + G_WEIGHT + B_WEIGHT, 1 << SHIFT);
    }

    #[test]
    fn test_gray_inputs_are_preserved() {
        for v in 0..=255u8 {
            assert_eq!(luma(v, v, v), v);
        }
    }

    #[test]
    fn test_primaries() {
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_to_gray_shape() {
        let mut img = RgbImage::from_pixel(4, 2, Rgb([255, 255, 255]));
        img.put_pixel(3, 1, Rgb([0, 0, 0]));
        let gray = to_gray(&img).unwrap();
        assert_eq!(gray.dimensions(), (4, 2));
        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(3, 1).0[0], 0);
    }

    #[test]
    fn test_empty_is_error() {
        assert!(matches!(to_gray(&RgbImage::new(0, 0)), Err(Error::EmptyImage)));
    }
}
