//! # Floyd-Steinberg Error Diffusion
//!
//! Dithering simulates gray levels with a pattern of pure black and pure
//! white pixels. Each visited pixel is rounded to 0 or 255, and the
//! rounding error is pushed onto neighbours that have not been visited yet,
//! so the average intensity of a region survives quantization.
//!
//! ## Kernel
//!
//! ```text
//!              ┌──────┬──────┐
//!              │  X   │ 7/16 │
//!       ┌──────┼──────┼──────┤
//!       │ 3/16 │ 5/16 │ 1/16 │
//!       └──────┴──────┴──────┘
//! ```
//!
//! ## Traversal
//!
//! Rows `0..height-1` top to bottom, and within each row columns
//! `1..width-1` left to right (upper bounds exclusive). The first and last
//! columns and the last row are never quantized, which leaves every kernel
//! tap inside the image. Neighbour updates are visible to later visits, so
//! the scan is strictly sequential.
//!
//! ## Sample Precision
//!
//! The buffer keeps 8-bit samples. Every update is computed in `f64`,
//! clamped to `[0, 255]`, and stored truncated toward zero.

use image::GrayImage;
use tracing::debug;

/// Error distribution as `(dx, dy, weight / 16)`.
const KERNEL: [(i64, u32, f64); 4] = [(1, 0, 7.0), (-1, 1, 3.0), (0, 1, 5.0), (1, 1, 1.0)];

/// Quantize one sample to the nearer of 0 and 255.
#[inline]
pub fn quantize(value: u8) -> u8 {
    if (f64::from(value) / 255.0).round() >= 1.0 {
        255
    } else {
        0
    }
}

/// Dither a grayscale image in place.
///
/// Images narrower than 3 or shorter than 2 pixels have no interior to
/// visit and are left unchanged.
pub fn floyd_steinberg(img: &mut GrayImage) {
    let (width, height) = img.dimensions();
    if width < 3 || height < 2 {
        debug!(width, height, "Image too small to dither, skipping");
        return;
    }
    debug!(width, height, "Applying Floyd-Steinberg dithering");

    for y in 0..height - 1 {
        for x in 1..width - 1 {
            let old = img.get_pixel(x, y).0[0];
            let new = quantize(old);
            img.get_pixel_mut(x, y).0[0] = new;
            let error = f64::from(old) - f64::from(new);

            for (dx, dy, weight) in KERNEL {
                let nx = (i64::from(x) + dx) as u32;
                let ny = y + dy;
                let sample = &mut img.get_pixel_mut(nx, ny).0[0];
                let updated = (f64::from(*sample) + error * weight / 16.0).clamp(0.0, 255.0);
                *sample = updated as u8;
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn image_from_rows(rows: &[&[u8]]) -> GrayImage {
        GrayImage::from_fn(rows[0].len() as u32, rows.len() as u32, |x, y| {
            Luma([rows[y as usize][x as usize]])
        })
    }

    fn rows_of(img: &GrayImage) -> Vec<Vec<u8>> {
        (0..img.height())
            .map(|y| (0..img.width()).map(|x| img.get_pixel(x, y).0[0]).collect())
            .collect()
    }

    fn sum(img: &GrayImage) -> i64 {
        img.pixels().map(|p| i64::from(p.0[0])).sum()
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0), 0);
        assert_eq!(quantize(127), 0);
        assert_eq!(quantize(128), 255);
        assert_eq!(quantize(255), 255);
    }

    #[test]
    fn test_known_4x3() {
        let mut img = image_from_rows(&[
            &[100, 150, 200, 50],
            &[50, 127, 250, 10],
            &[0, 80, 160, 240],
        ]);
        floyd_steinberg(&mut img);
        assert_eq!(
            rows_of(&img),
            vec![
                vec![100, 255, 255, 5],
                vec![30, 0, 255, 0],
                vec![14, 100, 160, 239],
            ]
        );
    }

    #[test]
    fn test_interior_becomes_binary() {
        let mut img = GrayImage::from_fn(9, 7, |x, y| Luma([((x * 29 + y * 17) % 256) as u8]));
        floyd_steinberg(&mut img);
        for y in 0..6 {
            for x in 1..8 {
                let v = img.get_pixel(x, y).0[0];
                assert!(v == 0 || v == 255, "({}, {}) = {}", x, y, v);
            }
        }
    }

    #[test]
    fn test_top_left_corner_untouched() {
        // Nothing diffuses into (0, 0): it is left of every visited pixel.
        let mut img = GrayImage::from_pixel(6, 4, Luma([90]));
        floyd_steinberg(&mut img);
        assert_eq!(img.get_pixel(0, 0).0[0], 90);
    }

    #[test]
    fn test_intensity_approximately_preserved() {
        let mut img = GrayImage::from_pixel(5, 4, Luma([128]));
        let before = sum(&img);
        floyd_steinberg(&mut img);
        let after = sum(&img);
        // Only truncation of the four taps per visited pixel is lost.
        let visited = 3 * 3;
        assert!(
            (before - after).abs() <= 4 * visited,
            "before {} after {}",
            before,
            after
        );
    }

    #[test]
    fn test_uniform_extremes_unchanged() {
        for v in [0u8, 255] {
            let mut img = GrayImage::from_pixel(5, 5, Luma([v]));
            floyd_steinberg(&mut img);
            assert!(img.pixels().all(|p| p.0[0] == v));
        }
    }

    #[test]
    fn test_too_small_is_noop() {
        let mut narrow = GrayImage::from_pixel(2, 5, Luma([100]));
        floyd_steinberg(&mut narrow);
        assert!(narrow.pixels().all(|p| p.0[0] == 100));

        let mut flat = GrayImage::from_pixel(5, 1, Luma([100]));
        floyd_steinberg(&mut flat);
        assert!(flat.pixels().all(|p| p.0[0] == 100));
    }
}
