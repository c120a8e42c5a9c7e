//! # Otsu Thresholding
//!
//! Chooses the intensity that best separates a grayscale histogram into a
//! dark and a light class, shifts it by a user offset, and binarizes.
//!
//! ## Otsu's Method
//!
//! For every candidate level `t`, pixels `<= t` form class 0 and pixels
//! `> t` form class 1. With class probabilities `q0`, `q1` and class means
//! `μ0`, `μ1`, the between-class variance is
//!
//! ```text
//! σ²_b(t) = q0 · q1 · (μ0 − μ1)²
//! ```
//!
//! Maximizing `σ²_b` is equivalent to minimizing the within-class variance.
//! Levels where either class is empty (probability below `f32::EPSILON`)
//! are skipped, the first maximum wins, and a histogram with a single
//! occupied bin yields level 0.
//!
//! ## Polarity
//!
//! | Intensity | Result |
//! |-----------|--------|
//! | `> effective` | White (255) |
//! | `<= effective` | Black (0), geometry is placed here |

use image::GrayImage;
use tracing::info;

use super::bitmap::{BinaryBitmap, Pixel};

/// Threshold chosen for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    /// Level chosen by Otsu's method.
    pub otsu: u8,
    /// Caller-supplied shift.
    pub offset: f64,
    /// `clamp(otsu + offset, 0, 255)`.
    pub effective: f64,
}

impl Threshold {
    /// Compute the Otsu level of `img` and apply `offset`.
    pub fn compute(img: &GrayImage, offset: f64) -> Self {
        let otsu = otsu_level(img);
        let effective = effective_threshold(otsu, offset);
        info!(otsu, offset, effective, "Threshold selected");
        Self {
            otsu,
            offset,
            effective,
        }
    }
}

/// 256-bin intensity histogram.
pub fn histogram(img: &GrayImage) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for p in img.pixels() {
        hist[p.0[0] as usize] += 1;
    }
    hist
}

/// Otsu threshold level of a grayscale image.
pub fn otsu_level(img: &GrayImage) -> u8 {
    let hist = histogram(img);
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 0;
    }
    let scale = 1.0 / total as f64;
    let eps = f64::from(f32::EPSILON);

    let mu: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum::<f64>()
        * scale;

    let mut mu0 = 0.0;
    let mut q0 = 0.0;
    let mut max_sigma = 0.0;
    let mut level = 0u8;

    for (i, &count) in hist.iter().enumerate() {
        let p = count as f64 * scale;
        // Running sum of i·p over class 0, renormalized below.
        mu0 *= q0;
        q0 += p;
        let q1 = 1.0 - q0;

        if q0.min(q1) < eps || q0.max(q1) > 1.0 - eps {
            continue;
        }

        mu0 = (mu0 + i as f64 * p) / q0;
        let mu1 = (mu - q0 * mu0) / q1;
        let sigma = q0 * q1 * (mu0 - mu1) * (mu0 - mu1);
        if sigma > max_sigma {
            max_sigma = sigma;
            level = i as u8;
        }
    }

    level
}

/// Shift the Otsu level by `offset`, clamped to the valid intensity range.
///
/// ```
/// use pixgds::render::threshold::effective_threshold;
///
/// assert_eq!(effective_threshold(120, 10.0), 130.0);
/// assert_eq!(effective_threshold(120, -300.0), 0.0);
/// assert_eq!(effective_threshold(120, 500.0), 255.0);
/// ```
pub fn effective_threshold(otsu: u8, offset: f64) -> f64 {
    (f64::from(otsu) + offset).clamp(0.0, 255.0)
}

/// Binarize: intensities above `threshold` are white, the rest black.
pub fn binarize(img: &GrayImage, threshold: f64) -> BinaryBitmap {
    BinaryBitmap::from_fn(img.width(), img.height(), |x, y| {
        if f64::from(img.get_pixel(x, y).0[0]) > threshold {
            Pixel::White
        } else {
            Pixel::Black
        }
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn from_values(values: &[u8]) -> GrayImage {
        GrayImage::from_fn(values.len() as u32, 1, |x, _| Luma([values[x as usize]]))
    }

    #[test]
    fn test_uniform_image_level_zero() {
        assert_eq!(otsu_level(&GrayImage::from_pixel(2, 2, Luma([255]))), 0);
        assert_eq!(otsu_level(&GrayImage::from_pixel(3, 3, Luma([90]))), 0);
    }

    #[test]
    fn test_two_values_split_at_lower() {
        // Every level in 20..200 separates the classes equally well;
        // the first one wins.
        let img = from_values(&[20, 20, 200, 200]);
        assert_eq!(otsu_level(&img), 20);
    }

    #[test]
    fn test_bimodal_separates_modes() {
        let img = from_values(&[10, 12, 14, 16, 200, 210, 220, 230]);
        let level = otsu_level(&img);
        assert!((16..200).contains(&level), "level {}", level);

        let bitmap = binarize(&img, f64::from(level));
        assert_eq!(bitmap.count_black(), 4);
        assert!(bitmap.is_black(3, 0));
        assert!(!bitmap.is_black(4, 0));
    }

    #[test]
    fn test_three_clusters() {
        // The mid cluster joins the dark class.
        let img = from_values(&[0, 0, 0, 0, 0, 0, 100, 100, 250, 250]);
        let level = otsu_level(&img);
        assert_eq!(level, 100);
        let bitmap = binarize(&img, f64::from(level));
        assert_eq!(bitmap.count_black(), 8);
        assert!(!bitmap.is_black(9, 0));
    }

    #[test]
    fn test_effective_threshold_always_in_range() {
        for otsu in [0u8, 1, 127, 254, 255] {
            for offset in [-1e9, -300.0, -1.0, 0.0, 0.5, 300.0, 1e9] {
                let t = effective_threshold(otsu, offset);
                assert!((0.0..=255.0).contains(&t), "{} + {} -> {}", otsu, offset, t);
            }
        }
    }

    #[test]
    fn test_binarize_polarity_at_zero() {
        let img = from_values(&[0, 1, 254, 255]);
        let bitmap = binarize(&img, 0.0);
        assert!(bitmap.is_black(0, 0));
        assert!(!bitmap.is_black(1, 0));
        assert!(!bitmap.is_black(3, 0));
    }

    #[test]
    fn test_binarize_polarity_at_full_scale() {
        // Nothing exceeds 255, so every pixel lands in the black bucket.
        let img = from_values(&[0, 128, 255]);
        let bitmap = binarize(&img, 255.0);
        assert_eq!(bitmap.count_black(), 3);
    }

    #[test]
    fn test_fractional_threshold() {
        let img = from_values(&[100, 101]);
        let bitmap = binarize(&img, 100.5);
        assert!(bitmap.is_black(0, 0));
        assert!(!bitmap.is_black(1, 0));
    }

    #[test]
    fn test_compute_reports_components() {
        let img = from_values(&[20, 20, 200, 200]);
        let t = Threshold::compute(&img, -300.0);
        assert_eq!(t.otsu, 20);
        assert_eq!(t.offset, -300.0);
        assert_eq!(t.effective, 0.0);
    }
}
