//! # Binary Bitmap
//!
//! A fixed-size grid of black/white pixels produced by the thresholder and
//! consumed by the corner corrector, the layout emitter and the preview
//! writer.
//!
//! ## Coordinate System
//!
//! ```text
//! (0,0) ──────────────────────► x (width)
//!   │
//!   │   ██░░██
//!   │   ░░██░░
//!   ▼
//!   y (height, growing downward)
//! ```
//!
//! Black is the foreground: every black pixel becomes one unit square in
//! the layout. When converted to 8-bit samples, black is 0 and white is 255.

use image::{GrayImage, Luma};

/// State of a single bitmap pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {
    /// Foreground; geometry is placed here.
    Black,
    /// Background.
    White,
}

impl Pixel {
    /// The opposite state.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Pixel::Black => Pixel::White,
            Pixel::White => Pixel::Black,
        }
    }

    /// 8-bit sample value: 0 for black, 255 for white.
    #[inline]
    pub fn luma(self) -> u8 {
        match self {
            Pixel::Black => 0,
            Pixel::White => 255,
        }
    }
}

/// Width × height grid of [`Pixel`]s, stored row-major.
///
/// Dimensions never change after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryBitmap {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl BinaryBitmap {
    /// Create a bitmap filled with `fill`.
    pub fn new(width: u32, height: u32, fill: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Create a bitmap from a function of `(x, y)`.
    ///
    /// ```
    /// use pixgds::render::bitmap::{BinaryBitmap, Pixel};
    ///
    /// let checker = BinaryBitmap::from_fn(4, 4, |x, y| {
    ///     if (x + y) % 2 == 0 { Pixel::Black } else { Pixel::White }
    /// });
    /// assert_eq!(checker.count_black(), 8);
    /// ```
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Pixel,
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Interpret a grayscale image: 0 is black, anything else is white.
    #[cfg(test)]
    pub(crate) fn from_gray(img: &GrayImage) -> Self {
        Self::from_fn(img.width(), img.height(), |x, y| {
            if img.get_pixel(x, y).0[0] == 0 {
                Pixel::Black
            } else {
                Pixel::White
            }
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Pixel {
        self.pixels[self.index(x, y)]
    }

    /// Overwrite the pixel at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, pixel: Pixel) {
        let idx = self.index(x, y);
        self.pixels[idx] = pixel;
    }

    #[inline]
    pub fn is_black(&self, x: u32, y: u32) -> bool {
        self.get(x, y) == Pixel::Black
    }

    /// Number of black pixels.
    pub fn count_black(&self) -> usize {
        self.pixels.iter().filter(|&&p| p == Pixel::Black).count()
    }

    /// Swap black and white everywhere.
    ///
    /// Applying it twice restores the original bitmap.
    pub fn invert(&mut self) {
        for pixel in &mut self.pixels {
            *pixel = pixel.flipped();
        }
    }

    /// Render as an 8-bit grayscale image with values 0 and 255 only.
    pub fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| Luma([self.get(x, y).luma()]))
    }
}

// ============================================================================
// TESTS
// ============================================================================
