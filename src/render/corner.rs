//! # Diagonal Corner Correction
//!
//! Two black pixels that touch only at a corner become two squares sharing
//! a single vertex in the layout, which design-rule checkers reject. This
//! pass finds every 2×2 checkerboard and blackens one more cell so the two
//! black pixels share an edge.
//!
//! ## Patterns
//!
//! ```text
//!   Falling diagonal          Rising diagonal
//!   ┌───┬───┐  ┌───┬───┐    ┌───┬───┐  ┌───┬───┐
//!   │ █ │   │  │ █ │   │    │   │ █ │  │   │ █ │
//!   ├───┼───┤→ ├───┼───┤    ├───┼───┤→ ├───┼───┤
//!   │   │ █ │  │ █ │ █ │    │ █ │   │  │ █ │ █ │
//!   └───┴───┘  └───┴───┘    └───┴───┘  └───┴───┘
//!   fill bottom-left          fill bottom-right
//! ```
//!
//! ## Scan Order
//!
//! Column-major: the outer loop walks `x in 0..width-1`, the inner loop
//! `y in 0..height-1`. Each window reads the bitmap as already modified by
//! earlier windows. A fill to the bottom-left can complete a rising
//! diagonal in a window the scan has already passed, so a second pass may
//! still find work on some inputs.

use tracing::debug;

use super::bitmap::{BinaryBitmap, Pixel};

/// A checkerboard found in the 2×2 window whose top-left corner is `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagonal {
    /// Top-left and bottom-right black, the other two white.
    Falling,
    /// Top-right and bottom-left black, the other two white.
    Rising,
}

/// Classify the window at `(x, y)`. Requires `x + 1 < width`, `y + 1 < height`.
pub fn diagonal_at(bitmap: &BinaryBitmap, x: u32, y: u32) -> Option<Diagonal> {
    use Pixel::{Black, White};

    let top_left = bitmap.get(x, y);
    let bottom_left = bitmap.get(x, y + 1);
    let top_right = bitmap.get(x + 1, y);
    let bottom_right = bitmap.get(x + 1, y + 1);

    match (top_left, bottom_left, top_right, bottom_right) {
        (Black, White, White, Black) => Some(Diagonal::Falling),
        (White, Black, Black, White) => Some(Diagonal::Rising),
        _ => None,
    }
}

/// Run one correction pass, returning the number of filled cells.
pub fn correct_corners(bitmap: &mut BinaryBitmap) -> usize {
    let (width, height) = bitmap.dimensions();
    if width < 2 || height < 2 {
        return 0;
    }

    let mut filled = 0;
    for x in 0..width - 1 {
        for y in 0..height - 1 {
            match diagonal_at(bitmap, x, y) {
                Some(Diagonal::Falling) => {
                    bitmap.set(x, y + 1, Pixel::Black);
                    filled += 1;
                }
                Some(Diagonal::Rising) => {
                    bitmap.set(x + 1, y + 1, Pixel::Black);
                    filled += 1;
                }
                None => {}
            }
        }
    }

    debug!(filled, "Corner correction pass complete");
    filled
}

/// Every window that still forms a checkerboard, as `(x, y, kind)`.
pub fn remaining_diagonals(bitmap: &BinaryBitmap) -> Vec<(u32, u32, Diagonal)> {
    let (width, height) = bitmap.dimensions();
    let mut found = Vec::new();
    for x in 0..width.saturating_sub(1) {
        for y in 0..height.saturating_sub(1) {
            if let Some(kind) = diagonal_at(bitmap, x, y) {
                found.push((x, y, kind));
            }
        }
    }
    found
}

// ============================================================================
// TESTS
// ============================================================================
