//! Coordinate rotation utilities
//!
//! This module maps logical (drawing) coordinates to the physical column and
//! row the bit-plane encoder addresses.
//!
//! Column shift registers on these panels are fed last pixel first, so after
//! rotation and the bounds check every column index is mirrored
//! (`col = width - 1 - col`). Coordinates that land outside the panel yield
//! `None` and the write is dropped.
//!
//! ## Rotation Modes
//!
//! - **Rotate0**: Native orientation
//! - **Rotate90**: `(x, y) -> (y, height - 1 - x)`
//! - **Rotate180**: `(x, y) -> (width - 1 - x, height - 1 - y)`
//! - **Rotate270**: `(x, y) -> (width - 1 - y, x)`
//!
//! ## Example
//!
//! ```
//! use pxmatrix::{rotation::apply_rotation, Rotation};
//!
//! // On a 32x16 panel the top-left pixel is the last column shifted out
//! assert_eq!(apply_rotation(0, 0, 32, 16, Rotation::Rotate0), Some((31, 0)));
//!
//! // Negative coordinates are dropped
//! assert_eq!(apply_rotation(-1, 0, 32, 16, Rotation::Rotate0), None);
//! ```

use crate::config::Rotation;

/// Apply rotation, bounds check and column mirroring
///
/// # Arguments
///
/// * `x` - Logical X coordinate (may be negative or out of range)
/// * `y` - Logical Y coordinate (may be negative or out of range)
/// * `width` - Physical panel width in pixels
/// * `height` - Physical panel height in pixels
/// * `rotation` - Rotation mode
///
/// # Returns
///
/// `Some((col, row))` in physical shift-register order, or `None` if the
/// rotated point falls outside the panel.
pub fn apply_rotation(
    x: i32,
    y: i32,
    width: u16,
    height: u16,
    rotation: Rotation,
) -> Option<(usize, usize)> {
    let (x, y) = (i64::from(x), i64::from(y));
    let w = i64::from(width);
    let h = i64::from(height);

    let (px, py) = match rotation {
        Rotation::Rotate0 => (x, y),
        Rotation::Rotate90 => (y, h - 1 - x),
        Rotation::Rotate180 => (w - 1 - x, h - 1 - y),
        Rotation::Rotate270 => (w - 1 - y, x),
    };

    if px < 0 || py < 0 || px >= w || py >= h {
        return None;
    }

    Some(((w - 1 - px) as usize, py as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate0_mirrors_columns() {
        assert_eq!(apply_rotation(0, 0, 32, 16, Rotation::Rotate0), Some((31, 0)));
        assert_eq!(apply_rotation(31, 15, 32, 16, Rotation::Rotate0), Some((0, 15)));
    }

    #[test]
    fn test_out_of_range_dropped() {
        assert_eq!(apply_rotation(32, 0, 32, 16, Rotation::Rotate0), None);
        assert_eq!(apply_rotation(0, 16, 32, 16, Rotation::Rotate0), None);
        assert_eq!(apply_rotation(0, -3, 32, 16, Rotation::Rotate0), None);
    }

    #[test]
    fn test_rotate90() {
        // (0,0) -> physical (0, 15) -> mirrored column 31
        assert_eq!(apply_rotation(0, 0, 32, 16, Rotation::Rotate90), Some((31, 15)));
        // logical x spans the physical height
        assert_eq!(apply_rotation(15, 31, 32, 16, Rotation::Rotate90), Some((0, 0)));
        assert_eq!(apply_rotation(16, 0, 32, 16, Rotation::Rotate90), None);
    }

    #[test]
    fn test_rotate180() {
        assert_eq!(apply_rotation(0, 0, 32, 16, Rotation::Rotate180), Some((0, 15)));
    }

    #[test]
    fn test_rotate270() {
        assert_eq!(apply_rotation(0, 0, 32, 16, Rotation::Rotate270), Some((0, 0)));
        assert_eq!(apply_rotation(15, 0, 32, 16, Rotation::Rotate270), Some((0, 15)));
    }
}
