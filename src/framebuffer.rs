//! Bit-plane framebuffer
//!
//! A frame is stored as [`COLOR_DEPTH`] bit planes. Each plane holds one bit
//! per channel per pixel, laid out in exactly the order the row-scan driver
//! shifts it into the column drivers, so a scan step is a single contiguous
//! slice write.
//!
//! ## Plane layout
//!
//! Within a plane the data is split into `row_pattern` row blocks of
//! `send_buffer_size` bytes, one per multiplexer address. A row block holds
//! the blue, green and red bytes of every row that shares that address, each
//! colour taking `pattern_color_bytes` bytes. Bytes are filled back to front
//! because the first byte shifted out ends up in the furthest column.
//!
//! ## Brightness encoding
//!
//! Channel value `v` sets its bit in plane `p` when
//! `v > p * 32 + 16 + offset`, so the number of lit planes is the channel
//! level quantized to eight steps. Green is written `32 / 3 = 10` planes
//! (two, modulo 8) after red and blue twice that, which staggers the three
//! channels across the refresh cycle.
//!
//! ## Example
//!
//! ```
//! use pxmatrix::{BitPlaneBuffer, Builder, Color, Geometry};
//!
//! let config = Builder::new()
//!     .geometry(Geometry::new(32, 16).unwrap())
//!     .build()
//!     .unwrap();
//! let mut buffer = BitPlaneBuffer::new(&config);
//!
//! buffer.set_pixel(3, 4, Color::new(200, 100, 0));
//! assert_eq!(buffer.pixel(3, 4), Some(Color::new(192, 96, 0)));
//!
//! // Writes outside the panel are ignored
//! buffer.set_pixel(-1, 40, Color::WHITE);
//! ```

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use crate::color::Color;
use crate::config::{COLOR_DEPTH, ColorOffsets, Config, Rotation, ScanPattern};
use crate::rotation::apply_rotation;

const COLOR_STEP: usize = 256 / COLOR_DEPTH;
const COLOR_HALF_STEP: usize = COLOR_STEP / 2;
// 32 / 3 truncates to 10: green lands 2 planes after red, blue 4.
const COLOR_THIRD_STEP: usize = COLOR_STEP / 3;
const COLOR_TWO_THIRD_STEP: usize = COLOR_THIRD_STEP * 2;

/// Plane that holds the green bit for threshold index `plane`
pub const fn green_plane(plane: usize) -> usize {
    (plane + COLOR_THIRD_STEP) % COLOR_DEPTH
}

/// Plane that holds the blue bit for threshold index `plane`
pub const fn blue_plane(plane: usize) -> usize {
    (plane + COLOR_TWO_THIRD_STEP) % COLOR_DEPTH
}

/// Channel threshold for plane `plane`, before offsets
pub const fn threshold(plane: usize) -> u16 {
    (plane * COLOR_STEP + COLOR_HALF_STEP) as u16
}

/// Byte offsets and bit mask of one pixel inside a plane
#[derive(Clone, Copy, Debug, PartialEq)]
struct Location {
    r: usize,
    g: usize,
    b: usize,
    mask: u8,
}

/// Precomputed addressing for one panel configuration
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneLayout {
    width: u16,
    height: u16,
    row_pattern: u8,
    rotation: Rotation,
    scan_pattern: ScanPattern,
    offsets: ColorOffsets,
    plane_size: usize,
    pattern_color_bytes: usize,
    send_buffer_size: usize,
    row_offsets: Vec<usize>,
}

impl PlaneLayout {
    /// Compute the layout for a configuration
    pub fn new(config: &Config) -> Self {
        let width = config.geometry.width();
        let height = config.geometry.height();
        let row_pattern = config.row_pattern.rows();
        let rows = usize::from(row_pattern);

        let pattern_color_bytes = (usize::from(height) / rows) * (usize::from(width) / 8);
        let send_buffer_size = pattern_color_bytes * 3;
        let row_offsets = (0..usize::from(height))
            .map(|y| (y % rows) * send_buffer_size + send_buffer_size - 1)
            .collect();

        Self {
            width,
            height,
            row_pattern,
            rotation: config.rotation,
            scan_pattern: config.scan_pattern,
            offsets: config.color_offsets,
            plane_size: config.geometry.plane_size(),
            pattern_color_bytes,
            send_buffer_size,
            row_offsets,
        }
    }

    /// Physical panel width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Physical panel height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of multiplexer addresses
    pub fn row_pattern(&self) -> u8 {
        self.row_pattern
    }

    /// Bytes per bit plane
    pub fn plane_size(&self) -> usize {
        self.plane_size
    }

    /// Bytes per colour inside one row block
    pub fn pattern_color_bytes(&self) -> usize {
        self.pattern_color_bytes
    }

    /// Bytes shifted out per scan step
    pub fn send_buffer_size(&self) -> usize {
        self.send_buffer_size
    }

    /// Bytes per frame
    pub fn buffer_size(&self) -> usize {
        self.plane_size * COLOR_DEPTH
    }

    /// Byte range of the row block for `plane` and multiplexer address `mux`
    pub fn row_block(&self, plane: usize, mux: u8) -> Range<usize> {
        let start = plane * self.plane_size + usize::from(mux) * self.send_buffer_size;
        start..start + self.send_buffer_size
    }

    fn locate(&self, col: usize, row: usize) -> Option<Location> {
        let bytes_per_row = usize::from(self.width) / 8;
        let vertical_sector = row / usize::from(self.row_pattern);

        let r = self
            .row_offsets
            .get(row)?
            .checked_sub(col / 8)?
            .checked_sub(vertical_sector * bytes_per_row)?;
        let g = r.checked_sub(self.pattern_color_bytes)?;
        let b = g.checked_sub(self.pattern_color_bytes)?;

        let mut bit = col % 8;
        if self.scan_pattern == ScanPattern::Zaggiz && row % 8 < 4 {
            bit = 7 - bit;
        }

        Some(Location {
            r,
            g,
            b,
            mask: 1 << bit,
        })
    }

    fn map(&self, x: i32, y: i32) -> Option<Location> {
        let (col, row) = apply_rotation(x, y, self.width, self.height, self.rotation)?;
        self.locate(col, row)
    }
}

/// One full frame of bit planes
#[derive(Clone, Debug)]
pub struct BitPlaneBuffer {
    layout: PlaneLayout,
    data: Vec<u8>,
}

impl BitPlaneBuffer {
    /// Allocate a blank frame for a configuration
    pub fn new(config: &Config) -> Self {
        Self::with_layout(PlaneLayout::new(config))
    }

    /// Allocate a blank frame for a precomputed layout
    pub fn with_layout(layout: PlaneLayout) -> Self {
        let data = vec![0; layout.buffer_size()];
        Self { layout, data }
    }

    /// Addressing used by this frame
    pub fn layout(&self) -> &PlaneLayout {
        &self.layout
    }

    /// Raw frame bytes, plane 0 first
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes shifted out for `plane` at multiplexer address `mux`
    ///
    /// Returns `None` if the plane or address is out of range.
    pub fn row_block(&self, plane: usize, mux: u8) -> Option<&[u8]> {
        if plane >= COLOR_DEPTH || mux >= self.layout.row_pattern {
            return None;
        }
        self.data.get(self.layout.row_block(plane, mux))
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Write one pixel
    ///
    /// Coordinates are logical (before rotation). Out-of-range writes are
    /// silently dropped.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        let Some(loc) = self.layout.map(x, y) else {
            return;
        };
        let plane_size = self.layout.plane_size;
        let offsets = self.layout.offsets;

        for plane in 0..COLOR_DEPTH {
            let thresh = threshold(plane);
            self.write_bit(
                plane * plane_size + loc.r,
                loc.mask,
                u16::from(color.r) > thresh + u16::from(offsets.r),
            );
            self.write_bit(
                green_plane(plane) * plane_size + loc.g,
                loc.mask,
                u16::from(color.g) > thresh + u16::from(offsets.g),
            );
            self.write_bit(
                blue_plane(plane) * plane_size + loc.b,
                loc.mask,
                u16::from(color.b) > thresh + u16::from(offsets.b),
            );
        }
    }

    /// Write one pixel from an RGB565 value
    pub fn set_pixel_rgb565(&mut self, x: i32, y: i32, color: u16) {
        self.set_pixel(x, y, Color::from_rgb565(color));
    }

    /// Set every pixel to one colour
    pub fn fill(&mut self, color: Color) {
        let (w, h) = self.logical_size();
        for y in 0..h {
            for x in 0..w {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Read a pixel back, quantized to the plane resolution
    ///
    /// Each channel decodes to `32 * lit_planes`, capped at 255, which is
    /// within 16 of the value written when no offsets are configured.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let loc = self.layout.map(x, y)?;
        let plane_size = self.layout.plane_size;
        let lit = |index: usize| {
            self.data
                .get(index)
                .is_some_and(|byte| byte & loc.mask != 0)
        };

        let mut levels = [0usize; 3];
        for plane in 0..COLOR_DEPTH {
            levels[0] += usize::from(lit(plane * plane_size + loc.r));
            levels[1] += usize::from(lit(green_plane(plane) * plane_size + loc.g));
            levels[2] += usize::from(lit(blue_plane(plane) * plane_size + loc.b));
        }
        let decode = |n: usize| (n * COLOR_STEP).min(255) as u8;

        Some(Color::new(decode(levels[0]), decode(levels[1]), decode(levels[2])))
    }

    /// Logical drawing size (width, height) after rotation
    pub fn logical_size(&self) -> (i32, i32) {
        let w = i32::from(self.layout.width);
        let h = i32::from(self.layout.height);
        match self.layout.rotation {
            Rotation::Rotate0 | Rotation::Rotate180 => (w, h),
            Rotation::Rotate90 | Rotation::Rotate270 => (h, w),
        }
    }

    fn write_bit(&mut self, index: usize, mask: u8, on: bool) {
        if let Some(byte) = self.data.get_mut(index) {
            if on {
                *byte |= mask;
            } else {
                *byte &= !mask;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Geometry, RowPattern};

    fn config(width: u16, height: u16, rows: RowPattern, scan: ScanPattern) -> Config {
        Builder::new()
            .geometry(Geometry::new(width, height).unwrap())
            .row_pattern(rows)
            .scan_pattern(scan)
            .build()
            .unwrap()
    }

    fn panel() -> Config {
        config(32, 16, RowPattern::Rows8, ScanPattern::Line)
    }

    #[test]
    fn test_plane_shifts() {
        assert_eq!(green_plane(0), 2);
        assert_eq!(green_plane(7), 1);
        assert_eq!(blue_plane(0), 4);
        assert_eq!(blue_plane(5), 1);
        assert_eq!(threshold(0), 16);
        assert_eq!(threshold(7), 240);
    }

    #[test]
    fn test_layout_sizes() {
        let layout = PlaneLayout::new(&panel());
        assert_eq!(layout.plane_size(), 192);
        assert_eq!(layout.pattern_color_bytes(), 8);
        assert_eq!(layout.send_buffer_size(), 24);
        assert_eq!(layout.buffer_size(), 1536);
        assert_eq!(layout.row_block(1, 2), 240..264);
    }

    #[test]
    fn test_first_pixel_lands_in_last_red_byte() {
        let layout = PlaneLayout::new(&panel());
        // logical (31, 0) mirrors to column 0, the last byte of the red third
        let loc = layout.map(31, 0).unwrap();
        assert_eq!(loc.r, 23);
        assert_eq!(loc.g, 15);
        assert_eq!(loc.b, 7);
        assert_eq!(loc.mask, 0x01);
    }

    #[test]
    fn test_zaggiz_reverses_bits_in_upper_half() {
        let layout = PlaneLayout::new(&config(32, 16, RowPattern::Rows8, ScanPattern::Zaggiz));
        assert_eq!(layout.map(31, 0).unwrap().mask, 0x80);
        assert_eq!(layout.map(31, 4).unwrap().mask, 0x01);
    }

    #[test]
    fn test_round_trip_within_half_step() {
        let layouts = [
            config(32, 16, RowPattern::Rows8, ScanPattern::Line),
            config(32, 16, RowPattern::Rows4, ScanPattern::Line),
            config(64, 32, RowPattern::Rows16, ScanPattern::Zaggiz),
        ];
        for cfg in &layouts {
            let mut buffer = BitPlaneBuffer::new(cfg);
            let (w, h) = buffer.logical_size();
            for y in 0..h {
                for x in 0..w {
                    let v = ((x * 7 + y * 13) % 256) as u8;
                    buffer.set_pixel(x, y, Color::new(v, 255 - v, v / 2));
                }
            }
            for y in 0..h {
                for x in 0..w {
                    let v = ((x * 7 + y * 13) % 256) as u8;
                    let got = buffer.pixel(x, y).unwrap();
                    assert!(got.r.abs_diff(v) <= 16, "r at ({x},{y})");
                    assert!(got.g.abs_diff(255 - v) <= 16, "g at ({x},{y})");
                    assert!(got.b.abs_diff(v / 2) <= 16, "b at ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_writes_leave_buffer_untouched() {
        let mut buffer = BitPlaneBuffer::new(&panel());
        buffer.fill(Color::new(90, 180, 250));
        let before = buffer.as_bytes().to_vec();

        for (x, y) in [(-1, 0), (0, -1), (32, 0), (0, 16), (i32::MIN, i32::MAX)] {
            buffer.set_pixel(x, y, Color::WHITE);
            buffer.set_pixel(x, y, Color::BLACK);
        }

        assert_eq!(buffer.as_bytes(), before.as_slice());
    }

    #[test]
    fn test_full_red_sets_top_plane_red_only() {
        let mut buffer = BitPlaneBuffer::new(&panel());
        buffer.fill(Color::RED);
        let layout = buffer.layout().clone();
        let pcb = layout.pattern_color_bytes();

        for mux in 0..layout.row_pattern() {
            let block = buffer.row_block(7, mux).unwrap();
            let (blue, rest) = block.split_at(pcb);
            let (green, red) = rest.split_at(pcb);
            assert!(red.iter().all(|&b| b == 0xFF));
            assert!(green.iter().all(|&b| b == 0));
            assert!(blue.iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_offsets_raise_thresholds() {
        let cfg = Builder::new()
            .geometry(Geometry::new(32, 16).unwrap())
            .color_offsets(20, 0, 0)
            .build()
            .unwrap();
        let mut buffer = BitPlaneBuffer::new(&cfg);
        // 30 > 16 lights plane 0 without an offset, but not 30 > 36
        buffer.set_pixel(0, 0, Color::new(30, 30, 0));
        let got = buffer.pixel(0, 0).unwrap();
        assert_eq!(got.r, 0);
        assert_eq!(got.g, 32);
    }

    #[test]
    fn test_rgb565_write() {
        let mut buffer = BitPlaneBuffer::new(&panel());
        buffer.set_pixel_rgb565(1, 1, 0xFFFF);
        assert_eq!(buffer.pixel(1, 1), Some(Color::WHITE));
        buffer.clear();
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_row_block_bounds() {
        let buffer = BitPlaneBuffer::new(&panel());
        assert!(buffer.row_block(8, 0).is_none());
        assert!(buffer.row_block(0, 8).is_none());
        assert_eq!(buffer.row_block(7, 7).map(<[u8]>::len), Some(24));
    }
}
