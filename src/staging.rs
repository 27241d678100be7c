//! Manual-mode staging frame
//!
//! Drawing commands rasterize into a plain RGB888 [`StagingFrame`] rather
//! than straight into the bit planes. The frame is copied into the write
//! buffer on an explicit update, so partial drawings never reach the panel.

use alloc::vec;
use alloc::vec::Vec;

use crate::color::Color;
use crate::framebuffer::BitPlaneBuffer;

/// Full-resolution RGB888 frame in logical (rotated) coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct StagingFrame {
    width: u16,
    height: u16,
    pixels: Vec<Color>,
}

impl StagingFrame {
    /// Create a black frame
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; usize::from(width) * usize::from(height)],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < usize::from(self.width) && y < usize::from(self.height))
            .then(|| y * usize::from(self.width) + x)
    }

    /// Read a pixel
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).and_then(|i| self.pixels.get(i).copied())
    }

    /// Write a pixel, dropping out-of-range coordinates
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(pixel) = self.index(x, y).and_then(|i| self.pixels.get_mut(i)) {
            *pixel = color;
        }
    }

    /// Set every pixel to one colour
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Set every pixel to black
    pub fn clear(&mut self) {
        self.fill(Color::BLACK);
    }

    /// All pixels, row-major
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Encode the whole frame into a bit-plane buffer
    pub fn commit(&self, target: &mut BitPlaneBuffer) {
        let width = usize::from(self.width);
        if width == 0 {
            return;
        }
        for (i, color) in self.pixels.iter().enumerate() {
            target.set_pixel((i % width) as i32, (i / width) as i32, *color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Geometry};

    #[test]
    fn test_out_of_range_dropped() {
        let mut frame = StagingFrame::new(4, 2);
        frame.set_pixel(4, 0, Color::WHITE);
        frame.set_pixel(0, -1, Color::WHITE);
        assert!(frame.pixels().iter().all(|c| *c == Color::BLACK));
        assert_eq!(frame.pixel(4, 0), None);
    }

    #[test]
    fn test_commit_encodes_every_pixel() {
        let config = Builder::new()
            .geometry(Geometry::new(32, 16).unwrap())
            .build()
            .unwrap();
        let mut buffer = BitPlaneBuffer::new(&config);
        buffer.fill(Color::WHITE);

        let mut frame = StagingFrame::new(32, 16);
        frame.set_pixel(5, 6, Color::new(255, 0, 255));
        frame.commit(&mut buffer);

        assert_eq!(buffer.pixel(5, 6), Some(Color::new(255, 0, 255)));
        assert_eq!(buffer.pixel(0, 0), Some(Color::BLACK));
    }
}
