//! Built-in animation table
//!
//! Animations are stored back to back as little-endian RGB565 frames. A
//! length table gives the number of frames in each animation; the offset of
//! animation `n` is the sum of the lengths before it.

use crate::color::Color;

/// A set of RGB565 animations sharing one frame size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationSet<'a> {
    lengths: &'a [usize],
    data: &'a [u8],
    pixels_per_frame: usize,
}

impl<'a> AnimationSet<'a> {
    /// Wrap a frame-length table and packed frame data
    ///
    /// `pixels_per_frame` is the panel's pixel count.
    pub const fn new(lengths: &'a [usize], data: &'a [u8], pixels_per_frame: usize) -> Self {
        Self {
            lengths,
            data,
            pixels_per_frame,
        }
    }

    /// A set with no animations
    pub const fn empty() -> Self {
        Self::new(&[], &[], 0)
    }

    /// Number of animations
    pub fn count(&self) -> usize {
        self.lengths.len()
    }

    /// Number of frames in animation `index`
    pub fn frame_count(&self, index: usize) -> usize {
        self.lengths.get(index).copied().unwrap_or(0)
    }

    /// Bytes per frame
    pub fn frame_size(&self) -> usize {
        self.pixels_per_frame * 2
    }

    /// Raw bytes of one frame
    ///
    /// Returns `None` if either index is out of range or the data is short.
    pub fn frame(&self, index: usize, frame: usize) -> Option<&'a [u8]> {
        if frame >= self.frame_count(index) {
            return None;
        }
        let preceding: usize = self.lengths.get(..index)?.iter().sum();
        let start = (preceding + frame) * self.frame_size();
        self.data.get(start..start + self.frame_size())
    }

    /// Decoded pixels of one frame, row-major
    pub fn pixels(&self, index: usize, frame: usize) -> Option<impl Iterator<Item = Color> + 'a> {
        let bytes = self.frame(index, frame)?;
        Some(
            bytes
                .chunks_exact(2)
                .map(|px| Color::from_rgb565(u16::from_le_bytes([px[0], px[1]]))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    // two animations on a 2-pixel panel: 1 frame, then 2 frames
    static LENGTHS: [usize; 2] = [1, 2];
    static DATA: [u8; 12] = [
        0x00, 0xF8, 0x1F, 0x00, // red, blue
        0xE0, 0x07, 0x00, 0x00, // green, black
        0xFF, 0xFF, 0xFF, 0xFF, // white, white
    ];

    #[test]
    fn test_frame_offsets_sum_previous_lengths() {
        let set = AnimationSet::new(&LENGTHS, &DATA, 2);
        assert_eq!(set.count(), 2);
        assert_eq!(set.frame(0, 0), Some(&DATA[0..4]));
        assert_eq!(set.frame(1, 0), Some(&DATA[4..8]));
        assert_eq!(set.frame(1, 1), Some(&DATA[8..12]));
        assert_eq!(set.frame(0, 1), None);
        assert_eq!(set.frame(2, 0), None);
    }

    #[test]
    fn test_pixels_decode_little_endian() {
        let set = AnimationSet::new(&LENGTHS, &DATA, 2);
        let px: Vec<Color> = set.pixels(0, 0).unwrap().collect();
        assert_eq!(px, [Color::RED, Color::BLUE]);
        let px: Vec<Color> = set.pixels(1, 0).unwrap().collect();
        assert_eq!(px, [Color::GREEN, Color::BLACK]);
    }

    #[test]
    fn test_short_data_yields_none() {
        let set = AnimationSet::new(&LENGTHS, &DATA[..10], 2);
        assert_eq!(set.frame(1, 1), None);
        assert_eq!(AnimationSet::empty().count(), 0);
    }
}
