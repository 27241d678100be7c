//! Bitmap fonts in the Adafruit-GFX layout
//!
//! A [`Font`] is a packed 1-bit-per-pixel bitmap plus a table of [`Glyph`]
//! metrics covering a contiguous code point range. Glyph bitmaps are read
//! MSB first and run on from one row into the next without padding, so a
//! 5 pixel wide glyph starts its second row at bit 5 of its first byte.
//!
//! Fonts are read-only and usually live in flash:
//!
//! ```
//! use pxmatrix::font::{Font, Glyph};
//!
//! // A single 2x2 block glyph for '#'
//! static BITMAP: [u8; 1] = [0b1111_0000];
//! static GLYPHS: [Glyph; 1] = [Glyph::new(0, 2, 2, 3, 0, -2)];
//! static FONT: Font<'static> = Font::new(&BITMAP, &GLYPHS, '#' as u16, '#' as u16, 3);
//!
//! let glyph = FONT.glyph('#').unwrap();
//! assert_eq!(FONT.glyph_pixels(glyph).count(), 4);
//! assert!(FONT.glyph('$').is_none());
//! ```

/// Metrics and bitmap location of one character
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    /// Index of the first bitmap byte
    pub bitmap_offset: u16,
    /// Bitmap width in pixels
    pub width: u8,
    /// Bitmap height in pixels
    pub height: u8,
    /// Cursor advance after drawing
    pub x_advance: u8,
    /// Horizontal offset from the cursor to the bitmap's left edge
    pub x_offset: i8,
    /// Vertical offset from the baseline to the bitmap's top edge
    pub y_offset: i8,
}

impl Glyph {
    /// Create glyph metrics
    pub const fn new(
        bitmap_offset: u16,
        width: u8,
        height: u8,
        x_advance: u8,
        x_offset: i8,
        y_offset: i8,
    ) -> Self {
        Self {
            bitmap_offset,
            width,
            height,
            x_advance,
            x_offset,
            y_offset,
        }
    }
}

/// A bitmap font covering code points `first..=last`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Font<'a> {
    /// Packed glyph bitmaps
    pub bitmap: &'a [u8],
    /// Glyph table, indexed by `code point - first`
    pub glyphs: &'a [Glyph],
    /// First covered code point
    pub first: u16,
    /// Last covered code point
    pub last: u16,
    /// Line height
    pub y_advance: u8,
}

impl<'a> Font<'a> {
    /// Create a font
    pub const fn new(
        bitmap: &'a [u8],
        glyphs: &'a [Glyph],
        first: u16,
        last: u16,
        y_advance: u8,
    ) -> Self {
        Self {
            bitmap,
            glyphs,
            first,
            last,
            y_advance,
        }
    }

    /// Look up the glyph for a character
    ///
    /// Returns `None` for characters outside the covered range.
    pub fn glyph(&self, c: char) -> Option<&'a Glyph> {
        let code = u32::from(c);
        if code < u32::from(self.first) || code > u32::from(self.last) {
            return None;
        }
        self.glyphs.get((code - u32::from(self.first)) as usize)
    }

    /// Lit pixels of a glyph as `(column, row)` inside its bitmap box
    pub fn glyph_pixels(&self, glyph: &Glyph) -> impl Iterator<Item = (u8, u8)> + 'a {
        let bitmap = self.bitmap;
        let start = usize::from(glyph.bitmap_offset);
        let width = usize::from(glyph.width);
        let count = width * usize::from(glyph.height);

        (0..count).filter_map(move |i| {
            let byte = bitmap.get(start + i / 8)?;
            (byte & (0x80 >> (i % 8)) != 0).then_some(((i % width) as u8, (i / width) as u8))
        })
    }
}
