//! 24-bit colour type and RGB565 helpers
//!
//! Pixels are handled as 8 bits per channel. Animation assets are stored
//! as little-endian RGB565 and are expanded with a rounding multiply, so a
//! full-scale 5-bit channel maps to 255 and zero maps to zero.
//!
//! ## Example
//!
//! ```
//! use pxmatrix::Color;
//!
//! let white = Color::from_rgb565(0xFFFF);
//! assert_eq!(white, Color::WHITE);
//! assert_eq!(Color::new(255, 0, 0).to_rgb565(), 0xF800);
//! assert_eq!(Color::from_packed(0x00_12_34_56), Color::new(0x12, 0x34, 0x56));
//! ```

/// An RGB888 colour
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// All channels off
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// All channels full
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Full red
    pub const RED: Self = Self::new(255, 0, 0);
    /// Full green
    pub const GREEN: Self = Self::new(0, 255, 0);
    /// Full blue
    pub const BLUE: Self = Self::new(0, 0, 255);
    /// Mid grey, the default text colour
    pub const GREY: Self = Self::new(128, 128, 128);

    /// Create a colour from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Expand an RGB565 value
    pub const fn from_rgb565(color: u16) -> Self {
        let r = ((color >> 11) & 0x1F) as u32;
        let g = ((color >> 5) & 0x3F) as u32;
        let b = (color & 0x1F) as u32;
        Self {
            r: ((r * 527 + 23) >> 6) as u8,
            g: ((g * 259 + 33) >> 6) as u8,
            b: ((b * 527 + 23) >> 6) as u8,
        }
    }

    /// Reduce to RGB565, dropping the low bits of each channel
    pub const fn to_rgb565(self) -> u16 {
        ((self.r as u16 & 0xF8) << 8) | ((self.g as u16 & 0xFC) << 3) | (self.b as u16 >> 3)
    }

    /// Unpack from `0x00RRGGBB`
    pub const fn from_packed(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }

    /// Pack into `0x00RRGGBB`
    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::Rgb888> for Color {
    fn from(color: embedded_graphics_core::pixelcolor::Rgb888) -> Self {
        use embedded_graphics_core::pixelcolor::RgbColor;
        Self::new(color.r(), color.g(), color.b())
    }
}

#[cfg(feature = "graphics")]
impl From<Color> for embedded_graphics_core::pixelcolor::Rgb888 {
    fn from(color: Color) -> Self {
        Self::new(color.r, color.g, color.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_extremes() {
        assert_eq!(Color::from_rgb565(0x0000), Color::BLACK);
        assert_eq!(Color::from_rgb565(0xFFFF), Color::WHITE);
        assert_eq!(Color::from_rgb565(0xF800), Color::RED);
        assert_eq!(Color::from_rgb565(0x07E0), Color::GREEN);
        assert_eq!(Color::from_rgb565(0x001F), Color::BLUE);
    }

    #[test]
    fn test_rgb565_midpoint_rounding() {
        // 5-bit 16 -> (16 * 527 + 23) >> 6 = 132
        let c = Color::from_rgb565(16 << 11);
        assert_eq!(c.r, 132);
        // 6-bit 32 -> (32 * 259 + 33) >> 6 = 130
        let c = Color::from_rgb565(32 << 5);
        assert_eq!(c.g, 130);
    }

    #[test]
    fn test_to_rgb565_truncates() {
        assert_eq!(Color::new(0x07, 0x03, 0x07).to_rgb565(), 0);
        assert_eq!(Color::WHITE.to_rgb565(), 0xFFFF);
    }

    #[test]
    fn test_packed() {
        let c = Color::new(1, 2, 3);
        assert_eq!(c.packed(), 0x0001_0203);
        assert_eq!(Color::from_packed(0xFF00_0000), Color::BLACK);
    }
}
