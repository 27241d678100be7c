//! Graphics support via embedded-graphics
//!
//! [`BitPlaneBuffer`] and [`StagingFrame`] both implement
//! [`DrawTarget`] with [`Rgb888`] colour, so the whole embedded-graphics
//! ecosystem (primitives, mono fonts, images) can draw onto a frame. Sizes
//! are logical, after rotation. Pixels outside the frame are dropped.
//!
//! ## Example
//!
//! ```
//! use embedded_graphics::{
//!     pixelcolor::Rgb888,
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle, Rectangle},
//! };
//! use pxmatrix::{BitPlaneBuffer, Builder, Color, Geometry};
//!
//! let config = Builder::new()
//!     .geometry(Geometry::new(32, 16).unwrap())
//!     .build()
//!     .unwrap();
//! let mut frame = BitPlaneBuffer::new(&config);
//!
//! let _ = Rectangle::new(Point::new(1, 1), Size::new(6, 4))
//!     .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
//!     .draw(&mut frame);
//! let _ = Circle::new(Point::new(16, 2), 10)
//!     .into_styled(PrimitiveStyle::with_stroke(Rgb888::BLUE, 1))
//!     .draw(&mut frame);
//!
//! assert_eq!(frame.pixel(2, 2), Some(Color::RED));
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::Rgb888,
    prelude::Pixel,
};

use crate::color::Color;
use crate::framebuffer::BitPlaneBuffer;
use crate::staging::StagingFrame;

impl DrawTarget for BitPlaneBuffer {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            self.set_pixel(x, y, color.into());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let color = Color::from(color);
        if color == Color::BLACK {
            BitPlaneBuffer::clear(self);
        } else {
            self.fill(color);
        }
        Ok(())
    }
}

impl OriginDimensions for BitPlaneBuffer {
    fn size(&self) -> Size {
        let (w, h) = self.logical_size();
        Size::new(w as u32, h as u32)
    }
}

impl DrawTarget for StagingFrame {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            self.set_pixel(x, y, color.into());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color.into());
        Ok(())
    }
}

impl OriginDimensions for StagingFrame {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}
