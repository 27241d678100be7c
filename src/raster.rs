//! Vector and text rasterization
//!
//! Integer-only drawing routines that emit pixels through the [`Canvas`]
//! trait. Shapes may be partly or wholly off screen: loops are clipped to
//! [`Canvas::bounds`] first, so the work done tracks what is visible rather
//! than how large the shape is.
//!
//! ## Example
//!
//! ```
//! use pxmatrix::raster::{self, Canvas};
//! use pxmatrix::{Color, StagingFrame};
//!
//! let mut frame = StagingFrame::new(32, 16);
//! raster::draw_line(&mut frame, 0, 0, 5, 0, Color::WHITE);
//! raster::fill_circle(&mut frame, 16, 8, 3, Color::RED);
//!
//! assert_eq!(frame.pixel(5, 0), Some(Color::WHITE));
//! assert_eq!(frame.pixel(16, 8), Some(Color::RED));
//! ```

use core::ops::RangeInclusive;

use crate::color::Color;
use crate::font::Font;
use crate::framebuffer::BitPlaneBuffer;
use crate::staging::StagingFrame;

/// Something pixels can be drawn onto
pub trait Canvas {
    /// Write one pixel; out-of-range coordinates must be ignored
    fn put_pixel(&mut self, x: i32, y: i32, color: Color);

    /// Drawable (width, height)
    fn bounds(&self) -> (i32, i32);
}

impl Canvas for StagingFrame {
    fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.set_pixel(x, y, color);
    }

    fn bounds(&self) -> (i32, i32) {
        (i32::from(self.width()), i32::from(self.height()))
    }
}

impl Canvas for BitPlaneBuffer {
    fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.set_pixel(x, y, color);
    }

    fn bounds(&self) -> (i32, i32) {
        self.logical_size()
    }
}

/// Bounding box of rendered text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBounds {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// `lo..=hi` clipped to `0..limit`; empty when nothing is left
fn clip(lo: i32, hi: i32, limit: i32) -> RangeInclusive<i32> {
    lo.max(0)..=hi.min(limit - 1)
}

/// Whether the box `x0..=x1` by `y0..=y1` touches the canvas
fn touches<C: Canvas + ?Sized>(canvas: &C, x0: i32, y0: i32, x1: i32, y1: i32) -> bool {
    let (w, h) = canvas.bounds();
    x1 >= 0 && y1 >= 0 && x0 < w && y0 < h
}

/// Draw a straight line, both endpoints included
pub fn draw_line<C: Canvas + ?Sized>(
    canvas: &mut C,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Color,
) {
    if !touches(canvas, x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)) {
        return;
    }
    let (w, h) = canvas.bounds();
    if x0 == x1 {
        for y in clip(y0.min(y1), y0.max(y1), h) {
            canvas.put_pixel(x0, y, color);
        }
        return;
    }
    if y0 == y1 {
        for x in clip(x0.min(x1), x0.max(x1), w) {
            canvas.put_pixel(x, y0, color);
        }
        return;
    }

    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    let (mut x0, mut y0, mut x1, mut y1) = if steep {
        (y0, x0, y1, x1)
    } else {
        (x0, y0, x1, y1)
    };
    if x0 > x1 {
        core::mem::swap(&mut x0, &mut x1);
        core::mem::swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let y_step = if y0 < y1 { 1 } else { -1 };
    let mut err = dx / 2;
    let mut y = y0;
    let major_limit = if steep { h } else { w };

    for x in x0..=x1 {
        if x >= major_limit {
            break;
        }
        if steep {
            canvas.put_pixel(y, x, color);
        } else {
            canvas.put_pixel(x, y, color);
        }
        err -= dy;
        if err < 0 {
            y += y_step;
            err += dx;
        }
    }
}

/// Draw a rectangle outline
pub fn draw_rect<C: Canvas + ?Sized>(
    canvas: &mut C,
    x: i32,
    y: i32,
    width: u16,
    height: u16,
    color: Color,
) {
    if width == 0 || height == 0 {
        return;
    }
    let right = x + i32::from(width) - 1;
    let bottom = y + i32::from(height) - 1;

    draw_line(canvas, x, y, right, y, color);
    draw_line(canvas, x, y, x, bottom, color);
    draw_line(canvas, right, y, right, bottom, color);
    draw_line(canvas, x, bottom, right, bottom, color);
}

/// Fill a rectangle
pub fn fill_rect<C: Canvas + ?Sized>(
    canvas: &mut C,
    x: i32,
    y: i32,
    width: u16,
    height: u16,
    color: Color,
) {
    let (w, h) = canvas.bounds();
    for yy in clip(y, y + i32::from(height) - 1, h) {
        for xx in clip(x, x + i32::from(width) - 1, w) {
            canvas.put_pixel(xx, yy, color);
        }
    }
}

/// Fill the whole canvas
pub fn fill_screen<C: Canvas + ?Sized>(canvas: &mut C, color: Color) {
    let (w, h) = canvas.bounds();
    for y in 0..h {
        for x in 0..w {
            canvas.put_pixel(x, y, color);
        }
    }
}

/// Midpoint circle stepper shared by the outline and fill routines
struct Octants {
    f: i32,
    ddf_x: i32,
    ddf_y: i32,
    x: i32,
    y: i32,
}

impl Octants {
    fn new(radius: i32) -> Self {
        Self {
            f: 1 - radius,
            ddf_x: 1,
            ddf_y: -2 * radius,
            x: 0,
            y: radius,
        }
    }
}

impl Iterator for Octants {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.x >= self.y {
            return None;
        }
        if self.f >= 0 {
            self.y -= 1;
            self.ddf_y += 2;
            self.f += self.ddf_y;
        }
        self.x += 1;
        self.ddf_x += 2;
        self.f += self.ddf_x;
        Some((self.x, self.y))
    }
}

/// Draw a circle outline
pub fn draw_circle<C: Canvas + ?Sized>(
    canvas: &mut C,
    x0: i32,
    y0: i32,
    radius: u16,
    color: Color,
) {
    let r = i32::from(radius);
    if !touches(canvas, x0 - r, y0 - r, x0 + r, y0 + r) {
        return;
    }
    canvas.put_pixel(x0, y0 + r, color);
    canvas.put_pixel(x0, y0 - r, color);
    canvas.put_pixel(x0 + r, y0, color);
    canvas.put_pixel(x0 - r, y0, color);

    for (x, y) in Octants::new(r) {
        canvas.put_pixel(x0 + x, y0 + y, color);
        canvas.put_pixel(x0 - x, y0 + y, color);
        canvas.put_pixel(x0 + x, y0 - y, color);
        canvas.put_pixel(x0 - x, y0 - y, color);
        canvas.put_pixel(x0 + y, y0 + x, color);
        canvas.put_pixel(x0 - y, y0 + x, color);
        canvas.put_pixel(x0 + y, y0 - x, color);
        canvas.put_pixel(x0 - y, y0 - x, color);
    }
}

/// Fill a circle
pub fn fill_circle<C: Canvas + ?Sized>(
    canvas: &mut C,
    x0: i32,
    y0: i32,
    radius: u16,
    color: Color,
) {
    let r = i32::from(radius);
    if !touches(canvas, x0 - r, y0 - r, x0 + r, y0 + r) {
        return;
    }
    draw_line(canvas, x0, y0 - r, x0, y0 + r, color);
    fill_circle_spans(canvas, x0, y0, r, Corners::BOTH, 0, color);
}

/// Which halves [`fill_circle_spans`] draws
#[derive(Clone, Copy)]
struct Corners(u8);

impl Corners {
    const RIGHT: u8 = 0x01;
    const LEFT: u8 = 0x02;
    const BOTH: Self = Self(Self::RIGHT | Self::LEFT);
}

fn fill_circle_spans<C: Canvas + ?Sized>(
    canvas: &mut C,
    x0: i32,
    y0: i32,
    r: i32,
    corners: Corners,
    delta: i32,
    color: Color,
) {
    for (x, y) in Octants::new(r) {
        if corners.0 & Corners::RIGHT != 0 {
            draw_line(canvas, x0 + x, y0 - y, x0 + x, y0 + y + delta, color);
            draw_line(canvas, x0 + y, y0 - x, x0 + y, y0 + x + delta, color);
        }
        if corners.0 & Corners::LEFT != 0 {
            draw_line(canvas, x0 - x, y0 - y, x0 - x, y0 + y + delta, color);
            draw_line(canvas, x0 - y, y0 - x, x0 - y, y0 + x + delta, color);
        }
    }
}

/// Draw text with its first baseline at `y`
///
/// `\n` returns to `x` and moves down one line. Characters the font does
/// not cover are skipped without advancing.
pub fn draw_text<C: Canvas + ?Sized>(
    canvas: &mut C,
    font: &Font<'_>,
    text: &str,
    x: i32,
    y: i32,
    color: Color,
) {
    let mut cursor_x = x;
    let mut cursor_y = y;

    for c in text.chars() {
        if c == '\n' {
            cursor_x = x;
            cursor_y += i32::from(font.y_advance);
            continue;
        }
        let Some(glyph) = font.glyph(c) else {
            continue;
        };
        let left = cursor_x + i32::from(glyph.x_offset);
        let top = cursor_y + i32::from(glyph.y_offset);
        for (col, row) in font.glyph_pixels(glyph) {
            canvas.put_pixel(left + i32::from(col), top + i32::from(row), color);
        }
        cursor_x += i32::from(glyph.x_advance);
    }
}

/// Measure text without drawing it
///
/// Returns the smallest box containing every glyph bitmap `draw_text` would
/// touch. Text with no drawable glyphs measures as an empty box at `(x, y)`.
pub fn text_bounds(font: &Font<'_>, text: &str, x: i32, y: i32) -> TextBounds {
    let mut cursor_x = x;
    let mut cursor_y = y;
    let mut extent: Option<(i32, i32, i32, i32)> = None;

    for c in text.chars() {
        if c == '\n' {
            cursor_x = x;
            cursor_y += i32::from(font.y_advance);
            continue;
        }
        let Some(glyph) = font.glyph(c) else {
            continue;
        };
        if glyph.width > 0 && glyph.height > 0 {
            let left = cursor_x + i32::from(glyph.x_offset);
            let top = cursor_y + i32::from(glyph.y_offset);
            let right = left + i32::from(glyph.width);
            let bottom = top + i32::from(glyph.height);
            extent = Some(match extent {
                None => (left, top, right, bottom),
                Some((l, t, r, b)) => (l.min(left), t.min(top), r.max(right), b.max(bottom)),
            });
        }
        cursor_x += i32::from(glyph.x_advance);
    }

    extent.map_or(
        TextBounds {
            x,
            y,
            width: 0,
            height: 0,
        },
        |(left, top, right, bottom)| TextBounds {
            x: left,
            y: top,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::tests::FONT;

    fn lit(frame: &StagingFrame) -> usize {
        frame.pixels().iter().filter(|c| **c != Color::BLACK).count()
    }

    /// Counts every pixel handed to it, on or off the canvas
    struct Counting {
        calls: usize,
    }

    impl Canvas for Counting {
        fn put_pixel(&mut self, _x: i32, _y: i32, _color: Color) {
            self.calls += 1;
        }

        fn bounds(&self) -> (i32, i32) {
            (32, 16)
        }
    }

    fn calls(draw: impl FnOnce(&mut Counting)) -> usize {
        let mut canvas = Counting { calls: 0 };
        draw(&mut canvas);
        canvas.calls
    }

    #[test]
    fn test_oversized_shapes_only_touch_visible_pixels() {
        assert_eq!(calls(|c| fill_rect(c, 0, 0, 4096, 4096, Color::RED)), 32 * 16);
        assert_eq!(calls(|c| fill_rect(c, -100, -100, 200, 101, Color::RED)), 32);
        assert_eq!(calls(|c| fill_rect(c, 40, 0, 8, 8, Color::RED)), 0);
        assert!(calls(|c| fill_circle(c, 16, 8, 20000, Color::RED)) <= 32 * 16);
        assert_eq!(calls(|c| draw_line(c, -30000, 3, 30000, 3, Color::RED)), 32);
        assert_eq!(calls(|c| draw_line(c, 5, -30000, 5, 30000, Color::RED)), 16);
        assert_eq!(calls(|c| draw_line(c, -30000, -30000, -20000, -25000, Color::RED)), 0);
        assert_eq!(calls(|c| draw_circle(c, 1000, 1000, 10, Color::RED)), 0);
    }

    #[test]
    fn test_huge_fill_circle_covers_canvas() {
        let mut frame = StagingFrame::new(32, 16);
        fill_circle(&mut frame, 16, 8, 20000, Color::RED);
        assert_eq!(lit(&frame), 32 * 16);
    }

    #[test]
    fn test_clipped_diagonal_matches_unclipped_pixels() {
        let mut clipped = StagingFrame::new(32, 16);
        draw_line(&mut clipped, -20, -10, 60, 30, Color::WHITE);
        let mut reference = StagingFrame::new(128, 64);
        draw_line(&mut reference, 0, 0, 80, 40, Color::WHITE);
        for y in 0..16 {
            for x in 0..32 {
                assert_eq!(clipped.pixel(x, y), reference.pixel(x + 20, y + 10));
            }
        }
    }

    #[test]
    fn test_horizontal_line_inclusive() {
        let mut frame = StagingFrame::new(32, 16);
        draw_line(&mut frame, 0, 0, 5, 0, Color::WHITE);
        assert_eq!(lit(&frame), 6);
        for x in 0..=5 {
            assert_eq!(frame.pixel(x, 0), Some(Color::WHITE));
        }
    }

    #[test]
    fn test_vertical_line_reversed_endpoints() {
        let mut frame = StagingFrame::new(32, 16);
        draw_line(&mut frame, 3, 9, 3, 2, Color::WHITE);
        assert_eq!(lit(&frame), 8);
    }

    #[test]
    fn test_diagonal_and_steep_lines_connected() {
        let mut frame = StagingFrame::new(32, 16);
        draw_line(&mut frame, 0, 0, 4, 4, Color::WHITE);
        assert_eq!(lit(&frame), 5);
        assert_eq!(frame.pixel(4, 4), Some(Color::WHITE));

        let mut frame = StagingFrame::new(32, 16);
        draw_line(&mut frame, 10, 15, 12, 0, Color::WHITE);
        // one pixel per row, nothing skipped
        assert_eq!(lit(&frame), 16);
        for y in 0..16 {
            assert!((10..=12).any(|x| frame.pixel(x, y) == Some(Color::WHITE)));
        }
    }

    #[test]
    fn test_line_clipped_off_screen() {
        let mut frame = StagingFrame::new(8, 8);
        draw_line(&mut frame, -4, 2, 3, 2, Color::WHITE);
        assert_eq!(lit(&frame), 4);
    }

    #[test]
    fn test_rect_outline_and_fill() {
        let mut frame = StagingFrame::new(32, 16);
        draw_rect(&mut frame, 1, 1, 4, 3, Color::WHITE);
        assert_eq!(lit(&frame), 10);
        assert_eq!(frame.pixel(2, 2), Some(Color::BLACK));

        let mut frame = StagingFrame::new(32, 16);
        fill_rect(&mut frame, 2, 2, 4, 4, Color::new(10, 20, 30));
        assert_eq!(lit(&frame), 16);

        fill_screen(&mut frame, Color::BLUE);
        assert!(frame.pixels().iter().all(|c| *c == Color::BLUE));
    }

    #[test]
    fn test_circle_outline_symmetric() {
        let mut frame = StagingFrame::new(32, 32);
        draw_circle(&mut frame, 16, 16, 5, Color::WHITE);
        for (dx, dy) in [(0, 5), (5, 0), (0, -5), (-5, 0)] {
            assert_eq!(frame.pixel(16 + dx, 16 + dy), Some(Color::WHITE));
        }
        assert_eq!(frame.pixel(16, 16), Some(Color::BLACK));
        // mirror image about the centre column and row
        for y in 1..32 {
            for x in 1..32 {
                assert_eq!(frame.pixel(x, y), frame.pixel(32 - x, y));
                assert_eq!(frame.pixel(x, y), frame.pixel(x, 32 - y));
            }
        }
    }

    #[test]
    fn test_fill_circle_covers_outline() {
        let mut outline = StagingFrame::new(32, 32);
        draw_circle(&mut outline, 16, 16, 6, Color::WHITE);
        let mut filled = StagingFrame::new(32, 32);
        fill_circle(&mut filled, 16, 16, 6, Color::WHITE);

        for y in 0..32 {
            for x in 0..32 {
                if outline.pixel(x, y) == Some(Color::WHITE) {
                    assert_eq!(filled.pixel(x, y), Some(Color::WHITE), "({x},{y})");
                }
            }
        }
        assert_eq!(filled.pixel(16, 16), Some(Color::WHITE));
        assert_eq!(filled.pixel(19, 19), Some(Color::WHITE));
        assert!(lit(&filled) > lit(&outline));
    }

    #[test]
    fn test_text_draws_glyph_bits_at_baseline() {
        let mut frame = StagingFrame::new(32, 16);
        draw_text(&mut frame, &FONT, "AB", 0, 8, Color::WHITE);
        // 'A' top row at y = 8 - 3
        assert_eq!(frame.pixel(0, 5), Some(Color::WHITE));
        assert_eq!(frame.pixel(1, 6), Some(Color::BLACK));
        // 'B' starts at x = 4 + 1, y = 8 - 2
        assert_eq!(frame.pixel(5, 6), Some(Color::WHITE));
        assert_eq!(frame.pixel(7, 7), Some(Color::WHITE));
        assert_eq!(lit(&frame), 7 + 2);
    }

    #[test]
    fn test_text_newline_and_unknown_chars() {
        let mut frame = StagingFrame::new(32, 16);
        draw_text(&mut frame, &FONT, "Az\nA", 2, 4, Color::WHITE);
        // second line starts back at x = 2, one line advance lower
        assert_eq!(frame.pixel(2, 1), Some(Color::WHITE));
        assert_eq!(frame.pixel(2, 6), Some(Color::WHITE));
        assert_eq!(lit(&frame), 14);
    }

    #[test]
    fn test_text_bounds() {
        let bounds = text_bounds(&FONT, "AB", 0, 8);
        assert_eq!(
            bounds,
            TextBounds {
                x: 0,
                y: 5,
                width: 8,
                height: 3
            }
        );

        let bounds = text_bounds(&FONT, "A\nA", 0, 8);
        assert_eq!(bounds.height, 8);
        assert_eq!(bounds.width, 3);

        assert_eq!(
            text_bounds(&FONT, "zz", 3, 4),
            TextBounds {
                x: 3,
                y: 4,
                width: 0,
                height: 0
            }
        );
    }
}
