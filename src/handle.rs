//! Caller-facing display handle
//!
//! [`DisplayHandle`] is the thread-safe front door: every setter validates
//! its arguments, turns them into a [`Command`] and enqueues it without
//! blocking. Getters read the [`DisplayStatus`] the controller publishes at
//! the end of each tick, so they reflect applied state rather than queued
//! requests.

use alloc::string::String;
use alloc::sync::Arc;
use core::cell::Cell;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicI16, AtomicU8, AtomicUsize, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::color::Color;
use crate::command::{Command, DisplayMode};
use crate::config::{clamp_brightness, clamp_dim_rate, clamp_rate, on_time_us};
use crate::font::Font;
use crate::queue::CommandSender;
use crate::raster::{TextBounds, text_bounds};

/// Where [`DisplayHandle::print`] starts text
pub const PRINT_ORIGIN: (i16, i16) = (0, 8);

/// Colour [`DisplayHandle::print`] uses
pub const PRINT_COLOR: Color = Color::GREY;

/// Controller state visible to callers and the scanner
pub struct DisplayStatus {
    power: AtomicBool,
    mode: AtomicU8,
    brightness: AtomicI16,
    animation: AtomicUsize,
    font: Mutex<CriticalSectionRawMutex, Cell<Option<&'static Font<'static>>>>,
}

impl DisplayStatus {
    pub(crate) fn new(power: bool, brightness: i16, animation: usize) -> Self {
        Self {
            power: AtomicBool::new(power),
            mode: AtomicU8::new(DisplayMode::default() as u8),
            brightness: AtomicI16::new(brightness),
            animation: AtomicUsize::new(animation),
            font: Mutex::new(Cell::new(None)),
        }
    }

    pub(crate) fn publish(&self, power: bool, mode: DisplayMode, brightness: i16, animation: usize) {
        self.power.store(power, Ordering::Relaxed);
        self.mode.store(mode as u8, Ordering::Relaxed);
        self.brightness.store(brightness, Ordering::Relaxed);
        self.animation.store(animation, Ordering::Relaxed);
    }

    pub(crate) fn set_font(&self, font: &'static Font<'static>) {
        self.font.lock(|slot| slot.set(Some(font)));
    }

    /// Whether the panel is powered
    pub fn power(&self) -> bool {
        self.power.load(Ordering::Relaxed)
    }

    /// Current render mode
    pub fn mode(&self) -> DisplayMode {
        DisplayMode::from_u8(self.mode.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Current brightness, `0..=2100`
    pub fn brightness(&self) -> i16 {
        self.brightness.load(Ordering::Relaxed)
    }

    /// Output-enable on-time the scanner should use
    pub fn on_time_us(&self) -> u32 {
        on_time_us(self.brightness())
    }

    /// Current animation index
    pub fn animation(&self) -> usize {
        self.animation.load(Ordering::Relaxed)
    }

    /// Font applied by the last `SetFont`
    pub fn font(&self) -> Option<&'static Font<'static>> {
        self.font.lock(Cell::get)
    }
}

impl fmt::Debug for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayStatus")
            .field("power", &self.power())
            .field("mode", &self.mode())
            .field("brightness", &self.brightness())
            .field("animation", &self.animation())
            .finish_non_exhaustive()
    }
}

/// Cloneable, thread-safe handle for controlling the display
#[derive(Clone, Debug)]
pub struct DisplayHandle {
    sender: CommandSender,
    status: Arc<DisplayStatus>,
    width: u16,
    height: u16,
    animation_count: usize,
}

impl DisplayHandle {
    pub(crate) fn new(
        sender: CommandSender,
        status: Arc<DisplayStatus>,
        width: u16,
        height: u16,
        animation_count: usize,
    ) -> Self {
        Self {
            sender,
            status,
            width,
            height,
            animation_count,
        }
    }

    /// Shared status published by the controller
    pub fn status(&self) -> &Arc<DisplayStatus> {
        &self.status
    }

    /// Enqueue a raw command
    ///
    /// No clamping is applied; prefer the typed setters.
    pub fn send(&self, command: Command) -> bool {
        self.sender.send(command)
    }

    /// Ramp brightness toward `target` by `rate` per tick
    ///
    /// `target` is clamped to `0..=2100` and the magnitude of `rate` to
    /// `1..=100`. The controller fixes the sign of `rate`.
    pub fn set_brightness(&self, target: i16, rate: i16) -> bool {
        self.send(Command::Brightness {
            target: clamp_brightness(target),
            rate: clamp_dim_rate(rate),
        })
    }

    /// Switch the panel on or off
    pub fn set_power(&self, on: bool) -> bool {
        self.send(Command::Power(on))
    }

    /// Change the render mode
    pub fn set_mode(&self, mode: DisplayMode) -> bool {
        self.send(Command::Mode(mode))
    }

    /// Change the tick period, clamped to at least 33 ms
    pub fn set_rate(&self, rate_ms: u32) -> bool {
        self.send(Command::Rate(clamp_rate(rate_ms)))
    }

    /// Select an animation, wrapped modulo the animation count
    pub fn set_animation(&self, index: usize) -> bool {
        let index = index.checked_rem(self.animation_count).unwrap_or(0);
        self.send(Command::Animation(index))
    }

    /// Set the Color-mode fill
    pub fn set_color(&self, color: Color) -> bool {
        self.send(Command::Color(color))
    }

    /// Set the File-mode path
    pub fn set_file(&self, path: &str) -> bool {
        self.send(Command::File(String::from(path)))
    }

    /// Publish the staging frame (Manual mode)
    pub fn update(&self) -> bool {
        self.send(Command::Update)
    }

    /// Fill a rectangle in the staging frame
    pub fn fill_rect(&self, x: i16, y: i16, width: u16, height: u16, color: Color) -> bool {
        self.send(Command::FillRect {
            x,
            y,
            width,
            height,
            color,
        })
    }

    /// Fill the whole staging frame
    pub fn fill_screen(&self, color: Color) -> bool {
        self.fill_rect(0, 0, self.width, self.height, color)
    }

    /// Draw a line in the staging frame, both endpoints included
    pub fn draw_line(&self, x0: i16, y0: i16, x1: i16, y1: i16, color: Color) -> bool {
        self.send(Command::DrawLine {
            x0,
            y0,
            x1,
            y1,
            color,
        })
    }

    /// Draw a rectangle outline as four lines
    ///
    /// Returns `true` only if all four were queued.
    pub fn draw_rect(&self, x: i16, y: i16, width: u16, height: u16, color: Color) -> bool {
        if width == 0 || height == 0 {
            return true;
        }
        let right = x.saturating_add_unsigned(width - 1);
        let bottom = y.saturating_add_unsigned(height - 1);
        [
            (x, y, right, y),
            (x, y, x, bottom),
            (right, y, right, bottom),
            (x, bottom, right, bottom),
        ]
        .into_iter()
        .fold(true, |queued, (x0, y0, x1, y1)| {
            self.draw_line(x0, y0, x1, y1, color) && queued
        })
    }

    /// Draw a circle outline in the staging frame
    pub fn draw_circle(&self, x: i16, y: i16, radius: u16, color: Color) -> bool {
        self.send(Command::DrawCircle {
            x,
            y,
            radius,
            color,
        })
    }

    /// Fill a circle in the staging frame
    pub fn fill_circle(&self, x: i16, y: i16, radius: u16, color: Color) -> bool {
        self.send(Command::FillCircle {
            x,
            y,
            radius,
            color,
        })
    }

    /// Set one pixel in the staging frame
    pub fn set_pixel(&self, x: i16, y: i16, color: Color) -> bool {
        self.send(Command::SetPixel { x, y, color })
    }

    /// Select the font used for printing
    pub fn set_font(&self, font: &'static Font<'static>) -> bool {
        self.send(Command::SetFont(font))
    }

    /// Print text at [`PRINT_ORIGIN`] in [`PRINT_COLOR`]
    pub fn print(&self, text: &str) -> bool {
        self.print_at(text, PRINT_ORIGIN.0, PRINT_ORIGIN.1, PRINT_COLOR)
    }

    /// Print text with its first baseline at `(x, y)`
    pub fn print_at(&self, text: &str, x: i16, y: i16, color: Color) -> bool {
        self.send(Command::Print {
            text: String::from(text),
            x,
            y,
            color,
        })
    }

    /// Whether the panel is powered
    pub fn power(&self) -> bool {
        self.status.power()
    }

    /// Current render mode
    pub fn mode(&self) -> DisplayMode {
        self.status.mode()
    }

    /// Current brightness
    pub fn brightness(&self) -> i16 {
        self.status.brightness()
    }

    /// Current animation index
    pub fn animation(&self) -> usize {
        self.status.animation()
    }

    /// Number of built-in animations
    pub fn animation_count(&self) -> usize {
        self.animation_count
    }

    /// Logical width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Logical height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Measure text in the current font
    ///
    /// Returns `None` until a font has been applied.
    pub fn text_bounds(&self, text: &str, x: i16, y: i16) -> Option<TextBounds> {
        let font = self.status.font()?;
        Some(text_bounds(font, text, i32::from(x), i32::from(y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::tests::FONT;
    use crate::queue::{CommandReceiver, QUEUE_CAPACITY, command_queue};
    use std::vec::Vec;

    fn handle() -> (DisplayHandle, CommandReceiver) {
        let (tx, rx) = command_queue();
        let status = Arc::new(DisplayStatus::new(true, 0, 0));
        (DisplayHandle::new(tx, status, 32, 16, 3), rx)
    }

    fn drain(rx: &CommandReceiver) -> Vec<Command> {
        core::iter::from_fn(|| rx.try_recv()).collect()
    }

    #[test]
    fn test_setters_clamp() {
        let (handle, rx) = handle();
        handle.set_brightness(5000, 0);
        handle.set_brightness(-10, -500);
        handle.set_rate(1);
        handle.set_animation(7);
        assert_eq!(
            drain(&rx),
            [
                Command::Brightness {
                    target: 2100,
                    rate: 1
                },
                Command::Brightness {
                    target: 0,
                    rate: -100
                },
                Command::Rate(33),
                Command::Animation(1),
            ]
        );
    }

    #[test]
    fn test_draw_rect_is_four_lines() {
        let (handle, rx) = handle();
        assert!(handle.draw_rect(1, 2, 4, 3, Color::RED));
        let lines = drain(&rx);
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            Command::DrawLine {
                x0: 1,
                y0: 2,
                x1: 4,
                y1: 2,
                color: Color::RED
            }
        );
        assert_eq!(
            lines[3],
            Command::DrawLine {
                x0: 1,
                y0: 4,
                x1: 4,
                y1: 4,
                color: Color::RED
            }
        );
    }

    #[test]
    fn test_fill_screen_and_print_defaults() {
        let (handle, rx) = handle();
        handle.fill_screen(Color::BLUE);
        handle.print("hi");
        assert_eq!(
            drain(&rx),
            [
                Command::FillRect {
                    x: 0,
                    y: 0,
                    width: 32,
                    height: 16,
                    color: Color::BLUE
                },
                Command::Print {
                    text: String::from("hi"),
                    x: 0,
                    y: 8,
                    color: Color::GREY
                },
            ]
        );
    }

    #[test]
    fn test_full_queue_reports_false() {
        let (handle, rx) = handle();
        for _ in 0..QUEUE_CAPACITY - 1 {
            assert!(handle.update());
        }
        assert!(handle.set_power(false));
        assert!(!handle.set_power(true));
        // four lines, none fit
        assert!(!handle.draw_rect(0, 0, 2, 2, Color::WHITE));
        assert_eq!(drain(&rx).last(), Some(&Command::Power(false)));
    }

    #[test]
    fn test_text_bounds_needs_font() {
        let (handle, _rx) = handle();
        assert_eq!(handle.text_bounds("AB", 0, 8), None);
        handle.status().set_font(&FONT);
        assert!(handle.text_bounds("AB", 0, 8).is_some());
    }

    #[test]
    fn test_status_reads_published_values() {
        let (handle, _rx) = handle();
        handle
            .status()
            .publish(false, DisplayMode::File, 900, 2);
        assert!(!handle.power());
        assert_eq!(handle.mode(), DisplayMode::File);
        assert_eq!(handle.brightness(), 900);
        assert_eq!(handle.status().on_time_us(), 30);
        assert_eq!(handle.animation(), 2);
    }
}
