//! Playback commands
//!
//! Every request a caller can make of the display is one [`Command`]
//! variant. Commands own their payloads, so a queued command never borrows
//! from its sender. The controller applies them in arrival order at the
//! start of each tick.
//!
//! ## Example
//!
//! ```
//! use pxmatrix::command::{Command, DisplayMode};
//! use pxmatrix::Color;
//!
//! let cmds = [
//!     Command::Mode(DisplayMode::Manual),
//!     Command::FillRect { x: 2, y: 2, width: 4, height: 4, color: Color::new(10, 20, 30) },
//!     Command::Update,
//! ];
//! assert!(cmds[1].is_drawing());
//! assert_eq!(cmds[2].name(), "update");
//! ```

use alloc::string::String;

use crate::color::Color;
use crate::font::Font;

/// What the controller renders each tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DisplayMode {
    /// Play the built-in RGB565 animations
    #[default]
    Animation = 0,
    /// Fill the panel with a solid colour
    Color = 1,
    /// Stream RGB888 frames from a file
    File = 2,
    /// Show only what drawing commands put in the staging frame
    Manual = 3,
}

impl DisplayMode {
    /// Decode from the `repr(u8)` value
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Animation),
            1 => Some(Self::Color),
            2 => Some(Self::File),
            3 => Some(Self::Manual),
            _ => None,
        }
    }
}

/// A request to the playback controller
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Ramp brightness toward `target` by `rate` per tick
    Brightness {
        /// Target brightness (clamped to `0..=2100` on submission)
        target: i16,
        /// Step per tick; its sign is corrected toward the target
        rate: i16,
    },
    /// Switch the panel supply and the refresh scan
    Power(bool),
    /// Change the render mode
    Mode(DisplayMode),
    /// Change the tick period in milliseconds
    Rate(u32),
    /// Select an animation (wrapped modulo the animation count)
    Animation(usize),
    /// Set the Color-mode fill
    Color(Color),
    /// Set the File-mode path
    File(String),
    /// Fill a rectangle in the staging frame
    FillRect {
        /// Left edge
        x: i16,
        /// Top edge
        y: i16,
        /// Width in pixels
        width: u16,
        /// Height in pixels
        height: u16,
        /// Fill colour
        color: Color,
    },
    /// Draw a line in the staging frame
    DrawLine {
        /// Start X
        x0: i16,
        /// Start Y
        y0: i16,
        /// End X
        x1: i16,
        /// End Y
        y1: i16,
        /// Line colour
        color: Color,
    },
    /// Draw a circle outline in the staging frame
    DrawCircle {
        /// Centre X
        x: i16,
        /// Centre Y
        y: i16,
        /// Radius in pixels
        radius: u16,
        /// Outline colour
        color: Color,
    },
    /// Fill a circle in the staging frame
    FillCircle {
        /// Centre X
        x: i16,
        /// Centre Y
        y: i16,
        /// Radius in pixels
        radius: u16,
        /// Fill colour
        color: Color,
    },
    /// Set one pixel in the staging frame
    SetPixel {
        /// X coordinate
        x: i16,
        /// Y coordinate
        y: i16,
        /// Pixel colour
        color: Color,
    },
    /// Publish the staging frame (Manual mode only)
    Update,
    /// Select the font used by [`Command::Print`]
    SetFont(&'static Font<'static>),
    /// Draw text into the staging frame with the current font
    Print {
        /// Text to draw; `\n` starts a new line
        text: String,
        /// Left edge of the first line
        x: i16,
        /// Baseline of the first line
        y: i16,
        /// Text colour
        color: Color,
    },
}

impl Command {
    /// Whether this command draws into the staging frame
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            Self::FillRect { .. }
                | Self::DrawLine { .. }
                | Self::DrawCircle { .. }
                | Self::FillCircle { .. }
                | Self::SetPixel { .. }
                | Self::Print { .. }
        )
    }

    /// Short name for log output
    pub fn name(&self) -> &'static str {
        match self {
            Self::Brightness { .. } => "brightness",
            Self::Power(_) => "power",
            Self::Mode(_) => "mode",
            Self::Rate(_) => "rate",
            Self::Animation(_) => "animation",
            Self::Color(_) => "color",
            Self::File(_) => "file",
            Self::FillRect { .. } => "fill_rect",
            Self::DrawLine { .. } => "draw_line",
            Self::DrawCircle { .. } => "draw_circle",
            Self::FillCircle { .. } => "fill_circle",
            Self::SetPixel { .. } => "set_pixel",
            Self::Update => "update",
            Self::SetFont(_) => "set_font",
            Self::Print { .. } => "print",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_u8() {
        for mode in [
            DisplayMode::Animation,
            DisplayMode::Color,
            DisplayMode::File,
            DisplayMode::Manual,
        ] {
            assert_eq!(DisplayMode::from_u8(mode as u8), Some(mode));
        }
        assert_eq!(DisplayMode::from_u8(4), None);
    }

    #[test]
    fn test_drawing_commands() {
        assert!(Command::SetPixel { x: 0, y: 0, color: Color::WHITE }.is_drawing());
        assert!(!Command::Update.is_drawing());
        assert!(!Command::Power(true).is_drawing());
    }
}
