//! RGB LED Matrix Panel Driver
//!
//! A driver for multiplexed RGB LED matrix panels (HUB75-style shift-register
//! columns with row-address multiplexing), for panels up to 1024x1024 pixels.
//!
//! ## Features
//!
//! - `no_std` + `alloc` throughout: bit-plane framebuffer, row-scan
//!   driver, rasterizer, GFX-style fonts and the playback runtime
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - 8-bit-per-channel colour through binary-coded bit planes with
//!   staggered channels
//! - Row patterns 1/4 to 1/32, binary or straight multiplexers, line,
//!   zigzag and zaggiz scan orders
//! - Rotation support
//! - Double buffering with tear-free swaps, command queue and playback
//!   controller, synchronized with `embassy-sync` so the scan can run from a
//!   timer interrupt
//! - Host filesystem frame files and a host critical section (with `std`
//!   feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use pxmatrix::{BitPlaneBuffer, Builder, Color, Geometry, Interface, RowPattern, ScanDriver};
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let spi = MockSpi;
//! # let mut delay = MockDelay;
//! let interface = Interface::new(spi, MockPin, MockPin, [MockPin, MockPin, MockPin]);
//! let geometry = match Geometry::new(32, 16) {
//!     Ok(geometry) => geometry,
//!     Err(_) => return,
//! };
//! let config = match Builder::new()
//!     .geometry(geometry)
//!     .row_pattern(RowPattern::Rows8)
//!     .build()
//! {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut frame = BitPlaneBuffer::new(&config);
//! frame.set_pixel(4, 2, Color::new(255, 128, 0));
//!
//! let mut driver = ScanDriver::new(interface);
//! let _ = driver.init();
//! // Call from a ~1 ms timer; on-time sets brightness
//! let _ = driver.refresh_cycle(&frame, 70, &mut delay);
//! ```

#![no_std]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

/// Built-in RGB565 animation table
pub mod animation;
/// RGB888 colour type
pub mod color;
/// Playback commands and render modes
pub mod command;
/// Panel configuration types and builder
pub mod config;
/// Playback controller
pub mod controller;
/// Error types for the driver
pub mod error;
/// GFX-style bitmap fonts
pub mod font;
/// Bit-plane framebuffer encoding
pub mod framebuffer;
/// Caller-facing display handle
pub mod handle;
/// Hardware interface abstraction
pub mod interface;
/// Bounded command queue
pub mod queue;
/// Line, rectangle, circle and text rasterization
pub mod raster;
/// Timer-driven refresh
pub mod refresh;
/// Coordinate rotation utilities
pub mod rotation;
/// Row-scan output driver
pub mod scan;
/// Manual-mode staging frame
pub mod staging;
/// Frame file access for File mode
pub mod storage;
/// Double-buffer swap coordination
pub mod swap;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use color::Color;
pub use command::{Command, DisplayMode};
pub use config::{
    Builder, COLOR_DEPTH, ColorOffsets, Config, Geometry, MAX_EDGE, MuxPattern, PlaybackConfig,
    RowPattern, Rotation, ScanPattern,
};
pub use controller::Controller;
pub use error::{BuilderError, Error, SwapTimeout};
pub use font::{Font, Glyph};
pub use framebuffer::{BitPlaneBuffer, PlaneLayout};
pub use handle::{DisplayHandle, DisplayStatus};
pub use interface::{Interface, InterfaceError, PanelInterface};
pub use raster::{Canvas, TextBounds};
pub use refresh::Refresher;
pub use scan::ScanDriver;
pub use staging::StagingFrame;
pub use storage::{FrameFile, FrameStore, NoStore};
pub use swap::{BufferId, DoubleBuffer};

#[cfg(feature = "std")]
pub use storage::FsStore;
