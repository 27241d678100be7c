//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`]),
//! row-scan operations ([`Error`]) and the double-buffer hand-off ([`SwapTimeout`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors while shifting bit planes out to the panel
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//! - [`SwapTimeout`] - The scanner did not finish a refresh cycle in time
//!
//! ## Example
//!
//! ```
//! use pxmatrix::{Builder, BuilderError, Geometry, RowPattern};
//!
//! // Missing geometry
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingGeometry)));
//!
//! // Width must be a multiple of 8
//! assert!(Geometry::new(30, 16).is_err());
//!
//! // A 1/16 scan needs at least 16 rows
//! let geometry = Geometry::new(32, 8).unwrap();
//! let result = Builder::new().geometry(geometry).row_pattern(RowPattern::Rows16).build();
//! assert!(matches!(result, Err(BuilderError::InvalidRowPattern { .. })));
//! ```

use crate::interface::PanelInterface;

/// Largest panel edge accepted by [`Geometry::new`](crate::config::Geometry::new)
///
/// Chained panels are addressed as one wide matrix, so the limit is generous.
pub const MAX_EDGE: u16 = 1024;

/// Errors that can occur while driving the panel
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying hardware error.
#[derive(Debug)]
pub enum Error<I: PanelInterface> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying hardware error from the [`PanelInterface`] implementation.
    /// The failed step is not retried.
    Interface(I::Error),
    /// Bit-plane buffer is too small for the configured geometry
    ///
    /// The buffer must hold `8 * plane_size` bytes.
    BufferTooSmall {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
    /// Bit plane index outside `0..8`
    InvalidPlane {
        /// Requested plane
        plane: usize,
    },
    /// Multiplexer address outside `0..row_pattern`
    InvalidAddress {
        /// Requested address
        address: u8,
        /// Number of multiplexed row groups
        row_pattern: u8,
    },
}

impl<I: PanelInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(_) => write!(f, "Interface error"),
            Self::BufferTooSmall { required, provided } => {
                write!(
                    f,
                    "Buffer too small: required {required} bytes, provided {provided}"
                )
            }
            Self::InvalidPlane { plane } => write!(f, "Invalid bit plane: {plane}"),
            Self::InvalidAddress {
                address,
                row_pattern,
            } => {
                write!(
                    f,
                    "Invalid mux address {address} for 1/{row_pattern} scan"
                )
            }
        }
    }
}

impl<I: PanelInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before any buffer is allocated.
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// Geometry was not specified
    ///
    /// [`Builder::geometry()`](crate::config::Builder::geometry) must be called before building.
    MissingGeometry,
    /// Invalid panel size
    ///
    /// See [`Geometry::new()`](crate::config::Geometry::new) for constraints.
    InvalidGeometry {
        /// Width in pixels requested
        width: u16,
        /// Height in pixels requested
        height: u16,
    },
    /// Row pattern does not evenly divide the panel height
    InvalidRowPattern {
        /// Multiplexed row groups requested
        row_pattern: u8,
        /// Panel height in pixels
        height: u16,
    },
    /// Unsupported row pattern value
    UnsupportedRowPattern(u16),
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingGeometry => write!(f, "Geometry must be specified"),
            Self::InvalidGeometry { width, height } => write!(
                f,
                "Invalid geometry {width}x{height} (max {MAX_EDGE}x{MAX_EDGE}, width must be multiple of 8)"
            ),
            Self::InvalidRowPattern {
                row_pattern,
                height,
            } => write!(
                f,
                "Row pattern 1/{row_pattern} does not divide panel height {height}"
            ),
            Self::UnsupportedRowPattern(rows) => {
                write!(f, "Unsupported row pattern {rows} (expected 4, 8, 16 or 32)")
            }
        }
    }
}

impl core::error::Error for BuilderError {}

/// The scanner did not signal swap-ready within the wait bound
///
/// Returned by [`DoubleBuffer::swap_buffer`](crate::swap::DoubleBuffer::swap_buffer).
/// The write target is left unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwapTimeout {
    /// How long the writer waited, in milliseconds
    pub waited_ms: u32,
}

impl core::fmt::Display for SwapTimeout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Timed out after {}ms waiting for buffer swap", self.waited_ms)
    }
}

impl core::error::Error for SwapTimeout {}
