//! Hardware interface abstraction
//!
//! This module provides the [`PanelInterface`] trait and the [`Interface`] struct
//! for shifting row data into an RGB LED matrix panel over SPI.
//!
//! ## Hardware Requirements
//!
//! A HUB75-style panel needs:
//! - SPI bus (MOSI + SCK) feeding the column shift registers
//! - GPIO pins:
//!   - **LAT**: Latch (output, pulsed high to transfer shifted data)
//!   - **OE**: Output enable (output, active low)
//!   - **A..E**: Row group address lines (outputs, 2 to 5 of them)
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use pxmatrix::{Interface, PanelInterface};
//! # use core::convert::Infallible;
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
//! # let mut delay = MockDelay;
//! // 1/8 scan panel: three address lines
//! let mut interface = Interface::new(MockSpi, MockPin, MockPin, [MockPin, MockPin, MockPin]);
//!
//! // Select row group 5, shift a row block and show it for 20us
//! let _ = interface.set_address(5);
//! let _ = interface.send_row(&[0xFF; 24]);
//! let _ = interface.latch();
//! let _ = interface.show(20, &mut delay);
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use crate::config::MuxPattern;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Trait for the hardware interface to a multiplexed LED panel
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`ScanDriver`](crate::scan::ScanDriver) to work with any
/// SPI + GPIO implementation that satisfies embedded-hal traits.
///
/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct. If the panel is
/// driven through a parallel bus or DMA peripheral instead, implement this
/// trait on your own type.
pub trait PanelInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Drive the row group address lines
    ///
    /// # Errors
    ///
    /// Returns an error if a GPIO write fails.
    fn set_address(&mut self, address: u8) -> InterfaceResult<(), Self::Error>;

    /// Shift one row block into the column drivers
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails.
    fn send_row(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Pulse the latch line high then low
    ///
    /// # Errors
    ///
    /// Returns an error if a GPIO write fails.
    fn latch(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Light the latched row for `on_time_us` microseconds
    ///
    /// The implementation must assert output-enable, wait, then deassert it.
    ///
    /// # Errors
    ///
    /// Returns an error if a GPIO write fails.
    fn show<D: DelayNs>(
        &mut self,
        on_time_us: u32,
        delay: &mut D,
    ) -> InterfaceResult<(), Self::Error>;

    /// Deassert output-enable so the panel stays dark
    ///
    /// # Errors
    ///
    /// Returns an error if a GPIO write fails.
    fn blank(&mut self) -> InterfaceResult<(), Self::Error>;
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// SPI + GPIO interface for HUB75-style panels
///
/// Implements [`PanelInterface`] for embedded-hal v1.0 SPI and GPIO traits.
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `LAT` - Latch pin implementing [`OutputPin`]
/// * `OE` - Output-enable pin implementing [`OutputPin`] (active low)
/// * `ADDR` - Address line pin type implementing [`OutputPin`]
/// * `N` - Number of address lines (A, B, C, ...)
pub struct Interface<SPI, LAT, OE, ADDR, const N: usize> {
    /// SPI device feeding the column shift registers
    spi: SPI,
    /// Latch pin (pulsed high)
    latch: LAT,
    /// Output-enable pin (active low)
    oe: OE,
    /// Address lines, A first
    address: [ADDR; N],
    /// How addresses are encoded on the lines
    mux_pattern: MuxPattern,
}

impl<SPI, LAT, OE, ADDR, const N: usize> Interface<SPI, LAT, OE, ADDR, N>
where
    SPI: SpiDevice,
    LAT: OutputPin,
    OE: OutputPin,
    ADDR: OutputPin,
{
    /// Create a new Interface using binary address encoding
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI device (must implement [`SpiDevice`])
    /// * `latch` - Latch pin
    /// * `oe` - Output-enable pin (active low)
    /// * `address` - Address lines, A first
    pub fn new(spi: SPI, latch: LAT, oe: OE, address: [ADDR; N]) -> Self {
        Self {
            spi,
            latch,
            oe,
            address,
            mux_pattern: MuxPattern::Binary,
        }
    }

    /// Set how row group addresses are encoded on the lines
    pub fn set_mux_pattern(&mut self, mux_pattern: MuxPattern) -> &mut Self {
        self.mux_pattern = mux_pattern;
        self
    }

    /// Get the address encoding
    pub fn mux_pattern(&self) -> MuxPattern {
        self.mux_pattern
    }

    /// Release the SPI device and pins
    pub fn release(self) -> (SPI, LAT, OE, [ADDR; N]) {
        (self.spi, self.latch, self.oe, self.address)
    }
}

/// Level of address line `line` for `address`
///
/// Binary encoding drives bit `line` of the address. Straight encoding pulls
/// only the selected line low.
pub fn address_level(mux_pattern: MuxPattern, address: u8, line: usize) -> bool {
    match mux_pattern {
        MuxPattern::Binary => line < 8 && (address >> line) & 1 == 1,
        MuxPattern::Straight => usize::from(address) != line,
    }
}

impl<SPI, LAT, OE, ADDR, PinErr, const N: usize> PanelInterface
    for Interface<SPI, LAT, OE, ADDR, N>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    LAT: OutputPin<Error = PinErr>,
    OE: OutputPin<Error = PinErr>,
    ADDR: OutputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn set_address(&mut self, address: u8) -> InterfaceResult<(), Self::Error> {
        let pattern = self.mux_pattern;
        for (line, pin) in self.address.iter_mut().enumerate() {
            if address_level(pattern, address, line) {
                pin.set_high().map_err(InterfaceError::Pin)?;
            } else {
                pin.set_low().map_err(InterfaceError::Pin)?;
            }
        }
        Ok(())
    }

    fn send_row(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.spi.write(data).map_err(InterfaceError::Spi)
    }

    fn latch(&mut self) -> InterfaceResult<(), Self::Error> {
        self.latch.set_high().map_err(InterfaceError::Pin)?;
        self.latch.set_low().map_err(InterfaceError::Pin)
    }

    fn show<D: DelayNs>(
        &mut self,
        on_time_us: u32,
        delay: &mut D,
    ) -> InterfaceResult<(), Self::Error> {
        self.oe.set_low().map_err(InterfaceError::Pin)?;
        delay.delay_us(on_time_us);
        self.oe.set_high().map_err(InterfaceError::Pin)
    }

    fn blank(&mut self) -> InterfaceResult<(), Self::Error> {
        self.oe.set_high().map_err(InterfaceError::Pin)
    }
}
