//! Row-scan driver
//!
//! [`ScanDriver`] turns a [`BitPlaneBuffer`] into timed panel output. One
//! scan step selects a row group, shifts that group's row block for one bit
//! plane, latches it and lights it for the caller's on-time. Every plane is
//! shown for the same on-time; plane weighting comes only from how many
//! planes a channel level lights.
//!
//! A refresh cycle is every plane over every row group:
//!
//! ```text
//! for plane in 0..8 {
//!     for mux in 0..row_pattern {
//!         set_address(mux); send_row(block); latch(); show(on_time);
//!     }
//! }
//! ```
//!
//! Transport errors abort the step and are returned; nothing is retried.

use embedded_hal::delay::DelayNs;

use crate::config::COLOR_DEPTH;
use crate::error::Error;
use crate::framebuffer::BitPlaneBuffer;
use crate::interface::PanelInterface;

type ScanResult<I> = core::result::Result<(), Error<I>>;

/// Drives bit-plane data onto the panel through a [`PanelInterface`]
pub struct ScanDriver<I>
where
    I: PanelInterface,
{
    /// Hardware interface
    interface: I,
    /// Zero-filled row block used by [`ScanDriver::flush`]
    blank_row: alloc::vec::Vec<u8>,
}

impl<I> ScanDriver<I>
where
    I: PanelInterface,
{
    /// Create a new driver
    pub fn new(interface: I) -> Self {
        Self {
            interface,
            blank_row: alloc::vec::Vec::new(),
        }
    }

    /// Put the panel in a known state: dark, address 0
    pub fn init(&mut self) -> ScanResult<I> {
        self.interface.blank().map_err(Error::Interface)?;
        self.interface.set_address(0).map_err(Error::Interface)
    }

    /// Turn the panel output off
    pub fn blank(&mut self) -> ScanResult<I> {
        self.interface.blank().map_err(Error::Interface)
    }

    /// Shift and latch an all-zero row block for every row group
    ///
    /// Clears whatever the column drivers were last holding. Output stays
    /// disabled.
    pub fn flush(&mut self, buffer: &BitPlaneBuffer) -> ScanResult<I> {
        let layout = buffer.layout();
        self.blank_row.clear();
        self.blank_row.resize(layout.send_buffer_size(), 0);

        self.interface.blank().map_err(Error::Interface)?;
        for mux in 0..layout.row_pattern() {
            self.interface.set_address(mux).map_err(Error::Interface)?;
            self.interface
                .send_row(&self.blank_row)
                .map_err(Error::Interface)?;
            self.interface.latch().map_err(Error::Interface)?;
        }
        Ok(())
    }

    /// Output one row group of one bit plane
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPlane`] or [`Error::InvalidAddress`] for
    /// out-of-range indices, [`Error::BufferTooSmall`] if the buffer does not
    /// hold a full frame, and [`Error::Interface`] on transport failure.
    pub fn scan_step<D: DelayNs>(
        &mut self,
        buffer: &BitPlaneBuffer,
        plane: usize,
        mux: u8,
        on_time_us: u32,
        delay: &mut D,
    ) -> ScanResult<I> {
        let layout = buffer.layout();
        if plane >= COLOR_DEPTH {
            return Err(Error::InvalidPlane { plane });
        }
        if mux >= layout.row_pattern() {
            return Err(Error::InvalidAddress {
                address: mux,
                row_pattern: layout.row_pattern(),
            });
        }
        let block = buffer.row_block(plane, mux).ok_or(Error::BufferTooSmall {
            required: layout.buffer_size(),
            provided: buffer.as_bytes().len(),
        })?;

        self.interface.set_address(mux).map_err(Error::Interface)?;
        self.interface.send_row(block).map_err(Error::Interface)?;
        self.interface.latch().map_err(Error::Interface)?;
        self.interface
            .show(on_time_us, delay)
            .map_err(Error::Interface)
    }

    /// Output one bit plane over every row group
    pub fn scan_plane<D: DelayNs>(
        &mut self,
        buffer: &BitPlaneBuffer,
        plane: usize,
        on_time_us: u32,
        delay: &mut D,
    ) -> ScanResult<I> {
        for mux in 0..buffer.layout().row_pattern() {
            self.scan_step(buffer, plane, mux, on_time_us, delay)?;
        }
        Ok(())
    }

    /// Output a full refresh cycle: every plane over every row group
    pub fn refresh_cycle<D: DelayNs>(
        &mut self,
        buffer: &BitPlaneBuffer,
        on_time_us: u32,
        delay: &mut D,
    ) -> ScanResult<I> {
        for plane in 0..COLOR_DEPTH {
            self.scan_plane(buffer, plane, on_time_us, delay)?;
        }
        Ok(())
    }

    /// Get a reference to the interface
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Get a mutable reference to the interface
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Release the interface
    pub fn release(self) -> I {
        self.interface
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::color::Color;
    use crate::config::{Builder, Geometry, RowPattern};
    use alloc::vec::Vec;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Address(u8),
        Row(Vec<u8>),
        Latch,
        Show(u32),
        Blank,
    }

    #[derive(Debug, Default)]
    pub(crate) struct MockInterface {
        pub(crate) calls: Vec<Call>,
        pub(crate) fail_rows: bool,
    }

    impl PanelInterface for MockInterface {
        type Error = &'static str;

        fn set_address(&mut self, address: u8) -> Result<(), Self::Error> {
            self.calls.push(Call::Address(address));
            Ok(())
        }

        fn send_row(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            if self.fail_rows {
                return Err("spi");
            }
            self.calls.push(Call::Row(data.to_vec()));
            Ok(())
        }

        fn latch(&mut self) -> Result<(), Self::Error> {
            self.calls.push(Call::Latch);
            Ok(())
        }

        fn show<D: DelayNs>(&mut self, on_time_us: u32, _delay: &mut D) -> Result<(), Self::Error> {
            self.calls.push(Call::Show(on_time_us));
            Ok(())
        }

        fn blank(&mut self) -> Result<(), Self::Error> {
            self.calls.push(Call::Blank);
            Ok(())
        }
    }

    pub(crate) struct MockDelay;

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn buffer() -> BitPlaneBuffer {
        let config = Builder::new()
            .geometry(Geometry::new(32, 16).unwrap())
            .row_pattern(RowPattern::Rows8)
            .build()
            .unwrap();
        BitPlaneBuffer::new(&config)
    }

    #[test]
    fn test_scan_step_sequence() {
        let mut buf = buffer();
        buf.fill(Color::WHITE);
        let mut driver = ScanDriver::new(MockInterface::default());
        driver.scan_step(&buf, 3, 5, 17, &mut MockDelay).unwrap();

        let calls = &driver.interface().calls;
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], Call::Address(5));
        assert_eq!(calls[1], Call::Row(buf.row_block(3, 5).unwrap().to_vec()));
        assert_eq!(calls[2], Call::Latch);
        assert_eq!(calls[3], Call::Show(17));
    }

    #[test]
    fn test_refresh_cycle_visits_each_plane_and_address_once_in_order() {
        let buf = buffer();
        let mut driver = ScanDriver::new(MockInterface::default());
        driver.refresh_cycle(&buf, 9, &mut MockDelay).unwrap();

        let calls = &driver.interface().calls;
        assert_eq!(calls.len(), 8 * 8 * 4);

        let addresses: Vec<u8> = calls
            .iter()
            .filter_map(|c| match c {
                Call::Address(a) => Some(*a),
                _ => None,
            })
            .collect();
        let expected: Vec<u8> = (0..8).flat_map(|_| 0..8u8).collect();
        assert_eq!(addresses, expected);

        // Rows come out in memory order: plane-major, then address
        let rows: Vec<u8> = calls
            .iter()
            .filter_map(|c| match c {
                Call::Row(r) => Some(r.clone()),
                _ => None,
            })
            .flatten()
            .collect();
        assert_eq!(rows.as_slice(), buf.as_bytes());

        assert!(
            calls
                .iter()
                .filter(|c| matches!(c, Call::Show(_)))
                .all(|c| *c == Call::Show(9))
        );
    }

    #[test]
    fn test_invalid_indices_rejected() {
        let buf = buffer();
        let mut driver = ScanDriver::new(MockInterface::default());
        assert!(matches!(
            driver.scan_step(&buf, 8, 0, 1, &mut MockDelay),
            Err(Error::InvalidPlane { plane: 8 })
        ));
        assert!(matches!(
            driver.scan_step(&buf, 0, 8, 1, &mut MockDelay),
            Err(Error::InvalidAddress {
                address: 8,
                row_pattern: 8
            })
        ));
        assert!(driver.interface().calls.is_empty());
    }

    #[test]
    fn test_transport_error_aborts_step() {
        let buf = buffer();
        let mut driver = ScanDriver::new(MockInterface {
            fail_rows: true,
            ..MockInterface::default()
        });
        let result = driver.scan_plane(&buf, 0, 1, &mut MockDelay);
        assert!(matches!(result, Err(Error::Interface("spi"))));
        // Address was set, nothing latched or shown
        assert_eq!(driver.interface().calls, [Call::Address(0)]);
    }

    #[test]
    fn test_flush_sends_zero_blocks() {
        let mut buf = buffer();
        buf.fill(Color::WHITE);
        let mut driver = ScanDriver::new(MockInterface::default());
        driver.flush(&buf).unwrap();

        let calls = &driver.interface().calls;
        assert_eq!(calls[0], Call::Blank);
        assert_eq!(calls.len(), 1 + 8 * 3);
        assert!(calls.iter().all(|c| match c {
            Call::Row(r) => r.len() == 24 && r.iter().all(|&b| b == 0),
            _ => true,
        }));
        assert!(!calls.iter().any(|c| matches!(c, Call::Show(_))));
    }

    #[test]
    fn test_init_blanks_and_resets_address() {
        let mut driver = ScanDriver::new(MockInterface::default());
        driver.init().unwrap();
        assert_eq!(driver.interface().calls, [Call::Blank, Call::Address(0)]);
    }
}
