//! Periodic refresh
//!
//! [`Refresher`] is what the periodic timer calls. Each tick outputs one
//! bit plane of the active buffer over every row group, so eight ticks make
//! a refresh cycle. Cycle boundaries are reported to the [`DoubleBuffer`],
//! which is the only place a new frame can become visible.
//!
//! ```text
//! tick 0: begin_cycle, plane 0
//! tick 1: plane 1
//! ...
//! tick 7: plane 7, end_cycle
//! ```

use alloc::sync::Arc;

use embedded_hal::delay::DelayNs;

use crate::config::COLOR_DEPTH;
use crate::error::Error;
use crate::interface::PanelInterface;
use crate::scan::ScanDriver;
use crate::swap::DoubleBuffer;

/// Timer-driven scanner over a shared [`DoubleBuffer`]
pub struct Refresher<I>
where
    I: PanelInterface,
{
    driver: ScanDriver<I>,
    frames: Arc<DoubleBuffer>,
    plane: usize,
    blanked: bool,
    skipped: u32,
}

impl<I> Refresher<I>
where
    I: PanelInterface,
{
    /// Create a refresher starting at plane 0
    pub fn new(driver: ScanDriver<I>, frames: Arc<DoubleBuffer>) -> Self {
        Self {
            driver,
            frames,
            plane: 0,
            blanked: false,
            skipped: 0,
        }
    }

    /// Run one timer tick
    ///
    /// While scanning is stopped the panel is blanked once and the tick
    /// returns without touching the buffers. A plane whose buffer is
    /// momentarily held by the writer is skipped, never waited for.
    ///
    /// # Errors
    ///
    /// Transport errors from the plane output are returned after the plane
    /// counter has advanced, so one bad plane does not stall the cycle.
    pub fn tick<D: DelayNs>(&mut self, on_time_us: u32, delay: &mut D) -> Result<(), Error<I>> {
        if !self.frames.is_scanning() {
            if !self.blanked {
                log::debug!("scan stopped, blanking panel");
                self.plane = 0;
                self.blanked = true;
                self.driver.blank()?;
            }
            return Ok(());
        }
        self.blanked = false;

        if self.plane == 0 {
            self.frames.begin_cycle();
        }
        let plane = self.plane;
        let driver = &mut self.driver;
        let result = match self
            .frames
            .with_active(|buffer| driver.scan_plane(buffer, plane, on_time_us, delay))
        {
            Some(result) => result,
            None => {
                self.skipped = self.skipped.wrapping_add(1);
                log::trace!("plane {} skipped, buffer busy", plane);
                Ok(())
            }
        };

        self.plane += 1;
        if self.plane == COLOR_DEPTH {
            self.plane = 0;
            self.frames.end_cycle();
        }
        result
    }

    /// Plane the next tick will output
    pub fn plane(&self) -> usize {
        self.plane
    }

    /// Planes skipped because the writer held the active buffer
    pub fn skipped_planes(&self) -> u32 {
        self.skipped
    }

    /// Shared frame storage
    pub fn frames(&self) -> &Arc<DoubleBuffer> {
        &self.frames
    }

    /// Get a reference to the scan driver
    pub fn driver(&self) -> &ScanDriver<I> {
        &self.driver
    }

    /// Get a mutable reference to the scan driver
    pub fn driver_mut(&mut self) -> &mut ScanDriver<I> {
        &mut self.driver
    }

    /// Release the scan driver
    pub fn release(self) -> ScanDriver<I> {
        self.driver
    }
}
