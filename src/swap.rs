//! Double-buffered frame storage shared between the writer and the scanner
//!
//! Two [`BitPlaneBuffer`]s are kept. The writer draws into the *selected*
//! buffer while the refresh scan reads the *active* one. The active buffer
//! only changes at a refresh-cycle boundary, so the panel never shows a
//! frame that is half old and half new.
//!
//! ## Protocol
//!
//! * The scanner calls [`DoubleBuffer::begin_cycle`] before plane 0, which
//!   clears the *swap-ready* flag, and [`DoubleBuffer::end_cycle`] after
//!   plane 7, which raises it.
//! * `end_cycle` also promotes the selected buffer to active, once the
//!   writer has finished a frame in it and is not drawing.
//! * [`DoubleBuffer::swap_buffer`] polls (bounded) until a cycle has ended,
//!   consumes swap-ready and, if its buffer went on screen, selects the
//!   other one. While scanning is stopped there is nobody to wait for: the
//!   selection is promoted and flipped at once.
//!
//! All locks are [`embassy_sync`] mutexes over a critical section, so the
//! scanner can run from a timer interrupt. It only ever uses `try_lock` on
//! frame data: a writer holding a buffer costs the scanner one skipped plane
//! rather than a stall. Async writers can await [`DoubleBuffer::swap`].

use core::cell::Cell;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embassy_sync::blocking_mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_sync::signal::Signal;
use embedded_hal::delay::DelayNs;

use crate::config::Config;
use crate::error::SwapTimeout;
use crate::framebuffer::{BitPlaneBuffer, PlaneLayout};

/// Which of the two frame buffers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BufferId {
    /// Buffer 0
    #[default]
    First,
    /// Buffer 1
    Second,
}

impl BufferId {
    /// The other buffer
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// Array index, 0 or 1
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    const fn from_index(index: u8) -> Self {
        if index == 0 { Self::First } else { Self::Second }
    }
}

#[derive(Clone, Copy, Debug)]
struct SwapState {
    selected: BufferId,
    active: BufferId,
    /// The selected buffer holds a finished frame
    drawn: bool,
    ready: bool,
    /// Completed refresh cycles, wrapping
    cycles: u32,
}

type FrameMutex = Mutex<CriticalSectionRawMutex, BitPlaneBuffer>;
type FrameGuard<'a> = MutexGuard<'a, CriticalSectionRawMutex, BitPlaneBuffer>;

/// Two frame buffers plus the swap handshake
pub struct DoubleBuffer {
    buffers: [FrameMutex; 2],
    state: blocking_mutex::Mutex<CriticalSectionRawMutex, Cell<SwapState>>,
    cycle_end: Signal<CriticalSectionRawMutex, ()>,
    active: AtomicU8,
    scanning: AtomicBool,
    size: (i32, i32),
}

fn relax() {
    #[cfg(feature = "std")]
    std::thread::yield_now();
    #[cfg(not(feature = "std"))]
    core::hint::spin_loop();
}

impl DoubleBuffer {
    /// Allocate two blank frames
    ///
    /// Buffer 0 starts as both selected and active. Scanning starts stopped.
    pub fn new(config: &Config) -> Self {
        let layout = PlaneLayout::new(config);
        let first = BitPlaneBuffer::with_layout(layout.clone());
        let size = first.logical_size();
        Self {
            buffers: [Mutex::new(first), Mutex::new(BitPlaneBuffer::with_layout(layout))],
            state: blocking_mutex::Mutex::new(Cell::new(SwapState {
                selected: BufferId::First,
                active: BufferId::First,
                drawn: true,
                ready: false,
                cycles: 0,
            })),
            cycle_end: Signal::new(),
            active: AtomicU8::new(0),
            scanning: AtomicBool::new(false),
            size,
        }
    }

    fn snapshot(&self) -> SwapState {
        self.state.lock(Cell::get)
    }

    fn update<R>(&self, f: impl FnOnce(&mut SwapState) -> R) -> R {
        self.state.lock(|cell| {
            let mut state = cell.get();
            let result = f(&mut state);
            cell.set(state);
            result
        })
    }

    fn lock_buffer(&self, id: BufferId) -> FrameGuard<'_> {
        loop {
            if let Ok(guard) = self.buffers[id.index()].try_lock() {
                return guard;
            }
            relax();
        }
    }

    fn set_active(&self, id: BufferId) {
        self.active.store(id.index() as u8, Ordering::Release);
    }

    /// Buffer the writer draws into
    pub fn selected(&self) -> BufferId {
        self.snapshot().selected
    }

    /// Buffer the scanner reads
    pub fn active(&self) -> BufferId {
        BufferId::from_index(self.active.load(Ordering::Acquire))
    }

    /// Whether a refresh cycle has ended since the last swap or cycle start
    pub fn is_swap_ready(&self) -> bool {
        self.snapshot().ready
    }

    /// Logical drawing size of either buffer
    pub fn logical_size(&self) -> (i32, i32) {
        self.size
    }

    /// Start or stop the refresh scan
    ///
    /// Stopping releases any writer waiting for a cycle to end.
    pub fn set_scanning(&self, scanning: bool) {
        self.scanning.store(scanning, Ordering::Release);
        if !scanning {
            self.cycle_end.signal(());
        }
    }

    /// Whether the refresh scan is running
    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    /// Point the writer at a specific buffer without waiting
    pub fn select_buffer(&self, id: BufferId) {
        self.update(|state| {
            if state.selected != id {
                state.selected = id;
                state.drawn = false;
            }
        });
    }

    /// Swap if a cycle has ended since `since`, or swap-ready is up
    fn swap_since(&self, since: u32) -> Option<BufferId> {
        let scanning = self.is_scanning();
        self.update(|state| {
            if !scanning {
                state.active = state.selected;
                self.set_active(state.active);
            } else if !state.ready && state.cycles == since {
                return None;
            }
            state.ready = false;
            // a selection still waiting for promotion stays selected
            if state.selected == state.active {
                state.selected = state.selected.other();
                state.drawn = false;
            }
            Some(state.selected)
        })
    }

    /// Swap without waiting
    ///
    /// Returns the buffer to draw into next, or `None` if swap-ready is down.
    pub fn try_swap(&self) -> Option<BufferId> {
        self.swap_since(self.snapshot().cycles)
    }

    /// Wait for a refresh cycle to end, then move the writer off the buffer
    /// being shown
    ///
    /// Polls every millisecond for up to `timeout_ms`. Returns the buffer to
    /// draw into next; it is never the active one while scanning.
    ///
    /// # Errors
    ///
    /// Returns [`SwapTimeout`] if no refresh cycle ended within the
    /// timeout. The selection is left unchanged.
    pub fn swap_buffer<D: DelayNs>(
        &self,
        timeout_ms: u32,
        delay: &mut D,
    ) -> Result<BufferId, SwapTimeout> {
        let since = self.snapshot().cycles;
        let mut waited_ms = 0;
        loop {
            if let Some(id) = self.swap_since(since) {
                return Ok(id);
            }
            if waited_ms >= timeout_ms {
                return Err(SwapTimeout { waited_ms });
            }
            delay.delay_ms(1);
            waited_ms += 1;
        }
    }

    /// Async [`DoubleBuffer::swap_buffer`] without a bound
    ///
    /// Wrap it in the executor's timeout to bound the wait.
    pub async fn swap(&self) -> BufferId {
        let since = self.snapshot().cycles;
        loop {
            if let Some(id) = self.swap_since(since) {
                return id;
            }
            self.cycle_end.wait().await;
        }
    }

    /// Run `f` with exclusive access to the selected buffer
    ///
    /// The buffer counts as finished once `f` returns. It cannot be promoted
    /// while `f` runs.
    pub fn draw<R>(&self, f: impl FnOnce(&mut BitPlaneBuffer) -> R) -> R {
        let selected = self.update(|state| {
            state.drawn = false;
            state.selected
        });
        let result = f(&mut self.lock_buffer(selected));
        self.update(|state| {
            if state.selected == selected {
                state.drawn = true;
            }
        });
        result
    }

    /// Run `f` with shared access to a specific buffer, waiting if needed
    pub fn inspect<R>(&self, id: BufferId, f: impl FnOnce(&BitPlaneBuffer) -> R) -> R {
        f(&self.lock_buffer(id))
    }

    /// Mark the start of a refresh cycle
    pub fn begin_cycle(&self) {
        self.update(|state| state.ready = false);
    }

    /// Mark the end of a refresh cycle
    ///
    /// Raises swap-ready and promotes the selected buffer to active.
    /// Promotion waits for a later cycle while the writer has not finished a
    /// frame in it or is holding it; `false` is returned in that case.
    pub fn end_cycle(&self) -> bool {
        let promoted = self.update(|state| {
            state.ready = true;
            state.cycles = state.cycles.wrapping_add(1);
            if state.selected == state.active {
                return true;
            }
            if !state.drawn || self.buffers[state.selected.index()].try_lock().is_err() {
                return false;
            }
            state.active = state.selected;
            self.set_active(state.active);
            true
        });
        if !promoted {
            log::trace!("selected buffer not ready, promotion deferred");
        }
        self.cycle_end.signal(());
        promoted
    }

    /// Run `f` on the active buffer without blocking
    ///
    /// Returns `None` if the buffer is momentarily held by the writer.
    pub fn with_active<R>(&self, f: impl FnOnce(&BitPlaneBuffer) -> R) -> Option<R> {
        let buffer = self.buffers[self.active().index()].try_lock().ok()?;
        Some(f(&buffer))
    }
}

impl fmt::Debug for DoubleBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.snapshot();
        f.debug_struct("DoubleBuffer")
            .field("selected", &state.selected)
            .field("active", &state.active)
            .field("ready", &state.ready)
            .field("scanning", &self.is_scanning())
            .finish_non_exhaustive()
    }
}
