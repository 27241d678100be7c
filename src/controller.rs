//! Playback controller
//!
//! The controller owns everything the writer side needs: the command queue's
//! receiving end, the Manual-mode staging frame, the per-mode counters and
//! the open frame file. Once per tick it
//!
//! 1. applies every queued command in order,
//! 2. handles a mode change (frame counter reset, File-mode file closed),
//! 3. swaps buffers and renders the next frame for the current mode
//!    (Manual mode swaps only on `Update`),
//! 4. steps the brightness ramp and publishes [`DisplayStatus`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use pxmatrix::animation::AnimationSet;
//! use pxmatrix::command::DisplayMode;
//! use pxmatrix::config::PlaybackConfig;
//! use pxmatrix::controller::Controller;
//! use pxmatrix::storage::NoStore;
//! use pxmatrix::swap::DoubleBuffer;
//! use pxmatrix::{Builder, Color, Geometry};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::OutputPin;
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl embedded_hal::delay::DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//!
//! let config = Builder::new()
//!     .geometry(Geometry::new(32, 16).unwrap())
//!     .build()
//!     .unwrap();
//! let frames = Arc::new(DoubleBuffer::new(&config));
//! let playback = PlaybackConfig { powered: false, ..PlaybackConfig::default() };
//! let (mut controller, display) =
//!     Controller::new(Arc::clone(&frames), AnimationSet::empty(), NoStore, MockPin, playback);
//! controller.init().unwrap();
//!
//! display.set_mode(DisplayMode::Color);
//! display.set_color(Color::RED);
//! controller.tick(&mut delay);
//! assert_eq!(display.mode(), DisplayMode::Color);
//! ```

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::animation::AnimationSet;
use crate::color::Color;
use crate::command::{Command, DisplayMode};
use crate::config::{PlaybackConfig, clamp_brightness, clamp_dim_rate, clamp_rate, on_time_us};
use crate::font::Font;
use crate::handle::{DisplayHandle, DisplayStatus};
use crate::queue::{CommandReceiver, command_queue};
use crate::raster;
use crate::staging::StagingFrame;
use crate::storage::{FrameFile, FrameStore};
use crate::swap::DoubleBuffer;

/// Mode and playback counters owned by the controller
#[derive(Debug)]
pub struct DisplayState<F> {
    mode: DisplayMode,
    previous_mode: DisplayMode,
    animation: usize,
    current_frame: usize,
    total_frames: usize,
    color: Color,
    file_path: Option<String>,
    file: Option<F>,
    brightness: i16,
    target_brightness: i16,
    dim_rate: i16,
    rate_ms: u32,
    powered: bool,
    font: Option<&'static Font<'static>>,
}

impl<F> DisplayState<F> {
    /// Current render mode
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Selected animation
    pub fn animation(&self) -> usize {
        self.animation
    }

    /// Frame the next render will draw
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Frames in the current animation or file
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Color-mode fill
    pub fn color(&self) -> Color {
        self.color
    }

    /// File-mode path
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    /// Whether a frame file is open
    pub fn file_open(&self) -> bool {
        self.file.is_some()
    }

    /// Current brightness
    pub fn brightness(&self) -> i16 {
        self.brightness
    }

    /// Brightness the ramp is heading toward
    pub fn target_brightness(&self) -> i16 {
        self.target_brightness
    }

    /// Signed brightness step per tick
    pub fn dim_rate(&self) -> i16 {
        self.dim_rate
    }

    /// Tick period in milliseconds
    pub fn rate_ms(&self) -> u32 {
        self.rate_ms
    }

    /// Whether the panel is powered
    pub fn powered(&self) -> bool {
        self.powered
    }

    /// Font used by `Print`
    pub fn font(&self) -> Option<&'static Font<'static>> {
        self.font
    }
}

/// Per-tick frame producer
pub struct Controller<S, P>
where
    S: FrameStore,
{
    frames: Arc<DoubleBuffer>,
    commands: CommandReceiver,
    status: Arc<DisplayStatus>,
    state: DisplayState<S::File>,
    staging: StagingFrame,
    animations: AnimationSet<'static>,
    store: S,
    power_pin: P,
    file_frame: Vec<u8>,
    width: usize,
    swap_timeout_ms: u32,
}

impl<S, P> Controller<S, P>
where
    S: FrameStore,
    P: OutputPin,
{
    /// Create a controller and the handle callers use to drive it
    ///
    /// Nothing touches hardware until [`Controller::init`].
    pub fn new(
        frames: Arc<DoubleBuffer>,
        animations: AnimationSet<'static>,
        store: S,
        power_pin: P,
        playback: PlaybackConfig,
    ) -> (Self, DisplayHandle) {
        let (width, height) = frames.logical_size();
        let (width, height) = (width as u16, height as u16);
        let animation = playback
            .initial_animation
            .checked_rem(animations.count())
            .unwrap_or(0);
        let brightness = clamp_brightness(playback.initial_brightness);

        let (sender, commands) = command_queue();
        let status = Arc::new(DisplayStatus::new(playback.powered, brightness, animation));
        let handle = DisplayHandle::new(
            sender,
            Arc::clone(&status),
            width,
            height,
            animations.count(),
        );

        let state = DisplayState {
            mode: DisplayMode::default(),
            previous_mode: DisplayMode::default(),
            animation,
            current_frame: 0,
            total_frames: animations.frame_count(animation),
            color: Color::BLACK,
            file_path: None,
            file: None,
            brightness,
            target_brightness: clamp_brightness(playback.target_brightness),
            dim_rate: clamp_dim_rate(playback.dim_rate),
            rate_ms: clamp_rate(playback.rate_ms),
            powered: playback.powered,
            font: None,
        };

        let controller = Self {
            frames,
            commands,
            status,
            state,
            staging: StagingFrame::new(width, height),
            animations,
            store,
            power_pin,
            file_frame: vec![0; usize::from(width) * usize::from(height) * 3],
            width: usize::from(width),
            swap_timeout_ms: playback.swap_timeout_ms,
        };
        (controller, handle)
    }

    /// Drive the power pin and the scan to the configured start-up state
    pub fn init(&mut self) -> Result<(), P::Error> {
        if self.state.powered {
            self.power_pin.set_high()?;
        } else {
            self.power_pin.set_low()?;
        }
        self.frames.set_scanning(self.state.powered);
        self.publish();
        log::info!(
            "display {}x{} ready, powered={}, mode={:?}",
            self.width,
            self.staging.height(),
            self.state.powered,
            self.state.mode
        );
        Ok(())
    }

    /// Current playback state
    pub fn state(&self) -> &DisplayState<S::File> {
        &self.state
    }

    /// Manual-mode staging frame
    pub fn staging(&self) -> &StagingFrame {
        &self.staging
    }

    /// Shared frame storage
    pub fn frames(&self) -> &Arc<DoubleBuffer> {
        &self.frames
    }

    /// Shared status
    pub fn status(&self) -> &Arc<DisplayStatus> {
        &self.status
    }

    /// Time to wait between ticks
    pub fn rate(&self) -> Duration {
        Duration::from_millis(u64::from(self.state.rate_ms))
    }

    /// Wait the tick period, then tick, until `running` is cleared
    pub fn run<D: DelayNs>(&mut self, running: &AtomicBool, delay: &mut D) {
        while running.load(Ordering::Relaxed) {
            delay.delay_ms(self.state.rate_ms);
            self.tick(delay);
        }
    }

    /// Run one producer tick
    ///
    /// `delay` paces the bounded wait for the scanner's cycle boundary.
    pub fn tick<D: DelayNs>(&mut self, delay: &mut D) {
        while let Some(command) = self.commands.try_recv() {
            self.apply(command, delay);
        }

        if self.state.mode != self.state.previous_mode {
            log::info!(
                "mode {:?} -> {:?}",
                self.state.previous_mode,
                self.state.mode
            );
            if self.state.previous_mode == DisplayMode::File {
                self.close_file();
            }
            self.state.current_frame = 0;
            self.state.previous_mode = self.state.mode;
        }

        if self.state.mode != DisplayMode::Manual {
            self.swap(delay);
            match self.state.mode {
                DisplayMode::Animation => self.render_animation(),
                DisplayMode::Color => {
                    let color = self.state.color;
                    self.frames.draw(|buffer| buffer.fill(color));
                }
                DisplayMode::File => self.render_file(),
                DisplayMode::Manual => {}
            }
        }

        self.step_brightness();
        self.publish();
    }

    fn apply<D: DelayNs>(&mut self, command: Command, delay: &mut D) {
        log::trace!("applying {}", command.name());
        match command {
            Command::Brightness { target, rate } => {
                self.state.target_brightness = clamp_brightness(target);
                self.state.dim_rate = clamp_dim_rate(rate);
            }
            Command::Power(on) => self.set_power(on),
            Command::Mode(mode) => self.state.mode = mode,
            Command::Rate(rate_ms) => self.state.rate_ms = clamp_rate(rate_ms),
            Command::Animation(index) => {
                self.state.animation = index.checked_rem(self.animations.count()).unwrap_or(0);
                if self.state.mode == DisplayMode::Animation {
                    self.state.current_frame = 0;
                }
            }
            Command::Color(color) => self.state.color = color,
            Command::File(path) => {
                log::info!("file: {}", path);
                self.state.file_path = Some(path);
                self.close_file();
                if self.state.mode == DisplayMode::File {
                    self.state.current_frame = 0;
                }
            }
            Command::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => raster::fill_rect(
                &mut self.staging,
                i32::from(x),
                i32::from(y),
                width,
                height,
                color,
            ),
            Command::DrawLine {
                x0,
                y0,
                x1,
                y1,
                color,
            } => raster::draw_line(
                &mut self.staging,
                i32::from(x0),
                i32::from(y0),
                i32::from(x1),
                i32::from(y1),
                color,
            ),
            Command::DrawCircle {
                x,
                y,
                radius,
                color,
            } => raster::draw_circle(&mut self.staging, i32::from(x), i32::from(y), radius, color),
            Command::FillCircle {
                x,
                y,
                radius,
                color,
            } => raster::fill_circle(&mut self.staging, i32::from(x), i32::from(y), radius, color),
            Command::SetPixel { x, y, color } => {
                self.staging.set_pixel(i32::from(x), i32::from(y), color);
            }
            Command::Update => {
                if self.state.mode == DisplayMode::Manual {
                    self.swap(delay);
                    let staging = &self.staging;
                    self.frames.draw(|buffer| staging.commit(buffer));
                } else {
                    log::debug!("update ignored in {:?} mode", self.state.mode);
                }
            }
            Command::SetFont(font) => {
                self.state.font = Some(font);
                self.status.set_font(font);
            }
            Command::Print { text, x, y, color } => match self.state.font {
                Some(font) => raster::draw_text(
                    &mut self.staging,
                    font,
                    &text,
                    i32::from(x),
                    i32::from(y),
                    color,
                ),
                None => log::debug!("print with no font set"),
            },
        }
    }

    fn set_power(&mut self, on: bool) {
        if on == self.state.powered {
            return;
        }
        let result = if on {
            self.power_pin.set_high()
        } else {
            self.power_pin.set_low()
        };
        if let Err(e) = result {
            log::error!("power pin: {:?}", e);
            return;
        }
        self.frames.set_scanning(on);
        self.state.powered = on;
        log::info!("power {}", if on { "on" } else { "off" });
    }

    /// Swap buffers; on timeout the frame is still drawn into the current
    /// selection
    fn swap<D: DelayNs>(&self, delay: &mut D) {
        if let Err(e) = self.frames.swap_buffer(self.swap_timeout_ms, delay) {
            log::warn!("{}", e);
        }
    }

    fn close_file(&mut self) {
        if self.state.file.take().is_some() {
            log::debug!("frame file closed");
        }
    }

    fn render_animation(&mut self) {
        let index = self.state.animation;
        let frame = self.state.current_frame;
        self.state.total_frames = self.animations.frame_count(index);
        let Some(pixels) = self.animations.pixels(index, frame) else {
            log::debug!("animation {} has no frame {}", index, frame);
            self.state.current_frame = 0;
            return;
        };

        let width = self.width;
        self.frames.draw(|buffer| {
            for (i, color) in pixels.enumerate() {
                buffer.set_pixel((i % width) as i32, (i / width) as i32, color);
            }
        });
        self.advance_frame();
    }

    fn render_file(&mut self) {
        let Some(path) = self.state.file_path.as_deref() else {
            return;
        };
        let frame_bytes = self.file_frame.len();

        if self.state.file.is_none() {
            let mut file = match self.store.open(path) {
                Ok(file) => file,
                Err(e) => {
                    log::warn!("cannot open {}: {:?}", path, e);
                    return;
                }
            };
            let size = match file.size() {
                Ok(size) => size,
                Err(e) => {
                    log::warn!("cannot stat {}: {:?}", path, e);
                    return;
                }
            };
            self.state.total_frames = usize::try_from(size / frame_bytes.max(1) as u64)
                .unwrap_or(usize::MAX);
            self.state.current_frame = 0;
            log::info!("{}: {} frames", path, self.state.total_frames);
            self.state.file = Some(file);
        }

        let Some(file) = self.state.file.as_mut() else {
            return;
        };
        if self.state.total_frames == 0 {
            return;
        }

        let offset = self.state.current_frame as u64 * frame_bytes as u64;
        if let Err(e) = file.seek_to(offset) {
            log::warn!("seek to frame {} failed: {:?}", self.state.current_frame, e);
            return;
        }
        let filled = match file.read_into(&mut self.file_frame) {
            Ok(n) => n.min(frame_bytes),
            Err(e) => {
                log::warn!("read of frame {} failed: {:?}", self.state.current_frame, e);
                0
            }
        };
        self.file_frame[filled..].fill(0);

        let width = self.width;
        let data = &self.file_frame;
        self.frames.draw(|buffer| {
            for (i, px) in data.chunks_exact(3).enumerate() {
                buffer.set_pixel(
                    (i % width) as i32,
                    (i / width) as i32,
                    Color::new(px[0], px[1], px[2]),
                );
            }
        });
        self.advance_frame();
    }

    fn advance_frame(&mut self) {
        self.state.current_frame += 1;
        if self.state.current_frame >= self.state.total_frames {
            self.state.current_frame = 0;
        }
    }

    fn step_brightness(&mut self) {
        let state = &mut self.state;
        if state.brightness == state.target_brightness {
            return;
        }
        // rate sign follows the direction of travel
        let magnitude = state.dim_rate.saturating_abs();
        state.dim_rate = if state.target_brightness < state.brightness {
            -magnitude
        } else {
            magnitude
        };
        state.brightness = state.brightness.saturating_add(state.dim_rate);
        if (state.dim_rate < 0 && state.brightness <= state.target_brightness)
            || (state.dim_rate > 0 && state.brightness >= state.target_brightness)
        {
            state.brightness = state.target_brightness;
        }
    }

    fn publish(&self) {
        self.status.publish(
            self.state.powered,
            self.state.mode,
            self.state.brightness,
            self.state.animation,
        );
        log::trace!(
            "brightness {} (on-time {} us)",
            self.state.brightness,
            on_time_us(self.state.brightness)
        );
    }
}
