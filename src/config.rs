//! Panel configuration types and builder
//!
//! A [`Config`] captures everything the bit-plane encoder and the row-scan
//! driver need to know about the physical panel: its size, how many row
//! groups are multiplexed, how the multiplexer lines are encoded, the
//! pixel scan order inside the shift registers and an optional rotation.
//!
//! [`PlaybackConfig`] carries the timing and brightness defaults used by the
//! playback controller.

pub use crate::error::{BuilderError, MAX_EDGE};

/// Number of bit planes in a frame (8 bits per channel)
pub const COLOR_DEPTH: usize = 8;

/// Lowest accepted brightness value
pub const BRIGHTNESS_MIN: i16 = 0;
/// Highest accepted brightness value
pub const BRIGHTNESS_MAX: i16 = 2100;
/// Brightness units per microsecond of output-enable on-time
pub const BRIGHTNESS_PER_MICROSECOND: i16 = 30;
/// Smallest brightness step per tick
pub const DIM_RATE_MIN: i16 = 1;
/// Largest brightness step per tick
pub const DIM_RATE_MAX: i16 = 100;
/// Default brightness step per tick
pub const DEFAULT_DIM_RATE: i16 = 30;
/// Shortest accepted playback tick period in milliseconds
pub const RATE_MIN_MS: u32 = 33;
/// Default playback tick period in milliseconds
pub const DEFAULT_RATE_MS: u32 = 66;
/// Default bound on the writer's wait for swap-ready, in milliseconds
pub const DEFAULT_SWAP_TIMEOUT_MS: u32 = 1000;
/// Period of the refresh timer the scanner is expected to run at, in microseconds
pub const SCAN_PERIOD_US: u32 = 1000;

/// Panel size in pixels
///
/// Only [`Geometry::new`] builds one, so every instance is a valid size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    width: u16,
    height: u16,
}

impl Geometry {
    /// Create a new geometry with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidGeometry` if:
    /// - width or height is 0 or above [`MAX_EDGE`]
    /// - width % 8 != 0 (columns are packed eight to a byte)
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || width > MAX_EDGE || !width.is_multiple_of(8) {
            return Err(BuilderError::InvalidGeometry { width, height });
        }
        if height == 0 || height > MAX_EDGE {
            return Err(BuilderError::InvalidGeometry { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in pixels (number of columns shifted per row)
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Same panel turned a quarter
    const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Number of pixels on the panel
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size of one bit plane in bytes (one bit per channel per pixel)
    pub fn plane_size(&self) -> usize {
        self.pixel_count() * 3 / 8
    }

    /// Size of a full frame (all bit planes) in bytes
    pub fn buffer_size(&self) -> usize {
        self.plane_size() * COLOR_DEPTH
    }
}

/// Number of row groups driven through the multiplexer (1/N scan)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RowPattern {
    /// 1/4 scan
    Rows4,
    /// 1/8 scan
    #[default]
    Rows8,
    /// 1/16 scan
    Rows16,
    /// 1/32 scan
    Rows32,
}

impl RowPattern {
    /// Number of multiplexed row groups
    pub fn rows(self) -> u8 {
        match self {
            Self::Rows4 => 4,
            Self::Rows8 => 8,
            Self::Rows16 => 16,
            Self::Rows32 => 32,
        }
    }

    /// Number of binary address lines (A..E) needed to select a row group
    pub fn address_lines(self) -> usize {
        match self {
            Self::Rows4 => 2,
            Self::Rows8 => 3,
            Self::Rows16 => 4,
            Self::Rows32 => 5,
        }
    }
}

impl TryFrom<u16> for RowPattern {
    type Error = BuilderError;

    fn try_from(rows: u16) -> Result<Self, Self::Error> {
        match rows {
            4 => Ok(Self::Rows4),
            8 => Ok(Self::Rows8),
            16 => Ok(Self::Rows16),
            32 => Ok(Self::Rows32),
            other => Err(BuilderError::UnsupportedRowPattern(other)),
        }
    }
}

/// How the row group address is presented on the A..E lines
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MuxPattern {
    /// The panel decodes the address; line `k` carries bit `k` of it
    #[default]
    Binary,
    /// We decode the address; only line `address` is driven low
    Straight,
}

/// Pixel order inside the column shift registers
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ScanPattern {
    /// Left to right
    #[default]
    Line,
    /// Jumps four rows after every byte
    Zigzag,
    /// Zigzag with the bit order reversed in the upper half of every 8-row group
    Zaggiz,
}

/// Panel rotation relative to native orientation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Rotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate 90 degrees
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees
    Rotate270,
}

/// Per-channel threshold offsets added to every bit-plane comparison
///
/// Raising an offset darkens that channel, which is the only colour
/// calibration the encoder applies.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorOffsets {
    /// Red threshold offset
    pub r: u8,
    /// Green threshold offset
    pub g: u8,
    /// Blue threshold offset
    pub b: u8,
}

/// Panel configuration
///
/// Use [`Builder`] to create a Config.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Panel size
    pub geometry: Geometry,
    /// Multiplexed row groups
    pub row_pattern: RowPattern,
    /// Address line encoding
    pub mux_pattern: MuxPattern,
    /// Shift register scan order
    pub scan_pattern: ScanPattern,
    /// Panel rotation
    pub rotation: Rotation,
    /// Per-channel threshold offsets
    pub color_offsets: ColorOffsets,
}

impl Config {
    /// Get the logical (drawable) size after rotation
    pub fn rotated_geometry(&self) -> Geometry {
        match self.rotation {
            Rotation::Rotate0 | Rotation::Rotate180 => self.geometry,
            Rotation::Rotate90 | Rotation::Rotate270 => self.geometry.transposed(),
        }
    }
}

/// Builder for constructing panel configuration
///
/// # Example
///
/// ```rust,no_run
/// use pxmatrix::{Builder, Geometry, RowPattern, ScanPattern};
///
/// let geometry = match Geometry::new(32, 16) {
///     Ok(geometry) => geometry,
///     Err(_) => return,
/// };
/// let config = match Builder::new()
///     .geometry(geometry)
///     .row_pattern(RowPattern::Rows8)
///     .scan_pattern(ScanPattern::Line)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[must_use]
#[derive(Default)]
pub struct Builder {
    /// Panel size (required)
    geometry: Option<Geometry>,
    /// Multiplexed row groups
    row_pattern: RowPattern,
    /// Address line encoding
    mux_pattern: MuxPattern,
    /// Shift register scan order
    scan_pattern: ScanPattern,
    /// Panel rotation
    rotation: Rotation,
    /// Per-channel threshold offsets
    color_offsets: ColorOffsets,
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set panel geometry (required)
    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Set the number of multiplexed row groups
    ///
    /// A 1/4 scan panel always uses [`ScanPattern::Zigzag`].
    pub fn row_pattern(mut self, row_pattern: RowPattern) -> Self {
        self.row_pattern = row_pattern;
        self
    }

    /// Set the address line encoding
    pub fn mux_pattern(mut self, mux_pattern: MuxPattern) -> Self {
        self.mux_pattern = mux_pattern;
        self
    }

    /// Set the shift register scan order
    pub fn scan_pattern(mut self, scan_pattern: ScanPattern) -> Self {
        self.scan_pattern = scan_pattern;
        self
    }

    /// Set panel rotation
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set per-channel threshold offsets
    pub fn color_offsets(mut self, r: u8, g: u8, b: u8) -> Self {
        self.color_offsets = ColorOffsets { r, g, b };
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingGeometry` if geometry was not set, and
    /// `BuilderError::InvalidRowPattern` if the row pattern exceeds or does
    /// not divide the panel height.
    pub fn build(self) -> Result<Config, BuilderError> {
        let geometry = self.geometry.ok_or(BuilderError::MissingGeometry)?;
        let rows = self.row_pattern.rows();
        let height = geometry.height();
        if u16::from(rows) > height || !height.is_multiple_of(u16::from(rows)) {
            return Err(BuilderError::InvalidRowPattern {
                row_pattern: rows,
                height,
            });
        }

        let scan_pattern = if self.row_pattern == RowPattern::Rows4 {
            ScanPattern::Zigzag
        } else {
            self.scan_pattern
        };

        Ok(Config {
            geometry,
            row_pattern: self.row_pattern,
            mux_pattern: self.mux_pattern,
            scan_pattern,
            rotation: self.rotation,
            color_offsets: self.color_offsets,
        })
    }
}

/// Timing and brightness defaults for the playback controller
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackConfig {
    /// Tick period in milliseconds (clamped to at least [`RATE_MIN_MS`])
    pub rate_ms: u32,
    /// Brightness at start-up
    pub initial_brightness: i16,
    /// Brightness the start-up ramp heads toward
    pub target_brightness: i16,
    /// Brightness step per tick
    pub dim_rate: i16,
    /// Bound on the wait for swap-ready, in milliseconds
    pub swap_timeout_ms: u32,
    /// Animation selected at start-up (wrapped modulo the animation count)
    pub initial_animation: usize,
    /// Whether the panel starts powered
    pub powered: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            rate_ms: DEFAULT_RATE_MS,
            initial_brightness: BRIGHTNESS_MIN,
            target_brightness: BRIGHTNESS_MAX,
            dim_rate: DEFAULT_DIM_RATE,
            swap_timeout_ms: DEFAULT_SWAP_TIMEOUT_MS,
            initial_animation: 0,
            powered: true,
        }
    }
}

/// Clamp a brightness target into the accepted range
pub fn clamp_brightness(target: i16) -> i16 {
    target.clamp(BRIGHTNESS_MIN, BRIGHTNESS_MAX)
}

/// Clamp a tick period to the shortest accepted value
pub fn clamp_rate(rate_ms: u32) -> u32 {
    rate_ms.max(RATE_MIN_MS)
}

/// Clamp the magnitude of a brightness step, keeping its sign
pub fn clamp_dim_rate(rate: i16) -> i16 {
    let magnitude = rate.saturating_abs().clamp(DIM_RATE_MIN, DIM_RATE_MAX);
    if rate < 0 { -magnitude } else { magnitude }
}

/// Output-enable on-time in microseconds for a brightness value
pub fn on_time_us(brightness: i16) -> u32 {
    (clamp_brightness(brightness) / BRIGHTNESS_PER_MICROSECOND) as u32
}
