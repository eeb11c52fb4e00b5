//! Application-wide constants and runtime configuration.
//!
//! All timing parameters, panel geometry, and protocol constants live
//! here so they can be tuned in one place. [`DeckConfig`] bundles the
//! values the core consumes; the firmware builds it once at startup.

// Input

/// Main loop tick (ms). Buttons are sampled once per tick.
pub const POLL_INTERVAL_MS: u64 = 1;

/// Consecutive uniform samples needed before a level is accepted.
pub const DEBOUNCE_WINDOW: u8 = 15;

/// Ticks a slot is ignored for after an accepted edge.
pub const DEBOUNCE_COOLDOWN_TICKS: u32 = 15;

/// Interval for latching held buttons into the repeat set (ms).
pub const REPEAT_INTERVAL_MS: u64 = 33;

/// Whether page navigation wraps from the last page to the first.
pub const PAGE_WRAP: bool = true;

// Preferences

/// Quiet time after the last page change before the page is saved (ms).
pub const SAVE_DELAY_MS: u64 = 1000;

/// Flash offset (from the start of flash) where preference storage starts.
/// The last 16 KB of the 2 MB part, kept out of `memory.x`.
pub const PREFS_FLASH_START: u32 = 0x001F_C000;

/// End (exclusive) of the preference storage range.
pub const PREFS_FLASH_END: u32 = 0x0020_0000;

/// Total flash size of the board.
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

// Display

/// Panel width in pixels.
pub const PANEL_WIDTH: u32 = 128;

/// Panel height in pixels.
pub const PANEL_HEIGHT: u32 = 64;

/// Height of the title banner; a divider line is drawn right below it.
pub const BANNER_HEIGHT: u32 = 15;

/// Legend cell size and grid layout below the banner.
pub const CELL_WIDTH: u32 = 32;
pub const CELL_HEIGHT: u32 = 16;
pub const GRID_COLUMNS: usize = 4;
pub const GRID_ROWS: usize = 3;

/// Panel I²C clock (Hz). Fast mode.
pub const DISPLAY_I2C_FREQUENCY_HZ: u32 = 400_000;

/// Minimum time between two display idle ticks (ms).
pub const DISPLAY_TICK_MS: u64 = 10;

/// Banner pause between two slides (ms).
pub const BANNER_DWELL_MS: u64 = 4000;

/// Columns the banner advances per idle tick while sliding.
pub const BANNER_SCROLL_STEP: i32 = 2;

/// How long the save-status glyph stays up (ms).
pub const STATUS_GLYPH_MS: u64 = 2000;

/// Inactivity before the panel is dimmed (ms).
pub const DIM_TIMEOUT_MS: u64 = 60_000;

/// Panel contrast levels.
pub const CONTRAST_NORMAL: u8 = 0xCF;
pub const CONTRAST_DIM: u8 = 0x01;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "macrodeck";
pub const USB_PRODUCT: &str = "Macro Keypad";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 1;

/// Debounce tuning for [`crate::matrix::ButtonMatrix`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Samples (1..=32) that must agree before a level is accepted.
    pub window: u8,
    /// Ticks a slot is skipped after an accepted edge.
    pub cooldown_ticks: u32,
    /// Interval for [`crate::matrix::ButtonMatrix::repeat`] (ms).
    pub repeat_interval_ms: u64,
}

/// Timing and contrast for [`crate::ui::display::DisplayController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    pub tick_ms: u64,
    pub banner_dwell_ms: u64,
    pub scroll_step: i32,
    pub status_glyph_ms: u64,
    pub dim_timeout_ms: u64,
    pub contrast_normal: u8,
    pub contrast_dim: u8,
}

/// Everything the core needs at construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeckConfig {
    pub poll_interval_ms: u64,
    pub page_wrap: bool,
    pub save_delay_ms: u64,
    pub debounce: DebounceConfig,
    pub display: DisplayConfig,
}

impl DeckConfig {
    pub const fn new() -> Self {
        Self {
            poll_interval_ms: POLL_INTERVAL_MS,
            page_wrap: PAGE_WRAP,
            save_delay_ms: SAVE_DELAY_MS,
            debounce: DebounceConfig {
                window: DEBOUNCE_WINDOW,
                cooldown_ticks: DEBOUNCE_COOLDOWN_TICKS,
                repeat_interval_ms: REPEAT_INTERVAL_MS,
            },
            display: DisplayConfig {
                tick_ms: DISPLAY_TICK_MS,
                banner_dwell_ms: BANNER_DWELL_MS,
                scroll_step: BANNER_SCROLL_STEP,
                status_glyph_ms: STATUS_GLYPH_MS,
                dim_timeout_ms: DIM_TIMEOUT_MS,
                contrast_normal: CONTRAST_NORMAL,
                contrast_dim: CONTRAST_DIM,
            },
        }
    }
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self::new()
    }
}
