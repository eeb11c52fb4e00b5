//! Library interface for macrodeck.
//!
//! Everything the poll loop needs lives here: debouncing and page
//! navigation, HID report composition, and the display state machine.
//! None of it touches hardware directly, so the whole core builds and
//! tests on the host.
//!
//! Usage: `cargo test` runs the core on the host.
//!
//! Note: The embedded binary (main.rs, `--features embedded`) adds the
//! RP2040 glue: Embassy USB, the SSD1306 panel and flash storage, all of
//! which are compiled into this library only with that feature.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Core
// ═══════════════════════════════════════════════════════════════════════════

pub mod board;
pub mod config;
pub mod deck;
pub mod error;
pub mod hid;
pub mod keycodes;
pub mod keymap;
pub mod matrix;
pub mod ui;
pub mod usb;

// ═══════════════════════════════════════════════════════════════════════════
// Hardware glue (embedded only)
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(feature = "embedded")]
pub mod storage;

pub use deck::{Deck, TickOutcome};
pub use error::{Error, PrefsError, Result};
