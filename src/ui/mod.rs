//! User interface subsystem - monochrome panel showing the active page.
//!
//! The display controller keeps a state machine that reacts to page
//! changes, key presses and save results, rendering onto any [`Panel`].
//!
//! ## Layout (128×64)
//!
//! - **Banner** (rows 0..15): alternates "Page N: name" and a navigation
//!   hint with a horizontal slide; a save-status glyph sits in the top
//!   right corner.
//! - **Divider** (row 15).
//! - **Legend grid** (rows 16..64): 4×3 cells of 32×16, one per macro key,
//!   inverted while the key is held.

pub mod bitmap;
pub mod display;
pub mod panel;
pub mod queued;
#[cfg(feature = "embedded")]
pub mod oled;


pub use display::DisplayController;
pub use panel::{FramePanel, Panel, TextSize};
pub use queued::{FrameSink, QueuedPanel};

/// Screens the display can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenMode {
    /// Nothing drawn yet.
    Init,
    /// Banner and legend grid of the active page.
    Default,
    /// Full-screen "Saving..." message.
    Saving,
    /// Full-screen "Save successful" message.
    SaveSuccess,
    /// Full-screen "Save failed" message.
    SaveError,
}

impl ScreenMode {
    /// Fixed message of the full-screen save modes.
    pub fn message(self) -> Option<&'static str> {
        match self {
            ScreenMode::Saving => Some("Saving..."),
            ScreenMode::SaveSuccess => Some("Save successful"),
            ScreenMode::SaveError => Some("Save failed"),
            ScreenMode::Init | ScreenMode::Default => None,
        }
    }
}

/// Corner glyph reporting the last save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusGlyph {
    Pending,
    Success,
    Failure,
}
