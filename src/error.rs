//! Unified error type for macrodeck.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (with the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the firmware.
///
/// None of these are fatal: the poll loop logs them and carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // HID
    /// Seven or more non-modifier keys held; the newest press was dropped.
    Rollover,

    /// The host transport could not take a report this tick.
    TransportNotReady,

    // USB
    /// USB stack returned an error.
    Usb,

    // UI / Display
    /// I²C transaction to the display failed.
    Display,

    // Storage
    /// The persisted-preferences collaborator reported a failure.
    Prefs(PrefsError),
}

/// Failure codes of the persisted-preferences collaborator.
///
/// Together with `Ok(())` these form the six save/load result codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrefsError {
    /// No storage backend could be initialised.
    NoStorage,
    /// Reading the stored value failed.
    Read,
    /// Storage is reachable but holds no value.
    NoData,
    /// Writing the value failed.
    Write,
    /// Erasing/reclaiming flash failed.
    Erase,
}

/// Outcome of one save of the page index.
pub type SaveResult = core::result::Result<(), PrefsError>;

pub type Result<T> = core::result::Result<T, Error>;

// Convenience conversions

impl From<PrefsError> for Error {
    fn from(e: PrefsError) -> Self {
        Error::Prefs(e)
    }
}
