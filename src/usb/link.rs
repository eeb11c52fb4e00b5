//! Host link state as seen by the USB device handler.
//!
//! Configuration and suspension are tracked separately: a resume does not
//! come with a new SET_CONFIGURATION, so clearing the configured flag on
//! suspend would leave the link down after the host wakes up.

use core::sync::atomic::{AtomicBool, Ordering};

pub struct UsbLink {
    configured: AtomicBool,
    suspended: AtomicBool,
}

impl UsbLink {
    pub const fn new() -> Self {
        Self {
            configured: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
        }
    }

    pub fn set_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::Relaxed);
    }

    pub fn set_suspended(&self, suspended: bool) {
        self.suspended.store(suspended, Ordering::Release);
    }

    /// Bus reset or new address: the host has to configure us again.
    pub fn reset(&self) {
        self.configured.store(false, Ordering::Relaxed);
        self.suspended.store(false, Ordering::Release);
    }

    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Relaxed)
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Acquire)
    }

    /// `true` while the host is listening for reports.
    pub fn is_up(&self) -> bool {
        self.is_configured() && !self.is_suspended()
    }
}

impl Default for UsbLink {
    fn default() -> Self {
        Self::new()
    }
}
