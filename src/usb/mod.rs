//! USB Device subsystem - presents a boot keyboard to the host.
//!
//! The RP2040's built-in USB 1.1 Full-Speed controller is driven by
//! `embassy-usb` with a single HID interface:
//!
//! - Interface 0: Keyboard (boot protocol, 8-byte reports)
//!
//! The poll loop hands finished reports to a bounded channel; a writer
//! task drains it into the HID endpoint.

#[cfg(feature = "embedded")]
pub mod hid_device;
pub mod link;

pub use link::UsbLink;
