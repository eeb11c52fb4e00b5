//! Keyboard report types and the composer that turns key entries into
//! reports for the host.

pub mod composer;
pub mod report;

#[cfg(test)]
mod tests;

pub use composer::{HidComposer, HidTransport};
pub use report::{KeyReport, KEY_REPORT_SIZE, KEY_SLOTS};
