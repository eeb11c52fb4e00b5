//! Keyboard report composition with modifier reference counting.
//!
//! Several buttons may ask for the same modifier at once (e.g. two keys
//! mapped to Ctrl+something). Each modifier bit carries a count of the
//! entries holding it; the bit is only cleared when the last one lets go.

use super::report::KeyReport;
use crate::error::{Error, Result};
use crate::keycodes::{self, Modifiers};
use crate::keymap::KeyEntry;

/// Host link that accepts keyboard reports.
pub trait HidTransport {
    /// `false` while the host side cannot take a report; never blocks.
    fn ready(&mut self) -> bool;

    fn send(&mut self, report: &KeyReport) -> Result<()>;
}

pub struct HidComposer {
    report: KeyReport,
    modifier_refs: [u8; Modifiers::COUNT],
    dirty: bool,
    rollover_drops: u32,
}

impl HidComposer {
    pub const fn new() -> Self {
        Self {
            report: KeyReport::empty(),
            modifier_refs: [0; Modifiers::COUNT],
            dirty: false,
            rollover_drops: 0,
        }
    }

    /// Adds `entry` to the report.
    ///
    /// Returns [`Error::Rollover`] if the keycode found all six slots taken;
    /// the modifiers of the entry are still applied and the report is left
    /// otherwise unchanged.
    pub fn press(&mut self, entry: KeyEntry) -> Result<()> {
        for bit in entry.modifiers.indices() {
            let refs = &mut self.modifier_refs[bit];
            *refs = refs.saturating_add(1);
            if *refs == 1 {
                self.report.modifier |= 1 << bit;
                self.dirty = true;
            }
        }

        let code = entry.code;
        if !keycodes::is_key(code) || self.report.contains(code) {
            return Ok(());
        }

        match self.report.keycodes.iter_mut().find(|k| **k == 0) {
            Some(slot) => {
                *slot = code;
                self.dirty = true;
                Ok(())
            }
            None => {
                self.rollover_drops = self.rollover_drops.wrapping_add(1);
                warn!("HID rollover: dropped keycode {=u8:#x}", code);
                Err(Error::Rollover)
            }
        }
    }

    /// Removes `entry` from the report. Modifier bits clear only when their
    /// count reaches zero; counts never go below zero.
    pub fn release(&mut self, entry: KeyEntry) {
        for bit in entry.modifiers.indices() {
            let refs = &mut self.modifier_refs[bit];
            if *refs == 0 {
                continue;
            }
            *refs -= 1;
            if *refs == 0 {
                self.report.modifier &= !(1 << bit);
                self.dirty = true;
            }
        }

        let code = entry.code;
        if !keycodes::is_key(code) {
            return;
        }
        if let Some(slot) = self.report.keycodes.iter_mut().find(|k| **k == code) {
            *slot = 0;
            self.dirty = true;
        }
    }

    /// Drops every key, modifier and reference count.
    pub fn release_all(&mut self) {
        if !self.report.is_empty() {
            self.dirty = true;
        }
        self.report = KeyReport::empty();
        self.modifier_refs = [0; Modifiers::COUNT];
    }

    /// Sends the report if it changed since the last successful send.
    ///
    /// Returns `Ok(true)` when a report went out and `Ok(false)` when there
    /// was nothing to send. A busy transport yields
    /// [`Error::TransportNotReady`]; the report stays pending either way.
    pub fn flush(&mut self, transport: &mut impl HidTransport) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        if !transport.ready() {
            return Err(Error::TransportNotReady);
        }
        transport.send(&self.report)?;
        self.dirty = false;
        Ok(true)
    }

    pub fn report(&self) -> &KeyReport {
        &self.report
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Presses dropped because all key slots were taken.
    pub fn rollover_drops(&self) -> u32 {
        self.rollover_drops
    }

    /// Entries currently holding modifier `bit` (0..8).
    pub fn modifier_refs(&self, bit: usize) -> u8 {
        self.modifier_refs.get(bit).copied().unwrap_or(0)
    }
}

impl Default for HidComposer {
    fn default() -> Self {
        Self::new()
    }
}
