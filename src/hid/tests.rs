//! Unit tests for keyboard report serialization and composition.
//!
//! These tests run on the host (not embedded) and check the pure logic
//! of the report and the modifier reference counting.

use super::composer::{HidComposer, HidTransport};
use super::report::KeyReport;
use crate::error::{Error, Result};
use crate::keycodes::*;
use crate::keymap::KeyEntry;

/// Transport that records every report it accepts.
struct Recorder {
    ready: bool,
    fail: bool,
    sent: heapless::Vec<KeyReport, 32>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            ready: true,
            fail: false,
            sent: heapless::Vec::new(),
        }
    }
}

impl HidTransport for Recorder {
    fn ready(&mut self) -> bool {
        self.ready
    }

    fn send(&mut self, report: &KeyReport) -> Result<()> {
        if self.fail {
            return Err(Error::Usb);
        }
        self.sent.push(*report).map_err(|_| Error::Usb)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Keyboard Report Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn keyboard_report_empty() {
    let report = KeyReport::empty();
    assert!(report.is_empty());
    assert_eq!(report.modifier, 0);
    assert_eq!(report.keycodes, [0; 6]);
    assert_eq!(report.held_keys(), 0);
}

#[test]
fn keyboard_report_serialize() {
    let report = KeyReport {
        modifier: 0x05,
        reserved: 0x00,
        keycodes: [0x04, 0x05, 0x06, 0x00, 0x00, 0x00],
    };

    let mut buf = [0u8; 8];
    let written = report.serialize(&mut buf);

    assert_eq!(written, 8);
    assert_eq!(buf, [0x05, 0x00, 0x04, 0x05, 0x06, 0x00, 0x00, 0x00]);
    assert_eq!(report.to_bytes(), buf);
    assert_eq!(report.held_keys(), 3);
}

#[test]
fn keyboard_report_serialize_buffer_too_small() {
    let report = KeyReport::empty();
    let mut small_buf = [0u8; 4];
    assert_eq!(report.serialize(&mut small_buf), 0);
}

#[test]
fn keyboard_report_never_contains_empty_slot() {
    let report = KeyReport::empty();
    assert!(!report.contains(0));
}

// ═══════════════════════════════════════════════════════════════════════════
// Composer Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn press_places_key_in_first_free_slot() {
    let mut hid = HidComposer::new();
    hid.press(KeyEntry::key(KEY_F13)).unwrap();
    hid.press(KeyEntry::key(KEY_F14)).unwrap();
    assert_eq!(hid.report().keycodes, [KEY_F13, KEY_F14, 0, 0, 0, 0]);

    hid.release(KeyEntry::key(KEY_F13));
    hid.press(KeyEntry::key(KEY_F15)).unwrap();
    assert_eq!(hid.report().keycodes, [KEY_F15, KEY_F14, 0, 0, 0, 0]);
}

#[test]
fn duplicate_press_keeps_one_slot() {
    let mut hid = HidComposer::new();
    hid.press(KeyEntry::key(KEY_A)).unwrap();
    hid.press(KeyEntry::key(KEY_A)).unwrap();
    assert_eq!(hid.report().held_keys(), 1);
}

#[test]
fn shared_modifier_survives_first_release() {
    let mut hid = HidComposer::new();
    let a = KeyEntry::with(Modifiers::LCTRL, KEY_F13);
    let b = KeyEntry::with(Modifiers::LCTRL, KEY_F14);

    hid.press(a).unwrap();
    hid.press(b).unwrap();
    assert_eq!(hid.modifier_refs(0), 2);

    hid.release(a);
    assert_eq!(hid.report().modifier, Modifiers::LCTRL.bits());
    assert_eq!(hid.report().keycodes, [0, KEY_F14, 0, 0, 0, 0]);

    hid.release(b);
    assert_eq!(hid.report().modifier, 0);
    assert!(hid.report().is_empty());
}

#[test]
fn modifier_count_never_goes_negative() {
    let mut hid = HidComposer::new();
    let entry = KeyEntry::with(Modifiers::LSHIFT, KEY_A);
    hid.release(entry);
    assert_eq!(hid.modifier_refs(1), 0);

    hid.press(entry).unwrap();
    assert_eq!(hid.report().modifier, Modifiers::LSHIFT.bits());
}

#[test]
fn modifier_only_entry_sets_bits() {
    let mut hid = HidComposer::new();
    hid.press(KeyEntry::with(Modifiers::LGUI, UNMAPPED)).unwrap();
    assert_eq!(hid.report().modifier, Modifiers::LGUI.bits());
    assert_eq!(hid.report().held_keys(), 0);
    assert!(hid.is_dirty());
}

#[test]
fn sentinels_never_reach_the_report() {
    let mut hid = HidComposer::new();
    hid.press(KeyEntry::NEXT).unwrap();
    hid.press(KeyEntry::PREV).unwrap();
    hid.press(KeyEntry::INERT).unwrap();
    assert!(hid.report().is_empty());
    assert!(!hid.is_dirty());
}

#[test]
fn seventh_key_is_dropped() {
    let mut hid = HidComposer::new();
    for code in KEY_F13..KEY_F13 + 6 {
        hid.press(KeyEntry::key(code)).unwrap();
    }
    let before = *hid.report();

    assert_eq!(hid.press(KeyEntry::key(KEY_F19)), Err(Error::Rollover));
    assert_eq!(*hid.report(), before);
    assert_eq!(hid.rollover_drops(), 1);
}

#[test]
fn release_all_clears_counts() {
    let mut hid = HidComposer::new();
    hid.press(KeyEntry::with(Modifiers::LCTRL, KEY_F13)).unwrap();
    hid.press(KeyEntry::with(Modifiers::LCTRL, KEY_F14)).unwrap();
    hid.release_all();

    assert!(hid.report().is_empty());
    assert_eq!(hid.modifier_refs(0), 0);

    // A fresh press after the reset behaves like the first one.
    let entry = KeyEntry::with(Modifiers::LCTRL, KEY_F15);
    hid.press(entry).unwrap();
    hid.release(entry);
    assert_eq!(hid.report().modifier, 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Flush Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn flush_sends_only_when_dirty() {
    let mut hid = HidComposer::new();
    let mut link = Recorder::new();

    assert_eq!(hid.flush(&mut link), Ok(false));
    hid.press(KeyEntry::key(KEY_A)).unwrap();
    assert_eq!(hid.flush(&mut link), Ok(true));
    assert_eq!(hid.flush(&mut link), Ok(false));
    assert_eq!(link.sent.len(), 1);
    assert_eq!(link.sent[0].keycodes[0], KEY_A);
}

#[test]
fn flush_holds_report_while_transport_busy() {
    let mut hid = HidComposer::new();
    let mut link = Recorder::new();
    link.ready = false;

    hid.press(KeyEntry::key(KEY_A)).unwrap();
    assert_eq!(hid.flush(&mut link), Err(Error::TransportNotReady));
    assert!(hid.is_dirty());
    assert!(link.sent.is_empty());

    link.ready = true;
    assert_eq!(hid.flush(&mut link), Ok(true));
    assert_eq!(link.sent.len(), 1);
}

#[test]
fn failed_send_stays_pending() {
    let mut hid = HidComposer::new();
    let mut link = Recorder::new();
    link.fail = true;

    hid.press(KeyEntry::key(KEY_A)).unwrap();
    assert_eq!(hid.flush(&mut link), Err(Error::Usb));
    assert!(hid.is_dirty());
}

#[test]
fn release_all_on_empty_report_sends_nothing() {
    let mut hid = HidComposer::new();
    let mut link = Recorder::new();
    hid.release_all();
    assert_eq!(hid.flush(&mut link), Ok(false));
}
