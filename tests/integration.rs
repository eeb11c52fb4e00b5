//! Integration tests for the macrodeck poll loop.
//!
//! Drives [`Deck`] with the board's key table, a scripted pin source, a
//! recording host transport and an in-memory panel.

use macrodeck::board::{PAGES, SLOTS, SLOT_COUNT};
use macrodeck::config::DeckConfig;
use macrodeck::hid::{HidTransport, KeyReport};
use macrodeck::keycodes::*;
use macrodeck::matrix::ButtonInput;
use macrodeck::ui::{FramePanel, StatusGlyph};
use macrodeck::{Deck, PrefsError, Result};

const PREV: usize = 12;
const NEXT: usize = 13;

/// Ticks to get through a debounce window and the cooldown after it.
const SETTLE: u64 = 30;

struct Pins {
    low: [bool; SLOT_COUNT],
}

impl ButtonInput for Pins {
    fn is_high(&mut self, slot: usize, _pin: u8) -> bool {
        !self.low[slot]
    }
}

struct Host {
    ready: bool,
    sent: Vec<KeyReport>,
}

impl HidTransport for Host {
    fn ready(&mut self) -> bool {
        self.ready
    }

    fn send(&mut self, report: &KeyReport) -> Result<()> {
        self.sent.push(*report);
        Ok(())
    }
}

struct Rig {
    deck: Deck<FramePanel, SLOT_COUNT>,
    pins: Pins,
    host: Host,
    now: u64,
    saves: Vec<(u64, u8)>,
    page_changes: Vec<(u64, usize)>,
    repeats: usize,
}

impl Rig {
    fn with(config: DeckConfig, stored: core::result::Result<u8, PrefsError>) -> Self {
        Self {
            deck: Deck::new(&SLOTS, &PAGES, config, Some(FramePanel::new()), stored),
            pins: Pins {
                low: [false; SLOT_COUNT],
            },
            host: Host {
                ready: true,
                sent: Vec::new(),
            },
            now: 0,
            saves: Vec::new(),
            page_changes: Vec::new(),
            repeats: 0,
        }
    }

    fn new() -> Self {
        let mut config = DeckConfig::new();
        config.page_wrap = false;
        Self::with(config, Err(PrefsError::NoData))
    }

    fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.now += 1;
            let before = self.deck.page();
            let outcome = self.deck.tick(self.now, &mut self.pins, &mut self.host);
            if self.deck.page() != before {
                self.page_changes.push((self.now, self.deck.page()));
            }
            if let Some(page) = outcome.save {
                self.saves.push((self.now, page));
            }
            if !outcome.repeat.is_empty() {
                self.repeats += 1;
            }
        }
    }

    fn press(&mut self, slot: usize) {
        self.pins.low[slot] = true;
        self.run(SETTLE);
    }

    fn release(&mut self, slot: usize) {
        self.pins.low[slot] = false;
        self.run(SETTLE);
    }

    fn tap(&mut self, slot: usize) {
        self.press(slot);
        self.release(slot);
    }

    fn report(&self) -> KeyReport {
        *self.deck.hid().report()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Debounce
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn held_button_reports_once_at_tick_fifteen() {
    let mut rig = Rig::new();
    rig.pins.low[0] = true;

    let mut edges = Vec::new();
    for _ in 0..20 {
        rig.run(1);
        if rig.deck.matrix().pressed().contains(0) {
            edges.push(rig.now);
        }
    }

    assert_eq!(edges, vec![15]);
    assert_eq!(rig.host.sent.len(), 1);
    assert_eq!(rig.host.sent[0].keycodes[0], KEY_F13);
}

#[test]
fn short_glitch_never_reaches_host() {
    let mut rig = Rig::new();
    rig.pins.low[0] = true;
    rig.run(14);
    rig.pins.low[0] = false;
    rig.run(SETTLE);
    assert!(rig.host.sent.is_empty());
    assert!(rig.report().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// Page navigation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn page_count_is_longest_key_list() {
    let rig = Rig::new();
    let longest = SLOTS.iter().map(|s| s.keys.len()).max().unwrap();
    assert_eq!(rig.deck.page_count(), longest);
    assert_eq!(rig.deck.page_count(), 3);
}

#[test]
fn next_advances_then_clamps_without_wrap() {
    let mut rig = Rig::new();
    assert_eq!(rig.deck.page(), 0);

    rig.tap(NEXT);
    assert_eq!(rig.deck.page(), 1);
    rig.tap(NEXT);
    assert_eq!(rig.deck.page(), 2);
    rig.tap(NEXT);
    assert_eq!(rig.deck.page(), 2);
    rig.tap(PREV);
    assert_eq!(rig.deck.page(), 1);

    // One change per stable press edge.
    assert_eq!(rig.page_changes.len(), 3);
}

#[test]
fn navigation_wraps_when_enabled() {
    let mut rig = Rig::with(DeckConfig::new(), Err(PrefsError::NoData));
    rig.tap(PREV);
    assert_eq!(rig.deck.page(), 2);
    rig.tap(NEXT);
    assert_eq!(rig.deck.page(), 0);
}

#[test]
fn navigation_never_reaches_report_and_releases_everything() {
    let mut rig = Rig::new();
    rig.press(0);
    rig.press(1);
    assert_eq!(rig.report().held_keys(), 2);

    rig.tap(NEXT);
    assert_eq!(rig.deck.page(), 1);
    assert!(rig.report().is_empty());
    assert!(rig.host.sent.last().unwrap().is_empty());

    rig.release(0);
    rig.release(1);
    assert!(rig.report().is_empty());

    for report in &rig.host.sent {
        assert!(!report.contains(PREV_PAGE));
        assert!(!report.contains(NEXT_PAGE));
    }
}

#[test]
fn release_after_page_change_keeps_new_page_modifier() {
    let mut rig = Rig::new();
    rig.press(1); // F14 on page 0
    rig.tap(NEXT);
    rig.press(0); // Ctrl+F13 on page 1
    assert_eq!(rig.report().modifier, Modifiers::LCTRL.bits());

    // Slot 1 was pressed on page 0; its release must not touch Ctrl.
    rig.release(1);
    assert_eq!(rig.report().modifier, Modifiers::LCTRL.bits());
    assert!(rig.report().contains(KEY_F13));

    rig.release(0);
    assert!(rig.report().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// HID composition
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn shared_modifier_held_until_both_released() {
    let mut rig = Rig::new();
    rig.tap(NEXT); // Ctrl page

    rig.press(0);
    rig.press(1);
    let report = rig.report();
    assert_eq!(report.modifier, Modifiers::LCTRL.bits());
    assert!(report.contains(KEY_F13) && report.contains(KEY_F14));

    rig.release(0);
    let report = rig.report();
    assert_eq!(report.modifier, Modifiers::LCTRL.bits());
    assert!(!report.contains(KEY_F13));
    assert_eq!(rig.host.sent.last().copied(), Some(report));

    rig.release(1);
    assert!(rig.report().is_empty());
    assert!(rig.host.sent.last().unwrap().is_empty());
}

#[test]
fn seventh_key_leaves_report_unchanged() {
    let mut rig = Rig::new();
    for slot in 0..6 {
        rig.pins.low[slot] = true;
    }
    rig.run(SETTLE);
    let six = rig.report();
    assert_eq!(six.held_keys(), 6);
    let sent = rig.host.sent.len();

    rig.press(6);
    assert_eq!(rig.report(), six);
    assert_eq!(rig.host.sent.len(), sent);
    assert_eq!(rig.deck.hid().rollover_drops(), 1);

    for slot in 0..7 {
        rig.pins.low[slot] = false;
    }
    rig.run(SETTLE);
    assert!(rig.report().is_empty());
}

#[test]
fn busy_host_gets_latest_report_later() {
    let mut rig = Rig::new();
    rig.host.ready = false;
    rig.press(0);
    assert!(rig.host.sent.is_empty());
    assert!(rig.deck.hid().is_dirty());

    rig.host.ready = true;
    rig.run(1);
    assert_eq!(rig.host.sent.len(), 1);
    assert!(rig.host.sent[0].contains(KEY_F13));
}

#[test]
fn disabled_reporting_suppresses_presses_but_not_releases() {
    let mut rig = Rig::new();
    rig.press(1);
    assert!(rig.report().contains(KEY_F14));

    rig.deck.set_reporting(false);
    assert!(!rig.deck.is_reporting(0));
    rig.press(0);
    assert!(!rig.report().contains(KEY_F13));

    rig.release(1);
    assert!(rig.report().is_empty());
    rig.release(0);

    rig.deck.set_reporting(true);
    rig.press(0);
    assert!(rig.report().contains(KEY_F13));
}

#[test]
fn single_slot_can_be_muted() {
    let mut rig = Rig::new();
    rig.deck.set_slot_reporting(1, false);
    assert!(rig.deck.is_reporting(0));

    rig.press(0);
    rig.press(1);
    assert!(rig.report().contains(KEY_F13));
    assert!(!rig.report().contains(KEY_F14));
}

#[test]
fn held_key_latches_repeat() {
    let mut rig = Rig::new();
    rig.press(0);
    rig.repeats = 0;
    rig.run(99);
    assert_eq!(rig.repeats, 3);

    rig.release(0);
    rig.repeats = 0;
    rig.run(99);
    assert_eq!(rig.repeats, 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Persistence
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn stored_page_is_restored() {
    let rig = Rig::with(DeckConfig::new(), Ok(2));
    assert_eq!(rig.deck.page(), 2);
    assert_eq!(rig.deck.display().page(), 2);

    let rig = Rig::with(DeckConfig::new(), Ok(7));
    assert_eq!(rig.deck.page(), 0);

    let rig = Rig::with(DeckConfig::new(), Err(PrefsError::Read));
    assert_eq!(rig.deck.page(), 0);
}

#[test]
fn page_saved_after_quiet_period() {
    let mut rig = Rig::new();
    rig.tap(NEXT);
    let (changed_at, _) = rig.page_changes[0];

    rig.run(1000);
    assert_eq!(rig.saves, vec![(changed_at + 1000, 1)]);
    assert_eq!(rig.deck.display().status(), Some(StatusGlyph::Pending));

    rig.deck.save_finished(rig.now, Ok(()));
    assert_eq!(rig.deck.display().status(), Some(StatusGlyph::Success));
    rig.run(2000);
    assert_eq!(rig.saves.len(), 1);
    assert!(!rig.deck.save_pending());
}

#[test]
fn rapid_changes_save_final_page_once() {
    let mut rig = Rig::new();
    rig.tap(NEXT);
    rig.tap(NEXT);
    let (last_change, _) = rig.page_changes[1];

    rig.run(1100);
    assert_eq!(rig.saves, vec![(last_change + 1000, 2)]);
}

#[test]
fn returning_to_saved_page_skips_write() {
    let mut rig = Rig::with(
        {
            let mut c = DeckConfig::new();
            c.page_wrap = false;
            c
        },
        Ok(0),
    );
    rig.tap(NEXT);
    rig.tap(PREV);
    rig.run(1500);
    assert!(rig.saves.is_empty());
}

#[test]
fn read_error_glyph_shown_for_configured_duration() {
    let mut rig = Rig::new();
    rig.run(11);
    let clean = rig
        .deck
        .display()
        .panel()
        .unwrap()
        .pushed()
        .clone();

    let t0 = rig.now;
    rig.deck.save_finished(t0, Err(PrefsError::Read));
    rig.run(10);
    let panel = rig.deck.display().panel().unwrap();
    assert_ne!(*panel.pushed(), clean);

    rig.run(2000 - 11);
    assert_eq!(rig.now, t0 + 1999);
    assert_eq!(rig.deck.display().status(), Some(StatusGlyph::Failure));

    rig.run(1);
    assert_eq!(rig.now, t0 + 2000);
    assert_eq!(rig.deck.display().status(), None);
    assert_eq!(*rig.deck.display().panel().unwrap().pushed(), clean);
}

// ═══════════════════════════════════════════════════════════════════════════
// Headless
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn keys_work_without_panel() {
    let mut config = DeckConfig::new();
    config.page_wrap = false;
    let mut deck: Deck<FramePanel, SLOT_COUNT> =
        Deck::new(&SLOTS, &PAGES, config, None, Err(PrefsError::NoStorage));
    let mut pins = Pins {
        low: [false; SLOT_COUNT],
    };
    let mut host = Host {
        ready: true,
        sent: Vec::new(),
    };

    pins.low[0] = true;
    for now in 1..=SETTLE {
        deck.tick(now, &mut pins, &mut host);
    }
    assert!(!deck.display().has_panel());
    assert_eq!(deck.display().pushes(), 0);
    assert!(host.sent[0].contains(KEY_F13));
}
