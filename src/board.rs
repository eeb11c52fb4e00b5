//! Key table of the reference keypad.
//!
//! Fourteen switches on GPIO 2..=15. The first twelve are macro keys,
//! sending F13-F24 bare on page 1, with Ctrl on page 2 and with Shift on
//! page 3. GPIO 14 and 15 step to the previous and next page.

use crate::keycodes::*;
use crate::keymap::{ButtonSlot, KeyEntry, Page};

/// Number of button slots on the board.
pub const SLOT_COUNT: usize = 14;

/// Display SDA/SCL pins of the panel's I²C bus (I2C1). The firmware
/// logs them at boot; its pin choice has to match.
pub const DISPLAY_SDA_PIN: u8 = 18;
pub const DISPLAY_SCL_PIN: u8 = 19;

const fn macro_key(code: u8) -> [KeyEntry; 3] {
    [
        KeyEntry::key(code),
        KeyEntry::with(Modifiers::LCTRL, code),
        KeyEntry::with(Modifiers::LSHIFT, code),
    ]
}

static KEYS: [[KeyEntry; 3]; 12] = [
    macro_key(KEY_F13),
    macro_key(KEY_F14),
    macro_key(KEY_F15),
    macro_key(KEY_F16),
    macro_key(KEY_F17),
    macro_key(KEY_F18),
    macro_key(KEY_F19),
    macro_key(KEY_F20),
    macro_key(KEY_F21),
    macro_key(KEY_F22),
    macro_key(KEY_F23),
    macro_key(KEY_F24),
];

pub static SLOTS: [ButtonSlot; SLOT_COUNT] = [
    ButtonSlot::new(2, &KEYS[0]),
    ButtonSlot::new(3, &KEYS[1]),
    ButtonSlot::new(4, &KEYS[2]),
    ButtonSlot::new(5, &KEYS[3]),
    ButtonSlot::new(6, &KEYS[4]),
    ButtonSlot::new(7, &KEYS[5]),
    ButtonSlot::new(8, &KEYS[6]),
    ButtonSlot::new(9, &KEYS[7]),
    ButtonSlot::new(10, &KEYS[8]),
    ButtonSlot::new(11, &KEYS[9]),
    ButtonSlot::new(12, &KEYS[10]),
    ButtonSlot::new(13, &KEYS[11]),
    ButtonSlot::new(14, &[KeyEntry::PREV]),
    ButtonSlot::new(15, &[KeyEntry::NEXT]),
];

pub static PAGES: [Page; 3] = [
    Page {
        name: "Avatar Actions",
        color: 0x0000_00FF,
    },
    Page {
        name: "Scenes",
        color: 0x0000_FF00,
    },
    Page {
        name: "System Apps",
        color: 0x00FF_0000,
    },
];
