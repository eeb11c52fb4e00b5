//! USB HID keyboard usages, modifier bits and on-panel labels.
//!
//! Usages 0x00..=0x03 are never sent as keys by a real keyboard
//! (No Event / ErrorRollOver / POSTFail / ErrorUndefined), so the keymap
//! reuses that range for its own sentinels: an unmapped entry and the two
//! page-navigation actions.

use core::fmt::Write;

/// Sentinel: entry does nothing.
pub const UNMAPPED: u8 = 0x00;
/// Sentinel: go to the previous page.
pub const PREV_PAGE: u8 = 0x01;
/// Sentinel: go to the next page.
pub const NEXT_PAGE: u8 = 0x02;
/// First usage that is a real key.
pub const FIRST_KEY: u8 = 0x04;

pub const KEY_A: u8 = 0x04;
pub const KEY_1: u8 = 0x1E;
pub const KEY_0: u8 = 0x27;
pub const KEY_ENTER: u8 = 0x28;
pub const KEY_ESC: u8 = 0x29;
pub const KEY_BACKSPACE: u8 = 0x2A;
pub const KEY_TAB: u8 = 0x2B;
pub const KEY_SPACE: u8 = 0x2C;
pub const KEY_F1: u8 = 0x3A;
pub const KEY_F12: u8 = 0x45;
pub const KEY_INSERT: u8 = 0x49;
pub const KEY_HOME: u8 = 0x4A;
pub const KEY_PAGE_UP: u8 = 0x4B;
pub const KEY_DELETE: u8 = 0x4C;
pub const KEY_END: u8 = 0x4D;
pub const KEY_PAGE_DOWN: u8 = 0x4E;
pub const KEY_RIGHT: u8 = 0x4F;
pub const KEY_LEFT: u8 = 0x50;
pub const KEY_DOWN: u8 = 0x51;
pub const KEY_UP: u8 = 0x52;
pub const KEY_F13: u8 = 0x68;
pub const KEY_F14: u8 = 0x69;
pub const KEY_F15: u8 = 0x6A;
pub const KEY_F16: u8 = 0x6B;
pub const KEY_F17: u8 = 0x6C;
pub const KEY_F18: u8 = 0x6D;
pub const KEY_F19: u8 = 0x6E;
pub const KEY_F20: u8 = 0x6F;
pub const KEY_F21: u8 = 0x70;
pub const KEY_F22: u8 = 0x71;
pub const KEY_F23: u8 = 0x72;
pub const KEY_F24: u8 = 0x73;
pub const KEY_MUTE: u8 = 0x7F;
pub const KEY_VOLUME_UP: u8 = 0x80;
pub const KEY_VOLUME_DOWN: u8 = 0x81;

/// Page-navigation direction carried by a sentinel keycode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PageNav {
    Prev,
    Next,
}

impl PageNav {
    pub const fn from_keycode(code: u8) -> Option<Self> {
        match code {
            PREV_PAGE => Some(PageNav::Prev),
            NEXT_PAGE => Some(PageNav::Next),
            _ => None,
        }
    }
}

/// Returns `true` if `code` may be placed in a keyboard report.
pub const fn is_key(code: u8) -> bool {
    code >= FIRST_KEY
}

/// Modifier byte of the boot keyboard report.
///
/// ```text
/// Bit 0 = Left Ctrl,  Bit 1 = Left Shift,  Bit 2 = Left Alt,  Bit 3 = Left GUI
/// Bit 4 = Right Ctrl, Bit 5 = Right Shift, Bit 6 = Right Alt, Bit 7 = Right GUI
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const LCTRL: Self = Self(1 << 0);
    pub const LSHIFT: Self = Self(1 << 1);
    pub const LALT: Self = Self(1 << 2);
    pub const LGUI: Self = Self(1 << 3);
    pub const RCTRL: Self = Self(1 << 4);
    pub const RSHIFT: Self = Self(1 << 5);
    pub const RALT: Self = Self(1 << 6);
    pub const RGUI: Self = Self(1 << 7);

    /// Number of distinct modifier bits.
    pub const COUNT: usize = 8;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Indices (0..8) of the set modifier bits, low bit first.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..Self::COUNT).filter(move |i| self.0 & (1 << i) != 0)
    }

    /// Short legend text: a three-letter name for a single modifier,
    /// `C+S`-style initials for combinations, empty for none.
    pub fn label(self) -> heapless::String<16> {
        const NAMES: [&str; 8] = ["CTL", "SFT", "ALT", "GUI", "RCT", "RSF", "RAL", "RGU"];
        const INITIALS: [char; 4] = ['C', 'S', 'A', 'G'];

        let mut out = heapless::String::new();
        if self.0.count_ones() == 1 {
            let _ = out.push_str(NAMES[self.0.trailing_zeros() as usize]);
            return out;
        }
        for (n, i) in self.indices().enumerate() {
            if n > 0 {
                let _ = out.push('+');
            }
            let _ = out.push(INITIALS[i % 4]);
        }
        out
    }
}

/// Legend label for a key usage. Unknown usages render as hex.
pub fn label(code: u8) -> heapless::String<8> {
    let mut out = heapless::String::new();
    let _ = match code {
        UNMAPPED => Ok(()),
        PREV_PAGE => out.push_str("<-"),
        NEXT_PAGE => out.push_str("->"),
        0x04..=0x1D => out.push((b'A' + (code - KEY_A)) as char),
        0x1E..=0x26 => out.push((b'1' + (code - KEY_1)) as char),
        KEY_0 => out.push('0'),
        KEY_ENTER => out.push_str("Ent"),
        KEY_ESC => out.push_str("Esc"),
        KEY_BACKSPACE => out.push_str("Bks"),
        KEY_TAB => out.push_str("Tab"),
        KEY_SPACE => out.push_str("Spc"),
        KEY_F1..=KEY_F12 => write!(out, "F{}", code - KEY_F1 + 1).map_err(|_| ()),
        KEY_INSERT => out.push_str("Ins"),
        KEY_HOME => out.push_str("Hom"),
        KEY_PAGE_UP => out.push_str("PgU"),
        KEY_DELETE => out.push_str("Del"),
        KEY_END => out.push_str("End"),
        KEY_PAGE_DOWN => out.push_str("PgD"),
        KEY_RIGHT => out.push_str("Rgt"),
        KEY_LEFT => out.push_str("Lft"),
        KEY_DOWN => out.push_str("Dwn"),
        KEY_UP => out.push_str("Up"),
        KEY_F13..=KEY_F24 => write!(out, "F{}", code - KEY_F13 + 13).map_err(|_| ()),
        KEY_MUTE => out.push_str("Mut"),
        KEY_VOLUME_UP => out.push_str("Vl+"),
        KEY_VOLUME_DOWN => out.push_str("Vl-"),
        _ => write!(out, "{:02X}", code).map_err(|_| ()),
    };
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_not_keys() {
        assert!(!is_key(UNMAPPED));
        assert!(!is_key(PREV_PAGE));
        assert!(!is_key(NEXT_PAGE));
        assert!(is_key(KEY_A));
        assert_eq!(PageNav::from_keycode(PREV_PAGE), Some(PageNav::Prev));
        assert_eq!(PageNav::from_keycode(NEXT_PAGE), Some(PageNav::Next));
        assert_eq!(PageNav::from_keycode(KEY_F13), None);
    }

    #[test]
    fn labels_cover_common_keys() {
        assert_eq!(label(KEY_A).as_str(), "A");
        assert_eq!(label(0x1D).as_str(), "Z");
        assert_eq!(label(KEY_1).as_str(), "1");
        assert_eq!(label(KEY_0).as_str(), "0");
        assert_eq!(label(KEY_F1).as_str(), "F1");
        assert_eq!(label(KEY_F12).as_str(), "F12");
        assert_eq!(label(KEY_F13).as_str(), "F13");
        assert_eq!(label(KEY_F24).as_str(), "F24");
        assert_eq!(label(0xE8).as_str(), "E8");
        assert_eq!(label(UNMAPPED).as_str(), "");
    }

    #[test]
    fn modifier_labels() {
        assert_eq!(Modifiers::LCTRL.label().as_str(), "CTL");
        assert_eq!(Modifiers::LSHIFT.label().as_str(), "SFT");
        assert_eq!(Modifiers::RGUI.label().as_str(), "RGU");
        assert_eq!(
            Modifiers::LCTRL.union(Modifiers::LSHIFT).label().as_str(),
            "C+S"
        );
        assert_eq!(Modifiers::NONE.label().as_str(), "");
    }

    #[test]
    fn modifier_indices() {
        let mods = Modifiers::LCTRL.union(Modifiers::RALT);
        let mut it = mods.indices();
        assert_eq!(it.next(), Some(0));
        assert_eq!(it.next(), Some(6));
        assert_eq!(it.next(), None);
        assert!(mods.contains(Modifiers::RALT));
        assert!(!mods.contains(Modifiers::LSHIFT));
    }
}
