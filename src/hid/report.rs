//! USB HID keyboard report (boot protocol compatible).
//!
//! Layout (8 bytes):
//! ```text
//! Byte 0: Modifier keys (bitfield, see `Modifiers`)
//! Byte 1: Reserved (0x00)
//! Byte 2-7: Up to 6 simultaneous key codes (USB HID usage codes)
//! ```

/// Keyboard report size in bytes.
pub const KEY_REPORT_SIZE: usize = 8;

/// Number of non-modifier key slots.
pub const KEY_SLOTS: usize = 6;

/// Standard USB HID boot-protocol keyboard report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyReport {
    /// Modifier key bitfield.
    pub modifier: u8,
    /// Reserved byte, always 0x00.
    pub reserved: u8,
    /// Up to 6 simultaneously pressed key codes, 0 = empty slot.
    pub keycodes: [u8; KEY_SLOTS],
}

impl KeyReport {
    /// Create an empty (all-keys-released) report.
    pub const fn empty() -> Self {
        Self {
            modifier: 0,
            reserved: 0,
            keycodes: [0; KEY_SLOTS],
        }
    }

    /// Wire form of the report.
    pub fn to_bytes(&self) -> [u8; KEY_REPORT_SIZE] {
        let mut buf = [0u8; KEY_REPORT_SIZE];
        self.serialize(&mut buf);
        buf
    }

    /// Serialise into a byte slice for USB HID transmission.
    /// Returns the number of bytes written (8, or 0 if `buf` is too small).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEY_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.modifier;
        buf[1] = self.reserved;
        buf[2..8].copy_from_slice(&self.keycodes);
        KEY_REPORT_SIZE
    }

    /// Returns `true` if nothing is held.
    pub fn is_empty(&self) -> bool {
        self.modifier == 0 && self.keycodes.iter().all(|&k| k == 0)
    }

    /// Returns `true` if `code` occupies one of the key slots.
    pub fn contains(&self, code: u8) -> bool {
        code != 0 && self.keycodes.contains(&code)
    }

    /// Number of occupied key slots.
    pub fn held_keys(&self) -> usize {
        self.keycodes.iter().filter(|&&k| k != 0).count()
    }
}
