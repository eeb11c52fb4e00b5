//! Static key mapping: button slots, their per-page entries, and pages.
//!
//! A [`ButtonSlot`] lists one [`KeyEntry`] per page. Lists may have
//! different lengths; the page count is the longest list and a slot with
//! a shorter list is inert on the missing pages.

use crate::keycodes::{self, Modifiers, PageNav};

/// One (modifier mask, keycode) pair.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEntry {
    pub modifiers: Modifiers,
    pub code: u8,
}

impl KeyEntry {
    /// Entry that does nothing.
    pub const INERT: Self = Self::key(keycodes::UNMAPPED);
    /// Previous-page navigation entry.
    pub const PREV: Self = Self::key(keycodes::PREV_PAGE);
    /// Next-page navigation entry.
    pub const NEXT: Self = Self::key(keycodes::NEXT_PAGE);

    pub const fn key(code: u8) -> Self {
        Self {
            modifiers: Modifiers::NONE,
            code,
        }
    }

    pub const fn with(modifiers: Modifiers, code: u8) -> Self {
        Self { modifiers, code }
    }

    /// Navigation direction, if this is a page-navigation sentinel.
    pub const fn page_nav(&self) -> Option<PageNav> {
        PageNav::from_keycode(self.code)
    }

    /// `true` when pressing this entry changes nothing in a HID report.
    pub const fn is_inert(&self) -> bool {
        self.modifiers.is_empty() && !keycodes::is_key(self.code)
    }
}

/// A physical button: its input line and per-page entries.
#[derive(Clone, Copy, Debug)]
pub struct ButtonSlot {
    /// GPIO number, or `None` for an unpopulated slot (never sampled).
    pub pin: Option<u8>,
    pub keys: &'static [KeyEntry],
}

impl ButtonSlot {
    pub const fn new(pin: u8, keys: &'static [KeyEntry]) -> Self {
        Self {
            pin: Some(pin),
            keys,
        }
    }

    pub const fn unpopulated() -> Self {
        Self { pin: None, keys: &[] }
    }

    /// Navigation direction of the slot's page-0 entry.
    pub fn page_nav(&self) -> Option<PageNav> {
        self.keys.first().and_then(KeyEntry::page_nav)
    }
}

/// Display metadata of one page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub name: &'static str,
    /// Accent color, 0x00RRGGBB.
    pub color: u32,
}

/// Read-only view of the key table plus the derived page count.
#[derive(Clone, Copy)]
pub struct PageModel<const N: usize> {
    slots: &'static [ButtonSlot; N],
    pages: &'static [Page],
    page_count: usize,
    wrap: bool,
}

impl<const N: usize> PageModel<N> {
    /// Builds the model. The page count is fixed here: the longest key list
    /// of any populated slot, and at least one.
    pub fn new(slots: &'static [ButtonSlot; N], pages: &'static [Page], wrap: bool) -> Self {
        let page_count = slots
            .iter()
            .filter(|s| s.pin.is_some())
            .map(|s| s.keys.len())
            .max()
            .unwrap_or(0)
            .max(1);
        Self {
            slots,
            pages,
            page_count,
            wrap,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn wraps(&self) -> bool {
        self.wrap
    }

    pub fn slot(&self, slot: usize) -> &ButtonSlot {
        &self.slots[slot]
    }

    pub fn slots(&self) -> &[ButtonSlot; N] {
        self.slots
    }

    /// Entry for `slot` on `page`, or [`KeyEntry::INERT`] when the slot's
    /// list is shorter than `page + 1`.
    pub fn resolve_entry(&self, slot: usize, page: usize) -> KeyEntry {
        self.slots
            .get(slot)
            .and_then(|s| s.keys.get(page))
            .copied()
            .unwrap_or(KeyEntry::INERT)
    }

    /// `true` for slots whose page-0 entry is a navigation sentinel.
    pub fn is_nav_slot(&self, slot: usize) -> bool {
        self.slots.get(slot).and_then(ButtonSlot::page_nav).is_some()
    }

    /// Page index after one navigation step, wrapped or clamped to
    /// `[0, page_count)` depending on the wrap flag.
    pub fn step(&self, page: usize, nav: PageNav) -> usize {
        let last = self.page_count - 1;
        let page = page.min(last);
        match (nav, self.wrap) {
            (PageNav::Prev, _) if page > 0 => page - 1,
            (PageNav::Prev, true) => last,
            (PageNav::Prev, false) => 0,
            (PageNav::Next, _) if page < last => page + 1,
            (PageNav::Next, true) => 0,
            (PageNav::Next, false) => last,
        }
    }

    /// Descriptor of `page`; the page list may be shorter than the page
    /// count.
    pub fn page(&self, page: usize) -> Option<&Page> {
        self.pages.get(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycodes::*;

    static SLOTS: [ButtonSlot; 4] = [
        ButtonSlot::new(2, &[KeyEntry::key(KEY_F13), KeyEntry::with(Modifiers::LCTRL, KEY_F13)]),
        ButtonSlot::new(
            3,
            &[
                KeyEntry::key(KEY_F14),
                KeyEntry::key(KEY_A),
                KeyEntry::with(Modifiers::LSHIFT, KEY_F14),
            ],
        ),
        ButtonSlot::new(4, &[KeyEntry::NEXT]),
        ButtonSlot::unpopulated(),
    ];

    static PAGES: [Page; 2] = [
        Page { name: "Main", color: 0x0000FF },
        Page { name: "Ctrl", color: 0x00FF00 },
    ];

    #[test]
    fn page_count_is_longest_key_list() {
        let model = PageModel::new(&SLOTS, &PAGES, false);
        assert_eq!(model.page_count(), 3);
    }

    #[test]
    fn page_count_is_at_least_one() {
        static EMPTY: [ButtonSlot; 2] = [ButtonSlot::unpopulated(), ButtonSlot::unpopulated()];
        let model = PageModel::new(&EMPTY, &[], true);
        assert_eq!(model.page_count(), 1);
        assert_eq!(model.step(0, PageNav::Next), 0);
    }

    #[test]
    fn resolve_entry_falls_back_to_inert() {
        let model = PageModel::new(&SLOTS, &PAGES, false);
        assert_eq!(
            model.resolve_entry(0, 1),
            KeyEntry::with(Modifiers::LCTRL, KEY_F13)
        );
        assert_eq!(model.resolve_entry(0, 2), KeyEntry::INERT);
        assert_eq!(model.resolve_entry(3, 0), KeyEntry::INERT);
        assert_eq!(model.resolve_entry(99, 0), KeyEntry::INERT);
        assert!(KeyEntry::INERT.is_inert());
        assert!(!KeyEntry::with(Modifiers::LCTRL, UNMAPPED).is_inert());
    }

    #[test]
    fn nav_slots_are_detected_from_page_zero() {
        let model = PageModel::new(&SLOTS, &PAGES, false);
        assert!(model.is_nav_slot(2));
        assert!(!model.is_nav_slot(0));
        assert!(!model.is_nav_slot(3));
    }

    #[test]
    fn step_clamps_without_wrap() {
        let model = PageModel::new(&SLOTS, &PAGES, false);
        assert_eq!(model.step(0, PageNav::Next), 1);
        assert_eq!(model.step(2, PageNav::Next), 2);
        assert_eq!(model.step(0, PageNav::Prev), 0);
        assert_eq!(model.step(2, PageNav::Prev), 1);
    }

    #[test]
    fn step_wraps_with_wrap() {
        let model = PageModel::new(&SLOTS, &PAGES, true);
        assert_eq!(model.step(2, PageNav::Next), 0);
        assert_eq!(model.step(0, PageNav::Prev), 2);
        assert_eq!(model.step(1, PageNav::Next), 2);
    }

    #[test]
    fn page_descriptors_may_be_short() {
        let model = PageModel::new(&SLOTS, &PAGES, true);
        assert_eq!(model.page(1).map(|p| p.name), Some("Ctrl"));
        assert!(model.page(2).is_none());
    }
}
