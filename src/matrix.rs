//! Debounced button sampling and page navigation.
//!
//! Each slot keeps a shift register of raw samples. A level is accepted
//! only when the last `window` samples agree; after an accepted edge the
//! slot is left alone for `cooldown_ticks` so contact chatter right after
//! the edge cannot re-trigger it.
//!
//! Lines are active-low: a high sample means released.
//!
//! Navigation slots (page-0 entry is a page sentinel) are resolved here:
//! they move the page index and raise a [`PageEvent`] instead of showing
//! up in [`ButtonMatrix::pressed`]/[`ButtonMatrix::released`].

use crate::config::DebounceConfig;
use crate::keymap::PageModel;

/// Source of raw line levels.
pub trait ButtonInput {
    /// Level of the line wired to `slot` (GPIO `pin`); `true` = high.
    fn is_high(&mut self, slot: usize, pin: u8) -> bool;
}

/// Set of slot indices, one flag per slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotSet<const N: usize>([bool; N]);

impl<const N: usize> SlotSet<N> {
    pub const fn new() -> Self {
        Self([false; N])
    }

    /// Every slot.
    pub const fn full() -> Self {
        Self([true; N])
    }

    pub fn from_slots(slots: &[usize]) -> Self {
        let mut set = Self::new();
        for &slot in slots {
            set.insert(slot);
        }
        set
    }

    pub fn contains(&self, slot: usize) -> bool {
        self.0.get(slot).copied().unwrap_or(false)
    }

    pub fn insert(&mut self, slot: usize) {
        if let Some(flag) = self.0.get_mut(slot) {
            *flag = true;
        }
    }

    pub fn remove(&mut self, slot: usize) {
        if let Some(flag) = self.0.get_mut(slot) {
            *flag = false;
        }
    }

    pub fn clear(&mut self) {
        self.0 = [false; N];
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&f| f)
    }

    pub fn len(&self) -> usize {
        self.0.iter().filter(|&&f| f).count()
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut out = *self;
        for slot in other.iter() {
            out.insert(slot);
        }
        out
    }

    /// Slot indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(slot, &f)| f.then_some(slot))
    }
}

impl<const N: usize> Default for SlotSet<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Page change caused by navigation presses during one poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PageEvent {
    pub from: usize,
    pub to: usize,
}

impl PageEvent {
    /// `false` when navigation hit a clamped end.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Runtime debouncing state of one slot.
#[derive(Clone, Copy, Debug)]
struct DebounceState {
    /// Newest sample in bit 0; 1 = high (released).
    history: u32,
    /// Remaining ticks before the slot is sampled again.
    cooldown: u32,
    /// Last accepted level.
    pressed: bool,
}

impl DebounceState {
    const RELEASED: Self = Self {
        history: u32::MAX,
        cooldown: 0,
        pressed: false,
    };
}

pub struct ButtonMatrix<const N: usize> {
    states: [DebounceState; N],
    window_mask: u32,
    cooldown_ticks: u32,
    repeat_interval_ms: u64,
    last_poll_ms: u64,
    last_repeat_ms: u64,
    page: usize,

    pressed: SlotSet<N>,
    released: SlotSet<N>,
    debounced: SlotSet<N>,
    debouncing: SlotSet<N>,
    pressed_released: SlotSet<N>,
    combo: SlotSet<N>,
    repeat: SlotSet<N>,
    page_event: Option<PageEvent>,
}

impl<const N: usize> ButtonMatrix<N> {
    /// Creates the matrix with every slot released, starting on `page`.
    pub fn new(config: &DebounceConfig, page: usize) -> Self {
        let window = u32::from(config.window.clamp(1, 32));
        let window_mask = if window == 32 {
            u32::MAX
        } else {
            (1 << window) - 1
        };
        Self {
            states: [DebounceState::RELEASED; N],
            window_mask,
            cooldown_ticks: config.cooldown_ticks,
            repeat_interval_ms: config.repeat_interval_ms,
            last_poll_ms: 0,
            last_repeat_ms: 0,
            page,
            pressed: SlotSet::new(),
            released: SlotSet::new(),
            debounced: SlotSet::new(),
            debouncing: SlotSet::new(),
            pressed_released: SlotSet::new(),
            combo: SlotSet::new(),
            repeat: SlotSet::new(),
            page_event: None,
        }
    }

    /// Samples every populated slot once.
    ///
    /// Resets the per-poll sets first. Does nothing else if less than
    /// `min_interval_ms` passed since the last effective poll; returns
    /// whether sampling happened.
    pub fn poll(
        &mut self,
        now_ms: u64,
        min_interval_ms: u64,
        model: &PageModel<N>,
        input: &mut impl ButtonInput,
    ) -> bool {
        self.pressed.clear();
        self.released.clear();
        self.pressed_released.clear();
        self.page_event = None;

        let elapsed = now_ms.saturating_sub(self.last_poll_ms);
        if elapsed < min_interval_ms {
            return false;
        }
        self.last_poll_ms = now_ms;

        if elapsed > 0 && !self.debouncing.is_empty() {
            self.advance_cooldowns(elapsed);
        }

        for slot in 0..N {
            let Some(pin) = model.slot(slot).pin else {
                continue;
            };
            let state = &mut self.states[slot];
            if state.cooldown > 0 {
                continue;
            }

            state.history = (state.history << 1) | u32::from(input.is_high(slot, pin));
            let pressed = match state.history & self.window_mask {
                0 => true,
                m if m == self.window_mask => false,
                // still bouncing
                _ => continue,
            };
            if pressed == state.pressed {
                continue;
            }

            state.pressed = pressed;
            state.cooldown = 0;
            if self.cooldown_ticks > 0 {
                state.cooldown = self.cooldown_ticks;
                self.debouncing.insert(slot);
            }

            if pressed {
                self.on_press(slot, model);
            } else {
                self.on_release(slot, model);
            }
        }

        true
    }

    fn advance_cooldowns(&mut self, elapsed: u64) {
        for slot in 0..N {
            let state = &mut self.states[slot];
            if state.cooldown == 0 {
                continue;
            }
            if elapsed < u64::from(state.cooldown) {
                state.cooldown -= elapsed as u32;
            } else {
                state.cooldown = 0;
                self.debouncing.remove(slot);
            }
        }
    }

    fn on_press(&mut self, slot: usize, model: &PageModel<N>) {
        self.debounced.insert(slot);
        self.combo.insert(slot);

        match model.slot(slot).page_nav() {
            Some(nav) => {
                let from = self.page_event.map_or(self.page, |e| e.from);
                self.page = model.step(self.page, nav);
                self.page_event = Some(PageEvent {
                    from,
                    to: self.page,
                });
                info!("Page nav: {} -> {}", from, self.page);
            }
            None => self.pressed.insert(slot),
        }
    }

    fn on_release(&mut self, slot: usize, model: &PageModel<N>) {
        self.debounced.remove(slot);
        if !model.is_nav_slot(slot) {
            self.released.insert(slot);
        }
        if self.debounced.is_empty() {
            self.pressed_released = self.combo;
            self.combo.clear();
        }
    }

    /// Latches the held set into the repeat set once per repeat interval;
    /// between intervals the repeat set is empty.
    pub fn repeat(&mut self, now_ms: u64) -> SlotSet<N> {
        if now_ms.saturating_sub(self.last_repeat_ms) >= self.repeat_interval_ms {
            self.last_repeat_ms = now_ms;
            self.repeat = self.debounced;
        } else {
            self.repeat.clear();
        }
        self.repeat
    }

    /// `true` if this poll's new presses are exactly `pressed` while exactly
    /// `held` was already down.
    pub fn combo_pressed(&self, pressed: &SlotSet<N>, held: &SlotSet<N>) -> bool {
        *pressed == self.pressed && pressed.union(held) == self.debounced
    }

    /// Non-navigation slots that became pressed this poll.
    pub fn pressed(&self) -> &SlotSet<N> {
        &self.pressed
    }

    /// Non-navigation slots that became released this poll.
    pub fn released(&self) -> &SlotSet<N> {
        &self.released
    }

    /// Slots currently at the stable-pressed level.
    pub fn debounced(&self) -> &SlotSet<N> {
        &self.debounced
    }

    /// Slots in their post-edge cooldown.
    pub fn debouncing(&self) -> &SlotSet<N> {
        &self.debouncing
    }

    /// Every slot pressed since the last full release; only set on the poll
    /// where the last held slot is released.
    pub fn pressed_released(&self) -> &SlotSet<N> {
        &self.pressed_released
    }

    pub fn page_event(&self) -> Option<PageEvent> {
        self.page_event
    }

    pub fn page(&self) -> usize {
        self.page
    }
}
