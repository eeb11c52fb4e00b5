//! The poll-loop coordinator.
//!
//! [`Deck`] owns every core component and runs them in a fixed order on
//! each tick: sample buttons, apply page navigation, release then press
//! keys, push the HID report, update the panel. It never performs I/O of
//! its own; the page index to persist is handed back to the caller, which
//! reports the outcome through [`Deck::save_finished`].

use crate::config::DeckConfig;
use crate::error::{Error, PrefsError, SaveResult};
use crate::hid::{HidComposer, HidTransport};
use crate::keymap::{ButtonSlot, KeyEntry, Page, PageModel};
use crate::matrix::{ButtonInput, ButtonMatrix, PageEvent, SlotSet};
use crate::ui::{DisplayController, Panel};

/// What the caller has to act on after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome<const N: usize> {
    /// Page index to persist now.
    pub save: Option<u8>,
    /// Held slots latched by the repeat timer this tick.
    pub repeat: SlotSet<N>,
}

/// Page to start on, given what the preferences store returned.
pub fn restore_page(stored: Result<u8, PrefsError>, page_count: usize) -> usize {
    match stored {
        Ok(page) if usize::from(page) < page_count => {
            info!("Restored page {}", page);
            usize::from(page)
        }
        Ok(page) => {
            warn!("Stored page {} out of range, using 0", page);
            0
        }
        Err(PrefsError::NoData) => {
            info!("No stored page, using 0");
            0
        }
        Err(e) => {
            warn!("Could not load stored page: {}", e);
            0
        }
    }
}

pub struct Deck<P: Panel, const N: usize> {
    config: DeckConfig,
    model: PageModel<N>,
    matrix: ButtonMatrix<N>,
    hid: HidComposer,
    display: DisplayController<P, N>,

    /// Entry each slot pressed into the report, released verbatim.
    reported: [Option<KeyEntry>; N],
    /// Slots whose presses reach the report.
    reporting: SlotSet<N>,

    /// Time of the last page change not yet persisted.
    save_due: Option<u64>,
    /// Page being written by the caller.
    saving: Option<usize>,
    saved_page: Option<usize>,
}

impl<P: Panel, const N: usize> Deck<P, N> {
    /// Builds the core from the key table and draws the starting page.
    ///
    /// `stored` is the persisted page index as loaded at boot.
    pub fn new(
        slots: &'static [ButtonSlot; N],
        pages: &'static [Page],
        config: DeckConfig,
        panel: Option<P>,
        stored: Result<u8, PrefsError>,
    ) -> Self {
        let model = PageModel::new(slots, pages, config.page_wrap);
        let page = restore_page(stored, model.page_count());
        let saved_page = stored.ok().map(usize::from).filter(|&p| p == page);

        let mut display = DisplayController::new(panel, model, config.display);
        display.show_page(page, 0);

        info!(
            "Deck ready: {} slots, {} pages, wrap={}",
            N,
            model.page_count(),
            model.wraps()
        );

        Self {
            config,
            model,
            matrix: ButtonMatrix::new(&config.debounce, page),
            hid: HidComposer::new(),
            display,
            reported: [None; N],
            reporting: SlotSet::full(),
            save_due: None,
            saving: None,
            saved_page,
        }
    }

    /// Runs one iteration of the poll loop at `now` (ms).
    pub fn tick(
        &mut self,
        now: u64,
        input: &mut impl ButtonInput,
        transport: &mut impl HidTransport,
    ) -> TickOutcome<N> {
        if self
            .matrix
            .poll(now, self.config.poll_interval_ms, &self.model, input)
        {
            if let Some(event) = self.matrix.page_event() {
                self.on_page_event(event, now);
            }
            self.apply_edges(now);
        }

        match self.hid.flush(transport) {
            Ok(_) | Err(Error::TransportNotReady) => {}
            Err(e) => warn!("HID send failed: {}", e),
        }

        let repeat = self.matrix.repeat(now);
        let save = self.due_save(now);
        self.display.idle(now);

        TickOutcome { save, repeat }
    }

    fn on_page_event(&mut self, event: PageEvent, now: u64) {
        self.hid.release_all();
        self.reported = [None; N];
        if event.changed() {
            self.display.show_page(event.to, now);
            self.save_due = Some(now);
        } else {
            self.display.wake(now);
        }
    }

    fn apply_edges(&mut self, now: u64) {
        let pressed = *self.matrix.pressed();
        let released = *self.matrix.released();

        for slot in released.iter() {
            if let Some(entry) = self.reported[slot].take() {
                self.hid.release(entry);
            }
        }

        let page = self.matrix.page();
        let reporting = self.reporting;
        for slot in pressed.iter().filter(|&s| reporting.contains(s)) {
            let entry = self.model.resolve_entry(slot, page);
            if entry.is_inert() {
                continue;
            }
            // A rolled-over press still holds its modifiers, so it is
            // recorded for release like any other.
            if let Err(e) = self.hid.press(entry) {
                debug!("slot {} press not reported: {}", slot, e);
            }
            self.reported[slot] = Some(entry);
        }

        self.display.update_keys(&pressed, &released, now);
    }

    fn due_save(&mut self, now: u64) -> Option<u8> {
        if self.saving.is_some() {
            return None;
        }
        let since = self.save_due?;
        if now.wrapping_sub(since) < self.config.save_delay_ms {
            return None;
        }
        self.save_due = None;

        let page = self.matrix.page();
        if self.saved_page == Some(page) {
            return None;
        }
        let Ok(byte) = u8::try_from(page) else {
            warn!("Page {} does not fit the stored byte, not saving", page);
            return None;
        };
        info!("Saving page {}", page);
        self.saving = Some(page);
        self.display.save_started(now);
        Some(byte)
    }

    /// Reports the outcome of the save requested by the last [`TickOutcome`].
    pub fn save_finished(&mut self, now: u64, result: SaveResult) {
        let page = self.saving.take();
        match result {
            Ok(()) => {
                info!("Page saved");
                self.saved_page = page;
            }
            Err(e) => error!("Page save failed: {}", e),
        }
        self.display.save_finished(now, result);
    }

    /// Enables or disables HID reporting of presses on every slot. Releases
    /// of keys whose press was reported are always forwarded.
    pub fn set_reporting(&mut self, enabled: bool) {
        self.reporting = if enabled {
            SlotSet::full()
        } else {
            SlotSet::new()
        };
    }

    /// Per-slot variant of [`Deck::set_reporting`].
    pub fn set_slot_reporting(&mut self, slot: usize, enabled: bool) {
        if enabled {
            self.reporting.insert(slot);
        } else {
            self.reporting.remove(slot);
        }
    }

    pub fn is_reporting(&self, slot: usize) -> bool {
        self.reporting.contains(slot)
    }

    pub fn page(&self) -> usize {
        self.matrix.page()
    }

    pub fn page_count(&self) -> usize {
        self.model.page_count()
    }

    pub fn model(&self) -> &PageModel<N> {
        &self.model
    }

    pub fn matrix(&self) -> &ButtonMatrix<N> {
        &self.matrix
    }

    pub fn hid(&self) -> &HidComposer {
        &self.hid
    }

    pub fn display(&self) -> &DisplayController<P, N> {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayController<P, N> {
        &mut self.display
    }

    /// `true` while a page change waits for its autosave.
    pub fn save_pending(&self) -> bool {
        self.save_due.is_some() || self.saving.is_some()
    }
}
