//! Page display state machine.
//!
//! Drawing goes to the panel's framebuffer as soon as something changes
//! and only marks the frame dirty; [`DisplayController::idle`] pushes a
//! dirty frame at most once per tick, and only while the panel is ready.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::{FONT_4X6, FONT_5X8, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};

use super::bitmap::{BannerBitmap, Bitmap, CellBitmap};
use super::panel::{Panel, TextSize};
use super::{ScreenMode, StatusGlyph};
use crate::config::{
    DisplayConfig, BANNER_HEIGHT, CELL_HEIGHT, CELL_WIDTH, GRID_COLUMNS, GRID_ROWS, PANEL_HEIGHT,
    PANEL_WIDTH,
};
use crate::error::SaveResult;
use crate::keycodes;
use crate::keymap::{KeyEntry, PageModel};
use crate::matrix::SlotSet;

type Glyph = Bitmap<8>;

const GLYPH_SIZE: u32 = 8;
const GLYPH_ORIGIN: Point = Point::new((PANEL_WIDTH - GLYPH_SIZE) as i32, 0);

#[rustfmt::skip]
const GLYPH_PENDING: Glyph = Bitmap::from_bytes(8, 8, [
    0b1111_1111,
    0b0100_0010,
    0b0010_0100,
    0b0001_1000,
    0b0001_1000,
    0b0010_0100,
    0b0100_0010,
    0b1111_1111,
]);

#[rustfmt::skip]
const GLYPH_SUCCESS: Glyph = Bitmap::from_bytes(8, 8, [
    0b0000_0000,
    0b0000_0001,
    0b0000_0011,
    0b0000_0110,
    0b1000_1100,
    0b1101_1000,
    0b0111_0000,
    0b0010_0000,
]);

#[rustfmt::skip]
const GLYPH_FAILURE: Glyph = Bitmap::from_bytes(8, 8, [
    0b1000_0001,
    0b0100_0010,
    0b0010_0100,
    0b0001_1000,
    0b0001_1000,
    0b0010_0100,
    0b0100_0010,
    0b1000_0001,
]);

impl StatusGlyph {
    fn bitmap(self) -> &'static Glyph {
        match self {
            StatusGlyph::Pending => &GLYPH_PENDING,
            StatusGlyph::Success => &GLYPH_SUCCESS,
            StatusGlyph::Failure => &GLYPH_FAILURE,
        }
    }
}

#[derive(Clone, Copy)]
struct Status {
    glyph: StatusGlyph,
    since: u64,
}

/// Top-left corner of legend cell `index` in the grid.
fn cell_origin(index: usize) -> Point {
    Point::new(
        (index % GRID_COLUMNS) as i32 * CELL_WIDTH as i32,
        (BANNER_HEIGHT + 1) as i32 + (index / GRID_COLUMNS) as i32 * CELL_HEIGHT as i32,
    )
}

pub struct DisplayController<P: Panel, const N: usize> {
    panel: Option<P>,
    model: PageModel<N>,
    config: DisplayConfig,
    mode: ScreenMode,
    page: usize,

    /// Grid position of each slot's legend; `None` for navigation and
    /// unpopulated slots.
    origins: [Option<Point>; N],
    cells: [CellBitmap; N],
    highlighted: SlotSet<N>,

    banners: [BannerBitmap; 2],
    front: usize,
    scroll: Option<i32>,
    dwell_since: u64,

    status: Option<Status>,
    last_activity: u64,
    dimmed: bool,
    dirty: bool,
    last_tick: Option<u64>,
    pushes: u32,
}

impl<P: Panel, const N: usize> DisplayController<P, N> {
    /// `panel` is `None` when the display failed to initialise; every call
    /// is then a no-op apart from bookkeeping.
    pub fn new(panel: Option<P>, model: PageModel<N>, config: DisplayConfig) -> Self {
        if panel.is_none() {
            warn!("display: no panel, rendering disabled");
        }

        let mut origins = [None; N];
        let mut next = 0;
        for (slot, origin) in origins.iter_mut().enumerate() {
            if next == GRID_COLUMNS * GRID_ROWS {
                break;
            }
            if model.slot(slot).pin.is_none() || model.is_nav_slot(slot) {
                continue;
            }
            *origin = Some(cell_origin(next));
            next += 1;
        }

        Self {
            panel,
            model,
            config,
            mode: ScreenMode::Init,
            page: 0,
            origins,
            cells: core::array::from_fn(|_| CellBitmap::new(CELL_WIDTH, CELL_HEIGHT)),
            highlighted: SlotSet::new(),
            banners: core::array::from_fn(|_| BannerBitmap::new(PANEL_WIDTH, BANNER_HEIGHT)),
            front: 0,
            scroll: None,
            dwell_since: 0,
            status: None,
            last_activity: 0,
            dimmed: false,
            dirty: false,
            last_tick: None,
            pushes: 0,
        }
    }

    /// Switches screens. `Default` redraws the current page; the save
    /// modes show their fixed message.
    pub fn set_mode(&mut self, mode: ScreenMode, now: u64) {
        self.mode = mode;
        self.wake(now);
        match mode {
            ScreenMode::Default => self.render_page(now),
            ScreenMode::Init => {
                if let Some(panel) = self.panel.as_mut() {
                    panel.clear();
                    self.dirty = true;
                }
            }
            ScreenMode::Saving | ScreenMode::SaveSuccess | ScreenMode::SaveError => {
                if let Some(text) = mode.message() {
                    self.render_message(text);
                }
            }
        }
    }

    /// Redraws everything for `page` and enters `Default`.
    pub fn show_page(&mut self, page: usize, now: u64) {
        self.page = page.min(self.model.page_count() - 1);
        self.set_mode(ScreenMode::Default, now);
    }

    /// Applies this poll's edges to the legend grid.
    pub fn update_keys(&mut self, pressed: &SlotSet<N>, released: &SlotSet<N>, now: u64) {
        if pressed.is_empty() && released.is_empty() {
            return;
        }
        self.wake(now);
        for slot in released.iter() {
            self.unhighlight(slot);
        }
        for slot in pressed.iter() {
            self.highlight(slot);
        }
    }

    /// Shows `slot`'s legend inverted. Repeated calls do nothing.
    pub fn highlight(&mut self, slot: usize) {
        if !self.highlighted.contains(slot) {
            self.toggle_cell(slot);
        }
    }

    pub fn unhighlight(&mut self, slot: usize) {
        if self.highlighted.contains(slot) {
            self.toggle_cell(slot);
        }
    }

    fn toggle_cell(&mut self, slot: usize) {
        if self.mode != ScreenMode::Default {
            return;
        }
        let Some(origin) = self.origins.get(slot).copied().flatten() else {
            return;
        };
        let Some(panel) = self.panel.as_mut() else {
            return;
        };

        if self.highlighted.contains(slot) {
            self.highlighted.remove(slot);
        } else {
            self.highlighted.insert(slot);
        }
        let cell = &mut self.cells[slot];
        cell.invert();
        draw_cell(panel, origin, cell);
        self.dirty = true;
    }

    /// Resets the inactivity timer and restores full contrast.
    pub fn wake(&mut self, now: u64) {
        self.last_activity = now;
        if !self.dimmed {
            return;
        }
        self.dimmed = false;
        if let Some(panel) = self.panel.as_mut() {
            if let Err(e) = panel.set_contrast(self.config.contrast_normal) {
                warn!("display: contrast change failed: {}", e);
            }
        }
        debug!("display: undimmed");
    }

    /// A save of the page index started.
    pub fn save_started(&mut self, now: u64) {
        self.set_status(StatusGlyph::Pending, now);
    }

    /// A save finished with `result`.
    pub fn save_finished(&mut self, now: u64, result: SaveResult) {
        let glyph = match result {
            Ok(()) => StatusGlyph::Success,
            Err(_) => StatusGlyph::Failure,
        };
        self.set_status(glyph, now);
    }

    fn set_status(&mut self, glyph: StatusGlyph, now: u64) {
        self.status = Some(Status { glyph, since: now });
        if self.mode != ScreenMode::Default {
            return;
        }
        if let Some(panel) = self.panel.as_mut() {
            draw_glyph(panel, glyph);
            self.dirty = true;
        }
    }

    /// Periodic housekeeping: banner slide, status expiry, dimming and the
    /// hardware push. Runs at most once per `tick_ms`.
    pub fn idle(&mut self, now: u64) {
        if let Some(last) = self.last_tick {
            if now.wrapping_sub(last) < self.config.tick_ms {
                return;
            }
        }
        self.last_tick = Some(now);
        if self.panel.is_none() {
            return;
        }

        self.expire_status(now);
        if self.mode == ScreenMode::Default {
            self.advance_banner(now);
        }
        self.dim_if_idle(now);
        self.push();
    }

    fn expire_status(&mut self, now: u64) {
        let Some(status) = self.status else {
            return;
        };
        if now.wrapping_sub(status.since) < self.config.status_glyph_ms {
            return;
        }
        self.status = None;
        if self.mode == ScreenMode::Default {
            self.redraw_banner();
        }
    }

    fn advance_banner(&mut self, now: u64) {
        let step = self.config.scroll_step.max(1);
        let x = match self.scroll {
            Some(x) => x + step,
            None if now.wrapping_sub(self.dwell_since) >= self.config.banner_dwell_ms => step,
            None => return,
        };

        if x >= PANEL_WIDTH as i32 {
            self.front ^= 1;
            self.scroll = None;
            self.dwell_since = now;
        } else {
            self.scroll = Some(x);
        }
        self.redraw_banner();
    }

    fn dim_if_idle(&mut self, now: u64) {
        if self.dimmed || now.wrapping_sub(self.last_activity) < self.config.dim_timeout_ms {
            return;
        }
        self.dimmed = true;
        if let Some(panel) = self.panel.as_mut() {
            if let Err(e) = panel.set_contrast(self.config.contrast_dim) {
                warn!("display: contrast change failed: {}", e);
            }
        }
        debug!("display: dimmed");
    }

    fn push(&mut self) {
        if !self.dirty {
            return;
        }
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        if !panel.ready() {
            return;
        }
        match panel.flush() {
            Ok(()) => {
                self.dirty = false;
                self.pushes = self.pushes.wrapping_add(1);
            }
            Err(e) => warn!("display: flush failed: {}", e),
        }
    }

    fn render_page(&mut self, now: u64) {
        self.highlighted.clear();
        self.front = 0;
        self.scroll = None;
        self.dwell_since = now;

        if self.panel.is_none() {
            return;
        }

        let title = self.title();
        let hint = self.hint();
        render_banner(&mut self.banners[0], &title);
        render_banner(&mut self.banners[1], hint.unwrap_or(title.as_str()));

        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        panel.clear();
        for (slot, origin) in self.origins.iter().enumerate() {
            let Some(origin) = origin else {
                continue;
            };
            let cell = &mut self.cells[slot];
            render_legend(cell, self.model.resolve_entry(slot, self.page));
            draw_cell(panel, *origin, cell);
        }
        panel.fill_rect(
            Rectangle::new(
                Point::new(0, BANNER_HEIGHT as i32),
                Size::new(PANEL_WIDTH, 1),
            ),
            BinaryColor::On,
        );
        self.dirty = true;
        self.redraw_banner();
    }

    fn render_message(&mut self, text: &str) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        let size = TextSize::Large;
        let font = size.font();
        let width = text.len() as i32 * font.character_size.width as i32;
        let height = font.character_size.height as i32;

        panel.clear();
        panel.set_text_size(size);
        panel.set_cursor(Point::new(
            ((PANEL_WIDTH as i32 - width) / 2).max(0),
            (PANEL_HEIGHT as i32 - height) / 2,
        ));
        panel.print(text);
        self.dirty = true;
    }

    /// Draws the banner strip at the current slide offset, then the status
    /// glyph on top.
    fn redraw_banner(&mut self) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        panel.fill_rect(
            Rectangle::new(Point::zero(), Size::new(PANEL_WIDTH, BANNER_HEIGHT)),
            BinaryColor::Off,
        );
        let x = self.scroll.unwrap_or(0);
        panel.draw_bitmap(
            Point::new(x, 0),
            self.banners[self.front].as_ref(),
            BinaryColor::On,
        );
        if self.scroll.is_some() {
            panel.draw_bitmap(
                Point::new(x - PANEL_WIDTH as i32, 0),
                self.banners[self.front ^ 1].as_ref(),
                BinaryColor::On,
            );
        }
        if let Some(status) = self.status {
            draw_glyph(panel, status.glyph);
        }
        self.dirty = true;
    }

    /// "Page N: name", with the name cut to whatever still fits.
    pub(super) fn title(&self) -> heapless::String<32> {
        let mut out = heapless::String::new();
        let Some(page) = self.model.page(self.page) else {
            let _ = write!(out, "Page {}", self.page + 1);
            return out;
        };
        let _ = write!(out, "Page {}: ", self.page + 1);
        for c in page.name.chars() {
            if out.push(c).is_err() {
                break;
            }
        }
        out
    }

    /// Second banner string, or `None` on a single-page deck.
    pub(super) fn hint(&self) -> Option<&'static str> {
        let count = self.model.page_count();
        if count <= 1 {
            return None;
        }
        let wrap = self.model.wraps();
        let prev = wrap || self.page > 0;
        let next = wrap || self.page + 1 < count;
        Some(match (prev, next) {
            (true, true) => "<- Prev | Next ->",
            (false, _) => "Next ->",
            (true, false) => "<- Prev",
        })
    }

    pub fn mode(&self) -> ScreenMode {
        self.mode
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn panel(&self) -> Option<&P> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut P> {
        self.panel.as_mut()
    }

    pub fn has_panel(&self) -> bool {
        self.panel.is_some()
    }

    pub fn status(&self) -> Option<StatusGlyph> {
        self.status.map(|s| s.glyph)
    }

    pub fn is_dimmed(&self) -> bool {
        self.dimmed
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_highlighted(&self, slot: usize) -> bool {
        self.highlighted.contains(slot)
    }

    /// `true` while the hint (second) banner string is the resting one.
    pub fn showing_hint(&self) -> bool {
        self.front == 1
    }

    /// Column offset of a slide in progress.
    pub fn scroll_offset(&self) -> Option<i32> {
        self.scroll
    }

    /// Frames pushed to the hardware so far.
    pub fn pushes(&self) -> u32 {
        self.pushes
    }

    /// Grid origin of `slot`'s legend cell.
    pub fn cell_origin(&self, slot: usize) -> Option<Point> {
        self.origins.get(slot).copied().flatten()
    }
}

fn draw_cell<P: Panel>(panel: &mut P, origin: Point, cell: &CellBitmap) {
    panel.fill_rect(
        Rectangle::new(origin, Size::new(CELL_WIDTH, CELL_HEIGHT)),
        BinaryColor::Off,
    );
    panel.draw_bitmap(origin, cell.as_ref(), BinaryColor::On);
}

fn draw_glyph<P: Panel>(panel: &mut P, glyph: StatusGlyph) {
    panel.fill_rect(
        Rectangle::new(GLYPH_ORIGIN, Size::new(GLYPH_SIZE, GLYPH_SIZE)),
        BinaryColor::Off,
    );
    panel.draw_bitmap(GLYPH_ORIGIN, glyph.bitmap().as_ref(), BinaryColor::On);
}

fn render_banner(banner: &mut BannerBitmap, text: &str) {
    banner.erase();
    let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
    let y = (BANNER_HEIGHT as i32 - FONT_5X8.character_size.height as i32) / 2;
    let _ = Text::with_baseline(text, Point::new(1, y), style, Baseline::Top).draw(banner);
}

/// Modifier line (small) over the key label, or the key label alone,
/// centred in the cell.
fn render_legend(cell: &mut CellBitmap, entry: KeyEntry) {
    cell.erase();
    let key = keycodes::label(entry.code);
    let mods = entry.modifiers.label();
    if mods.is_empty() {
        let y = (CELL_HEIGHT as i32 - FONT_6X10.character_size.height as i32) / 2;
        draw_centered(cell, &key, &FONT_6X10, y);
    } else {
        draw_centered(cell, &mods, &FONT_4X6, 0);
        draw_centered(cell, &key, &FONT_6X10, FONT_4X6.character_size.height as i32);
    }
}

fn draw_centered(cell: &mut CellBitmap, text: &str, font: &MonoFont<'_>, y: i32) {
    let width = text.len() as i32 * font.character_size.width as i32;
    let x = ((CELL_WIDTH as i32 - width) / 2).max(0);
    let style = MonoTextStyle::new(font, BinaryColor::On);
    let _ = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(cell);
}
