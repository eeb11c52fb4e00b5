//! Drawing primitives the display controller depends on.
//!
//! [`Panel`] is the only thing [`super::display::DisplayController`] knows
//! about the hardware. Implementations pick the chip once at construction;
//! the helpers at the bottom of this file provide the primitives for any
//! `embedded-graphics` draw target so each implementation stays small.

use embedded_graphics::mono_font::ascii::{FONT_5X8, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use super::bitmap::{BitmapRef, FrameBitmap};
use crate::config::{PANEL_HEIGHT, PANEL_WIDTH};
use crate::error::Result;

/// Font selection for [`Panel::print`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextSize {
    #[default]
    Small,
    Large,
}

impl TextSize {
    pub fn font(self) -> &'static MonoFont<'static> {
        match self {
            TextSize::Small => &FONT_5X8,
            TextSize::Large => &FONT_6X10,
        }
    }
}

/// Monochrome panel with a local framebuffer.
///
/// Everything except [`Panel::flush`] and [`Panel::set_contrast`] only
/// touches the framebuffer.
pub trait Panel {
    fn clear(&mut self);

    fn fill_rect(&mut self, area: Rectangle, color: BinaryColor);

    /// Draws the lit pixels of `bitmap` in `color` with its top-left corner
    /// at `at`. Unlit pixels leave the framebuffer untouched.
    fn draw_bitmap(&mut self, at: Point, bitmap: BitmapRef<'_>, color: BinaryColor);

    /// Top-left corner of the next [`Panel::print`].
    fn set_cursor(&mut self, at: Point);

    fn set_text_size(&mut self, size: TextSize);

    /// Prints `text` at the cursor and advances the cursor past it.
    fn print(&mut self, text: &str);

    fn set_contrast(&mut self, level: u8) -> Result<()>;

    /// Whether a [`Panel::flush`] would complete without waiting.
    fn ready(&mut self) -> bool {
        true
    }

    /// Pushes the framebuffer to the hardware.
    fn flush(&mut self) -> Result<()>;
}

/// Text cursor state shared by the framebuffer-backed panels.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cursor {
    pub at: Point,
    pub size: TextSize,
}

pub fn fill_rect<D>(target: &mut D, area: Rectangle, color: BinaryColor)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let _ = area
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target);
}

pub fn draw_bitmap<D>(target: &mut D, at: Point, bitmap: BitmapRef<'_>, color: BinaryColor)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let _ = target.draw_iter(bitmap.lit_pixels(at).map(|p| Pixel(p, color)));
}

pub fn print<D>(target: &mut D, cursor: &mut Cursor, text: &str)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(cursor.size.font(), BinaryColor::On);
    if let Ok(next) = Text::with_baseline(text, cursor.at, style, Baseline::Top).draw(target) {
        cursor.at = next;
    }
}

/// Panel backed by an in-memory framebuffer.
///
/// Used on the host for tests and for boards without a display. Keeps a
/// copy of the last pushed frame so callers can tell drawn from flushed.
pub struct FramePanel {
    frame: FrameBitmap,
    pushed: FrameBitmap,
    cursor: Cursor,
    contrast: u8,
    contrast_changes: u32,
    flushes: u32,
    ready: bool,
}

impl FramePanel {
    pub fn new() -> Self {
        Self {
            frame: FrameBitmap::new(PANEL_WIDTH, PANEL_HEIGHT),
            pushed: FrameBitmap::new(PANEL_WIDTH, PANEL_HEIGHT),
            cursor: Cursor::default(),
            contrast: 0,
            contrast_changes: 0,
            flushes: 0,
            ready: true,
        }
    }

    /// Working framebuffer, including changes not yet flushed.
    pub fn frame(&self) -> &FrameBitmap {
        &self.frame
    }

    /// Frame as of the last [`Panel::flush`].
    pub fn pushed(&self) -> &FrameBitmap {
        &self.pushed
    }

    pub fn contrast(&self) -> u8 {
        self.contrast
    }

    pub fn contrast_changes(&self) -> u32 {
        self.contrast_changes
    }

    pub fn flushes(&self) -> u32 {
        self.flushes
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }
}

impl Default for FramePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel for FramePanel {
    fn clear(&mut self) {
        self.frame.erase();
    }

    fn fill_rect(&mut self, area: Rectangle, color: BinaryColor) {
        fill_rect(&mut self.frame, area, color);
    }

    fn draw_bitmap(&mut self, at: Point, bitmap: BitmapRef<'_>, color: BinaryColor) {
        draw_bitmap(&mut self.frame, at, bitmap, color);
    }

    fn set_cursor(&mut self, at: Point) {
        self.cursor.at = at;
    }

    fn set_text_size(&mut self, size: TextSize) {
        self.cursor.size = size;
    }

    fn print(&mut self, text: &str) {
        print(&mut self.frame, &mut self.cursor, text);
    }

    fn set_contrast(&mut self, level: u8) -> Result<()> {
        self.contrast = level;
        self.contrast_changes += 1;
        Ok(())
    }

    fn ready(&mut self) -> bool {
        self.ready
    }

    fn flush(&mut self) -> Result<()> {
        self.pushed = self.frame.clone();
        self.flushes += 1;
        Ok(())
    }
}
