//! Panel front end for displays driven by a separate task.
//!
//! The poll loop draws into a local framebuffer. [`Panel::flush`] hands a
//! copy to a [`FrameSink`] and returns at once; the sink reports busy until
//! the bus transfer has finished, which is what [`Panel::ready`] forwards.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::bitmap::{BitmapRef, FrameBitmap};
use super::panel::{self, Cursor, Panel, TextSize};
use crate::config::{PANEL_HEIGHT, PANEL_WIDTH};
use crate::error::Result;

/// Receiving end of a panel driven elsewhere.
pub trait FrameSink {
    /// `true` while the last posted frame is still being transferred.
    fn busy(&self) -> bool;

    /// Queues `frame` for transfer. A frame posted while busy replaces
    /// the one still waiting.
    fn post_frame(&mut self, frame: &FrameBitmap);

    fn post_contrast(&mut self, level: u8);
}

pub struct QueuedPanel<S> {
    frame: FrameBitmap,
    cursor: Cursor,
    sink: S,
}

impl<S: FrameSink> QueuedPanel<S> {
    pub fn new(sink: S) -> Self {
        Self {
            frame: FrameBitmap::new(PANEL_WIDTH, PANEL_HEIGHT),
            cursor: Cursor::default(),
            sink,
        }
    }

    pub fn frame(&self) -> &FrameBitmap {
        &self.frame
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

impl<S: FrameSink> Panel for QueuedPanel<S> {
    fn clear(&mut self) {
        self.frame.erase();
    }

    fn fill_rect(&mut self, area: Rectangle, color: BinaryColor) {
        panel::fill_rect(&mut self.frame, area, color);
    }

    fn draw_bitmap(&mut self, at: Point, bitmap: BitmapRef<'_>, color: BinaryColor) {
        panel::draw_bitmap(&mut self.frame, at, bitmap, color);
    }

    fn set_cursor(&mut self, at: Point) {
        self.cursor.at = at;
    }

    fn set_text_size(&mut self, size: TextSize) {
        self.cursor.size = size;
    }

    fn print(&mut self, text: &str) {
        panel::print(&mut self.frame, &mut self.cursor, text);
    }

    fn set_contrast(&mut self, level: u8) -> Result<()> {
        self.sink.post_contrast(level);
        Ok(())
    }

    fn ready(&mut self) -> bool {
        !self.sink.busy()
    }

    fn flush(&mut self) -> Result<()> {
        self.sink.post_frame(&self.frame);
        Ok(())
    }
}
