//! Fixed-size 1-bit bitmaps used for legend cells, banner strips, status
//! glyphs and the in-memory panel framebuffer.
//!
//! Pixels are stored row-major, each row padded to whole bytes, most
//! significant bit first (the usual `drawBitmap` layout).

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::config::{BANNER_HEIGHT, CELL_HEIGHT, CELL_WIDTH, PANEL_HEIGHT, PANEL_WIDTH};

/// Bytes needed for a `width` × `height` bitmap.
pub const fn bytes_for(width: u32, height: u32) -> usize {
    (width as usize).div_ceil(8) * height as usize
}

/// One legend cell.
pub type CellBitmap = Bitmap<{ bytes_for(CELL_WIDTH, CELL_HEIGHT) }>;

/// One banner strip, a full panel width wide.
pub type BannerBitmap = Bitmap<{ bytes_for(PANEL_WIDTH, BANNER_HEIGHT) }>;

/// The whole panel.
pub type FrameBitmap = Bitmap<{ bytes_for(PANEL_WIDTH, PANEL_HEIGHT) }>;

#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap<const BYTES: usize> {
    width: u32,
    height: u32,
    data: [u8; BYTES],
}

impl<const BYTES: usize> Bitmap<BYTES> {
    /// Blank bitmap. `BYTES` must match [`bytes_for`]`(width, height)`.
    pub const fn new(width: u32, height: u32) -> Self {
        Self::from_bytes(width, height, [0; BYTES])
    }

    pub const fn from_bytes(width: u32, height: u32, data: [u8; BYTES]) -> Self {
        assert!(bytes_for(width, height) == BYTES);
        Self {
            width,
            height,
            data,
        }
    }

    fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some((y * self.stride() + x / 8, 0x80 >> (x % 8)))
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        self.locate(x, y)
            .map(|(i, mask)| self.data[i] & mask != 0)
            .unwrap_or(false)
    }

    /// Sets one pixel; out-of-bounds coordinates are ignored.
    pub fn set(&mut self, x: i32, y: i32, on: bool) {
        if let Some((i, mask)) = self.locate(x, y) {
            if on {
                self.data[i] |= mask;
            } else {
                self.data[i] &= !mask;
            }
        }
    }

    pub fn erase(&mut self) {
        self.data = [0; BYTES];
    }

    /// Flips every pixel, padding bits included.
    pub fn invert(&mut self) {
        for b in self.data.iter_mut() {
            *b = !*b;
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_ref(&self) -> BitmapRef<'_> {
        BitmapRef {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    /// Number of lit pixels.
    pub fn count_on(&self) -> usize {
        let mut n = 0;
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                n += usize::from(self.get(x, y));
            }
        }
        n
    }
}

impl<const BYTES: usize> core::fmt::Debug for Bitmap<BYTES> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Bitmap({}x{})", self.width, self.height)
    }
}

impl<const BYTES: usize> OriginDimensions for Bitmap<BYTES> {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl<const BYTES: usize> DrawTarget for Bitmap<BYTES> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.set(coord.x, coord.y, color.is_on());
        }
        Ok(())
    }
}

/// Borrowed view of a bitmap, independent of its storage size.
#[derive(Clone, Copy)]
pub struct BitmapRef<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

impl<'a> BitmapRef<'a> {
    /// Lit pixels as panel coordinates, with the bitmap's top-left at `at`.
    pub fn lit_pixels(self, at: Point) -> impl Iterator<Item = Point> + 'a {
        let stride = (self.width as usize).div_ceil(8);
        (0..self.height as i32).flat_map(move |y| {
            (0..self.width as i32).filter_map(move |x| {
                let byte = self.data.get(y as usize * stride + x as usize / 8)?;
                (byte & (0x80 >> (x % 8)) != 0).then(|| at + Point::new(x, y))
            })
        })
    }
}
