//! SSD1306 128×64 OLED on I2C1, driven from its own task.
//!
//! The poll loop renders into a [`QueuedPanel<OledLink>`](super::QueuedPanel);
//! [`run_panel`] copies each posted frame into the driver buffer and pushes
//! it with async I²C, so a transfer never holds up button sampling.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::{self, I2c, InterruptHandler};
use embassy_rp::peripherals::I2C1;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_graphics::prelude::*;
use ssd1306::mode::BufferedGraphicsModeAsync;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306Async};

use super::bitmap::FrameBitmap;
use super::queued::FrameSink;
use crate::config::DISPLAY_I2C_FREQUENCY_HZ;
use crate::error::{Error, Result};

bind_interrupts!(pub struct Irqs {
    I2C1_IRQ => InterruptHandler<I2C1>;
});

pub type DisplayBus = I2c<'static, I2C1, i2c::Async>;

/// Type alias for the concrete display driver.
pub type Display = Ssd1306Async<
    I2CInterface<DisplayBus>,
    DisplaySize128x64,
    BufferedGraphicsModeAsync<DisplaySize128x64>,
>;

static FRAMES: Signal<CriticalSectionRawMutex, FrameBitmap> = Signal::new();
static CONTRAST: Signal<CriticalSectionRawMutex, u8> = Signal::new();
static IN_FLIGHT: AtomicBool = AtomicBool::new(false);

/// Bus settings for the panel. Fast mode keeps a full frame around 25 ms.
pub fn bus_config() -> i2c::Config {
    let mut config = i2c::Config::default();
    config.frequency = DISPLAY_I2C_FREQUENCY_HZ;
    config
}

/// Initialise the display and clear the screen.
///
/// Fails with [`Error::Display`] when the controller does not answer.
pub async fn init(bus: DisplayBus) -> Result<Display> {
    let interface = I2CDisplayInterface::new(bus);
    let mut display = Ssd1306Async::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    display.init().await.map_err(|_| Error::Display)?;
    display.clear_buffer();
    display.flush().await.map_err(|_| Error::Display)?;
    Ok(display)
}

/// Poll-loop end of the panel task.
pub struct OledLink;

impl FrameSink for OledLink {
    fn busy(&self) -> bool {
        IN_FLIGHT.load(Ordering::Acquire)
    }

    fn post_frame(&mut self, frame: &FrameBitmap) {
        IN_FLIGHT.store(true, Ordering::Release);
        FRAMES.signal(frame.clone());
    }

    fn post_contrast(&mut self, level: u8) {
        CONTRAST.signal(level);
    }
}

/// Pushes posted frames and contrast changes to the controller.
pub async fn run_panel(mut display: Display) -> ! {
    info!("Panel task started");
    loop {
        match select(FRAMES.wait(), CONTRAST.wait()).await {
            Either::First(frame) => {
                display.clear_buffer();
                for p in frame.as_ref().lit_pixels(Point::zero()) {
                    display.set_pixel(p.x as u32, p.y as u32, true);
                }
                if display.flush().await.is_err() {
                    warn!("display: flush failed");
                }
                IN_FLIGHT.store(false, Ordering::Release);
            }
            Either::Second(level) => {
                if display
                    .set_brightness(Brightness::custom(1, level))
                    .await
                    .is_err()
                {
                    warn!("display: contrast change failed");
                }
            }
        }
    }
}
