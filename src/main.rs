//! macrodeck - RP2040 macro keypad firmware.
//!
//! Fourteen switches select and send paged key mappings as a USB boot
//! keyboard; an SSD1306 OLED shows the active page and held keys.
//!
//! ## Tasks
//!
//! - `usb_task`: USB enumeration and endpoint servicing.
//! - `hid_task`: drains finished reports into the keyboard endpoint.
//! - `panel_task`: pushes rendered frames to the OLED over async I²C.
//! - `main`: the fixed-rate poll loop driving [`Deck`], plus the deferred
//!   flash write of the page index.

#![no_std]
#![no_main]

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::I2c;
use embassy_rp::peripherals::FLASH;
use embassy_time::{Duration, Instant, Ticker};
use embassy_usb::class::hid::HidWriter;
use embassy_usb::UsbDevice;
use {defmt_rtt as _, panic_probe as _};

use macrodeck::board::{DISPLAY_SCL_PIN, DISPLAY_SDA_PIN, PAGES, SLOTS, SLOT_COUNT};
use macrodeck::config::{self, DeckConfig};
use macrodeck::deck::Deck;
use macrodeck::hid::KEY_REPORT_SIZE;
use macrodeck::matrix::ButtonInput;
use macrodeck::storage::PageStore;
use macrodeck::ui::oled::{self, Display, OledLink};
use macrodeck::ui::QueuedPanel;
use macrodeck::usb::hid_device::{self, UsbDriver};

type PrefsFlash = Flash<'static, FLASH, Async, { config::FLASH_SIZE }>;

/// The fourteen key switches, indexed by slot. Wired active-low with the
/// internal pull-ups enabled.
struct Switches {
    lines: [Input<'static>; SLOT_COUNT],
}

impl ButtonInput for Switches {
    fn is_high(&mut self, slot: usize, _pin: u8) -> bool {
        self.lines.get(slot).map_or(true, |line| line.is_high())
    }
}

#[embassy_executor::task]
async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn hid_task(writer: HidWriter<'static, UsbDriver, KEY_REPORT_SIZE>) -> ! {
    hid_device::hid_writer_task(writer).await
}

#[embassy_executor::task]
async fn panel_task(display: Display) -> ! {
    oled::run_panel(display).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("macrodeck starting");
    let p = embassy_rp::init(Default::default());

    // ── Buttons ──────────────────────────────────────────────────────
    let mut switches = Switches {
        lines: [
            Input::new(p.PIN_2, Pull::Up),
            Input::new(p.PIN_3, Pull::Up),
            Input::new(p.PIN_4, Pull::Up),
            Input::new(p.PIN_5, Pull::Up),
            Input::new(p.PIN_6, Pull::Up),
            Input::new(p.PIN_7, Pull::Up),
            Input::new(p.PIN_8, Pull::Up),
            Input::new(p.PIN_9, Pull::Up),
            Input::new(p.PIN_10, Pull::Up),
            Input::new(p.PIN_11, Pull::Up),
            Input::new(p.PIN_12, Pull::Up),
            Input::new(p.PIN_13, Pull::Up),
            Input::new(p.PIN_14, Pull::Up),
            Input::new(p.PIN_15, Pull::Up),
        ],
    };
    let mut led = Output::new(p.PIN_25, Level::Low);

    // ── Display ──────────────────────────────────────────────────────
    // PIN_18/PIN_19 must match DISPLAY_SDA_PIN/DISPLAY_SCL_PIN.
    info!(
        "Display on I2C1: SDA GPIO{} SCL GPIO{}",
        DISPLAY_SDA_PIN,
        DISPLAY_SCL_PIN
    );
    let bus = I2c::new_async(p.I2C1, p.PIN_19, p.PIN_18, oled::Irqs, oled::bus_config());
    let panel = match oled::init(bus).await {
        Ok(display) => {
            unwrap!(spawner.spawn(panel_task(display)));
            Some(QueuedPanel::new(OledLink))
        }
        Err(e) => {
            warn!("Display init failed: {} - continuing without panel", e);
            None
        }
    };

    // ── Preferences ──────────────────────────────────────────────────
    let flash: PrefsFlash = Flash::new(p.FLASH, p.DMA_CH0);
    let mut store = PageStore::new(flash);
    let stored = store.load().await;

    // ── USB ──────────────────────────────────────────────────────────
    let usb = hid_device::init(p.USB);
    let mut transport = usb.transport;
    unwrap!(spawner.spawn(usb_task(usb.device)));
    unwrap!(spawner.spawn(hid_task(usb.keyboard_writer)));

    // ── Poll loop ────────────────────────────────────────────────────
    let deck_config = DeckConfig::new();
    let mut deck = Deck::new(&SLOTS, &PAGES, deck_config, panel, stored);
    let mut ticker = Ticker::every(Duration::from_millis(deck_config.poll_interval_ms));

    info!("Entering poll loop on page {}", deck.page());
    loop {
        let now = Instant::now().as_millis();
        let outcome = deck.tick(now, &mut switches, &mut transport);

        if !outcome.repeat.is_empty() {
            led.toggle();
        } else if deck.matrix().debounced().is_empty() {
            led.set_low();
        }

        if let Some(page) = outcome.save {
            let result = store.save(page).await;
            deck.save_finished(Instant::now().as_millis(), result);
        }

        ticker.next().await;
    }
}
