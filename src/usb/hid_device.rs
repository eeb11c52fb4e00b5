//! USB HID keyboard device.
//!
//! Initialises the Embassy USB stack on the RP2040 USB peripheral and
//! exposes one keyboard endpoint, fed through [`UsbTransport`].

use embassy_rp::peripherals::USB;
use embassy_rp::usb::{Driver, InterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender};
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;
use usbd_hid::descriptor::{KeyboardReport, SerializedDescriptor};

use super::UsbLink;
use crate::config;
use crate::error::{Error, Result};
use crate::hid::{HidTransport, KeyReport, KEY_REPORT_SIZE};

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

/// Reports buffered between the poll loop and the writer task.
const REPORT_QUEUE: usize = 8;

pub type UsbDriver = Driver<'static, USB>;

static KB_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static USB_HANDLER: StaticCell<DeviceHandler> = StaticCell::new();

static REPORTS: Channel<CriticalSectionRawMutex, KeyReport, REPORT_QUEUE> = Channel::new();
static LINK: UsbLink = UsbLink::new();

/// Feeds bus events into [`LINK`].
struct DeviceHandler;

impl embassy_usb::Handler for DeviceHandler {
    fn reset(&mut self) {
        LINK.reset();
        info!("USB bus reset");
    }

    fn addressed(&mut self, addr: u8) {
        LINK.set_configured(false);
        debug!("USB address set to {}", addr);
    }

    fn configured(&mut self, configured: bool) {
        LINK.set_configured(configured);
        info!("USB configured: {}", configured);
    }

    fn suspended(&mut self, suspended: bool) {
        LINK.set_suspended(suspended);
        if suspended {
            info!("USB suspended");
        } else {
            info!("USB resumed, configured: {}", LINK.is_configured());
        }
    }
}

/// Host link used by the poll loop. Never blocks: a report is only
/// queued while the host is listening (configured and not suspended) and
/// the queue has room.
pub struct UsbTransport {
    tx: Sender<'static, CriticalSectionRawMutex, KeyReport, REPORT_QUEUE>,
}

impl HidTransport for UsbTransport {
    fn ready(&mut self) -> bool {
        LINK.is_up() && !REPORTS.is_full()
    }

    fn send(&mut self, report: &KeyReport) -> Result<()> {
        self.tx.try_send(*report).map_err(|_| Error::Usb)
    }
}

/// Build result containing the USB device runner, the HID writer and the
/// poll loop's end of the report queue.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub keyboard_writer: HidWriter<'static, UsbDriver, KEY_REPORT_SIZE>,
    pub transport: UsbTransport,
}

/// Initialise the USB stack and create the keyboard device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usb: USB) -> UsbHidDevice {
    let driver = Driver::new(usb, Irqs);

    // USB device-level configuration.
    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    // Allocate static descriptor buffers.
    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 64]);

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    builder.handler(USB_HANDLER.init(DeviceHandler));

    let kb_state = KB_STATE.init(State::new());
    let kb_config = HidConfig {
        report_descriptor: KeyboardReport::desc(),
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: KEY_REPORT_SIZE as u16,
    };
    let keyboard_writer = HidWriter::new(&mut builder, kb_state, kb_config);

    let device = builder.build();

    info!("USB HID keyboard initialised");

    UsbHidDevice {
        device,
        keyboard_writer,
        transport: UsbTransport {
            tx: REPORTS.sender(),
        },
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles USB enumeration, suspend/resume, and endpoint servicing.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// Drains the report queue into the keyboard endpoint.
pub async fn hid_writer_task(mut keyboard: HidWriter<'static, UsbDriver, KEY_REPORT_SIZE>) -> ! {
    info!("HID writer task started - waiting for reports");

    let reports = REPORTS.receiver();
    loop {
        let report = reports.receive().await;
        if let Err(_e) = keyboard.write(&report.to_bytes()).await {
            warn!("USB keyboard write failed");
        }
    }
}
