//! USB HID output: the gamepad and keyboard interfaces and the non-blocking
//! transport that feeds them.

use defmt::{info, warn};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_usb::class::hid::{
    Config as HidConfig, HidBootProtocol, HidSubclass, HidWriter, ReportId, RequestHandler, State,
};
use embassy_usb::control::OutResponse;
use embassy_usb::Builder;
use heapless::Vec;
use portable_atomic::{AtomicBool, Ordering};
use turntable_core::{HidTransport, OutputError, ReportChannel};
use usbd_hid::descriptor::{KeyboardReport, SerializedDescriptor};

/// Largest report either interface sends.
pub const MAX_REPORT_SIZE: usize = 8;

/// Endpoint packet size for both interfaces.
pub const HID_PACKET_SIZE: usize = 8;

/// HID writer type used by both interfaces.
pub type UsbHidWriter<'d> = HidWriter<'d, Driver<'d, USB>, HID_PACKET_SIZE>;

/// Bytes of one pending report.
pub type ReportBytes = Vec<u8, MAX_REPORT_SIZE>;

/// Gamepad HID Report Descriptor.
///
/// This descriptor defines a gamepad with:
/// - 16 buttons (11 wired)
/// - X axis (turntable) and Y axis (unused), unsigned 8-bit
pub const GAMEPAD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Buttons (16 buttons) ---
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x10, //   Usage Maximum (Button 16)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x10, //   Report Count (16)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Axes ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x95, 0x02, //   Report Count (2)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

/// Hand-off point between the control loop and one HID writer task.
///
/// The control loop overwrites the pending report; the writer task always
/// sends the most recent one. `ready` is set while the writer is idle and
/// the interface is configured.
pub struct ReportSlot {
    report: Signal<CriticalSectionRawMutex, ReportBytes>,
    ready: AtomicBool,
}

impl ReportSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            report: Signal::new(),
            ready: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }
}

impl Default for ReportSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// [`HidTransport`] that hands reports to the writer tasks without waiting.
pub struct SignalTransport {
    gamepad: &'static ReportSlot,
    keyboard: &'static ReportSlot,
}

impl SignalTransport {
    #[must_use]
    pub fn new(gamepad: &'static ReportSlot, keyboard: &'static ReportSlot) -> Self {
        Self { gamepad, keyboard }
    }

    fn slot(&self, channel: ReportChannel) -> &'static ReportSlot {
        match channel {
            ReportChannel::Gamepad => self.gamepad,
            ReportChannel::Keyboard => self.keyboard,
        }
    }
}

impl HidTransport for SignalTransport {
    fn ready(&self, channel: ReportChannel) -> bool {
        self.slot(channel).is_ready()
    }

    fn submit(&mut self, channel: ReportChannel, report: &[u8]) -> Result<(), OutputError> {
        let slot = self.slot(channel);
        if !slot.is_ready() {
            return Err(OutputError::NotReady);
        }
        let bytes = ReportBytes::from_slice(report).map_err(|_| OutputError::Dropped)?;
        slot.report.signal(bytes);
        Ok(())
    }
}

/// Write reports from `slot` to `writer` forever.
///
/// Waits for the interface to be configured, then marks the slot ready.
/// The slot is not ready while a write is in flight, or after an endpoint
/// error until the host configures the interface again.
pub async fn forward_reports(writer: &mut UsbHidWriter<'_>, slot: &ReportSlot) -> ! {
    writer.ready().await;
    slot.set_ready(true);

    loop {
        let report = slot.report.wait().await;
        slot.set_ready(false);

        if let Err(e) = writer.write(&report).await {
            warn!("HID write failed: {:?}", e);
            writer.ready().await;
            info!("HID interface ready again");
        }

        slot.set_ready(true);
    }
}

/// HID request handler (handles SET_REPORT, etc.).
///
/// Accepts and ignores keyboard LED output reports.
pub struct TurntableRequestHandler;

impl RequestHandler for TurntableRequestHandler {
    fn get_report(&mut self, _id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        None
    }

    fn set_report(&mut self, _id: ReportId, _data: &[u8]) -> OutResponse {
        OutResponse::Accepted
    }

    fn set_idle_ms(&mut self, _id: Option<ReportId>, _duration_ms: u32) {}

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        None
    }
}

/// Configure the gamepad HID interface in the USB builder.
pub fn configure_gamepad_hid<'d>(
    builder: &mut Builder<'d, Driver<'d, USB>>,
    state: &'d mut State<'d>,
) -> UsbHidWriter<'d> {
    let config = HidConfig {
        report_descriptor: GAMEPAD_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: 1,
        max_packet_size: HID_PACKET_SIZE as u16,
        hid_subclass: HidSubclass::No,
        hid_boot_protocol: HidBootProtocol::None,
    };

    HidWriter::new(builder, state, config)
}

/// Configure the boot-keyboard HID interface in the USB builder.
pub fn configure_keyboard_hid<'d>(
    builder: &mut Builder<'d, Driver<'d, USB>>,
    state: &'d mut State<'d>,
    request_handler: &'d mut TurntableRequestHandler,
) -> UsbHidWriter<'d> {
    let config = HidConfig {
        report_descriptor: KeyboardReport::desc(),
        request_handler: Some(request_handler),
        poll_ms: 1,
        max_packet_size: HID_PACKET_SIZE as u16,
        hid_subclass: HidSubclass::Boot,
        hid_boot_protocol: HidBootProtocol::Keyboard,
    };

    HidWriter::new(builder, state, config)
}
