#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_time::{Duration, Ticker};
use embassy_usb::class::hid::State;
use embassy_usb::{Builder, Config as UsbConfig};
use static_cell::StaticCell;
use turntable_rp2040::{
    configure_gamepad_hid, configure_keyboard_hid, forward_reports, AdcSensor, BridgeConfig,
    DefmtSink, EmbassyClock, GpioButtons, ReportSlot, SignalTransport, TurntableBridge,
    TurntableRequestHandler, UsbHidWriter, CONTROLLER_CONFIG, TICK_PERIOD_MS,
};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

type FirmwareBridge = TurntableBridge<
    AdcSensor<'static>,
    GpioButtons<Input<'static>>,
    EmbassyClock,
    SignalTransport,
    DefmtSink,
>;

/// Latest pending report per HID interface.
static GAMEPAD_SLOT: ReportSlot = ReportSlot::new();
static KEYBOARD_SLOT: ReportSlot = ReportSlot::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state, one per interface.
static GAMEPAD_STATE: StaticCell<State> = StaticCell::new();
static KEYBOARD_STATE: StaticCell<State> = StaticCell::new();
static KEYBOARD_HANDLER: StaticCell<TurntableRequestHandler> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Turntable controller starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Sensor and buttons ---
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let sensor = AdcSensor::new(adc, Channel::new_pin(p.PIN_26, Pull::None));

    let buttons = GpioButtons::new([
        Input::new(p.PIN_0, Pull::Up),
        Input::new(p.PIN_1, Pull::Up),
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_4, Pull::Up),
        Input::new(p.PIN_5, Pull::Up),
        Input::new(p.PIN_6, Pull::Up),
        Input::new(p.PIN_7, Pull::Up),
        Input::new(p.PIN_8, Pull::Up),
        Input::new(p.PIN_9, Pull::Up),
        Input::new(p.PIN_10, Pull::Up),
    ]);

    let transport = SignalTransport::new(&GAMEPAD_SLOT, &KEYBOARD_SLOT);

    let bridge = match TurntableBridge::new(
        sensor,
        buttons,
        EmbassyClock,
        transport,
        CONTROLLER_CONFIG,
        BridgeConfig::DEFAULT,
    ) {
        Ok(bridge) => bridge.with_debug_sink(DefmtSink),
        Err(e) => {
            error!("Invalid controller configuration: {:?}", e);
            return;
        }
    };

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("Rust Turntable");
    usb_config.product = Some("Turntable Controller");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    // Configure both HID interfaces
    let gamepad_writer = configure_gamepad_hid(&mut builder, GAMEPAD_STATE.init(State::new()));
    let keyboard_writer = configure_keyboard_hid(
        &mut builder,
        KEYBOARD_STATE.init(State::new()),
        KEYBOARD_HANDLER.init(TurntableRequestHandler),
    );

    // Build the USB device
    let usb_device = builder.build();

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(usb_task(usb_device).unwrap());
    spawner.spawn(hid_writer_task(gamepad_writer, &GAMEPAD_SLOT).unwrap());
    spawner.spawn(hid_writer_task(keyboard_writer, &KEYBOARD_SLOT).unwrap());
    spawner.spawn(control_task(bridge).unwrap());

    info!("Turntable controller initialized");
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await;
}

/// HID writer task - sends the latest report for one interface.
#[embassy_executor::task(pool_size = 2)]
async fn hid_writer_task(mut writer: UsbHidWriter<'static>, slot: &'static ReportSlot) {
    forward_reports(&mut writer, slot).await;
}

/// Control task - one controller tick per millisecond.
#[embassy_executor::task]
async fn control_task(mut bridge: FirmwareBridge) {
    let mut ticker = Ticker::every(Duration::from_millis(TICK_PERIOD_MS));

    loop {
        if let Err(e) = bridge.process_one() {
            warn!("Report submission failed: {:?}", e);
        }
        ticker.next().await;
    }
}
