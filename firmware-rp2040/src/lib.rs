//! USB HID turntable controller for RP2040.
//!
//! This crate provides the embedded implementation of the turntable
//! controller: it samples a rotation sensor and eleven buttons every
//! millisecond and presents the result as a USB HID gamepad and keyboard.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Reads the turntable sensor on ADC0 and the buttons on GPIO 0-10
//! 2. Runs one [`turntable_core::ControllerState`] tick per millisecond
//! 3. Sends the gamepad and keyboard reports every 10 ms
//!
//! # Hardware Configuration
//!
//! | Function   | GPIO  | Description |
//! |------------|-------|-------------|
//! | Buttons    | 0-10  | Active low, internal pull-ups |
//! | Turntable  | 26    | ADC0, 12-bit |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with four concurrent tasks:
//!
//! - **USB Task**: Manages the USB device stack
//! - **Control Task**: Runs the controller tick on a 1 ms ticker
//! - **HID Writer Tasks**: One per interface, writes the latest report
//!
//! The control task never waits on USB. Reports are handed to the writer
//! tasks through [`ReportSlot`]s, each an Embassy
//! [`Signal`](embassy_sync::signal::Signal) with "latest value wins"
//! semantics plus a readiness flag.
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`preset-precise`** (default): Filtered, rounded, velocity-gated axis
//! - **`preset-simple`**: Moving average and truncating rescale only

#![no_std]

// Ensure mutually exclusive preset features
#[cfg(all(feature = "preset-precise", feature = "preset-simple"))]
compile_error!("Cannot enable both `preset-precise` and `preset-simple` features - they select conflicting controller configurations");

// Re-export core types for convenience
pub use turntable_core::{
    AnalogSensor, BridgeConfig, BridgeError, ButtonVector, Clock, ControllerConfig,
    ControllerState, DebugSink, DigitalInputs, HidTransport, OperatingMode, OutputError,
    ReportChannel, TurntableBridge,
};

pub mod debug;
pub mod input;
pub mod usb_output;

pub use debug::DefmtSink;
pub use input::{AdcSensor, EmbassyClock, GpioButtons};
pub use usb_output::{
    configure_gamepad_hid, configure_keyboard_hid, forward_reports, ReportSlot, SignalTransport,
    TurntableRequestHandler, UsbHidWriter,
};

/// Controller tick period.
pub const TICK_PERIOD_MS: u64 = 1;

/// Controller configuration selected by the preset feature.
#[cfg(not(feature = "preset-simple"))]
pub const CONTROLLER_CONFIG: ControllerConfig = ControllerConfig::PRECISE;

/// Controller configuration selected by the preset feature.
#[cfg(feature = "preset-simple")]
pub const CONTROLLER_CONFIG: ControllerConfig = ControllerConfig::SIMPLE;
