//! Platform-agnostic turntable controller logic.
//!
//! This crate turns a raw analog rotation sample and eleven button lines
//! into HID gamepad and keyboard reports. It has no platform-specific
//! dependencies: the hardware is reached through small collaborator traits,
//! so the same code runs on the RP2040 firmware and on host for testing.
//!
//! # Overview
//!
//! - [`filter`]: moving average plus deadband ([`SampleFilter`])
//! - [`calibration`]: auto-ranging and rescale ([`RangeCalibrator`], [`rescale`])
//! - [`velocity`]: wrap-aware angular velocity ([`VelocityEstimator`])
//! - [`gate`]: velocity-gated axis publication ([`ReportGate`])
//! - [`buttons`]: button vector and sampling ([`ButtonVector`])
//! - [`mode`]: chord-driven mode state machine ([`ModeController`])
//! - [`report`]: report assembly and wire layouts ([`ReportBuilder`])
//! - [`controller`]: the whole pipeline as one owned state ([`ControllerState`])
//! - [`bridge`]: drives the state from the collaborators ([`TurntableBridge`])
//! - [`input`], [`output`], [`telemetry`]: collaborator traits
//! - [`config`]: configuration structs and the `PRECISE`/`SIMPLE` presets
//!
//! # Tick
//!
//! One tick runs, in order:
//!
//! ```text
//! raw -> filter -> calibrator -> (axis byte, angle) -> velocity -> gate -> axis
//! buttons -> mode controller -> report builder (with the current mode)
//! ```
//!
//! # Example
//!
//! ```rust
//! use turntable_core::{ButtonVector, ControllerConfig, ControllerState};
//!
//! let mut state = ControllerState::new(ControllerConfig::PRECISE).unwrap();
//! for t in 1..=40 {
//!     state.tick(1000, ButtonVector::NONE, t);
//! }
//! // The turntable never turned: the angle stays at 0 and the gate holds
//! // the axis.
//! assert_eq!(state.axis(), 0);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded builds)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the logging macros are visible to every module.
mod fmt;

pub mod bridge;
pub mod buttons;
pub mod calibration;
pub mod config;
pub mod controller;
pub mod filter;
pub mod gate;
pub mod input;
pub mod mode;
pub mod output;
pub mod report;
pub mod telemetry;
pub mod velocity;

// Re-export main types at crate root
pub use bridge::{BridgeError, TurntableBridge};
pub use buttons::{ButtonSampler, ButtonVector, BUTTON_COUNT};
pub use calibration::{rescale, CalibrationRange, RangeCalibrator};
pub use config::{
    BoundPolicy, BridgeConfig, CalibratorConfig, ChordConfig, ConfigError, ControllerConfig,
    FilterConfig, FilterStages, RoundingPolicy, VelocityConfig, DEFAULT_KEYMAP, DEFAULT_MIN_SPEED,
};
pub use controller::ControllerState;
pub use filter::SampleFilter;
pub use gate::ReportGate;
pub use input::{AnalogSensor, Clock, DigitalInputs};
pub use mode::{Chord, ModeAction, ModeController, OperatingMode};
pub use output::{HidTransport, OutputError, ReportChannel};
pub use report::{GamepadReport, KeyboardReport, OutgoingReport, ReportBuilder};
pub use telemetry::{DebugSink, NullDebugSink, TelemetrySnapshot};
pub use velocity::{wrap_delta, AngleHistory, AngleSample, DegreesPerMs, VelocityEstimator};
