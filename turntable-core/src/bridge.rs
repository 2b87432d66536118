//! TurntableBridge: drives the controller state from the hardware
//! collaborators and pushes the finished reports to the HID transport.

use crate::buttons::ButtonSampler;
use crate::config::{BridgeConfig, ConfigError, ControllerConfig};
use crate::controller::ControllerState;
use crate::input::{AnalogSensor, Clock, DigitalInputs};
use crate::output::{HidTransport, OutputError, ReportChannel};
use crate::report::OutgoingReport;
use crate::telemetry::{DebugSink, NullDebugSink};

/// Owns the collaborators and the controller state, and runs one tick per
/// [`process_one`](TurntableBridge::process_one).
///
/// Each tick reads the clock, one analog sample and all button lines, and
/// advances the [`ControllerState`]. Reports are handed to the transport at
/// most once per `report_interval_ms`. A channel that is not ready is
/// skipped for that interval; the next interval carries the latest state
/// anyway.
pub struct TurntableBridge<S, D, C, T, G = NullDebugSink> {
    sensor: S,
    inputs: D,
    clock: C,
    transport: T,
    debug: G,
    sampler: ButtonSampler,
    state: ControllerState,
    config: BridgeConfig,
    ticks: u32,
    last_submit_ms: Option<u32>,
}

impl<S, D, C, T> TurntableBridge<S, D, C, T, NullDebugSink>
where
    S: AnalogSensor,
    D: DigitalInputs,
    C: Clock,
    T: HidTransport,
{
    /// Create a bridge with telemetry discarded.
    pub fn new(
        sensor: S,
        inputs: D,
        clock: C,
        transport: T,
        controller: ControllerConfig,
        config: BridgeConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            sensor,
            inputs,
            clock,
            transport,
            debug: NullDebugSink,
            sampler: ButtonSampler::new(),
            state: ControllerState::new(controller)?,
            config,
            ticks: 0,
            last_submit_ms: None,
        })
    }
}

impl<S, D, C, T, G> TurntableBridge<S, D, C, T, G>
where
    S: AnalogSensor,
    D: DigitalInputs,
    C: Clock,
    T: HidTransport,
    G: DebugSink,
{
    /// Route telemetry lines to `debug`.
    pub fn with_debug_sink<G2: DebugSink>(self, debug: G2) -> TurntableBridge<S, D, C, T, G2> {
        TurntableBridge {
            sensor: self.sensor,
            inputs: self.inputs,
            clock: self.clock,
            transport: self.transport,
            debug,
            sampler: self.sampler,
            state: self.state,
            config: self.config,
            ticks: self.ticks,
            last_submit_ms: self.last_submit_ms,
        }
    }

    /// Run one tick.
    ///
    /// Returns the report built for this tick whether or not it was
    /// submitted. A transport error does not stop the other channel from
    /// being submitted; the first error is returned.
    pub fn process_one(&mut self) -> Result<OutgoingReport, BridgeError> {
        let now = self.clock.now_ms();
        let raw = self.sensor.read_raw();
        let buttons = self.sampler.sample(&mut self.inputs);
        let report = self.state.tick(raw, buttons, now);

        self.ticks = self.ticks.wrapping_add(1);
        if self.config.telemetry_every != 0 && self.ticks % self.config.telemetry_every == 0 {
            self.debug.write(self.state.snapshot().render().as_str());
        }

        if !self.submission_due(now) {
            return Ok(report);
        }
        self.last_submit_ms = Some(now);

        self.submit(&report).map(|()| report)
    }

    fn submission_due(&self, now: u32) -> bool {
        match self.last_submit_ms {
            None => true,
            Some(last) => now.wrapping_sub(last) >= self.config.report_interval_ms,
        }
    }

    fn submit(&mut self, report: &OutgoingReport) -> Result<(), BridgeError> {
        let gamepad = report.gamepad_report().as_bytes();
        let keyboard = report.keyboard_report().as_bytes();
        let mut first_error = None;

        for channel in ReportChannel::ALL {
            if !self.transport.ready(channel) {
                trace!("{:?} not ready, skipping", channel);
                continue;
            }

            let bytes: &[u8] = match channel {
                ReportChannel::Gamepad => &gamepad,
                ReportChannel::Keyboard => &keyboard,
            };

            if let Err(e) = self.transport.submit(channel, bytes) {
                warn!("{:?} submit failed: {:?}", channel, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(BridgeError::Output(e)),
            None => Ok(()),
        }
    }

    /// Get a reference to the controller state.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Get a mutable reference to the controller state.
    pub fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn inputs_mut(&mut self) -> &mut D {
        &mut self.inputs
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn debug_sink(&self) -> &G {
        &self.debug
    }

    /// Ticks run so far (wrapping).
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Decompose the bridge into its collaborators.
    pub fn into_parts(self) -> (S, D, C, T, G) {
        (self.sensor, self.inputs, self.clock, self.transport, self.debug)
    }
}

/// Error type for bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Error from the HID transport.
    Output(OutputError),
}

impl From<OutputError> for BridgeError {
    fn from(e: OutputError) -> Self {
        BridgeError::Output(e)
    }
}
