//! The per-tick controller state: every stage of the pipeline in one owned
//! object, advanced by a single call per tick.

use crate::buttons::ButtonVector;
use crate::calibration::{CalibrationRange, RangeCalibrator};
use crate::config::{ConfigError, ControllerConfig};
use crate::filter::SampleFilter;
use crate::gate::ReportGate;
use crate::mode::{ModeAction, ModeController, OperatingMode};
use crate::report::{OutgoingReport, ReportBuilder};
use crate::telemetry::TelemetrySnapshot;
use crate::velocity::VelocityEstimator;

/// All conditioning, calibration and mode state of the device.
///
/// One [`tick`](ControllerState::tick) runs, in order: sample filter, range
/// calibrator, velocity estimator, report gate, mode controller, report
/// builder. A calibrate chord resets the range onto this tick's filtered
/// sample and clears the angle history after the analog path has run.
///
/// # Example
///
/// ```
/// use turntable_core::{ButtonVector, ControllerConfig, ControllerState, OperatingMode};
///
/// let mut state = ControllerState::new(ControllerConfig::PRECISE).unwrap();
/// let report = state.tick(2048, ButtonVector::NONE, 1);
/// assert_eq!(report.mode, OperatingMode::Gamepad);
/// assert_eq!(report.keycodes, [0; 6]);
/// ```
#[derive(Debug, Clone)]
pub struct ControllerState {
    filter: SampleFilter,
    calibrator: RangeCalibrator,
    velocity: VelocityEstimator,
    gate: ReportGate,
    modes: ModeController,
    builder: ReportBuilder,
    snapshot: TelemetrySnapshot,
}

impl ControllerState {
    /// Build the state, rejecting invalid configuration.
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            filter: SampleFilter::new(config.filter)?,
            calibrator: RangeCalibrator::new(config.calibrator)?,
            velocity: VelocityEstimator::new(),
            gate: ReportGate::new(config.velocity)?,
            modes: ModeController::new(config.chords)?,
            builder: ReportBuilder::new(config.keymap),
            snapshot: TelemetrySnapshot::default(),
        })
    }

    /// Run one tick and return the report for it.
    pub fn tick(&mut self, raw: u16, buttons: ButtonVector, now_ms: u32) -> OutgoingReport {
        let filtered = self.filter.filter(raw);
        self.calibrator.observe(filtered);
        let mapped = self.calibrator.map_axis(filtered);
        let angle = self.calibrator.map_angle(filtered);
        let velocity = self.velocity.push(angle, now_ms);
        let axis = self.gate.update(mapped, velocity);

        if let Some(ModeAction::Calibrate) = self.modes.update(buttons) {
            self.calibrate(filtered);
        }

        self.snapshot = TelemetrySnapshot {
            mapped,
            angle,
            range: self.calibrator.range(),
            displacement: self.velocity.displacement(),
            velocity,
            mode: self.modes.mode(),
        };

        self.builder.build(buttons, axis, self.modes.mode())
    }

    /// Collapse the range onto `current` and forget the angle history.
    pub fn calibrate(&mut self, current: u16) {
        self.calibrator.reset(current);
        self.velocity.clear();
        info!("calibration reset at {}", current);
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> OperatingMode {
        self.modes.mode()
    }

    #[inline]
    #[must_use]
    pub fn range(&self) -> Option<CalibrationRange> {
        self.calibrator.range()
    }

    /// Axis byte currently published.
    #[inline]
    #[must_use]
    pub fn axis(&self) -> u8 {
        self.gate.published()
    }

    /// Analog-path values from the last tick.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }

    #[inline]
    #[must_use]
    pub fn calibrator(&self) -> &RangeCalibrator {
        &self.calibrator
    }

    #[inline]
    #[must_use]
    pub fn velocity(&self) -> &VelocityEstimator {
        &self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use crate::velocity::AngleSample;

    /// Precise preset with a one-sample window so the filter passes values
    /// straight through (subject to the deadband).
    const DIRECT: ControllerConfig = ControllerConfig {
        filter: FilterConfig {
            window_size: 1,
            ..FilterConfig::TWO_STAGE
        },
        ..ControllerConfig::PRECISE
    };

    fn chord(indices: &[usize]) -> ButtonVector {
        let mut buttons = ButtonVector::NONE;
        for &index in indices {
            buttons.set(index, true);
        }
        buttons
    }

    #[test]
    fn test_constant_signal_after_reset_maps_to_zero() {
        let mut state = ControllerState::new(ControllerConfig::PRECISE).unwrap();
        let mut t = 0;
        for _ in 0..40 {
            t += 1;
            state.tick(500, ButtonVector::NONE, t);
        }
        t += 1;
        state.tick(500, chord(&[7, 10, 5]), t);
        assert_eq!(state.range(), Some(CalibrationRange::point(500)));

        for _ in 0..40 {
            t += 1;
            let report = state.tick(500, ButtonVector::NONE, t);
            assert_eq!(state.range(), Some(CalibrationRange::point(500)));
            assert_eq!(state.calibrator().map_axis(500), 0);
            assert_eq!(report.axis, state.axis());
        }
        assert_eq!(state.snapshot().mapped, 0);

        // Average of seven 500s and one 600 is 512, past the deadband.
        t += 1;
        state.tick(600, ButtonVector::NONE, t);
        assert_eq!(state.range(), Some(CalibrationRange::new(500, 512)));
    }

    #[test]
    fn test_calibrate_chord_resets_range_and_history() {
        let mut state = ControllerState::new(DIRECT).unwrap();
        for (t, raw) in [100u16, 4000, 900, 3000].into_iter().enumerate() {
            state.tick(raw, ButtonVector::NONE, t as u32 + 1);
        }
        assert_eq!(state.range(), Some(CalibrationRange::new(100, 4000)));

        state.tick(2222, chord(&[7, 10, 5]), 10);
        assert_eq!(state.range(), Some(CalibrationRange::point(2222)));
        assert!(state
            .velocity()
            .history()
            .iter()
            .all(|s| s == AngleSample::default()));
        assert_eq!(state.mode(), OperatingMode::Gamepad);
    }

    #[test]
    fn test_held_calibrate_chord_resets_once() {
        let mut state = ControllerState::new(DIRECT).unwrap();
        state.tick(1000, ButtonVector::NONE, 1);
        state.tick(1000, chord(&[7, 10, 5]), 2);
        // Still held: the range widens again instead of being reset.
        state.tick(3000, chord(&[7, 10, 5]), 3);
        assert_eq!(state.range(), Some(CalibrationRange::new(1000, 3000)));
    }

    #[test]
    fn test_keyboard_chord_switches_and_emits_keys() {
        let mut state = ControllerState::new(DIRECT).unwrap();
        let report = state.tick(0, chord(&[3, 7, 10]), 1);
        assert_eq!(report.mode, OperatingMode::Keyboard);
        assert_eq!(report.keycodes, [0x09, 0x0E, 0x1B, 0, 0, 0]); // F K X

        // Release so the next chord can fire.
        state.tick(0, ButtonVector::NONE, 2);

        let mut switches = 0;
        for t in 3..103 {
            let before = state.mode();
            state.tick(0, chord(&[1, 7, 10]), t);
            if state.mode() != before {
                switches += 1;
            }
        }
        assert_eq!(switches, 1);
        assert_eq!(state.mode(), OperatingMode::Gamepad);
    }

    #[test]
    fn test_gamepad_mode_never_emits_keys() {
        let mut state = ControllerState::new(DIRECT).unwrap();
        for t in 1..20 {
            let report = state.tick(0, ButtonVector::from_bits(0x07FF ^ (1 << 3)), t);
            assert_eq!(report.keycodes, [0; 6]);
        }
    }

    #[test]
    fn test_gate_holds_axis_on_slow_drift_and_follows_spin() {
        let mut state = ControllerState::new(DIRECT).unwrap();
        let mut t = 0;
        let mut tick = |state: &mut ControllerState, raw: u16| {
            t += 1;
            state.tick(raw, ButtonVector::NONE, t).axis
        };

        tick(&mut state, 0);
        tick(&mut state, 3600);
        // Jump to mid-range: 180 degrees in a few ms is a real move.
        assert_eq!(tick(&mut state, 1800), 128);

        // Let the jump leave the window.
        for _ in 0..40 {
            assert_eq!(tick(&mut state, 1800), 128);
        }

        // Below the deadband: filtered value does not move.
        assert_eq!(tick(&mut state, 1803), 128);

        // Past the deadband but only 2 degrees over 31 ms: rejected.
        assert_eq!(tick(&mut state, 1820), 128);
        assert_eq!(state.snapshot().mapped, 129);

        // 68 degrees in one tick: accepted immediately.
        assert_eq!(tick(&mut state, 2500), 177);
    }

    #[test]
    fn test_zero_elapsed_time_keeps_axis() {
        let mut state = ControllerState::new(DIRECT).unwrap();
        state.tick(0, ButtonVector::NONE, 0);
        state.tick(3600, ButtonVector::NONE, 0);
        let report = state.tick(1800, ButtonVector::NONE, 0);
        assert_eq!(state.snapshot().velocity, None);
        assert_eq!(state.snapshot().mapped, 128);
        assert_eq!(report.axis, 0);
    }

    #[test]
    fn test_simple_preset_follows_mapped_value() {
        let mut state = ControllerState::new(ControllerConfig {
            filter: FilterConfig {
                window_size: 1,
                ..FilterConfig::AVERAGE_ONLY
            },
            ..ControllerConfig::SIMPLE
        })
        .unwrap();
        state.tick(0, ButtonVector::NONE, 1);
        state.tick(2, ButtonVector::NONE, 1);
        // Truncating rescale, no gate, even with zero elapsed time.
        assert_eq!(state.tick(1, ButtonVector::NONE, 1).axis, 127);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ControllerConfig {
            filter: FilterConfig {
                window_size: 0,
                ..FilterConfig::TWO_STAGE
            },
            ..ControllerConfig::PRECISE
        };
        assert!(matches!(
            ControllerState::new(config),
            Err(ConfigError::ZeroWindow)
        ));
    }
}
