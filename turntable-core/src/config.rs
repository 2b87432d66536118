//! Compile-time controller configuration and the named presets.
//!
//! Every component is configured through a plain `const`-constructible
//! struct. Customize the controller by copying a preset and overriding
//! fields:
//!
//! ```
//! use turntable_core::{ControllerConfig, FilterConfig, FilterStages};
//!
//! const MY_CONFIG: ControllerConfig = ControllerConfig {
//!     filter: FilterConfig {
//!         stages: FilterStages::MovingAverageThenDeadband,
//!         window_size: 16,
//!         deadband_threshold: 8,
//!     },
//!     ..ControllerConfig::PRECISE
//! };
//!
//! assert!(MY_CONFIG.validate().is_ok());
//! ```

use crate::buttons::BUTTON_COUNT;
use crate::calibration::CalibrationRange;
use crate::mode::Chord;
use crate::velocity::DegreesPerMs;
use fixed_macro::fixed;

/// Capacity of the moving-average buffer. `window_size` may not exceed it.
pub const MAX_FILTER_WINDOW: usize = 32;

/// Largest wrap deadzone accepted; a deadzone this wide would make the
/// "near 0" and "near 255" bands overlap.
pub const MAX_WRAP_DEADZONE: u8 = 127;

/// Minimum angular speed accepted by the gate in the precise preset:
/// 360 degrees per 5 seconds.
pub const DEFAULT_MIN_SPEED: DegreesPerMs = fixed!(0.072: I32F32);

/// USB HID usage IDs for buttons 0..10 in keyboard mode.
pub const DEFAULT_KEYMAP: [u8; BUTTON_COUNT] = [
    0x04, // A
    0x16, // S
    0x07, // D
    0x09, // F
    0x0A, // G
    0x0B, // H
    0x0D, // J
    0x0E, // K
    0x0F, // L
    0x1D, // Z
    0x1B, // X
];

/// Construction-time configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Moving-average window of zero samples.
    ZeroWindow,
    /// Moving-average window larger than [`MAX_FILTER_WINDOW`].
    WindowTooLarge,
    /// Initial calibration range with `min > max`.
    InvertedRange,
    /// Wrap deadzone larger than [`MAX_WRAP_DEADZONE`].
    DeadzoneTooWide,
    /// Velocity gate threshold below zero.
    NegativeMinSpeed,
    /// Chord refers to a button index `>= BUTTON_COUNT`.
    ChordButtonOutOfRange,
}

/// Which stages the sample filter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterStages {
    /// Raw moving average, no deadband.
    MovingAverageOnly,
    /// Moving average followed by the deadband stage.
    MovingAverageThenDeadband,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterConfig {
    pub stages: FilterStages,
    /// Number of raw samples averaged (1..=[`MAX_FILTER_WINDOW`]).
    pub window_size: usize,
    /// Minimum change of the averaged value that replaces the stable value.
    pub deadband_threshold: u16,
}

impl FilterConfig {
    pub const TWO_STAGE: Self = Self {
        stages: FilterStages::MovingAverageThenDeadband,
        window_size: 8,
        deadband_threshold: 5,
    };

    pub const AVERAGE_ONLY: Self = Self {
        stages: FilterStages::MovingAverageOnly,
        window_size: 8,
        deadband_threshold: 0,
    };

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.window_size > MAX_FILTER_WINDOW {
            return Err(ConfigError::WindowTooLarge);
        }
        Ok(())
    }
}

/// How the calibrator updates its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoundPolicy {
    /// Monotonic min/max capture.
    Expanding,
    /// Min/max capture plus slow re-anchoring of the bound the signal lands
    /// on after crossing the 255/0 rollover.
    WrapHysteresis {
        /// Distance from 0 or 255 (in mapped axis units) that counts as
        /// "at the boundary".
        deadzone: u8,
    },
}

/// Rounding used by the linear rescale.
///
/// The two policies differ by one count on values whose exact rescale falls
/// on or above a half step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RoundingPolicy {
    /// Exact quotient rounded half away from zero.
    HalfAwayFromZero,
    /// Plain truncating integer division.
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibratorConfig {
    pub bounds: BoundPolicy,
    pub rounding: RoundingPolicy,
    /// Starting range. `None` leaves the range unset until the first sample.
    pub initial_range: Option<CalibrationRange>,
}

impl CalibratorConfig {
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if let BoundPolicy::WrapHysteresis { deadzone } = self.bounds {
            if deadzone > MAX_WRAP_DEADZONE {
                return Err(ConfigError::DeadzoneTooWide);
            }
        }
        if let Some(range) = self.initial_range {
            if range.min > range.max {
                return Err(ConfigError::InvertedRange);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VelocityConfig {
    /// When false the axis follows the mapped value directly.
    pub gate_enabled: bool,
    /// Minimum |velocity| for the gate to accept a new axis value.
    pub min_speed: DegreesPerMs,
}

impl VelocityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_speed < DegreesPerMs::ZERO {
            return Err(ConfigError::NegativeMinSpeed);
        }
        Ok(())
    }
}

/// The three button triples that drive the mode controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChordConfig {
    pub to_gamepad: Chord,
    pub to_keyboard: Chord,
    pub to_calibrate: Chord,
}

impl ChordConfig {
    pub const DEFAULT: Self = Self {
        to_gamepad: Chord::new([7, 10, 1]),
        to_keyboard: Chord::new([7, 10, 3]),
        to_calibrate: Chord::new([7, 10, 5]),
    };

    pub const fn validate(&self) -> Result<(), ConfigError> {
        let chords = [self.to_gamepad, self.to_keyboard, self.to_calibrate];
        let mut i = 0;
        while i < chords.len() {
            if !chords[i].is_valid() {
                return Err(ConfigError::ChordButtonOutOfRange);
            }
            i += 1;
        }
        Ok(())
    }
}

/// Full controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub filter: FilterConfig,
    pub calibrator: CalibratorConfig,
    pub velocity: VelocityConfig,
    pub chords: ChordConfig,
    /// Keycode emitted for each button in keyboard mode.
    pub keymap: [u8; BUTTON_COUNT],
}

impl ControllerConfig {
    /// Two-stage filter, half-away-from-zero rescale, velocity gate on.
    pub const PRECISE: Self = Self {
        filter: FilterConfig::TWO_STAGE,
        calibrator: CalibratorConfig {
            bounds: BoundPolicy::Expanding,
            rounding: RoundingPolicy::HalfAwayFromZero,
            initial_range: None,
        },
        velocity: VelocityConfig {
            gate_enabled: true,
            min_speed: DEFAULT_MIN_SPEED,
        },
        chords: ChordConfig::DEFAULT,
        keymap: DEFAULT_KEYMAP,
    };

    /// Moving average only, truncating rescale, no velocity gate.
    pub const SIMPLE: Self = Self {
        filter: FilterConfig::AVERAGE_ONLY,
        calibrator: CalibratorConfig {
            bounds: BoundPolicy::Expanding,
            rounding: RoundingPolicy::Truncate,
            initial_range: None,
        },
        velocity: VelocityConfig {
            gate_enabled: false,
            min_speed: DEFAULT_MIN_SPEED,
        },
        chords: ChordConfig::DEFAULT,
        keymap: DEFAULT_KEYMAP,
    };

    pub const DEFAULT: Self = Self::PRECISE;

    /// Check every component configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter.validate()?;
        self.calibrator.validate()?;
        self.velocity.validate()?;
        self.chords.validate()
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Cadence settings for the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeConfig {
    /// Minimum milliseconds between report submissions.
    pub report_interval_ms: u32,
    /// Emit a telemetry line every N ticks. 0 disables telemetry.
    pub telemetry_every: u32,
}

impl BridgeConfig {
    pub const DEFAULT: Self = Self {
        report_interval_ms: 10,
        telemetry_every: 10,
    };
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert_eq!(ControllerConfig::PRECISE.validate(), Ok(()));
        assert_eq!(ControllerConfig::SIMPLE.validate(), Ok(()));
    }

    #[test]
    fn test_presets_differ_on_rounding_and_gate() {
        let precise = ControllerConfig::PRECISE;
        let simple = ControllerConfig::SIMPLE;
        assert_eq!(precise.calibrator.rounding, RoundingPolicy::HalfAwayFromZero);
        assert_eq!(simple.calibrator.rounding, RoundingPolicy::Truncate);
        assert!(precise.velocity.gate_enabled);
        assert!(!simple.velocity.gate_enabled);
        assert_eq!(simple.filter.stages, FilterStages::MovingAverageOnly);
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = ControllerConfig {
            filter: FilterConfig {
                window_size: 0,
                ..FilterConfig::TWO_STAGE
            },
            ..ControllerConfig::PRECISE
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroWindow));
    }

    #[test]
    fn test_oversized_window_rejected() {
        let filter = FilterConfig {
            window_size: MAX_FILTER_WINDOW + 1,
            ..FilterConfig::TWO_STAGE
        };
        assert_eq!(filter.validate(), Err(ConfigError::WindowTooLarge));
    }

    #[test]
    fn test_chord_out_of_range_rejected() {
        let chords = ChordConfig {
            to_calibrate: Chord::new([7, 10, 11]),
            ..ChordConfig::DEFAULT
        };
        assert_eq!(chords.validate(), Err(ConfigError::ChordButtonOutOfRange));
    }

    #[test]
    fn test_negative_min_speed_rejected() {
        let velocity = VelocityConfig {
            gate_enabled: true,
            min_speed: -DEFAULT_MIN_SPEED,
        };
        assert_eq!(velocity.validate(), Err(ConfigError::NegativeMinSpeed));
    }

    #[test]
    fn test_inverted_initial_range_rejected() {
        let calibrator = CalibratorConfig {
            initial_range: Some(CalibrationRange { min: 10, max: 5 }),
            ..ControllerConfig::PRECISE.calibrator
        };
        assert_eq!(calibrator.validate(), Err(ConfigError::InvertedRange));
    }

    #[test]
    fn test_wide_deadzone_rejected() {
        let calibrator = CalibratorConfig {
            bounds: BoundPolicy::WrapHysteresis { deadzone: 200 },
            ..ControllerConfig::PRECISE.calibrator
        };
        assert_eq!(calibrator.validate(), Err(ConfigError::DeadzoneTooWide));
    }
}
