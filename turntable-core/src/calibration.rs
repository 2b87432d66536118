//! Auto-calibration of the conditioned signal's range and the linear rescale
//! onto the axis byte and the 0..360 angle.

use crate::config::{BoundPolicy, CalibratorConfig, ConfigError, RoundingPolicy};

/// Largest axis byte value.
pub const AXIS_MAX: i32 = 255;

/// Degrees per revolution.
pub const FULL_TURN: i32 = 360;

/// Observed bounds of the conditioned signal. `min <= max` always holds.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationRange {
    pub min: u16,
    pub max: u16,
}

impl CalibrationRange {
    #[must_use]
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Range collapsed onto a single sample.
    #[must_use]
    pub const fn point(sample: u16) -> Self {
        Self {
            min: sample,
            max: sample,
        }
    }

    /// True while no variation has been observed.
    #[inline]
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.min >= self.max
    }

    /// Widen the range so it contains `sample`.
    #[inline]
    #[must_use]
    pub fn including(self, sample: u16) -> Self {
        Self {
            min: self.min.min(sample),
            max: self.max.max(sample),
        }
    }
}

/// Clamped linear rescale of `value` from `range` onto `[out_min, out_max]`.
///
/// `value` is clamped into `range` first, so the result always lies in the
/// output range. A degenerate range maps everything to `out_min`.
///
/// [`RoundingPolicy::HalfAwayFromZero`] rounds the exact rational quotient,
/// [`RoundingPolicy::Truncate`] truncates it toward zero. Both give
/// `out_min` at `range.min` and `out_max` at `range.max`.
///
/// ```
/// use turntable_core::{rescale, CalibrationRange, RoundingPolicy};
///
/// let range = CalibrationRange::new(0, 2);
/// assert_eq!(rescale(range, 1, 0, 255, RoundingPolicy::HalfAwayFromZero), 128);
/// assert_eq!(rescale(range, 1, 0, 255, RoundingPolicy::Truncate), 127);
/// ```
#[must_use]
pub fn rescale(
    range: CalibrationRange,
    value: u16,
    out_min: i32,
    out_max: i32,
    rounding: RoundingPolicy,
) -> i32 {
    if range.is_degenerate() {
        return out_min;
    }

    let value = value.clamp(range.min, range.max);
    let numerator = i64::from(value - range.min) * (i64::from(out_max) - i64::from(out_min));
    let denominator = i64::from(range.max - range.min);

    let quotient = match rounding {
        RoundingPolicy::Truncate => numerator / denominator,
        RoundingPolicy::HalfAwayFromZero => {
            let magnitude = (2 * numerator.abs() + denominator) / (2 * denominator);
            if numerator < 0 {
                -magnitude
            } else {
                magnitude
            }
        }
    };

    // |quotient| <= |out_max - out_min|, so the sum lies between the bounds.
    (i64::from(out_min) + quotient) as i32
}

/// Tracks the observed min/max of the conditioned signal and rescales it.
///
/// With [`BoundPolicy::Expanding`] the range only ever widens. With
/// [`BoundPolicy::WrapHysteresis`] the calibrator also watches the mapped
/// byte: when it jumps from within `deadzone` of 255 to within `deadzone` of
/// 0 the lower bound is pulled 10% toward the landing sample (and the upper
/// bound on the opposite crossing), absorbing slow zero drift.
#[derive(Debug, Clone)]
pub struct RangeCalibrator {
    config: CalibratorConfig,
    range: Option<CalibrationRange>,
    last_mapped: Option<u8>,
}

impl RangeCalibrator {
    pub fn new(config: CalibratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            range: config.initial_range,
            last_mapped: None,
        })
    }

    /// Fold a conditioned sample into the bounds and return them.
    pub fn observe(&mut self, filtered: u16) -> CalibrationRange {
        let mut range = match self.range {
            None => CalibrationRange::point(filtered),
            Some(range) => range.including(filtered),
        };

        if let BoundPolicy::WrapHysteresis { deadzone } = self.config.bounds {
            let mapped = rescale(range, filtered, 0, AXIS_MAX, self.config.rounding) as u8;
            let high = u8::MAX - deadzone;

            match self.last_mapped {
                Some(previous) if previous >= high && mapped <= deadzone => {
                    range.min = reanchor(range.min, filtered);
                    trace!("wrap forward, min re-anchored to {}", range.min);
                }
                Some(previous) if previous <= deadzone && mapped >= high => {
                    range.max = reanchor(range.max, filtered);
                    trace!("wrap backward, max re-anchored to {}", range.max);
                }
                _ => {}
            }

            self.last_mapped = Some(mapped);
        }

        self.range = Some(range);
        range
    }

    /// Rescale `value` with the current bounds. Unset bounds map to `out_min`.
    #[must_use]
    pub fn map(&self, value: u16, out_min: i32, out_max: i32) -> i32 {
        match self.range {
            Some(range) => rescale(range, value, out_min, out_max, self.config.rounding),
            None => out_min,
        }
    }

    /// Axis byte in `0..=255`.
    #[inline]
    #[must_use]
    pub fn map_axis(&self, value: u16) -> u8 {
        self.map(value, 0, AXIS_MAX) as u8
    }

    /// Angle in `0..360`; the top of the range lands on 0.
    #[inline]
    #[must_use]
    pub fn map_angle(&self, value: u16) -> u16 {
        (self.map(value, 0, FULL_TURN) % FULL_TURN) as u16
    }

    /// Collapse the bounds onto `current`.
    pub fn reset(&mut self, current: u16) {
        self.range = Some(CalibrationRange::point(current));
        self.last_mapped = None;
    }

    #[inline]
    #[must_use]
    pub fn range(&self) -> Option<CalibrationRange> {
        self.range
    }

    #[inline]
    #[must_use]
    pub fn rounding(&self) -> RoundingPolicy {
        self.config.rounding
    }
}

/// `(old * 9 + sample) / 10`
#[inline]
fn reanchor(old: u16, sample: u16) -> u16 {
    ((u32::from(old) * 9 + u32::from(sample)) / 10) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRECISE: CalibratorConfig = CalibratorConfig {
        bounds: BoundPolicy::Expanding,
        rounding: RoundingPolicy::HalfAwayFromZero,
        initial_range: None,
    };

    const WRAP: CalibratorConfig = CalibratorConfig {
        bounds: BoundPolicy::WrapHysteresis { deadzone: 4 },
        ..PRECISE
    };

    #[test]
    fn test_first_sample_collapses_range() {
        let mut cal = RangeCalibrator::new(PRECISE).unwrap();
        assert_eq!(cal.range(), None);
        assert_eq!(cal.observe(500), CalibrationRange::point(500));
    }

    #[test]
    fn test_expanding_only_widens() {
        let mut cal = RangeCalibrator::new(PRECISE).unwrap();
        cal.observe(500);
        cal.observe(300);
        cal.observe(900);
        assert_eq!(cal.observe(600), CalibrationRange::new(300, 900));
    }

    #[test]
    fn test_unset_and_degenerate_map_to_out_min() {
        let mut cal = RangeCalibrator::new(PRECISE).unwrap();
        assert_eq!(cal.map(123, 0, 255), 0);
        cal.observe(500);
        assert_eq!(cal.map(500, 0, 255), 0);
        assert_eq!(cal.map(500, 10, 20), 10);
    }

    #[test]
    fn test_endpoints_are_exact_for_both_policies() {
        let range = CalibrationRange::new(137, 3911);
        for rounding in [RoundingPolicy::HalfAwayFromZero, RoundingPolicy::Truncate] {
            assert_eq!(rescale(range, 137, 0, 255, rounding), 0);
            assert_eq!(rescale(range, 3911, 0, 255, rounding), 255);
            assert_eq!(rescale(range, 137, 0, 360, rounding), 0);
            assert_eq!(rescale(range, 3911, 0, 360, rounding), 360);
        }
    }

    #[test]
    fn test_clamping_law() {
        let range = CalibrationRange::new(1000, 2000);
        for rounding in [RoundingPolicy::HalfAwayFromZero, RoundingPolicy::Truncate] {
            for value in (0..=u16::MAX).step_by(97) {
                let out = rescale(range, value, 0, 255, rounding);
                assert!((0..=255).contains(&out), "{value} -> {out}");
            }
            assert_eq!(rescale(range, 0, 0, 255, rounding), 0);
            assert_eq!(rescale(range, u16::MAX, 0, 255, rounding), 255);
        }
    }

    #[test]
    fn test_rounding_policies_differ_on_half_steps() {
        let range = CalibrationRange::new(0, 2);
        assert_eq!(rescale(range, 1, 0, 255, RoundingPolicy::HalfAwayFromZero), 128);
        assert_eq!(rescale(range, 1, 0, 255, RoundingPolicy::Truncate), 127);
    }

    #[test]
    fn test_inverted_output_range_rounds_away_from_zero() {
        let range = CalibrationRange::new(0, 2);
        assert_eq!(rescale(range, 1, 255, 0, RoundingPolicy::HalfAwayFromZero), 127);
        assert_eq!(rescale(range, 1, 255, 0, RoundingPolicy::Truncate), 128);
    }

    #[test]
    fn test_angle_stays_below_full_turn() {
        let mut cal = RangeCalibrator::new(PRECISE).unwrap();
        cal.observe(0);
        cal.observe(3600);
        assert_eq!(cal.map_angle(1800), 180);
        assert_eq!(cal.map_angle(3590), 359);
        assert_eq!(cal.map_angle(3600), 0);
        assert_eq!(cal.map_axis(3600), 255);
    }

    #[test]
    fn test_reset_collapses_onto_current_sample() {
        let mut cal = RangeCalibrator::new(PRECISE).unwrap();
        cal.observe(100);
        cal.observe(4000);
        cal.reset(2048);
        assert_eq!(cal.range(), Some(CalibrationRange::point(2048)));
        assert_eq!(cal.observe(2050), CalibrationRange::new(2048, 2050));
    }

    #[test]
    fn test_initial_range_seeds_bounds() {
        let mut cal = RangeCalibrator::new(CalibratorConfig {
            initial_range: Some(CalibrationRange::new(0, 4095)),
            ..PRECISE
        })
        .unwrap();
        assert_eq!(cal.map_axis(4095), 255);
        assert_eq!(cal.observe(2000), CalibrationRange::new(0, 4095));
    }

    #[test]
    fn test_wrap_forward_reanchors_min() {
        let mut cal = RangeCalibrator::new(WRAP).unwrap();
        cal.observe(1000);
        cal.observe(3000);
        cal.observe(2990); // mapped 254
        let range = cal.observe(1010); // mapped 1, crossed 255 -> 0
        assert_eq!(range, CalibrationRange::new(1001, 3000));
    }

    #[test]
    fn test_wrap_backward_reanchors_max() {
        let mut cal = RangeCalibrator::new(WRAP).unwrap();
        cal.observe(1000);
        cal.observe(3000);
        cal.observe(2000); // mapped 128
        cal.observe(1010); // mapped 1
        let range = cal.observe(2995); // mapped 254, crossed 0 -> 255
        assert_eq!(range, CalibrationRange::new(1000, 2999));
    }

    #[test]
    fn test_wrap_ignores_moves_inside_the_range() {
        let mut cal = RangeCalibrator::new(WRAP).unwrap();
        cal.observe(1000);
        cal.observe(3000);
        cal.observe(2000);
        cal.observe(1500);
        assert_eq!(cal.observe(2500), CalibrationRange::new(1000, 3000));
    }

    #[test]
    fn test_expanding_never_reanchors() {
        let mut cal = RangeCalibrator::new(PRECISE).unwrap();
        cal.observe(1000);
        cal.observe(3000);
        cal.observe(2990);
        assert_eq!(cal.observe(1010), CalibrationRange::new(1000, 3000));
    }

    #[test]
    fn test_reanchor_weights_old_bound() {
        assert_eq!(reanchor(1000, 2000), 1100);
        assert_eq!(reanchor(3000, 2995), 2999);
    }
}
