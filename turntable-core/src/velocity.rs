//! Wrap-aware angular velocity over a fixed window of angle samples.

use fixed::types::I32F32;

/// Signed angular velocity in degrees per millisecond.
pub type DegreesPerMs = I32F32;

/// Number of `(angle, timestamp)` pairs retained.
pub const HISTORY_LEN: usize = 32;

const HALF_TURN: i32 = 180;
const FULL_TURN: i32 = 360;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AngleSample {
    /// Degrees, `0..360`.
    pub angle: u16,
    pub timestamp_ms: u32,
}

/// Fixed ring of the last [`HISTORY_LEN`] angle samples.
///
/// All slots always exist; a fresh or cleared history holds zeroed samples.
#[derive(Debug, Clone)]
pub struct AngleHistory {
    slots: [AngleSample; HISTORY_LEN],
    /// Index of the newest sample.
    head: usize,
}

impl AngleHistory {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [AngleSample {
                angle: 0,
                timestamp_ms: 0,
            }; HISTORY_LEN],
            head: 0,
        }
    }

    /// Overwrite the oldest slot with `sample`.
    pub fn push(&mut self, sample: AngleSample) {
        self.head = (self.head + 1) % HISTORY_LEN;
        self.slots[self.head] = sample;
    }

    #[inline]
    #[must_use]
    pub fn newest(&self) -> AngleSample {
        self.slots[self.head]
    }

    #[inline]
    #[must_use]
    pub fn oldest(&self) -> AngleSample {
        self.slots[(self.head + 1) % HISTORY_LEN]
    }

    /// Samples from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = AngleSample> + '_ {
        (0..HISTORY_LEN).map(move |i| self.slots[(self.head + HISTORY_LEN - i) % HISTORY_LEN])
    }

    /// Zero every slot.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for AngleHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Step from `older` to `newer`, taking the short way around the circle.
///
/// ```
/// use turntable_core::wrap_delta;
///
/// assert_eq!(wrap_delta(10, 350), 20);
/// assert_eq!(wrap_delta(350, 10), -20);
/// assert_eq!(wrap_delta(100, 40), 60);
/// ```
#[inline]
#[must_use]
pub fn wrap_delta(newer: u16, older: u16) -> i32 {
    let diff = i32::from(newer) - i32::from(older);
    if diff > HALF_TURN {
        diff - FULL_TURN
    } else if diff < -HALF_TURN {
        diff + FULL_TURN
    } else {
        diff
    }
}

/// Estimates angular velocity from the summed, wrap-corrected steps across
/// the whole history window divided by the window's elapsed time.
#[derive(Debug, Clone, Default)]
pub struct VelocityEstimator {
    history: AngleHistory,
    displacement: i32,
}

impl VelocityEstimator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            history: AngleHistory::new(),
            displacement: 0,
        }
    }

    /// Record an angle and return the window velocity.
    ///
    /// Returns `None` when the newest and oldest samples share a timestamp,
    /// in which case the velocity is undefined for this tick.
    pub fn push(&mut self, angle: u16, timestamp_ms: u32) -> Option<DegreesPerMs> {
        self.history.push(AngleSample {
            angle,
            timestamp_ms,
        });

        let mut displacement = 0;
        let mut newer = self.history.newest();
        for older in self.history.iter().skip(1) {
            displacement += wrap_delta(newer.angle, older.angle);
            newer = older;
        }
        self.displacement = displacement;

        let elapsed = timestamp_ms.wrapping_sub(self.history.oldest().timestamp_ms);
        if elapsed == 0 {
            return None;
        }

        Some(DegreesPerMs::from_num(displacement) / DegreesPerMs::saturating_from_num(elapsed))
    }

    /// Net wrap-corrected displacement (degrees) across the window at the
    /// last push.
    #[inline]
    #[must_use]
    pub fn displacement(&self) -> i32 {
        self.displacement
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &AngleHistory {
        &self.history
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.history.clear();
        self.displacement = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(angle: u16, start_ms: u32) -> VelocityEstimator {
        let mut est = VelocityEstimator::new();
        for i in 0..HISTORY_LEN as u32 {
            est.push(angle, start_ms + i);
        }
        est
    }

    #[test]
    fn test_wrap_delta_rules() {
        assert_eq!(wrap_delta(10, 350), 20);
        assert_eq!(wrap_delta(350, 10), -20);
        assert_eq!(wrap_delta(190, 10), 180);
        assert_eq!(wrap_delta(10, 190), -180);
        assert_eq!(wrap_delta(200, 10), -170);
        assert_eq!(wrap_delta(0, 359), 1);
    }

    #[test]
    fn test_constant_angle_has_zero_velocity() {
        let mut est = filled(123, 100);
        assert_eq!(est.push(123, 200), Some(DegreesPerMs::ZERO));
        assert_eq!(est.displacement(), 0);
    }

    #[test]
    fn test_wrap_step_is_small_positive() {
        let mut est = filled(350, 1);
        // Oldest retained sample is the one pushed at t=2.
        let velocity = est.push(10, 33).unwrap();
        assert_eq!(est.displacement(), 20);
        assert_eq!(velocity, DegreesPerMs::from_num(20) / DegreesPerMs::from_num(31));
        assert!(velocity > DegreesPerMs::ZERO);
    }

    #[test]
    fn test_backward_spin_is_negative() {
        let mut est = VelocityEstimator::new();
        let mut angle = 0u16;
        let mut velocity = None;
        for t in 1..=HISTORY_LEN as u32 * 2 {
            angle = (angle + 350) % 360; // -10 degrees per ms
            velocity = est.push(angle, t);
        }
        assert_eq!(est.displacement(), -10 * (HISTORY_LEN as i32 - 1));
        assert!(velocity.unwrap() < DegreesPerMs::ZERO);
    }

    #[test]
    fn test_zero_elapsed_time_is_undefined() {
        let mut est = VelocityEstimator::new();
        assert_eq!(est.push(90, 0), None);

        let mut est = filled(45, 7);
        // Same timestamp for the whole window.
        for _ in 0..HISTORY_LEN {
            est.push(45, 500);
        }
        assert_eq!(est.push(45, 500), None);
    }

    #[test]
    fn test_history_ring_overwrites_oldest() {
        let mut history = AngleHistory::new();
        for i in 0..(HISTORY_LEN as u16 + 3) {
            history.push(AngleSample {
                angle: i,
                timestamp_ms: u32::from(i),
            });
        }
        assert_eq!(history.newest().angle, HISTORY_LEN as u16 + 2);
        assert_eq!(history.oldest().angle, 3);
        assert_eq!(history.iter().count(), HISTORY_LEN);
        assert_eq!(history.iter().nth(1).map(|s| s.angle), Some(HISTORY_LEN as u16 + 1));
    }

    #[test]
    fn test_clear_zeroes_history() {
        let mut est = filled(300, 50);
        est.clear();
        assert!(est.history().iter().all(|s| s == AngleSample::default()));
        assert_eq!(est.displacement(), 0);
    }
}
