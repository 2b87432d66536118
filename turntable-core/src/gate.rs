//! Velocity-gated acceptance of the axis value.

use crate::config::{ConfigError, VelocityConfig};
use crate::velocity::DegreesPerMs;

/// True when `velocity` is fast enough to publish a new axis value.
#[inline]
#[must_use]
pub fn accept(velocity: DegreesPerMs, min_speed: DegreesPerMs) -> bool {
    velocity.abs() >= min_speed
}

/// Holds the published axis byte and decides each tick whether to replace it.
///
/// Jitter around a resting position that survives the deadband produces a
/// tiny window velocity and is rejected; a real spin updates the axis on the
/// very first tick it is detected. With the gate disabled the axis follows
/// the mapped value directly.
#[derive(Debug, Clone)]
pub struct ReportGate {
    enabled: bool,
    min_speed: DegreesPerMs,
    published: u8,
}

impl ReportGate {
    pub fn new(config: VelocityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            enabled: config.gate_enabled,
            min_speed: config.min_speed,
            published: 0,
        })
    }

    /// Offer `candidate` with this tick's velocity and return the axis byte
    /// to publish.
    ///
    /// An undefined velocity (`None`) keeps the previous axis value while the
    /// gate is enabled.
    pub fn update(&mut self, candidate: u8, velocity: Option<DegreesPerMs>) -> u8 {
        let accepted = !self.enabled || velocity.is_some_and(|v| accept(v, self.min_speed));
        if accepted {
            self.published = candidate;
        }
        self.published
    }

    #[inline]
    #[must_use]
    pub fn published(&self) -> u8 {
        self.published
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MIN_SPEED;

    const GATED: VelocityConfig = VelocityConfig {
        gate_enabled: true,
        min_speed: DEFAULT_MIN_SPEED,
    };

    #[test]
    fn test_accept_uses_magnitude() {
        assert!(accept(DEFAULT_MIN_SPEED, DEFAULT_MIN_SPEED));
        assert!(accept(-DEFAULT_MIN_SPEED, DEFAULT_MIN_SPEED));
        assert!(!accept(DegreesPerMs::from_num(0.05), DEFAULT_MIN_SPEED));
        assert!(!accept(DegreesPerMs::from_num(-0.05), DEFAULT_MIN_SPEED));
    }

    #[test]
    fn test_slow_motion_keeps_previous_axis() {
        let mut gate = ReportGate::new(GATED).unwrap();
        assert_eq!(gate.update(100, Some(DegreesPerMs::from_num(1))), 100);
        assert_eq!(gate.update(101, Some(DegreesPerMs::from_num(0.01))), 100);
        assert_eq!(gate.update(99, Some(DegreesPerMs::ZERO)), 100);
    }

    #[test]
    fn test_fast_motion_updates_immediately() {
        let mut gate = ReportGate::new(GATED).unwrap();
        assert_eq!(gate.update(200, Some(DegreesPerMs::from_num(-0.5))), 200);
        assert_eq!(gate.published(), 200);
    }

    #[test]
    fn test_undefined_velocity_keeps_previous_axis() {
        let mut gate = ReportGate::new(GATED).unwrap();
        gate.update(42, Some(DegreesPerMs::from_num(1)));
        assert_eq!(gate.update(43, None), 42);
    }

    #[test]
    fn test_disabled_gate_follows_candidate() {
        let mut gate = ReportGate::new(VelocityConfig {
            gate_enabled: false,
            ..GATED
        })
        .unwrap();
        assert!(!gate.is_enabled());
        assert_eq!(gate.update(10, Some(DegreesPerMs::ZERO)), 10);
        assert_eq!(gate.update(11, None), 11);
    }
}
