//! Input collaborator traits: clock, analog sensor, button lines.
//!
//! The controller never blocks on these; implementations must return
//! immediately with the current reading.

/// Monotonic millisecond clock.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch. May wrap.
    fn now_ms(&mut self) -> u32;
}

/// The turntable's analog position sensor.
pub trait AnalogSensor {
    /// One raw sample in the sensor's native range (0..=4095 for a 12-bit ADC).
    fn read_raw(&mut self) -> u16;
}

/// The eleven button lines.
pub trait DigitalInputs {
    /// True while button `index` is pressed.
    ///
    /// Buttons are wired active-low with pull-ups; implementations translate
    /// the electrical low into `true`.
    fn read_level(&mut self, index: usize) -> bool;
}
