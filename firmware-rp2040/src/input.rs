//! Hardware collaborators for the controller: the turntable sensor, the
//! button lines and the millisecond clock.
//!
//! # Pins
//!
//! - GPIO 0-10: buttons 0-10, active low with internal pull-ups
//! - GPIO 26: turntable sensor (ADC0)

use defmt::warn;
use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_time::Instant;
use embedded_hal::digital::InputPin;
use turntable_core::{AnalogSensor, Clock, DigitalInputs, BUTTON_COUNT};

/// Turntable sensor on one ADC channel.
///
/// Conversions are blocking; one takes about 2 µs, well inside a tick.
pub struct AdcSensor<'d> {
    adc: Adc<'d, Blocking>,
    channel: Channel<'d>,
    /// Last good conversion, reused when a conversion fails.
    last: u16,
}

impl<'d> AdcSensor<'d> {
    #[must_use]
    pub fn new(adc: Adc<'d, Blocking>, channel: Channel<'d>) -> Self {
        Self {
            adc,
            channel,
            last: 0,
        }
    }
}

impl AnalogSensor for AdcSensor<'_> {
    fn read_raw(&mut self) -> u16 {
        match self.adc.blocking_read(&mut self.channel) {
            Ok(value) => {
                self.last = value;
                value
            }
            Err(e) => {
                warn!("ADC conversion failed: {:?}", e);
                self.last
            }
        }
    }
}

/// The eleven button lines, index `i` on `pins[i]`.
pub struct GpioButtons<P> {
    pins: [P; BUTTON_COUNT],
}

impl<P: InputPin> GpioButtons<P> {
    /// Pins must already be configured as inputs with pull-ups.
    #[must_use]
    pub fn new(pins: [P; BUTTON_COUNT]) -> Self {
        Self { pins }
    }
}

impl<P: InputPin> DigitalInputs for GpioButtons<P> {
    fn read_level(&mut self, index: usize) -> bool {
        // Pressed pulls the line low.
        self.pins
            .get_mut(index)
            .is_some_and(|pin| pin.is_low().unwrap_or(false))
    }
}

/// Millisecond clock backed by the Embassy time driver.
#[derive(Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&mut self) -> u32 {
        // Truncation wraps after ~49 days; the controller uses wrapping math.
        Instant::now().as_millis() as u32
    }
}
