//! Optional human-readable diagnostics.
//!
//! Every Nth tick the bridge renders a [`TelemetrySnapshot`] into a fixed
//! buffer and hands it to a [`DebugSink`]. Nothing here affects the reports.

use crate::calibration::CalibrationRange;
use crate::mode::OperatingMode;
use crate::velocity::DegreesPerMs;
use core::fmt::{self, Write};
use heapless::String;

/// Capacity of one rendered telemetry line.
pub const TELEMETRY_LINE_LEN: usize = 96;

/// Destination for telemetry lines (debug UART, RTT, CDC...).
pub trait DebugSink {
    fn write(&mut self, text: &str);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDebugSink;

impl DebugSink for NullDebugSink {
    fn write(&mut self, _text: &str) {}
}

/// Values of the analog path at the end of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Mapped axis byte before the gate.
    pub mapped: u8,
    pub angle: u16,
    pub range: Option<CalibrationRange>,
    /// Wrap-corrected displacement across the history window.
    pub displacement: i32,
    pub velocity: Option<DegreesPerMs>,
    pub mode: OperatingMode,
}

impl TelemetrySnapshot {
    /// Render into a fixed-size line. Output that does not fit is cut off.
    #[must_use]
    pub fn render(&self) -> String<TELEMETRY_LINE_LEN> {
        let mut line = String::new();
        // A full buffer only truncates the line.
        let _ = write!(line, "{self}");
        line
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D({},{}') ", self.mapped, self.angle)?;

        match self.range {
            Some(range) => write!(f, "m({},{}) ", range.min, range.max)?,
            None => f.write_str("m(-,-) ")?,
        }

        write!(f, "M({:+},", self.displacement)?;
        match self.velocity {
            Some(v) => {
                let sign = if v < DegreesPerMs::ZERO { '-' } else { '+' };
                write!(f, "{sign}{:.3})", v.abs())?;
            }
            None => f.write_str("-)")?,
        }

        match self.mode {
            OperatingMode::Gamepad => f.write_str(" gamepad"),
            OperatingMode::Keyboard => f.write_str(" keyboard"),
        }
    }
}
