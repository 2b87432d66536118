//! Telemetry output over defmt-rtt.

use turntable_core::DebugSink;

/// Writes telemetry lines to the defmt log at debug level.
#[derive(Clone, Copy, Default)]
pub struct DefmtSink;

impl DebugSink for DefmtSink {
    fn write(&mut self, text: &str) {
        defmt::debug!("{=str}", text);
    }
}
