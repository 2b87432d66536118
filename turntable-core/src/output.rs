//! HID transport trait and error types.

/// The two HID interfaces the device exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportChannel {
    Gamepad,
    Keyboard,
}

impl ReportChannel {
    pub const ALL: [ReportChannel; 2] = [ReportChannel::Gamepad, ReportChannel::Keyboard];
}

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// USB/communication I/O error.
    Io,
    /// Device not ready (e.g., USB not enumerated).
    NotReady,
    /// Report dropped (e.g., host not polling fast enough).
    Dropped,
    /// Endpoint busy.
    Busy,
}

/// Non-blocking sink for finished HID reports.
///
/// The controller checks [`ready`](HidTransport::ready) before every
/// [`submit`](HidTransport::submit) and skips a channel that is not ready;
/// implementations must not wait for the host inside either call.
pub trait HidTransport {
    /// True if `channel` can take a report right now.
    fn ready(&self, channel: ReportChannel) -> bool;

    /// Hand over one report. The bytes are copied; the caller keeps no
    /// reference after this returns.
    fn submit(&mut self, channel: ReportChannel, report: &[u8]) -> Result<(), OutputError>;
}
