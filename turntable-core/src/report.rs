//! Report assembly and the wire layouts of both HID interfaces.

use crate::buttons::{ButtonVector, BUTTON_COUNT};
use crate::mode::OperatingMode;

/// Keycode slots in a boot keyboard report.
pub const MAX_ROLLOVER: usize = 6;

/// Gamepad interface report.
///
/// Layout (4 bytes): `buttons[0]`, `buttons[1]`, `x`, `y`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GamepadReport {
    /// Button bitmap, buttons 0..7 in byte 0 and 8..10 in byte 1.
    pub buttons: [u8; 2],
    /// Turntable axis (0-255).
    pub x: u8,
    /// Unused second axis, always 0.
    pub y: u8,
}

impl GamepadReport {
    /// Size of the report in bytes.
    pub const SIZE: usize = 4;

    /// Neutral/zero report.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: [0; 2],
            x: 0,
            y: 0,
        }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> [u8; Self::SIZE] {
        [self.buttons[0], self.buttons[1], self.x, self.y]
    }
}

/// Keyboard interface report (boot keyboard layout).
///
/// Layout (8 bytes): `modifier`, reserved, `keycodes[0..6]`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    pub modifier: u8,
    pub keycodes: [u8; MAX_ROLLOVER],
}

impl KeyboardReport {
    pub const SIZE: usize = 8;

    /// No keys pressed.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            modifier: 0,
            keycodes: [0; MAX_ROLLOVER],
        }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> [u8; Self::SIZE] {
        let k = self.keycodes;
        [self.modifier, 0, k[0], k[1], k[2], k[3], k[4], k[5]]
    }
}

/// Everything produced for one tick.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutgoingReport {
    /// Mode the report was built in.
    pub mode: OperatingMode,
    pub buttons: ButtonVector,
    /// Published (post-gate) axis byte.
    pub axis: u8,
    /// Rollover slots, zero when empty.
    pub keycodes: [u8; MAX_ROLLOVER],
}

impl OutgoingReport {
    /// 16-bit button bitmap as sent on the wire.
    #[inline]
    #[must_use]
    pub const fn button_bitmap(&self) -> [u8; 2] {
        self.buttons.to_le_bytes()
    }

    /// Report for the gamepad interface; neutral while in keyboard mode.
    #[must_use]
    pub const fn gamepad_report(&self) -> GamepadReport {
        match self.mode {
            OperatingMode::Gamepad => GamepadReport {
                buttons: self.button_bitmap(),
                x: self.axis,
                y: 0,
            },
            OperatingMode::Keyboard => GamepadReport::neutral(),
        }
    }

    /// Report for the keyboard interface.
    #[must_use]
    pub const fn keyboard_report(&self) -> KeyboardReport {
        KeyboardReport {
            modifier: 0,
            keycodes: self.keycodes,
        }
    }
}

/// Builds the [`OutgoingReport`] from buttons, axis and mode.
///
/// In keyboard mode pressed buttons are turned into keycodes in increasing
/// button order; buttons beyond the sixth are dropped (6-key rollover). In
/// gamepad mode the keycode array is always empty.
///
/// # Example
///
/// ```
/// use turntable_core::{ButtonVector, OperatingMode, ReportBuilder, DEFAULT_KEYMAP};
///
/// let builder = ReportBuilder::new(DEFAULT_KEYMAP);
/// let report = builder.build(ButtonVector::single(1), 200, OperatingMode::Keyboard);
/// assert_eq!(report.keycodes, [0x16, 0, 0, 0, 0, 0]); // S
/// assert_eq!(report.axis, 200);
/// ```
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    keymap: [u8; BUTTON_COUNT],
}

impl ReportBuilder {
    #[must_use]
    pub const fn new(keymap: [u8; BUTTON_COUNT]) -> Self {
        Self { keymap }
    }

    #[must_use]
    pub fn build(&self, buttons: ButtonVector, axis: u8, mode: OperatingMode) -> OutgoingReport {
        let keycodes = match mode {
            OperatingMode::Keyboard => self.keycodes(buttons),
            OperatingMode::Gamepad => [0; MAX_ROLLOVER],
        };

        OutgoingReport {
            mode,
            buttons,
            axis,
            keycodes,
        }
    }

    /// Keycodes for the first [`MAX_ROLLOVER`] pressed buttons.
    #[must_use]
    pub fn keycodes(&self, buttons: ButtonVector) -> [u8; MAX_ROLLOVER] {
        let mut keycodes = [0; MAX_ROLLOVER];
        for (slot, index) in keycodes.iter_mut().zip(buttons.pressed()) {
            *slot = self.keymap[index];
        }
        keycodes
    }
}
