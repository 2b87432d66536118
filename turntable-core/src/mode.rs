//! Operating-mode state machine driven by chorded buttons.

use crate::buttons::{ButtonVector, BUTTON_COUNT};
use crate::config::{ChordConfig, ConfigError};

/// Persistent operating mode.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Buttons and axis go out on the gamepad endpoint; keyboard stays empty.
    #[default]
    Gamepad,
    /// Buttons are typed as keys; the gamepad endpoint reports neutral.
    Keyboard,
}

/// Three buttons that must be held together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Chord {
    buttons: [u8; 3],
}

impl Chord {
    #[must_use]
    pub const fn new(buttons: [u8; 3]) -> Self {
        Self { buttons }
    }

    #[inline]
    #[must_use]
    pub const fn buttons(&self) -> [u8; 3] {
        self.buttons
    }

    /// All indices name a physical button.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        let mut i = 0;
        while i < self.buttons.len() {
            if self.buttons[i] as usize >= BUTTON_COUNT {
                return false;
            }
            i += 1;
        }
        true
    }

    /// The chord as a button mask.
    #[must_use]
    pub const fn mask(&self) -> ButtonVector {
        let mut bits = 0u16;
        let mut i = 0;
        while i < self.buttons.len() {
            if (self.buttons[i] as usize) < BUTTON_COUNT {
                bits |= 1 << self.buttons[i];
            }
            i += 1;
        }
        ButtonVector::from_bits(bits)
    }

    /// True while every button of the chord is pressed.
    #[inline]
    #[must_use]
    pub const fn is_held(&self, buttons: ButtonVector) -> bool {
        buttons.contains(self.mask())
    }
}

/// Action fired on a chord's rising edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeAction {
    /// Switch the persistent mode.
    SwitchTo(OperatingMode),
    /// Reset the calibration range and the angle history.
    Calibrate,
}

/// Chord-driven mode state machine.
///
/// One latch is shared by all three chords: the first tick on which any
/// chord is held fires its action and sets the latch; nothing else fires
/// until no chord is held at all, which clears the latch. Holding a chord at
/// a 1 ms tick therefore toggles or resets exactly once.
///
/// When several chords are held on the same edge the priority is gamepad,
/// keyboard, calibrate.
#[derive(Debug, Clone)]
pub struct ModeController {
    chords: ChordConfig,
    mode: OperatingMode,
    latched: bool,
}

impl ModeController {
    pub fn new(chords: ChordConfig) -> Result<Self, ConfigError> {
        chords.validate()?;
        Ok(Self {
            chords,
            mode: OperatingMode::Gamepad,
            latched: false,
        })
    }

    /// Advance one tick with this tick's buttons.
    ///
    /// Returns the action fired on this tick, if any. Mode switches are
    /// applied before returning; calibration is left to the caller.
    pub fn update(&mut self, buttons: ButtonVector) -> Option<ModeAction> {
        let action = if self.chords.to_gamepad.is_held(buttons) {
            Some(ModeAction::SwitchTo(OperatingMode::Gamepad))
        } else if self.chords.to_keyboard.is_held(buttons) {
            Some(ModeAction::SwitchTo(OperatingMode::Keyboard))
        } else if self.chords.to_calibrate.is_held(buttons) {
            Some(ModeAction::Calibrate)
        } else {
            None
        };

        let Some(action) = action else {
            self.latched = false;
            return None;
        };

        if self.latched {
            return None;
        }
        self.latched = true;

        match action {
            ModeAction::SwitchTo(mode) => {
                info!("mode chord: {:?} -> {:?}", self.mode, mode);
                self.mode = mode;
            }
            ModeAction::Calibrate => info!("calibrate chord"),
        }

        Some(action)
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// True while a chord that already fired is still held.
    #[inline]
    #[must_use]
    pub fn is_latched(&self) -> bool {
        self.latched
    }
}
