//! Button state for the eleven physical buttons.

use crate::input::DigitalInputs;
use core::ops::{BitAnd, BitOr, BitOrAssign};

/// Number of physical buttons.
pub const BUTTON_COUNT: usize = 11;

const ALL_BUTTONS: u16 = (1 << BUTTON_COUNT) - 1;

/// Pressed/released state of every button, one bit per button index.
///
/// Bit `i` is set while button `i` is pressed; bits above
/// [`BUTTON_COUNT`] are always clear. The little-endian bytes of the raw
/// value are exactly the gamepad report's button bitmap.
///
/// # Example
///
/// ```
/// use turntable_core::ButtonVector;
///
/// let buttons = ButtonVector::from_levels([
///     true, false, false, false, false, false, false, false, true, false, false,
/// ]);
/// assert!(buttons.is_pressed(0));
/// assert!(buttons.is_pressed(8));
/// assert_eq!(buttons.to_le_bytes(), [0b0000_0001, 0b0000_0001]);
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonVector(u16);

impl ButtonVector {
    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Build from raw bits; bits above the last button are dropped.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits & ALL_BUTTONS)
    }

    /// Build from one "pressed" flag per button.
    #[must_use]
    pub fn from_levels(levels: [bool; BUTTON_COUNT]) -> Self {
        let mut buttons = Self::NONE;
        for (index, &pressed) in levels.iter().enumerate() {
            buttons.set(index, pressed);
        }
        buttons
    }

    /// Vector with only `index` pressed. Out-of-range indices give `NONE`.
    #[inline]
    #[must_use]
    pub const fn single(index: usize) -> Self {
        if index < BUTTON_COUNT {
            Self(1 << index)
        } else {
            Self::NONE
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_pressed(self, index: usize) -> bool {
        index < BUTTON_COUNT && (self.0 >> index) & 1 == 1
    }

    /// True when every button in `other` is pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: ButtonVector) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Set or clear one button. Out-of-range indices are ignored.
    #[inline]
    pub fn set(&mut self, index: usize, pressed: bool) {
        if index >= BUTTON_COUNT {
            return;
        }
        if pressed {
            self.0 |= 1 << index;
        } else {
            self.0 &= !(1 << index);
        }
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Bitmap bytes: buttons 0..7 in byte 0, buttons 8..10 in byte 1.
    #[inline]
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    /// Indices of pressed buttons in increasing order.
    pub fn pressed(self) -> impl Iterator<Item = usize> {
        (0..BUTTON_COUNT).filter(move |&index| self.is_pressed(index))
    }
}

impl BitOr for ButtonVector {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ButtonVector {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ButtonVector {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

/// Reads every button line once per tick. No debouncing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonSampler;

impl ButtonSampler {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Sample all [`BUTTON_COUNT`] lines from `inputs`.
    pub fn sample<D: DigitalInputs>(&self, inputs: &mut D) -> ButtonVector {
        let mut buttons = ButtonVector::NONE;
        for index in 0..BUTTON_COUNT {
            buttons.set(index, inputs.read_level(index));
        }
        buttons
    }
}
