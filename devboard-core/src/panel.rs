//! LED and push-button bit vectors

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outgoing LED pattern, one bit per LED (bit 0 = LED 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedState(pub u16);

impl LedState {
    /// All LEDs off
    pub const OFF: Self = Self(0);

    /// Raw bit pattern
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Check whether an LED is lit
    pub const fn is_on(self, led: u8) -> bool {
        led < 16 && self.0 & (1 << led) != 0
    }
}

/// Snapshot of the button input register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState(pub u16);

impl ButtonState {
    /// Raw bit pattern
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Check whether an input bit is set
    pub const fn is_set(self, bit: u8) -> bool {
        bit < 16 && self.0 & (1 << bit) != 0
    }
}

/// Press/release view between two polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEdges {
    /// Bits that went from clear to set
    pub pressed: u16,
    /// Bits that went from set to clear
    pub released: u16,
}

impl ButtonEdges {
    /// Compute edges between two snapshots
    pub const fn between(previous: ButtonState, current: ButtonState) -> Self {
        Self {
            pressed: current.0 & !previous.0,
            released: previous.0 & !current.0,
        }
    }

    /// Check whether anything changed
    pub const fn is_empty(&self) -> bool {
        self.pressed == 0 && self.released == 0
    }
}

/// Where the buttons sit in the button register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ButtonLayout {
    /// Bit of button 1
    pub first_bit: u8,
    /// Number of buttons mirrored to LEDs
    pub count: u8,
    /// Bit that requests termination of polling loops when set
    pub exit_bit: u8,
}

impl Default for ButtonLayout {
    /// Buttons on bits 1..=8, exit on bit 9
    fn default() -> Self {
        Self {
            first_bit: 1,
            count: 8,
            exit_bit: 9,
        }
    }
}

impl ButtonLayout {
    /// Mask of the button bits
    pub const fn button_mask(&self) -> u16 {
        let ones = if self.count >= 16 {
            u16::MAX
        } else {
            (1u16 << self.count) - 1
        };
        ones << self.first_bit
    }
}
