//! Board configuration types
//!
//! Everything a driver needs to know that differs between board revisions.
//! Adding a revision means adding data of these types, never touching
//! driver logic.

use devboard_hal::{UartConfig, WaitSpec};
use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::lcd::{LcdCommandSet, LcdGeometry, LcdProtocol};
use crate::map::RegisterMap;
use crate::panel::ButtonLayout;

/// Maximum board name length
pub const MAX_LABEL_LEN: usize = 16;

/// LCD configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LcdConfig {
    /// Wiring convention
    pub protocol: LcdProtocol,
    /// Init sequence values
    pub commands: LcdCommandSet,
    /// Visible character grid
    pub geometry: LcdGeometry,
    /// Characters after which long strings scroll (display shift), if any
    pub max_display_chars: Option<u8>,
    /// Settling time after each instruction
    pub command_wait: WaitSpec,
    /// Settling time after each character
    pub char_wait: WaitSpec,
}

impl LcdConfig {
    /// Latch-wired controller as found on the first boards
    pub const fn latch() -> Self {
        Self {
            protocol: LcdProtocol::Latch,
            commands: LcdCommandSet::LATCH,
            geometry: LcdGeometry {
                columns: 16,
                lines: 2,
            },
            max_display_chars: Some(16),
            command_wait: WaitSpec::new(1, 1),
            char_wait: WaitSpec::new(2, 1),
        }
    }

    /// Strobe-wired controller
    pub const fn strobe() -> Self {
        Self {
            protocol: LcdProtocol::Strobe,
            commands: LcdCommandSet::STROBE,
            geometry: LcdGeometry {
                columns: 16,
                lines: 2,
            },
            max_display_chars: Some(16),
            command_wait: WaitSpec::new(1, 4),
            char_wait: WaitSpec::NONE,
        }
    }

    /// Defaults for a protocol family
    pub const fn for_protocol(protocol: LcdProtocol) -> Self {
        match protocol {
            LcdProtocol::Latch => Self::latch(),
            LcdProtocol::Strobe => Self::strobe(),
        }
    }
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self::latch()
    }
}

/// Walking-bit LED animation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnimationSpec {
    /// Pattern of the first frame of the right-shifting half
    pub start_right: u8,
    /// Pattern of the first frame of the left-shifting half
    pub start_left: u8,
    /// Wait after every frame
    pub frame_wait: WaitSpec,
}

impl AnimationSpec {
    /// Standard animation with `calls` delay calls per frame
    pub const fn with_waits(calls: u8, units: u32) -> Self {
        Self {
            start_right: 0xFF,
            start_left: 0x01,
            frame_wait: WaitSpec::new(calls, units),
        }
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::with_waits(5, 1)
    }
}

/// Complete description of one board
///
/// Chosen once at startup; drivers borrow its register map for the rest
/// of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    /// Board name for logs and tools
    pub name: String<MAX_LABEL_LEN>,
    /// Register addresses
    pub map: RegisterMap,
    /// Number of LEDs (8 or 10)
    pub led_width: u8,
    /// Button register layout
    pub buttons: ButtonLayout,
    /// LCD wiring and timing
    pub lcd: LcdConfig,
    /// LED animation parameters
    pub animation: AnimationSpec,
    /// UART line settings applied by `configure`
    pub uart: UartConfig,
}

impl BoardConfig {
    /// Create a configuration with default peripherals over a register map
    pub fn new(name: &str, map: RegisterMap) -> Self {
        let mut label = String::new();
        for c in name.chars() {
            if label.push(c).is_err() {
                break;
            }
        }
        Self {
            name: label,
            map,
            led_width: 8,
            buttons: ButtonLayout::default(),
            lcd: LcdConfig::default(),
            animation: AnimationSpec::default(),
            uart: UartConfig::default(),
        }
    }

    /// Mask covering every LED
    pub const fn led_mask(&self) -> u16 {
        if self.led_width >= 16 {
            u16::MAX
        } else {
            (1u16 << self.led_width) - 1
        }
    }
}
