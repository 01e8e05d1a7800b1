//! HD44780-class character LCD model
//!
//! Instruction encodings, the two wiring conventions found on devboard
//! revisions, display geometry and the shadow state a driver keeps for a
//! controller whose registers cannot be read back.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Instruction bytes
pub mod cmd {
    /// Clear display, address counter to 0, entry mode to increment
    pub const CLEAR_DISPLAY: u8 = 0x01;
    /// Address counter to 0, undo display shift, keep DDRAM content
    pub const RETURN_HOME: u8 = 0x02;

    /// Entry mode set (bit 2)
    pub const ENTRY_MODE_SET: u8 = 0x04;
    /// Entry mode: increment address after each character
    pub const ENTRY_INCREMENT: u8 = 0x02;
    /// Entry mode: shift display after each character
    pub const ENTRY_SHIFT: u8 = 0x01;

    /// Display on/off control (bit 3)
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const DISPLAY_ON: u8 = 0x04;
    pub const CURSOR_ON: u8 = 0x02;
    pub const BLINK_ON: u8 = 0x01;

    /// Cursor or display shift (bit 4)
    pub const CURSOR_SHIFT: u8 = 0x10;

    /// Function set (bit 5)
    pub const FUNCTION_SET: u8 = 0x20;
    /// 8-bit data bus
    pub const EIGHT_BIT: u8 = 0x10;
    /// Two display lines
    pub const TWO_LINES: u8 = 0x08;
    /// 5x10 dot font
    pub const FONT_5X10: u8 = 0x04;

    /// Set CGRAM address (bit 6)
    pub const SET_CGRAM_ADDRESS: u8 = 0x40;
    /// Set DDRAM address (bit 7), address in the low seven bits
    pub const SET_DDRAM_ADDRESS: u8 = 0x80;

    /// Increment, no shift (`0x06`)
    pub const ENTRY_MODE_DEFAULT: u8 = ENTRY_MODE_SET | ENTRY_INCREMENT;
    /// Increment with display shift (`0x07`)
    pub const DISPLAY_SHIFT_ENABLE: u8 = ENTRY_MODE_SET | ENTRY_INCREMENT | ENTRY_SHIFT;
}

/// Control register bits of the strobe-wired controller
pub mod strobe {
    /// Register select: 0 = instruction, 1 = data
    pub const RS: u8 = 0x01;
    /// Read/write select: 1 = read
    pub const RW: u8 = 0x02;
    /// Enable line; the controller latches on the falling edge
    pub const E: u8 = 0x04;
}

/// Control register value that executes a latched command (latch wiring)
pub const LATCH_EXECUTE: u8 = 0x80;

/// DDRAM start address of the second display line
pub const LINE2_ADDRESS: u8 = 0x40;

/// Size of the DDRAM address space used by the controller
pub const DDRAM_SIZE: u8 = 0x80;

/// How the controller is wired to the register window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LcdProtocol {
    /// Command byte latched into the control register, executed by writing
    /// [`LATCH_EXECUTE`] to the same register; characters go straight to
    /// the data register.
    #[default]
    Latch,
    /// Control register drives RS/RW/E; every byte is latched by an enable
    /// strobe around a write to the data register.
    Strobe,
}

/// Cursor movement after a character write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntryMode {
    #[default]
    Increment,
    Decrement,
}

impl EntryMode {
    /// Entry-mode-set instruction for this direction
    pub const fn command(self, shift: bool) -> u8 {
        let mut value = cmd::ENTRY_MODE_SET;
        if let EntryMode::Increment = self {
            value |= cmd::ENTRY_INCREMENT;
        }
        if shift {
            value |= cmd::ENTRY_SHIFT;
        }
        value
    }
}

/// Visible character grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LcdGeometry {
    /// Characters per line
    pub columns: u8,
    /// Number of lines (1, 2 or 4)
    pub lines: u8,
}

impl Default for LcdGeometry {
    /// 16x2, the module fitted to every known board
    fn default() -> Self {
        Self {
            columns: 16,
            lines: 2,
        }
    }
}

impl LcdGeometry {
    /// Number of visible character cells
    pub const fn cells(&self) -> u16 {
        self.columns as u16 * self.lines as u16
    }

    /// DDRAM address of the first cell of a row
    ///
    /// Rows 2 and 3 of four-line modules continue rows 0 and 1.
    pub const fn row_address(&self, row: u8) -> u8 {
        match row {
            0 => 0x00,
            1 => LINE2_ADDRESS,
            2 => self.columns,
            _ => LINE2_ADDRESS + self.columns,
        }
    }

    /// DDRAM address of a visible cell
    pub fn address_of(&self, row: u8, column: u8) -> Option<u8> {
        if row >= self.lines || column >= self.columns {
            return None;
        }
        Some(self.row_address(row) + column)
    }

    /// Logical cell index (`row * columns + column`) of a DDRAM address
    ///
    /// `None` for addresses outside the visible window.
    pub fn position_of(&self, address: u8) -> Option<u8> {
        (0..self.lines).find_map(|row| {
            let start = self.row_address(row);
            if address >= start && address < start + self.columns {
                Some(row * self.columns + (address - start))
            } else {
                None
            }
        })
    }

    /// Number of DDRAM lines the controller is configured for
    const fn ddram_lines(&self) -> u8 {
        if self.lines == 1 {
            1
        } else {
            2
        }
    }

    /// Address counter value after one character write
    ///
    /// Follows the controller's wrap rules: in two-line mode 0x27 is
    /// followed by 0x40 and 0x67 by 0x00; in one-line mode 0x4F wraps to 0.
    pub fn next_address(&self, address: u8, mode: EntryMode) -> u8 {
        if self.ddram_lines() == 1 {
            return match mode {
                EntryMode::Increment if address >= 0x4F => 0x00,
                EntryMode::Increment => address + 1,
                EntryMode::Decrement if address == 0x00 => 0x4F,
                EntryMode::Decrement => address - 1,
            };
        }
        match (mode, address) {
            (EntryMode::Increment, 0x27) => 0x40,
            (EntryMode::Increment, a) if a >= 0x67 => 0x00,
            (EntryMode::Increment, a) => a + 1,
            (EntryMode::Decrement, 0x00) => 0x67,
            (EntryMode::Decrement, 0x40) => 0x27,
            (EntryMode::Decrement, a) => a - 1,
        }
    }
}

/// Instruction values used by the init sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LcdCommandSet {
    /// Function set (bus width, lines, font)
    pub function_set: u8,
    /// Display control (display, cursor, blink)
    pub display_control: u8,
    /// Entry mode set
    pub entry_mode: u8,
}

impl LcdCommandSet {
    /// 8-bit, 2 lines, 5x10 font; display, cursor and blink on
    pub const LATCH: Self = Self {
        function_set: 0x3C,
        display_control: 0x0F,
        entry_mode: cmd::ENTRY_MODE_DEFAULT,
    };

    /// 8-bit, 2 lines, 5x8 font; display and cursor on, no blink
    pub const STROBE: Self = Self {
        function_set: 0x38,
        display_control: 0x0E,
        entry_mode: cmd::ENTRY_MODE_DEFAULT,
    };

    /// Defaults observed for a protocol family
    pub const fn for_protocol(protocol: LcdProtocol) -> Self {
        match protocol {
            LcdProtocol::Latch => Self::LATCH,
            LcdProtocol::Strobe => Self::STROBE,
        }
    }
}

/// Shadow of the controller's write-only state
///
/// Nothing here is ever read from the device; it is what the driver
/// believes after issuing complete command sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LcdState {
    /// DDRAM address counter
    pub address: u8,
    /// Cursor movement direction
    pub entry_mode: EntryMode,
    /// Display shifts on every character write
    pub shift_enabled: bool,
    /// Display on
    pub display_on: bool,
    /// Underline cursor visible
    pub cursor_visible: bool,
    /// Cursor cell blinks
    pub blink: bool,
}

impl LcdState {
    /// Logical cursor cell, `0..columns * lines`
    ///
    /// `None` while the address counter is outside the visible window.
    pub fn cursor_position(&self, geometry: &LcdGeometry) -> Option<u8> {
        geometry.position_of(self.address)
    }

    /// Apply an entry-mode-set instruction
    pub fn apply_entry_mode(&mut self, command: u8) {
        self.entry_mode = if command & cmd::ENTRY_INCREMENT != 0 {
            EntryMode::Increment
        } else {
            EntryMode::Decrement
        };
        self.shift_enabled = command & cmd::ENTRY_SHIFT != 0;
    }

    /// Apply a display-control instruction
    pub fn apply_display_control(&mut self, command: u8) {
        self.display_on = command & cmd::DISPLAY_ON != 0;
        self.cursor_visible = command & cmd::CURSOR_ON != 0;
        self.blink = command & cmd::BLINK_ON != 0;
    }
}
