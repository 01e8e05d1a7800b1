//! HD44780 character LCD model
//!
//! Models the controller as the drivers see it: instruction decoding by
//! highest set bit, a 128-byte display RAM, the address counter with the
//! controller's line wrap, entry mode and display shift. Execution is
//! instantaneous; there is no busy flag.
//!
//! Two front ends feed the controller:
//!
//! - [`Hd44780::latch_control`] / [`Hd44780::latch_data`]: the control
//!   register latches an instruction; a write with bit 7 set while an
//!   instruction is pending executes it. A byte with bit 7 set and nothing
//!   pending is itself latched (set-address instructions).
//! - [`Hd44780::strobe_control`] / [`Hd44780::strobe_data`]: the control
//!   register drives RS/RW/E and the data register is the bus; the
//!   controller acts on the falling edge of E.

use devboard_core::lcd::LcdGeometry;
use tracing::{debug, trace};

const DDRAM_LEN: usize = 0x80;

/// Simulated HD44780
#[derive(Debug, Clone)]
pub struct Hd44780 {
    ddram: [u8; DDRAM_LEN],
    ac: u8,
    increment: bool,
    shift_display: bool,
    display_on: bool,
    cursor_on: bool,
    blink_on: bool,
    two_lines: bool,
    large_font: bool,
    eight_bit: bool,
    /// Display shift in characters, positive = content moved left
    shift: i32,
    columns: u8,
    instructions: Vec<u8>,
    // Strobe front end
    lines: u8,
    bus: u8,
    // Latch front end
    pending: Option<u8>,
}

impl Hd44780 {
    /// Power-on state with a given visible width
    pub fn new(columns: u8) -> Self {
        Self {
            ddram: [b' '; DDRAM_LEN],
            ac: 0,
            increment: true,
            shift_display: false,
            display_on: false,
            cursor_on: false,
            blink_on: false,
            two_lines: false,
            large_font: false,
            eight_bit: true,
            shift: 0,
            columns,
            instructions: Vec::new(),
            lines: 0,
            bus: 0,
            pending: None,
        }
    }

    /// Control register write, latch wiring
    pub fn latch_control(&mut self, value: u8) {
        match self.pending.take() {
            Some(instruction) if value & 0x80 != 0 => self.execute(instruction),
            Some(stale) => {
                trace!(stale, value, "lcd latch overwritten");
                self.pending = Some(value);
            }
            None => self.pending = Some(value),
        }
    }

    /// Data register write, latch wiring
    pub fn latch_data(&mut self, value: u8) {
        self.write_ram(value);
    }

    /// Control register write, strobe wiring
    pub fn strobe_control(&mut self, value: u8) {
        let falling = self.lines & 0x04 != 0 && value & 0x04 == 0;
        // RS and RW are sampled while E is high
        let rs = self.lines & 0x01 != 0;
        let rw = self.lines & 0x02 != 0;
        self.lines = value & 0x07;
        if !falling {
            return;
        }
        match (rs, rw) {
            (false, false) => self.execute(self.bus),
            (true, false) => self.write_ram(self.bus),
            (false, true) => self.bus = self.ac & 0x7F,
            (true, true) => {
                self.bus = self.ddram[self.ac as usize];
                self.advance();
            }
        }
    }

    /// Data register write, strobe wiring
    pub fn strobe_data(&mut self, value: u8) {
        self.bus = value;
    }

    /// Control register read, strobe wiring
    pub fn strobe_lines(&self) -> u8 {
        self.lines
    }

    /// Data register read, strobe wiring
    pub fn strobe_bus(&self) -> u8 {
        self.bus
    }

    /// Run one instruction
    pub fn execute(&mut self, instruction: u8) {
        self.instructions.push(instruction);
        match 7u32.saturating_sub(instruction.leading_zeros()) {
            _ if instruction == 0 => {}
            0 => {
                self.ddram.fill(b' ');
                self.ac = 0;
                self.increment = true;
                self.shift = 0;
                debug!("lcd clear");
            }
            1 => {
                self.ac = 0;
                self.shift = 0;
            }
            2 => {
                self.increment = instruction & 0x02 != 0;
                self.shift_display = instruction & 0x01 != 0;
            }
            3 => {
                self.display_on = instruction & 0x04 != 0;
                self.cursor_on = instruction & 0x02 != 0;
                self.blink_on = instruction & 0x01 != 0;
            }
            4 => {
                let right = instruction & 0x04 != 0;
                if instruction & 0x08 != 0 {
                    self.shift += if right { -1 } else { 1 };
                } else if right {
                    self.ac = self.next(self.ac, true);
                } else {
                    self.ac = self.next(self.ac, false);
                }
            }
            5 => {
                self.eight_bit = instruction & 0x10 != 0;
                self.two_lines = instruction & 0x08 != 0;
                self.large_font = instruction & 0x04 != 0;
            }
            6 => {
                // Character generator RAM is not modelled
            }
            _ => self.ac = instruction & 0x7F,
        }
        trace!(instruction, ac = self.ac, "lcd instruction");
    }

    fn write_ram(&mut self, value: u8) {
        self.ddram[self.ac as usize] = value;
        self.advance();
        if self.shift_display {
            self.shift += if self.increment { 1 } else { -1 };
        }
    }

    fn advance(&mut self) {
        self.ac = self.next(self.ac, self.increment);
    }

    fn next(&self, ac: u8, increment: bool) -> u8 {
        if self.two_lines {
            match (increment, ac) {
                (true, 0x27) => 0x40,
                (true, a) if a >= 0x67 => 0x00,
                (true, a) => a + 1,
                (false, 0x00) => 0x67,
                (false, 0x40) => 0x27,
                (false, a) => a - 1,
            }
        } else {
            match (increment, ac) {
                (true, a) if a >= 0x4F => 0x00,
                (true, a) => a + 1,
                (false, 0x00) => 0x4F,
                (false, a) => a - 1,
            }
        }
    }

    /// Every instruction executed so far
    pub fn instructions(&self) -> &[u8] {
        &self.instructions
    }

    /// Address counter
    pub fn address(&self) -> u8 {
        self.ac
    }

    /// Display RAM content at an address
    pub fn ram(&self, address: u8) -> u8 {
        self.ddram[(address & 0x7F) as usize]
    }

    /// DDRAM address of the first cell of a row
    ///
    /// Four-line modules continue rows 0 and 1 in rows 2 and 3.
    fn row_start(&self, row: u8) -> u8 {
        LcdGeometry {
            columns: self.columns,
            lines: 4,
        }
        .row_address(row)
    }

    /// Display RAM content of one line, unshifted, as stored
    pub fn ram_line(&self, row: u8) -> String {
        let start = self.row_start(row);
        (0..self.columns)
            .map(|col| self.ram(start.wrapping_add(col)) as char)
            .collect()
    }

    /// What a line currently shows, honoring display shift
    pub fn visible_line(&self, row: u8) -> String {
        let (base, first, len) = if self.two_lines {
            let start = self.row_start(row);
            (start & 0x40, (start & 0x3F) as i32, 40)
        } else {
            (0x00, row as i32 * self.columns as i32, 80)
        };
        (0..self.columns as i32)
            .map(|col| {
                let offset = (first + col + self.shift).rem_euclid(len);
                self.ddram[base as usize + offset as usize] as char
            })
            .collect()
    }

    /// Current display shift in characters
    pub fn display_shift(&self) -> i32 {
        self.shift
    }

    pub fn display_on(&self) -> bool {
        self.display_on
    }

    pub fn cursor_on(&self) -> bool {
        self.cursor_on
    }

    pub fn blink_on(&self) -> bool {
        self.blink_on
    }

    pub fn two_lines(&self) -> bool {
        self.two_lines
    }

    pub fn large_font(&self) -> bool {
        self.large_font
    }

    pub fn eight_bit(&self) -> bool {
        self.eight_bit
    }

    /// Entry mode: address increments after a write
    pub fn increments(&self) -> bool {
        self.increment
    }

    /// Entry mode: display shifts after a write
    pub fn shifts_display(&self) -> bool {
        self.shift_display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devboard_core::lcd::EntryMode;
    use proptest::prelude::*;

    fn strobe_instruction(lcd: &mut Hd44780, value: u8) {
        lcd.strobe_control(0x04);
        lcd.strobe_data(value);
        lcd.strobe_control(0x00);
    }

    fn strobe_char(lcd: &mut Hd44780, value: u8) {
        lcd.strobe_control(0x05);
        lcd.strobe_data(value);
        lcd.strobe_control(0x01);
    }

    #[test]
    fn test_strobe_executes_on_falling_edge() {
        let mut lcd = Hd44780::new(16);

        lcd.strobe_control(0x04);
        lcd.strobe_data(0x38);
        assert!(lcd.instructions().is_empty());
        lcd.strobe_control(0x00);

        assert_eq!(lcd.instructions(), &[0x38]);
        assert!(lcd.two_lines());
        assert!(!lcd.large_font());
    }

    #[test]
    fn test_strobe_text() {
        let mut lcd = Hd44780::new(16);
        strobe_instruction(&mut lcd, 0x38);
        strobe_instruction(&mut lcd, 0xC0);
        for &c in b"Hi" {
            strobe_char(&mut lcd, c);
        }

        assert_eq!(lcd.visible_line(1).trim_end(), "Hi");
        assert_eq!(lcd.address(), 0x42);
    }

    #[test]
    fn test_latch_front_end() {
        let mut lcd = Hd44780::new(16);

        lcd.latch_control(0x3C);
        lcd.latch_control(0x80);
        lcd.latch_control(0xC0);
        lcd.latch_control(0x80);
        lcd.latch_data(b'A');

        assert_eq!(lcd.instructions(), &[0x3C, 0xC0]);
        assert!(lcd.large_font());
        assert_eq!(lcd.ram(0x40), b'A');
    }

    #[test]
    fn test_latch_seek_home_address() {
        let mut lcd = Hd44780::new(16);
        lcd.latch_control(0x38);
        lcd.latch_control(0x80);
        lcd.latch_data(b'x');

        lcd.latch_control(0x80);
        lcd.latch_control(0x80);

        assert_eq!(lcd.instructions(), &[0x38, 0x80]);
        assert_eq!(lcd.address(), 0);
    }

    #[test]
    fn test_clear_resets() {
        let mut lcd = Hd44780::new(16);
        lcd.execute(0x38);
        lcd.execute(0x04);
        lcd.latch_data(b'z');
        lcd.execute(0x01);

        assert!(lcd.increments());
        assert_eq!(lcd.address(), 0);
        assert_eq!(lcd.ram(0), b' ');
    }

    #[test]
    fn test_two_line_wrap() {
        let mut lcd = Hd44780::new(16);
        lcd.execute(0x38);
        lcd.execute(0x80 | 0x27);
        lcd.latch_data(b'a');
        assert_eq!(lcd.address(), 0x40);

        lcd.execute(0x80 | 0x67);
        lcd.latch_data(b'b');
        assert_eq!(lcd.address(), 0x00);
    }

    #[test]
    fn test_display_shift_scrolls() {
        let mut lcd = Hd44780::new(4);
        lcd.execute(0x38);
        lcd.execute(0x06);
        for &c in b"abcd" {
            lcd.latch_data(c);
        }
        lcd.execute(0x07);
        lcd.latch_data(b'e');
        lcd.latch_data(b'f');

        assert_eq!(lcd.display_shift(), 2);
        assert_eq!(lcd.visible_line(0), "cdef");
        assert_eq!(lcd.ram_line(0), "abcd");
    }

    #[test]
    fn test_four_line_rows() {
        let mut lcd = Hd44780::new(20);
        strobe_instruction(&mut lcd, 0x38);
        for (row, text) in [(0u8, "one"), (1, "two"), (2, "three"), (3, "four")] {
            let start = lcd.row_start(row);
            strobe_instruction(&mut lcd, 0x80 | start);
            for c in text.bytes() {
                strobe_char(&mut lcd, c);
            }
        }

        assert_eq!(lcd.ram(0x14), b't');
        assert_eq!(lcd.ram(0x54), b'f');
        assert_eq!(lcd.visible_line(0).trim_end(), "one");
        assert_eq!(lcd.visible_line(1).trim_end(), "two");
        assert_eq!(lcd.visible_line(2).trim_end(), "three");
        assert_eq!(lcd.visible_line(3).trim_end(), "four");
        assert_eq!(lcd.ram_line(2).trim_end(), "three");
        assert_eq!(lcd.ram_line(3).trim_end(), "four");
    }

    fn start_address(two_lines: bool, index: u8) -> u8 {
        if two_lines {
            let index = index % 80;
            if index < 40 {
                index
            } else {
                0x40 + (index - 40)
            }
        } else {
            index % 80
        }
    }

    proptest! {
        #[test]
        fn address_counter_follows_geometry(
            two_lines in any::<bool>(),
            increment in any::<bool>(),
            index in 0u8..80,
            writes in 0usize..200,
        ) {
            let start = start_address(two_lines, index);
            let geometry = LcdGeometry {
                columns: 16,
                lines: if two_lines { 2 } else { 1 },
            };
            let mode = if increment {
                EntryMode::Increment
            } else {
                EntryMode::Decrement
            };

            let mut lcd = Hd44780::new(16);
            lcd.execute(if two_lines { 0x38 } else { 0x30 });
            lcd.execute(if increment { 0x06 } else { 0x04 });
            lcd.execute(0x80 | start);

            let mut expected = start;
            for _ in 0..writes {
                strobe_char(&mut lcd, b'x');
                expected = geometry.next_address(expected, mode);
            }

            prop_assert_eq!(lcd.address(), expected);
        }
    }
}
