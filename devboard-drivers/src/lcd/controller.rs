//! LCD controller driver
//!
//! Every instruction passes through [`LcdController::command`], which also
//! updates the shadow [`LcdState`]. Since the device cannot be read, the
//! shadow is only as good as the sequences issued; the driver therefore
//! always sends complete instructions and never patches state by hand.

use devboard_core::config::{BoardConfig, LcdConfig};
use devboard_core::lcd::{cmd, EntryMode, LcdGeometry, LcdState};
use devboard_core::{HalError, RegisterMap, RegisterWindow};
use devboard_hal::{DelayUnit, RegisterBus};

use super::protocol::{transfer, Transfer};

/// Character LCD
pub struct LcdController<'m, B, D> {
    window: RegisterWindow<'m, B>,
    delay: D,
    config: LcdConfig,
    state: LcdState,
}

impl<'m, B: RegisterBus, D: DelayUnit> LcdController<'m, B, D> {
    /// Create the LCD driver of a board
    pub fn new(board: &'m BoardConfig, bus: B, delay: D) -> Self {
        Self::with_config(&board.map, bus, delay, board.lcd)
    }

    /// Create an LCD driver with explicit wiring and timing
    pub fn with_config(map: &'m RegisterMap, bus: B, delay: D, config: LcdConfig) -> Self {
        Self {
            window: RegisterWindow::new(map, bus),
            delay,
            config,
            state: LcdState::default(),
        }
    }

    /// Wiring and timing in use
    pub fn config(&self) -> &LcdConfig {
        &self.config
    }

    /// Visible character grid
    pub fn geometry(&self) -> LcdGeometry {
        self.config.geometry
    }

    /// What the driver believes the controller state is
    pub fn state(&self) -> LcdState {
        self.state
    }

    /// Logical cursor cell, if the address counter is on a visible cell
    pub fn cursor_position(&self) -> Option<u8> {
        self.state.cursor_position(&self.config.geometry)
    }

    /// Issue a raw instruction and wait for it to settle
    pub fn command(&mut self, instruction: u8) -> Result<(), HalError> {
        transfer(
            &mut self.window,
            self.config.protocol,
            Transfer::Instruction,
            instruction,
        )?;
        self.track(instruction);
        self.config.command_wait.apply(&mut self.delay);

        #[cfg(feature = "defmt")]
        defmt::trace!("lcd cmd {=u8:#x}", instruction);

        Ok(())
    }

    /// Bring the controller into a known state
    ///
    /// Clear, function set, display control and entry mode, in that order;
    /// the controller ignores configuration sent out of order.
    pub fn init(&mut self) -> Result<(), HalError> {
        let commands = self.config.commands;
        self.command(cmd::CLEAR_DISPLAY)?;
        self.command(commands.function_set)?;
        self.command(commands.display_control)?;
        self.command(commands.entry_mode)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("lcd ready ({})", self.config.protocol);

        Ok(())
    }

    /// Erase the display and move the cursor home
    pub fn clear(&mut self) -> Result<(), HalError> {
        self.command(cmd::CLEAR_DISPLAY)
    }

    /// Move the cursor home without erasing
    pub fn home(&mut self) -> Result<(), HalError> {
        self.command(cmd::RETURN_HOME)
    }

    /// Set the display RAM address
    ///
    /// Line 1 starts at `0x00`, line 2 at `0x40`. Only the low seven bits
    /// are used.
    pub fn seek(&mut self, address: u8) -> Result<(), HalError> {
        self.command(cmd::SET_DDRAM_ADDRESS | (address & !cmd::SET_DDRAM_ADDRESS))
    }

    /// Move the cursor to a visible cell
    pub fn seek_to(&mut self, row: u8, column: u8) -> Result<(), HalError> {
        let address = self
            .config
            .geometry
            .address_of(row, column)
            .ok_or(HalError::InvalidPosition { row, column })?;
        self.seek(address)
    }

    /// Switch display, cursor and blink
    pub fn set_display(&mut self, on: bool, cursor: bool, blink: bool) -> Result<(), HalError> {
        let mut value = cmd::DISPLAY_CONTROL;
        if on {
            value |= cmd::DISPLAY_ON;
        }
        if cursor {
            value |= cmd::CURSOR_ON;
        }
        if blink {
            value |= cmd::BLINK_ON;
        }
        self.command(value)
    }

    /// Set cursor direction and display shift
    pub fn set_entry_mode(&mut self, mode: EntryMode, shift: bool) -> Result<(), HalError> {
        self.command(mode.command(shift))
    }

    /// Write one character at the cursor
    pub fn write_char(&mut self, c: u8) -> Result<(), HalError> {
        transfer(&mut self.window, self.config.protocol, Transfer::Data, c)?;
        self.state.address = self
            .config
            .geometry
            .next_address(self.state.address, self.state.entry_mode);
        self.config.char_wait.apply(&mut self.delay);
        Ok(())
    }

    /// Write a string at the cursor
    pub fn write_string(&mut self, s: &str) -> Result<(), HalError> {
        self.write_bytes(s.as_bytes())
    }

    /// Write raw character codes at the cursor
    ///
    /// With `max_display_chars` configured, a longer text turns on display
    /// shift right before the first character past the limit, so the rest
    /// scrolls into view. The previous entry mode is restored afterwards.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), HalError> {
        let previous = self.state;
        let limit = self.config.max_display_chars.map(usize::from);
        let mut shifted = false;

        for (index, &byte) in bytes.iter().enumerate() {
            if !shifted && limit == Some(index) {
                self.command(cmd::DISPLAY_SHIFT_ENABLE)?;
                shifted = true;
            }
            self.write_char(byte)?;
        }

        if shifted {
            self.command(previous.entry_mode.command(previous.shift_enabled))?;
        }
        Ok(())
    }

    /// Access the delay strategy
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    /// Give back the bus and the delay
    pub fn release(self) -> (B, D) {
        (self.window.release(), self.delay)
    }

    /// Follow an instruction in the shadow state
    fn track(&mut self, instruction: u8) {
        let state = &mut self.state;
        if instruction & cmd::SET_DDRAM_ADDRESS != 0 {
            state.address = instruction & !cmd::SET_DDRAM_ADDRESS;
        } else if instruction & (cmd::SET_CGRAM_ADDRESS | cmd::FUNCTION_SET) != 0 {
            // No effect on the display RAM cursor
        } else if instruction & cmd::CURSOR_SHIFT != 0 {
            // S/C = 0 moves the cursor, R/L picks the direction
            if instruction & 0x08 == 0 {
                let direction = if instruction & 0x04 != 0 {
                    EntryMode::Increment
                } else {
                    EntryMode::Decrement
                };
                state.address = self.config.geometry.next_address(state.address, direction);
            }
        } else if instruction & cmd::DISPLAY_CONTROL != 0 {
            state.apply_display_control(instruction);
        } else if instruction & cmd::ENTRY_MODE_SET != 0 {
            state.apply_entry_mode(instruction);
        } else if instruction & cmd::RETURN_HOME != 0 {
            state.address = 0;
        } else if instruction & cmd::CLEAR_DISPLAY != 0 {
            state.address = 0;
            state.entry_mode = EntryMode::Increment;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBoard, Op};
    use devboard_core::lcd::{strobe, LcdProtocol, LATCH_EXECUTE};
    use devboard_core::BoardRevision;
    use devboard_hal::CountingDelay;
    use heapless::Vec;
    use proptest::prelude::*;

    const REV_A_CTRL: u32 = 0x8000_0004;
    const REV_A_DATA: u32 = 0x8000_0008;
    const REV_C_CTRL: u32 = 0xE000_8000;
    const REV_C_DATA: u32 = 0xE000_8004;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Cmd(u8),
        Char(u8),
    }

    /// Decode the register traffic back into instructions and characters
    fn decode(board: &MockBoard, protocol: LcdProtocol, ctrl: u32, data: u32) -> Vec<Event, 256> {
        let mut events = Vec::new();
        let mut lines = 0u32;
        for op in board.ops() {
            let Op::Write(address, value) = op else {
                continue;
            };
            let event = match protocol {
                LcdProtocol::Latch if address == ctrl && value != LATCH_EXECUTE as u32 => {
                    Some(Event::Cmd(value as u8))
                }
                LcdProtocol::Latch if address == data => Some(Event::Char(value as u8)),
                LcdProtocol::Strobe if address == ctrl => {
                    lines = value;
                    None
                }
                LcdProtocol::Strobe if address == data => {
                    if lines & strobe::RS as u32 != 0 {
                        Some(Event::Char(value as u8))
                    } else {
                        Some(Event::Cmd(value as u8))
                    }
                }
                _ => None,
            };
            if let Some(event) = event {
                events.push(event).unwrap();
            }
        }
        events
    }

    fn commands(events: &[Event]) -> Vec<u8, 64> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Cmd(c) => Some(*c),
                Event::Char(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_latch_init_order() {
        let config = BoardRevision::RevA.config().unwrap();
        let board = MockBoard::new();
        let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

        lcd.init().unwrap();

        assert_eq!(
            board.writes_to(REV_A_CTRL).as_slice(),
            &[0x01, 0x80, 0x3C, 0x80, 0x0F, 0x80, 0x06, 0x80]
        );
        assert!(board.writes_to(REV_A_DATA).is_empty());
        let (_, delay) = lcd.release();
        assert_eq!(delay.calls, 4);
    }

    #[test]
    fn test_strobe_init_order() {
        let config = BoardRevision::RevC.config().unwrap();
        let board = MockBoard::new();
        let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

        lcd.init().unwrap();

        assert_eq!(
            board.writes_to(REV_C_DATA).as_slice(),
            &[0x01, 0x38, 0x0E, 0x06]
        );
        assert_eq!(
            board.writes_to(REV_C_CTRL).as_slice(),
            &[0x04, 0x00, 0x04, 0x00, 0x04, 0x00, 0x04, 0x00]
        );

        let state = lcd.state();
        assert!(state.display_on);
        assert!(state.cursor_visible);
        assert!(!state.blink);
        assert_eq!(state.entry_mode, EntryMode::Increment);
        assert!(!state.shift_enabled);
    }

    #[test]
    fn test_write_char_strobe() {
        let config = BoardRevision::RevC.config().unwrap();
        let board = MockBoard::new();
        let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

        lcd.write_char(b'Z').unwrap();

        assert_eq!(
            board.ops().as_slice(),
            &[
                Op::Write(REV_C_CTRL, 0x05),
                Op::Write(REV_C_DATA, b'Z' as u32),
                Op::Write(REV_C_CTRL, 0x01),
            ]
        );
        assert_eq!(lcd.state().address, 1);
    }

    #[test]
    fn test_seek_second_line() {
        let config = BoardRevision::RevA.config().unwrap();
        let board = MockBoard::new();
        let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

        lcd.seek(0x40).unwrap();

        assert_eq!(board.writes_to(REV_A_CTRL).as_slice(), &[0xC0, 0x80]);
        assert_eq!(lcd.state().address, 0x40);
        assert_eq!(lcd.cursor_position(), Some(16));
    }

    #[test]
    fn test_seek_to() {
        let config = BoardRevision::RevA.config().unwrap();
        let board = MockBoard::new();
        let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

        lcd.seek_to(1, 3).unwrap();
        assert_eq!(board.writes_to(REV_A_CTRL).as_slice(), &[0xC3, 0x80]);

        assert_eq!(
            lcd.seek_to(2, 0),
            Err(HalError::InvalidPosition { row: 2, column: 0 })
        );
        assert_eq!(lcd.state().address, 0x43);
    }

    #[test]
    fn test_clear_and_home() {
        let config = BoardRevision::RevA.config().unwrap();
        let board = MockBoard::new();
        let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

        lcd.set_entry_mode(EntryMode::Decrement, false).unwrap();
        lcd.seek(0x05).unwrap();
        lcd.home().unwrap();
        assert_eq!(lcd.state().address, 0);
        assert_eq!(lcd.state().entry_mode, EntryMode::Decrement);

        lcd.seek(0x05).unwrap();
        lcd.clear().unwrap();
        assert_eq!(lcd.state().address, 0);
        assert_eq!(lcd.state().entry_mode, EntryMode::Increment);

        let cmds = commands(&decode(&board, LcdProtocol::Latch, REV_A_CTRL, REV_A_DATA));
        assert_eq!(cmds.as_slice(), &[0x04, 0x85, 0x02, 0x85, 0x01]);
    }

    #[test]
    fn test_decrement_moves_back() {
        let config = BoardRevision::RevA.config().unwrap();
        let board = MockBoard::new();
        let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

        lcd.seek(0x05).unwrap();
        lcd.set_entry_mode(EntryMode::Decrement, false).unwrap();
        lcd.write_char(b'a').unwrap();

        assert_eq!(lcd.state().address, 0x04);
    }

    #[test]
    fn test_set_display() {
        let config = BoardRevision::RevA.config().unwrap();
        let board = MockBoard::new();
        let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

        lcd.set_display(true, false, false).unwrap();

        assert_eq!(board.writes_to(REV_A_CTRL).as_slice(), &[0x0C, 0x80]);
        assert!(lcd.state().display_on);
        assert!(!lcd.state().cursor_visible);
    }

    #[test]
    fn test_char_waits() {
        let config = BoardRevision::RevA.config().unwrap();
        let board = MockBoard::new();
        let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

        lcd.write_string("Hello").unwrap();

        assert_eq!(board.writes_to(REV_A_DATA).len(), 5);
        assert_eq!(lcd.state().address, 5);
        assert_eq!(lcd.delay_mut().calls, 10);
    }

    #[test]
    fn test_short_string_does_not_shift() {
        let config = BoardRevision::RevA.config().unwrap();
        let board = MockBoard::new();
        let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

        lcd.write_string("exactly 16 chars").unwrap();

        assert!(board.writes_to(REV_A_CTRL).is_empty());
    }

    #[test]
    fn test_long_string_shifts_at_boundary() {
        let config = BoardRevision::RevA.config().unwrap();
        let board = MockBoard::new();
        let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

        lcd.write_string("Twenty characters!!!").unwrap();

        let events = decode(&board, LcdProtocol::Latch, REV_A_CTRL, REV_A_DATA);
        assert_eq!(events.len(), 22);
        assert_eq!(events[16], Event::Cmd(0x07));
        assert!(events[..16].iter().all(|e| matches!(e, Event::Char(_))));
        assert_eq!(events[21], Event::Cmd(0x06));
        assert!(!lcd.state().shift_enabled);
    }

    #[test]
    fn test_no_limit_no_shift() {
        let mut config = BoardRevision::RevC.config().unwrap();
        config.lcd.max_display_chars = None;
        let board = MockBoard::new();
        let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

        lcd.write_string("a string well past sixteen characters").unwrap();

        let events = decode(&board, LcdProtocol::Strobe, REV_C_CTRL, REV_C_DATA);
        assert!(commands(&events).is_empty());
    }

    proptest! {
        #[test]
        fn shift_enabled_once_at_boundary(len in 0usize..48, strobe_wired in any::<bool>()) {
            let (rev, protocol, ctrl, data) = if strobe_wired {
                (BoardRevision::RevC, LcdProtocol::Strobe, REV_C_CTRL, REV_C_DATA)
            } else {
                (BoardRevision::RevA, LcdProtocol::Latch, REV_A_CTRL, REV_A_DATA)
            };
            let config = rev.config().unwrap();
            let board = MockBoard::new();
            let mut lcd = LcdController::new(&config, &board, CountingDelay::new());

            let text = [b'x'; 48];
            lcd.write_bytes(&text[..len]).unwrap();

            let events = decode(&board, protocol, ctrl, data);
            let shifts: Vec<usize, 4> = events
                .iter()
                .enumerate()
                .filter(|(_, e)| **e == Event::Cmd(0x07))
                .map(|(i, _)| i)
                .collect();

            if len > 16 {
                prop_assert_eq!(shifts.as_slice(), &[16]);
                prop_assert_eq!(events.last(), Some(&Event::Cmd(0x06)));
            } else {
                prop_assert!(shifts.is_empty());
                prop_assert!(commands(&events).is_empty());
            }
        }
    }
}
