//! Demo routines
//!
//! Each routine drives one or two peripherals through their drivers and
//! nothing else, so they run unchanged on the real board and on the
//! simulator.

use devboard_core::config::AnimationSpec;
use devboard_core::lcd::LINE2_ADDRESS;
use devboard_core::HalError;
use devboard_drivers::{GpioButtonPanel, LcdController, LedPanel, UartDriver};
use devboard_hal::{DelayUnit, RegisterBus};
use heapless::Vec;

/// Outcome of a button echo session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EchoSummary {
    /// Button register reads performed
    pub polls: u32,
    /// Whether the exit button ended the session
    pub exited: bool,
}

/// Initialise the LCD and show two lines of text
pub fn intro<B: RegisterBus, D: DelayUnit>(
    lcd: &mut LcdController<'_, B, D>,
    first: &str,
    second: &str,
) -> Result<(), HalError> {
    lcd.init()?;
    lcd.write_string(first)?;
    lcd.seek(LINE2_ADDRESS)?;
    lcd.write_string(second)
}

/// Run one walking-bit animation, returning the number of frames shown
pub fn led_animation<B: RegisterBus, D: DelayUnit + ?Sized>(
    leds: &mut LedPanel<'_, B>,
    spec: &AnimationSpec,
    delay: &mut D,
) -> Result<u32, HalError> {
    let frames = leds.animate(spec, delay)?;

    #[cfg(feature = "defmt")]
    defmt::debug!("animation done after {=u32} frames", frames);

    Ok(frames)
}

/// Mirror the buttons onto the LEDs until the exit button is pressed
///
/// With `max_polls` set the session also ends after that many reads, which
/// keeps host runs finite when nobody presses exit.
pub fn button_echo<B: RegisterBus, L: RegisterBus>(
    buttons: &mut GpioButtonPanel<'_, B>,
    leds: &mut LedPanel<'_, L>,
    max_polls: Option<u32>,
) -> Result<EchoSummary, HalError> {
    let mut polls = 0;
    loop {
        if max_polls.is_some_and(|limit| polls >= limit) {
            return Ok(EchoSummary {
                polls,
                exited: false,
            });
        }

        let state = buttons.poll()?;
        polls += 1;
        if !buttons.should_continue(state) {
            #[cfg(feature = "defmt")]
            defmt::info!("exit button after {=u32} polls", polls);

            return Ok(EchoSummary {
                polls,
                exited: true,
            });
        }

        leds.set(buttons.led_mirror(state).bits())?;
    }
}

/// Receive one line and send it back unchanged
///
/// Returns the echoed line, terminator included.
pub fn serial_echo<const N: usize, B: RegisterBus>(
    uart: &mut UartDriver<'_, B>,
) -> Result<Vec<u8, N>, HalError> {
    let line = uart.receive_line::<N>()?;
    uart.send_bytes(&line)?;

    #[cfg(feature = "defmt")]
    defmt::trace!("echoed {=usize} bytes", line.len());

    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use devboard_core::{BoardRevision, UartPort};
    use devboard_hal::{CountingDelay, NoDelay, UartConfig};
    use devboard_sim::SimBoard;

    fn sim(rev: BoardRevision) -> SimBoard {
        SimBoard::new(rev.config().unwrap())
    }

    #[test]
    fn test_intro_latch() {
        let board = sim(BoardRevision::RevA);
        let config = board.config().clone();
        let mut lcd = LcdController::new(&config, &board, NoDelay);

        intro(&mut lcd, "Hello World", "Second Line").unwrap();

        let model = board.lcd();
        assert_eq!(model.visible_line(0).trim_end(), "Hello World");
        assert_eq!(model.visible_line(1).trim_end(), "Second Line");
        assert_eq!(&model.instructions()[..4], &[0x01, 0x3C, 0x0F, 0x06]);
        assert_eq!(model.instructions()[4], 0xC0);
    }

    #[test]
    fn test_intro_strobe() {
        let board = sim(BoardRevision::RevD);
        let config = board.config().clone();
        let mut lcd = LcdController::new(&config, &board, NoDelay);

        intro(&mut lcd, "Hello World", "Second Line").unwrap();

        let model = board.lcd();
        assert_eq!(model.visible_line(0).trim_end(), "Hello World");
        assert_eq!(model.visible_line(1).trim_end(), "Second Line");
        assert!(!model.blink_on());
    }

    #[test]
    fn test_led_animation_counts() {
        let board = sim(BoardRevision::RevA);
        let config = board.config().clone();
        let mut leds = LedPanel::new(&config, &board);
        let mut delay = CountingDelay::new();

        let frames = led_animation(&mut leds, &config.animation, &mut delay).unwrap();

        assert_eq!(frames, 16);
        assert_eq!(delay.calls, 80);
        assert_eq!(
            board.led_history(),
            vec![
                0xFF, 0x7F, 0x3F, 0x1F, 0x0F, 0x07, 0x03, 0x01, 0x01, 0x02, 0x04, 0x08, 0x10,
                0x20, 0x40, 0x80
            ]
        );
    }

    #[test]
    fn test_button_echo_until_exit() {
        let board = sim(BoardRevision::RevA);
        let config = board.config().clone();
        let mut buttons = GpioButtonPanel::new(&config, &board);
        let mut leds = LedPanel::new(&config, &board);
        board.script_buttons(&[0x0002, 0x0006, 0x0000, 0x0202]);

        let summary = button_echo(&mut buttons, &mut leds, None).unwrap();

        assert_eq!(
            summary,
            EchoSummary {
                polls: 4,
                exited: true
            }
        );
        // The exit poll does not touch the LEDs
        assert_eq!(board.led_history(), vec![0x01, 0x03, 0x00]);
    }

    #[test]
    fn test_button_echo_poll_limit() {
        let board = sim(BoardRevision::RevC);
        let config = board.config().clone();
        let mut buttons = GpioButtonPanel::new(&config, &board);
        let mut leds = LedPanel::new(&config, &board);
        board.set_buttons(0x0010);

        let summary = button_echo(&mut buttons, &mut leds, Some(5)).unwrap();

        assert_eq!(summary.polls, 5);
        assert!(!summary.exited);
        assert_eq!(board.leds(), 0x08);
    }

    #[test]
    fn test_button_echo_zero_budget() {
        let board = sim(BoardRevision::RevA);
        let config = board.config().clone();
        let mut buttons = GpioButtonPanel::new(&config, &board);
        let mut leds = LedPanel::new(&config, &board);

        let summary = button_echo(&mut buttons, &mut leds, Some(0)).unwrap();

        assert_eq!(summary.polls, 0);
        assert!(board.log().is_empty());
    }

    #[test]
    fn test_serial_echo() {
        let board = sim(BoardRevision::RevB);
        let config = board.config().clone();
        let mut uart = UartDriver::for_board(&config, &board, UartPort::Uart0);
        uart.configure(UartConfig::default()).unwrap();
        board.send_to_uart(UartPort::Uart0, b"ping\n");

        let line = serial_echo::<16, _>(&mut uart).unwrap();

        assert_eq!(line.as_slice(), b"ping\n");
        assert_eq!(board.take_uart_output(UartPort::Uart0), b"ping\n");
    }

    #[test]
    fn test_serial_echo_line_too_long() {
        let board = sim(BoardRevision::RevB);
        let config = board.config().clone();
        let mut uart = UartDriver::for_board(&config, &board, UartPort::Uart0);
        uart.configure(UartConfig::default()).unwrap();
        board.send_to_uart(UartPort::Uart0, b"abcdefgh\n");

        assert_eq!(serial_echo::<4, _>(&mut uart), Err(HalError::Unbounded));
        assert!(board.take_uart_output(UartPort::Uart0).is_empty());
    }
}
