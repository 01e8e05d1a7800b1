//! LED bank driver
//!
//! The LEDs are either an 8-bit output latch or the low bits of a GPIO
//! port. In both cases a write of the pattern is the whole protocol; the
//! driver keeps an outgoing mirror since the latch cannot always be read.

use devboard_core::config::{AnimationSpec, BoardConfig};
use devboard_core::panel::LedState;
use devboard_core::{HalError, RegisterName, RegisterWindow};
use devboard_hal::{DelayUnit, RegisterBus};

/// LED bank
pub struct LedPanel<'m, B> {
    window: RegisterWindow<'m, B>,
    width: u8,
    state: LedState,
}

impl<'m, B: RegisterBus> LedPanel<'m, B> {
    /// Create the LED driver of a board
    pub fn new(config: &'m BoardConfig, bus: B) -> Self {
        Self {
            window: RegisterWindow::new(&config.map, bus),
            width: config.led_width,
            state: LedState::OFF,
        }
    }

    /// Number of LEDs
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Pattern last written
    pub fn state(&self) -> LedState {
        self.state
    }

    /// Configure the LED pins as outputs
    ///
    /// Only boards whose LEDs hang off a GPIO port have a direction
    /// register; on latch boards this does nothing.
    pub fn enable_outputs(&mut self) -> Result<(), HalError> {
        if !self.window.has(RegisterName::GpioDirection) {
            return Ok(());
        }
        let mask = self.mask();
        self.window
            .modify(RegisterName::GpioDirection, |dir| dir | mask as u32)
    }

    /// Write an LED pattern
    ///
    /// The mask goes to the register verbatim; bit `i` lights LED `i`.
    pub fn set(&mut self, mask: u16) -> Result<(), HalError> {
        self.window.write(RegisterName::LedStatus, mask as u32)?;
        self.state = LedState(mask);

        #[cfg(feature = "defmt")]
        defmt::trace!("leds: {=u16:#x}", mask);

        Ok(())
    }

    /// Switch every LED off
    pub fn clear(&mut self) -> Result<(), HalError> {
        self.set(0)
    }

    /// Play the walking-bit animation
    ///
    /// The right-shifting half starts at `spec.start_right` and shifts one
    /// bit per frame until it reaches zero; the left-shifting half does the
    /// same from `spec.start_left` in 8-bit arithmetic. Every frame is
    /// followed by `spec.frame_wait`. Returns the number of frames shown.
    pub fn animate<D: DelayUnit + ?Sized>(
        &mut self,
        spec: &AnimationSpec,
        delay: &mut D,
    ) -> Result<u32, HalError> {
        let mut frames = 0;

        let mut mask = spec.start_right;
        while mask != 0 {
            self.set(mask as u16)?;
            spec.frame_wait.apply(delay);
            frames += 1;
            mask >>= 1;
        }

        let mut mask = spec.start_left;
        while mask != 0 {
            self.set(mask as u16)?;
            spec.frame_wait.apply(delay);
            frames += 1;
            mask <<= 1;
        }

        Ok(frames)
    }

    fn mask(&self) -> u16 {
        if self.width >= 16 {
            u16::MAX
        } else {
            (1u16 << self.width) - 1
        }
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.window.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBoard;
    use devboard_core::BoardRevision;
    use devboard_hal::CountingDelay;
    use proptest::prelude::*;

    const REV_C_LED: u32 = 0xE001_C000;
    const REV_C_DIR: u32 = 0xE001_C004;

    #[test]
    fn test_set_writes_verbatim() {
        let config = BoardRevision::RevA.config().unwrap();
        let board = MockBoard::new();
        let mut leds = LedPanel::new(&config, &board);

        leds.set(0xA5).unwrap();

        assert_eq!(board.writes().as_slice(), &[(0x8000_0000, 0xA5)]);
        assert_eq!(leds.state(), LedState(0xA5));
    }

    #[test]
    fn test_animation_frames() {
        let config = BoardRevision::RevA.config().unwrap();
        let board = MockBoard::new();
        let mut leds = LedPanel::new(&config, &board);
        let mut delay = CountingDelay::new();

        let frames = leds.animate(&config.animation, &mut delay).unwrap();

        assert_eq!(frames, 16);
        assert_eq!(delay.calls, 80);
        assert_eq!(
            board.writes_to(0x8000_0000).as_slice(),
            &[
                0xFF, 0x7F, 0x3F, 0x1F, 0x0F, 0x07, 0x03, 0x01, 0x01, 0x02, 0x04, 0x08, 0x10,
                0x20, 0x40, 0x80
            ]
        );
    }

    #[test]
    fn test_animation_three_waits() {
        let config = BoardRevision::RevB.config().unwrap();
        let board = MockBoard::new();
        let mut leds = LedPanel::new(&config, &board);
        let mut delay = CountingDelay::new();

        leds.animate(&config.animation, &mut delay).unwrap();

        assert_eq!(delay.calls, 48);
    }

    #[test]
    fn test_enable_outputs_on_gpio_board() {
        let config = BoardRevision::RevC.config().unwrap();
        let board = MockBoard::new();
        let mut leds = LedPanel::new(&config, &board);

        leds.enable_outputs().unwrap();

        assert_eq!(leds.width(), 10);
        assert_eq!(board.writes_to(REV_C_DIR).as_slice(), &[0x3FF]);
    }

    #[test]
    fn test_enable_outputs_on_latch_board() {
        let config = BoardRevision::RevA.config().unwrap();
        let board = MockBoard::new();
        let mut leds = LedPanel::new(&config, &board);

        leds.enable_outputs().unwrap();

        assert!(board.ops().is_empty());
    }

    #[test]
    fn test_missing_led_register() {
        let map = devboard_core::RegisterMap::new(0, &[]).unwrap();
        let config = BoardConfig::new("bare", map);
        let board = MockBoard::new();
        let mut leds = LedPanel::new(&config, &board);

        assert_eq!(
            leds.set(1),
            Err(HalError::UnknownRegister(RegisterName::LedStatus))
        );
        assert_eq!(leds.state(), LedState::OFF);
    }

    proptest! {
        #[test]
        fn led_read_back(mask in 0u16..0x400) {
            let config = BoardRevision::RevC.config().unwrap();
            let board = MockBoard::new();
            let mut leds = LedPanel::new(&config, &board);

            leds.set(mask).unwrap();

            let mut window = RegisterWindow::new(&config.map, &board);
            prop_assert_eq!(window.read(RegisterName::LedStatus).unwrap(), mask as u32);
            let writes = board.writes_to(REV_C_LED);
            prop_assert_eq!(writes.as_slice(), &[mask as u32]);
            prop_assert_eq!(leds.state().bits(), mask);
        }
    }
}
