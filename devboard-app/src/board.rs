//! One board's worth of drivers

use devboard_core::config::BoardConfig;
use devboard_core::{HalError, RegisterName, UartPort};
use devboard_drivers::{GpioButtonPanel, LcdController, LedPanel, UartDriver};
use devboard_hal::{DelayUnit, RegisterBus};
use heapless::Vec;

use crate::demo::{self, EchoSummary};

/// Every peripheral of a board, built from one configuration
///
/// The bus is copied into each driver, so it must be a cheap handle: the
/// MMIO bus itself or a shared reference to a simulated board. The delay
/// lives with the LCD, which needs it on every command, and is lent to the
/// LED animation.
pub struct DevBoard<'c, B, D> {
    config: &'c BoardConfig,
    leds: LedPanel<'c, B>,
    buttons: GpioButtonPanel<'c, B>,
    lcd: LcdController<'c, B, D>,
    uart: Option<UartDriver<'c, B>>,
}

impl<'c, B: RegisterBus + Copy, D: DelayUnit> DevBoard<'c, B, D> {
    /// Build the drivers without touching the hardware
    pub fn new(config: &'c BoardConfig, bus: B, delay: D) -> Self {
        let uart = config
            .map
            .contains(RegisterName::Uart0Data)
            .then(|| UartDriver::for_board(config, bus, UartPort::Uart0));
        Self {
            config,
            leds: LedPanel::new(config, bus),
            buttons: GpioButtonPanel::new(config, bus),
            lcd: LcdController::new(config, bus, delay),
            uart,
        }
    }

    /// Bring the board up: LED outputs, serial port and LCD
    pub fn start(&mut self) -> Result<(), HalError> {
        #[cfg(feature = "defmt")]
        defmt::info!("starting {}", self.config.name.as_str());

        self.leds.enable_outputs()?;
        if let Some(uart) = self.uart.as_mut() {
            uart.configure(self.config.uart)?;
        }
        self.lcd.init()
    }

    pub fn config(&self) -> &'c BoardConfig {
        self.config
    }

    pub fn leds(&mut self) -> &mut LedPanel<'c, B> {
        &mut self.leds
    }

    pub fn buttons(&mut self) -> &mut GpioButtonPanel<'c, B> {
        &mut self.buttons
    }

    pub fn lcd(&mut self) -> &mut LcdController<'c, B, D> {
        &mut self.lcd
    }

    /// The first serial port, if the board has one
    pub fn uart(&mut self) -> Option<&mut UartDriver<'c, B>> {
        self.uart.as_mut()
    }

    /// Show two lines of text
    pub fn intro(&mut self, first: &str, second: &str) -> Result<(), HalError> {
        demo::intro(&mut self.lcd, first, second)
    }

    /// Run the revision's LED animation
    pub fn led_animation(&mut self) -> Result<u32, HalError> {
        demo::led_animation(
            &mut self.leds,
            &self.config.animation,
            self.lcd.delay_mut(),
        )
    }

    /// Mirror buttons to LEDs until exit (or `max_polls` reads)
    pub fn button_echo(&mut self, max_polls: Option<u32>) -> Result<EchoSummary, HalError> {
        demo::button_echo(&mut self.buttons, &mut self.leds, max_polls)
    }

    /// Echo one line on the first serial port
    pub fn serial_echo<const N: usize>(&mut self) -> Result<Vec<u8, N>, HalError> {
        let uart = self
            .uart
            .as_mut()
            .ok_or(HalError::UnknownRegister(RegisterName::Uart0Data))?;
        demo::serial_echo::<N, B>(uart)
    }

    /// Startup demo: bring-up, intro text, one LED animation and a
    /// greeting on the serial port when there is one
    pub fn showcase(&mut self, first: &str, second: &str) -> Result<u32, HalError> {
        self.start()?;
        self.intro(first, second)?;
        let frames = self.led_animation()?;
        if let Some(uart) = self.uart.as_mut() {
            uart.send_string(first)?;
            uart.send_string("\r\n")?;
        }
        self.leds.clear()?;
        Ok(frames)
    }
}
