//! Push-button panel
//!
//! The button register is a plain bit vector with no debounce in hardware
//! and none here. One bit is reserved as an exit request for polling loops.

use devboard_core::config::BoardConfig;
use devboard_core::panel::{ButtonEdges, ButtonLayout, ButtonState, LedState};
use devboard_core::{HalError, RegisterName, RegisterWindow};
use devboard_hal::RegisterBus;

/// Button input register
pub struct GpioButtonPanel<'m, B> {
    window: RegisterWindow<'m, B>,
    layout: ButtonLayout,
}

impl<'m, B: RegisterBus> GpioButtonPanel<'m, B> {
    /// Create the button driver of a board
    pub fn new(config: &'m BoardConfig, bus: B) -> Self {
        Self {
            window: RegisterWindow::new(&config.map, bus),
            layout: config.buttons,
        }
    }

    /// Bit layout in use
    pub fn layout(&self) -> ButtonLayout {
        self.layout
    }

    /// Read the button register once
    pub fn poll(&mut self) -> Result<ButtonState, HalError> {
        let raw = self.window.read(RegisterName::ButtonStatus)?;
        Ok(ButtonState(raw as u16))
    }

    /// Whether a polling loop should keep going
    ///
    /// `false` exactly when the exit bit is set.
    pub fn should_continue(&self, state: ButtonState) -> bool {
        !state.is_set(self.layout.exit_bit)
    }

    /// LED pattern echoing the buttons
    ///
    /// Button `i` (counted from the layout's first bit) lights LED `i - 1`;
    /// every other input bit is dropped.
    pub fn led_mirror(&self, state: ButtonState) -> LedState {
        let buttons = state.bits() & self.layout.button_mask();
        LedState(buttons >> self.layout.first_bit)
    }

    /// Check whether button `index` (0-based) is held
    pub fn is_pressed(&self, state: ButtonState, index: u8) -> bool {
        index < self.layout.count && state.is_set(self.layout.first_bit + index)
    }

    /// Press/release view between two snapshots, restricted to buttons
    pub fn edges(&self, previous: ButtonState, current: ButtonState) -> ButtonEdges {
        let mask = self.layout.button_mask();
        ButtonEdges::between(
            ButtonState(previous.bits() & mask),
            ButtonState(current.bits() & mask),
        )
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.window.release()
    }
}
