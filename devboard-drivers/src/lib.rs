//! Peripheral drivers for the devboard
//!
//! Every driver is written once against [`RegisterWindow`] and a
//! [`BoardConfig`], so one implementation serves all board revisions:
//!
//! - [`LedPanel`] - LED latch or GPIO-port LEDs
//! - [`GpioButtonPanel`] - push-button register
//! - [`UartDriver`] - 16550-class UART, polled
//! - [`LcdController`] - HD44780-class character LCD, latch or strobe wiring
//!
//! Drivers share the bus by value, so the bus must be `Copy` (like
//! [`MmioBus`](devboard_hal::MmioBus)) or a shared reference to a device
//! with interior mutability.
//!
//! [`RegisterWindow`]: devboard_core::RegisterWindow
//! [`BoardConfig`]: devboard_core::BoardConfig

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod button;
pub mod lcd;
pub mod led;
pub mod uart;

#[cfg(test)]
pub(crate) mod mock;

pub use button::GpioButtonPanel;
pub use lcd::LcdController;
pub use led::LedPanel;
pub use uart::{BoundedUart, UartDriver};
