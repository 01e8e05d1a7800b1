//! Simulated devboard
//!
//! [`SimBoard`] implements [`RegisterBus`](devboard_hal::RegisterBus) for
//! `&SimBoard`, decoding every access through the board's register map
//! and dispatching it to a device model:
//!
//! - LED latch or GPIO port 0, with a history of every pattern shown
//! - Button register, fed by tests or scripts
//! - [`Hd44780`] character LCD in latch or strobe wiring
//! - Two [`Uart16550`] serial ports with captured output and queued input
//!
//! Several boards can live in one process; nothing is global.

pub mod board;
pub mod lcd;
pub mod uart;

pub use board::{BusAccess, SimBoard};
pub use lcd::Hd44780;
pub use uart::Uart16550;
