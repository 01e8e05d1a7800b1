//! HD44780-class character LCD
//!
//! One controller driver serves both wiring conventions found on the
//! boards; [`protocol`] turns a byte into register writes, [`controller`]
//! implements the logical operations and the shadow state on top.
//!
//! The controller is write-only from the driver's point of view. No
//! operation reads anything back, so a missing or dead display cannot be
//! detected.

pub mod controller;
pub mod protocol;

pub use controller::LcdController;
pub use protocol::Transfer;
