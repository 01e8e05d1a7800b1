//! Register-level byte transfer
//!
//! # Latch wiring
//!
//! The instruction byte is written to the control register and executed
//! by writing [`LATCH_EXECUTE`] to the same register. Characters go
//! straight to the data register.
//!
//! # Strobe wiring
//!
//! The control register drives the RS, RW and E lines. A byte on the data
//! register is taken by the controller on the falling edge of E:
//!
//! | Transfer    | control  | data | control |
//! |-------------|----------|------|---------|
//! | instruction | `E`      | byte | `0`     |
//! | character   | `E\|RS`  | byte | `RS`    |

use devboard_core::lcd::{strobe, LcdProtocol, LATCH_EXECUTE};
use devboard_core::{HalError, RegisterName, RegisterWindow};
use devboard_hal::RegisterBus;

/// What a byte means to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transfer {
    /// Instruction register
    Instruction,
    /// Character for display RAM
    Data,
}

/// Hand one byte to the controller
pub fn transfer<B: RegisterBus>(
    window: &mut RegisterWindow<'_, B>,
    protocol: LcdProtocol,
    kind: Transfer,
    byte: u8,
) -> Result<(), HalError> {
    let byte = byte as u32;
    match (protocol, kind) {
        (LcdProtocol::Latch, Transfer::Instruction) => {
            window.write(RegisterName::LcdControl, byte)?;
            window.write(RegisterName::LcdControl, LATCH_EXECUTE as u32)
        }
        (LcdProtocol::Latch, Transfer::Data) => window.write(RegisterName::LcdData, byte),
        (LcdProtocol::Strobe, Transfer::Instruction) => {
            window.write(RegisterName::LcdControl, strobe::E as u32)?;
            window.write(RegisterName::LcdData, byte)?;
            window.write(RegisterName::LcdControl, 0)
        }
        (LcdProtocol::Strobe, Transfer::Data) => {
            window.write(RegisterName::LcdControl, (strobe::E | strobe::RS) as u32)?;
            window.write(RegisterName::LcdData, byte)?;
            window.write(RegisterName::LcdControl, strobe::RS as u32)
        }
    }
}
