//! Error types shared by the register layer and the drivers

use core::fmt;

use crate::register::RegisterName;

/// Errors surfaced by register access and peripheral drivers
///
/// Hardware-protocol operations (LED writes, LCD commands) have no
/// acknowledgement channel on this board, so the only failures are
/// addressing, sequencing and buffer bounds. `Timeout` is produced only by
/// the bounded UART wrapper; the reference drivers wait forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// Register has no entry in the active board revision's map
    UnknownRegister(RegisterName),
    /// Register exists but not in the requested direction
    AccessDenied(RegisterName),
    /// UART used before `configure`
    NotConfigured,
    /// Fixed-size receive buffer would overflow
    Unbounded,
    /// Poll budget exhausted while waiting for a status bit
    Timeout,
    /// LCD cell outside the configured geometry
    InvalidPosition { row: u8, column: u8 },
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalError::UnknownRegister(name) => {
                write!(f, "register `{}` is not mapped on this board", name)
            }
            HalError::AccessDenied(name) => {
                write!(f, "register `{}` does not permit this access", name)
            }
            HalError::NotConfigured => f.write_str("UART used before configure"),
            HalError::Unbounded => f.write_str("receive buffer full before end of line"),
            HalError::Timeout => f.write_str("timed out waiting for device status"),
            HalError::InvalidPosition { row, column } => {
                write!(f, "no display cell at row {}, column {}", row, column)
            }
        }
    }
}

impl core::error::Error for HalError {}

impl embedded_io::Error for HalError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            HalError::UnknownRegister(_) | HalError::AccessDenied(_) => {
                embedded_io::ErrorKind::Unsupported
            }
            HalError::NotConfigured => embedded_io::ErrorKind::NotConnected,
            HalError::Unbounded => embedded_io::ErrorKind::OutOfMemory,
            HalError::Timeout => embedded_io::ErrorKind::TimedOut,
            HalError::InvalidPosition { .. } => embedded_io::ErrorKind::InvalidInput,
        }
    }
}

/// Errors raised while building a register map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MapError {
    /// The same register name appears twice
    DuplicateRegister(RegisterName),
    /// Two registers share at least one byte
    Overlap(RegisterName, RegisterName),
    /// More registers than a map can hold
    TooManyRegisters,
    /// `base + offset` does not fit the 32-bit address space
    AddressOverflow(RegisterName),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::DuplicateRegister(name) => write!(f, "register `{}` defined twice", name),
            MapError::Overlap(a, b) => write!(f, "registers `{}` and `{}` overlap", a, b),
            MapError::TooManyRegisters => f.write_str("too many registers in map"),
            MapError::AddressOverflow(name) => {
                write!(f, "register `{}` lies outside the address space", name)
            }
        }
    }
}

impl core::error::Error for MapError {}
