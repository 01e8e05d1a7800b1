//! Register bus abstraction
//!
//! A register bus moves 8, 16 or 32 bit quantities to and from absolute
//! addresses. It knows nothing about register names; that is the job of
//! the register map in `devboard-core`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Access width of a single register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Width {
    /// 8-bit register
    #[default]
    Byte,
    /// 16-bit register
    Half,
    /// 32-bit register
    Word,
}

impl Width {
    /// Size of the register in bytes
    pub const fn bytes(self) -> u32 {
        match self {
            Width::Byte => 1,
            Width::Half => 2,
            Width::Word => 4,
        }
    }

    /// Mask of the bits a register of this width can hold
    pub const fn mask(self) -> u32 {
        match self {
            Width::Byte => 0xFF,
            Width::Half => 0xFFFF,
            Width::Word => 0xFFFF_FFFF,
        }
    }

    /// Truncate a value to this width
    pub const fn truncate(self, value: u32) -> u32 {
        value & self.mask()
    }
}

/// Raw register access
///
/// Implementations must perform exactly one bus transaction per call and
/// must not cache, merge or reorder accesses: the peripherals behind the bus
/// react to every individual write (strobe lines, FIFO pops on read).
pub trait RegisterBus {
    /// Read a register at an absolute address
    fn read(&mut self, address: u32, width: Width) -> u32;

    /// Write a register at an absolute address
    ///
    /// Bits above `width` are discarded.
    fn write(&mut self, address: u32, width: Width, value: u32);
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    fn read(&mut self, address: u32, width: Width) -> u32 {
        (**self).read(address, width)
    }

    fn write(&mut self, address: u32, width: Width, value: u32) {
        (**self).write(address, width, value)
    }
}
