//! Memory-mapped register access for the real board
//!
//! This is the only place in the workspace that dereferences raw
//! addresses. Drivers never see pointers; they go through a register map
//! that hands validated addresses to a [`RegisterBus`].

#![allow(unsafe_code)]

use core::ptr::{read_volatile, write_volatile};

use crate::bus::{RegisterBus, Width};

/// Volatile memory-mapped register bus
///
/// The handle is zero-sized and `Copy`, so every peripheral driver can own
/// one. Ownership of the peripherals themselves is a board-level concern:
/// create one driver per peripheral for the lifetime of the program.
#[derive(Debug, Clone, Copy)]
pub struct MmioBus {
    _private: (),
}

impl MmioBus {
    /// Create a bus handle for the memory-mapped peripheral space
    ///
    /// # Safety
    ///
    /// Every address later passed to [`RegisterBus::read`] or
    /// [`RegisterBus::write`] must be a valid, suitably aligned device
    /// register for the requested width on the running board. The register
    /// map from `devboard-core` guarantees this as long as the selected
    /// board revision matches the hardware.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for MmioBus {
    fn read(&mut self, address: u32, width: Width) -> u32 {
        let addr = address as usize;
        // SAFETY: address validity is the contract of `MmioBus::new`.
        unsafe {
            match width {
                Width::Byte => read_volatile(addr as *const u8) as u32,
                Width::Half => read_volatile(addr as *const u16) as u32,
                Width::Word => read_volatile(addr as *const u32),
            }
        }
    }

    fn write(&mut self, address: u32, width: Width, value: u32) {
        let addr = address as usize;
        // SAFETY: address validity is the contract of `MmioBus::new`.
        unsafe {
            match width {
                Width::Byte => write_volatile(addr as *mut u8, value as u8),
                Width::Half => write_volatile(addr as *mut u16, value as u16),
                Width::Word => write_volatile(addr as *mut u32, value),
            }
        }
    }
}
