//! Typed register access by name
//!
//! A [`RegisterWindow`] pairs a board's [`RegisterMap`] with a
//! [`RegisterBus`]. It is the capability every driver holds: drivers can
//! only touch registers the active board revision actually maps, in the
//! directions the map allows.

use devboard_hal::RegisterBus;

use crate::error::HalError;
use crate::map::RegisterMap;
use crate::register::RegisterName;

/// Named register access through a register map
pub struct RegisterWindow<'m, B> {
    map: &'m RegisterMap,
    bus: B,
}

impl<'m, B: RegisterBus> RegisterWindow<'m, B> {
    /// Create a window over a bus
    pub fn new(map: &'m RegisterMap, bus: B) -> Self {
        Self { map, bus }
    }

    /// The register map this window resolves through
    pub fn map(&self) -> &'m RegisterMap {
        self.map
    }

    /// Check whether a register exists on this board
    pub fn has(&self, name: RegisterName) -> bool {
        self.map.contains(name)
    }

    /// Read a register
    pub fn read(&mut self, name: RegisterName) -> Result<u32, HalError> {
        let desc = self.map.descriptor(name)?;
        if !desc.access.readable() {
            return Err(HalError::AccessDenied(name));
        }
        let address = self.map.base() + desc.offset;
        Ok(self.bus.read(address, desc.width))
    }

    /// Write a register
    ///
    /// The value is handed to the bus verbatim; bits beyond the register
    /// width are dropped by the bus, not checked here.
    pub fn write(&mut self, name: RegisterName, value: u32) -> Result<(), HalError> {
        let desc = self.map.descriptor(name)?;
        if !desc.access.writable() {
            return Err(HalError::AccessDenied(name));
        }
        let address = self.map.base() + desc.offset;

        #[cfg(feature = "defmt")]
        defmt::trace!("{} <- {=u32:#x}", name, value);

        self.bus.write(address, desc.width, value);
        Ok(())
    }

    /// Read-modify-write a register
    pub fn modify<F>(&mut self, name: RegisterName, f: F) -> Result<(), HalError>
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(name)?;
        self.write(name, f(value))
    }

    /// Direct access to the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.bus
    }
}
