//! Register maps
//!
//! A register map is the single source of addressing truth for one board
//! revision: a base address plus a validated table of register
//! descriptors. It is immutable once built.

use heapless::Vec;

use crate::error::{HalError, MapError};
use crate::register::{RegisterDescriptor, RegisterName};

/// Maximum registers per map (one slot for every [`RegisterName`])
pub const MAX_REGISTERS: usize = RegisterName::ALL.len();

/// Validated register table of one board revision
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    base: u32,
    registers: Vec<RegisterDescriptor, MAX_REGISTERS>,
}

impl RegisterMap {
    /// Build a map from a base address and a descriptor table
    ///
    /// Rejects duplicate names, overlapping byte ranges and registers that
    /// would land outside the 32-bit address space.
    pub fn new(base: u32, descriptors: &[RegisterDescriptor]) -> Result<Self, MapError> {
        let mut registers: Vec<RegisterDescriptor, MAX_REGISTERS> = Vec::new();

        for desc in descriptors {
            let last_byte = base
                .checked_add(desc.offset)
                .and_then(|addr| addr.checked_add(desc.width.bytes() - 1));
            if last_byte.is_none() || desc.offset.checked_add(desc.width.bytes()).is_none() {
                return Err(MapError::AddressOverflow(desc.name));
            }
            for existing in registers.iter() {
                if existing.name == desc.name {
                    return Err(MapError::DuplicateRegister(desc.name));
                }
                if existing.overlaps(desc) {
                    return Err(MapError::Overlap(existing.name, desc.name));
                }
            }
            registers
                .push(*desc)
                .map_err(|_| MapError::TooManyRegisters)?;
        }

        Ok(Self { base, registers })
    }

    /// Build a map from several descriptor tables (one per peripheral block)
    pub fn from_parts(base: u32, parts: &[&[RegisterDescriptor]]) -> Result<Self, MapError> {
        let mut all: Vec<RegisterDescriptor, MAX_REGISTERS> = Vec::new();
        for desc in parts.iter().flat_map(|part| part.iter()) {
            all.push(*desc).map_err(|_| MapError::TooManyRegisters)?;
        }
        Self::new(base, &all)
    }

    /// Peripheral base address
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Look up the descriptor of a register
    pub fn descriptor(&self, name: RegisterName) -> Result<&RegisterDescriptor, HalError> {
        self.registers
            .iter()
            .find(|d| d.name == name)
            .ok_or(HalError::UnknownRegister(name))
    }

    /// Resolve a register name to its absolute address
    pub fn resolve(&self, name: RegisterName) -> Result<u32, HalError> {
        // Overflow was ruled out in `new`
        self.descriptor(name).map(|d| self.base + d.offset)
    }

    /// Check whether a register exists on this board
    pub fn contains(&self, name: RegisterName) -> bool {
        self.registers.iter().any(|d| d.name == name)
    }

    /// Iterate over all descriptors in table order
    pub fn iter(&self) -> impl Iterator<Item = &RegisterDescriptor> {
        self.registers.iter()
    }

    /// Number of registers in the map
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// Check whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}
