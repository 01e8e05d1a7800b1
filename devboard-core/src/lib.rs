//! Board-agnostic core of the devboard HAL
//!
//! This crate holds everything that describes a board without touching it:
//!
//! - Register names, descriptors and validated register maps
//! - The [`RegisterWindow`] capability drivers use for named access
//! - Built-in board revisions and their configuration
//! - The LCD, LED and button data model shared by drivers and tools
//! - Error types

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod lcd;
pub mod map;
pub mod panel;
pub mod register;
pub mod window;

pub use config::{BoardConfig, BoardRevision};
pub use error::{HalError, MapError};
pub use map::RegisterMap;
pub use register::{Access, RegisterDescriptor, RegisterName, UartPort, UartRegister};
pub use window::RegisterWindow;
