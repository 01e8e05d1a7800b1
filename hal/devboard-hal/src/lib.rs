//! Devboard Hardware Abstraction Layer
//!
//! This crate defines the lowest layer of the devboard driver stack: how a
//! register is physically read or written, and how the drivers wait for the
//! hardware to settle. Everything above it (register maps, peripheral
//! drivers, demo applications) is written against these traits, so the same
//! driver code runs on the real board and against host-side test doubles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (devboard-app demos)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  devboard-drivers (LED, buttons, UART,  │
//! │  LCD)                                   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  devboard-core (register maps, board    │
//! │  revisions)                             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  devboard-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!         │                       │
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │   MmioBus     │       │ devboard-sim  │
//! │ (real board)  │       │   (host)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`bus::RegisterBus`] - Raw register access by address and width
//! - [`delay::DelayUnit`] - Uncalibrated settling delays
//! - [`uart::UartTx`], [`uart::UartRx`] - Blocking serial communication

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod delay;
pub mod mmio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use bus::{RegisterBus, Width};
pub use delay::{CountingDelay, DelayUnit, HalDelay, NoDelay, SpinDelay, WaitSpec};
pub use mmio::MmioBus;
pub use uart::{DataBits, Parity, StopBits, UartConfig, UartRx, UartTx};
