//! Devboard demo application
//!
//! [`DevBoard`] assembles every driver from one [`BoardConfig`] and a
//! shared register bus; [`demo`] holds the routines the board runs. Nothing
//! here knows which revision it is on: register addresses, LCD wiring and
//! timing all come from the configuration.
//!
//! ```ignore
//! let config = BoardRevision::RevC.config()?;
//! let bus = unsafe { MmioBus::new() };
//! let mut board = DevBoard::new(&config, bus, SpinDelay::default());
//! board.showcase("Hello World", "from Rust")?;
//! ```
//!
//! [`BoardConfig`]: devboard_core::config::BoardConfig

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod board;
pub mod demo;

pub use board::DevBoard;
pub use demo::EchoSummary;
