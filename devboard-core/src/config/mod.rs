//! Board configuration
//!
//! Per-revision data: register tables, LCD wiring, LED width and timing.
//! Built-in revisions live in [`revision`]; host tools can build the same
//! types from board files.

pub mod board;
pub mod revision;

pub use board::*;
pub use revision::*;
