//! Host-side tools for the devboard
//!
//! - [`bin2js`]: byte dump to an array literal
//! - [`board_file`]: TOML board descriptions
//! - [`report`]: human-readable register maps
//! - [`simulate`]: the demo application on a simulated board

pub mod bin2js;
pub mod board_file;
pub mod report;
pub mod simulate;
