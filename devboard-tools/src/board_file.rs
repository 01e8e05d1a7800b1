//! TOML board descriptions
//!
//! A board file describes a board the built-in revision tables do not
//! cover:
//!
//! ```toml
//! name = "custom"
//! base = 0xE0000000
//! led_width = 10
//! exit_bit = 9
//! animation_waits = 5
//!
//! [lcd]
//! protocol = "strobe"
//! columns = 16
//! lines = 2
//! max_display_chars = 16
//!
//! [[registers]]
//! name = "led_status"
//! offset = 0x1C000
//! width = "word"
//! access = "write"
//! ```
//!
//! Everything but `name`, `base` and the register list is optional and
//! falls back to the defaults of the chosen LCD protocol.

use std::path::Path;

use anyhow::{bail, Context, Result};
use devboard_core::config::{AnimationSpec, BoardConfig, LcdConfig, MAX_LABEL_LEN};
use devboard_core::lcd::LcdProtocol;
use devboard_core::{RegisterDescriptor, RegisterMap};
use devboard_hal::UartConfig;
use serde::Deserialize;
use tracing::{debug, warn};

fn default_led_width() -> u8 {
    8
}

/// Top level of a board file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardFile {
    pub name: String,
    pub base: u32,
    #[serde(default = "default_led_width")]
    pub led_width: u8,
    /// Button bit that ends polling loops
    #[serde(default)]
    pub exit_bit: Option<u8>,
    /// Delay calls between animation frames
    #[serde(default)]
    pub animation_waits: Option<u8>,
    /// Delay units per animation wait call
    #[serde(default)]
    pub animation_units: Option<u32>,
    /// Baud rate of the serial ports
    #[serde(default)]
    pub baud_rate: Option<u32>,
    #[serde(default)]
    pub lcd: Option<LcdSection>,
    #[serde(default)]
    pub registers: Vec<RegisterDescriptor>,
}

/// `[lcd]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LcdSection {
    pub protocol: LcdProtocol,
    #[serde(default)]
    pub columns: Option<u8>,
    #[serde(default)]
    pub lines: Option<u8>,
    /// Scroll threshold; 0 disables scrolling
    #[serde(default)]
    pub max_display_chars: Option<u8>,
}

impl BoardFile {
    /// Parse a board file from its text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse board file")
    }

    /// Validate and turn into a board configuration
    pub fn into_config(self) -> Result<BoardConfig> {
        if !(1..=16).contains(&self.led_width) {
            bail!("led_width must be between 1 and 16, got {}", self.led_width);
        }
        if self.name.chars().count() > MAX_LABEL_LEN {
            warn!(
                "board name '{}' truncated to {} characters",
                self.name, MAX_LABEL_LEN
            );
        }

        let map = RegisterMap::new(self.base, &self.registers)
            .with_context(|| format!("Invalid register table for board '{}'", self.name))?;
        let mut config = BoardConfig::new(&self.name, map);
        config.led_width = self.led_width;

        if let Some(exit_bit) = self.exit_bit {
            if exit_bit >= 16 {
                bail!("exit_bit must be below 16, got {}", exit_bit);
            }
            config.buttons.exit_bit = exit_bit;
        }

        if let Some(lcd) = self.lcd {
            config.lcd = lcd.into_config()?;
        }

        if self.animation_waits.is_some() || self.animation_units.is_some() {
            let defaults = config.animation.frame_wait;
            config.animation = AnimationSpec::with_waits(
                self.animation_waits.unwrap_or(defaults.calls),
                self.animation_units.unwrap_or(defaults.units),
            );
        }

        if let Some(baud) = self.baud_rate {
            config.uart = UartConfig::with_baud_rate(baud)
                .with_context(|| format!("Baud rate {} is out of range", baud))?;
        }

        debug!(
            "board '{}': {} registers at {:#010x}",
            config.name,
            config.map.len(),
            config.map.base()
        );
        Ok(config)
    }
}

impl LcdSection {
    fn into_config(self) -> Result<LcdConfig> {
        let mut lcd = LcdConfig::for_protocol(self.protocol);
        if let Some(columns) = self.columns {
            if columns == 0 || columns > 40 {
                bail!("lcd.columns must be between 1 and 40, got {}", columns);
            }
            lcd.geometry.columns = columns;
        }
        if let Some(lines) = self.lines {
            if !matches!(lines, 1 | 2 | 4) {
                bail!("lcd.lines must be 1, 2 or 4, got {}", lines);
            }
            lcd.geometry.lines = lines;
        }
        if let Some(max) = self.max_display_chars {
            lcd.max_display_chars = (max > 0).then_some(max);
        }
        Ok(lcd)
    }
}

/// Read and validate a board file
pub fn load(path: &Path) -> Result<BoardConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read board file {:?}", path))?;
    BoardFile::parse(&text)
        .and_then(BoardFile::into_config)
        .with_context(|| format!("Invalid board file {:?}", path))
}
