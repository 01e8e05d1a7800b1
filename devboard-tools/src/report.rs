//! Text rendering of board configurations

use std::fmt::Write;

use devboard_core::config::BoardConfig;
use devboard_core::lcd::LcdProtocol;
use devboard_core::{Access, BoardRevision};
use devboard_hal::Width;

fn width_name(width: Width) -> &'static str {
    match width {
        Width::Byte => "byte",
        Width::Half => "half",
        Width::Word => "word",
    }
}

fn access_name(access: Access) -> &'static str {
    match access {
        Access::Read => "read",
        Access::Write => "write",
        Access::ReadWrite => "read_write",
    }
}

/// Register table of a board, sorted by address
pub fn map_table(config: &BoardConfig) -> String {
    let map = &config.map;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (base {:#010x}, {} registers)",
        config.name,
        map.base(),
        map.len()
    );

    let mut rows: Vec<_> = map.iter().collect();
    rows.sort_by_key(|d| d.offset);
    for desc in rows {
        let _ = writeln!(
            out,
            "  {:<24} {:#010x}  {:<5} {}",
            desc.name.as_str(),
            map.base().wrapping_add(desc.offset),
            width_name(desc.width),
            access_name(desc.access)
        );
    }
    out
}

/// One-paragraph summary of everything but the register table
pub fn summary(config: &BoardConfig) -> String {
    let lcd = &config.lcd;
    let protocol = match lcd.protocol {
        LcdProtocol::Latch => "latch",
        LcdProtocol::Strobe => "strobe",
    };
    let scroll = match lcd.max_display_chars {
        Some(n) => format!("scroll after {}", n),
        None => String::from("no scroll"),
    };
    format!(
        "{}: {} LEDs, exit button bit {}, LCD {}x{} {} ({}), UART {} baud",
        config.name,
        config.led_width,
        config.buttons.exit_bit,
        lcd.geometry.columns,
        lcd.geometry.lines,
        protocol,
        scroll,
        config.uart.baud_rate()
    )
}

/// Built-in revisions, one per line
pub fn revision_list() -> String {
    let mut out = String::new();
    for rev in BoardRevision::ALL {
        match rev.config() {
            Ok(config) => {
                let _ = writeln!(out, "{}", summary(&config));
            }
            Err(e) => {
                let _ = writeln!(out, "{}: invalid register table ({})", rev, e);
            }
        }
    }
    out
}
