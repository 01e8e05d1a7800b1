//! Built-in board revisions
//!
//! Five incompatible memory layouts have shipped. Each is described here
//! as plain descriptor tables; nothing outside this module knows where a
//! register lives.
//!
//! | Revision | Base          | LCD    | LEDs | UARTs          | Frame waits |
//! |----------|---------------|--------|------|----------------|-------------|
//! | A        | `0x8000_0000` | latch  | 8    | -              | 5           |
//! | B        | `0x8000_0000` | latch  | 8    | word-spaced    | 3           |
//! | C        | `0xE000_0000` | strobe | 10   | word-spaced    | 5           |
//! | D        | `0x4000_0000` | strobe | 10   | byte-spaced    | 3           |
//! | E        | `0xE000_0000` | latch  | 10   | word-spaced    | 5           |

use core::fmt;
use core::str::FromStr;

use devboard_hal::{WaitSpec, Width};

use super::board::{AnimationSpec, BoardConfig, LcdConfig};
use crate::error::MapError;
use crate::map::RegisterMap;
use crate::register::{Access, RegisterDescriptor, RegisterName, UartPort, UartRegister};

const fn reg(name: RegisterName, offset: u32, width: Width, access: Access) -> RegisterDescriptor {
    RegisterDescriptor::new(name, offset, width, access)
}

/// The eight registers of one 16550-class UART
const fn uart_block(port: UartPort, first: u32, stride: u32) -> [RegisterDescriptor; 8] {
    const fn at(port: UartPort, r: UartRegister, offset: u32, access: Access) -> RegisterDescriptor {
        RegisterDescriptor::new(RegisterName::uart(port, r), offset, Width::Byte, access)
    }
    [
        at(port, UartRegister::Data, first, Access::ReadWrite),
        at(port, UartRegister::InterruptEnable, first + stride, Access::ReadWrite),
        at(port, UartRegister::FifoControl, first + 2 * stride, Access::ReadWrite),
        at(port, UartRegister::LineControl, first + 3 * stride, Access::ReadWrite),
        at(port, UartRegister::ModemControl, first + 4 * stride, Access::ReadWrite),
        at(port, UartRegister::LineStatus, first + 5 * stride, Access::Read),
        at(port, UartRegister::ModemStatus, first + 6 * stride, Access::Read),
        at(port, UartRegister::Scratch, first + 7 * stride, Access::ReadWrite),
    ]
}

use RegisterName::*;

// Revision A: LED latch at the base, latch-wired LCD, no serial ports.
const REV_A: [RegisterDescriptor; 5] = [
    reg(LedStatus, 0x00, Width::Byte, Access::Write),
    reg(LcdControl, 0x04, Width::Byte, Access::Write),
    reg(LcdData, 0x08, Width::Byte, Access::Write),
    reg(ButtonStatus, 0x0C, Width::Half, Access::Read),
    reg(PowerControl, 0x10, Width::Word, Access::ReadWrite),
];

// Revision B: LCD moved up to make room, two UARTs added.
const REV_B: [RegisterDescriptor; 5] = [
    reg(LedStatus, 0x00, Width::Byte, Access::Write),
    reg(ButtonStatus, 0x0C, Width::Half, Access::Read),
    reg(PowerControl, 0x10, Width::Word, Access::ReadWrite),
    reg(LcdControl, 0x20, Width::Byte, Access::Write),
    reg(LcdData, 0x24, Width::Byte, Access::Write),
];
const REV_B_UART0: [RegisterDescriptor; 8] = uart_block(UartPort::Uart0, 0x100, 4);
const REV_B_UART1: [RegisterDescriptor; 8] = uart_block(UartPort::Uart1, 0x200, 4);

// Revision C: one 16 KiB window per device; LEDs on GPIO port 0, buttons
// on port 1.
const REV_C: [RegisterDescriptor; 11] = [
    reg(LcdControl, 0x8000, Width::Byte, Access::ReadWrite),
    reg(LcdData, 0x8004, Width::Byte, Access::ReadWrite),
    reg(InterruptMask, 0x1_0000, Width::Word, Access::ReadWrite),
    reg(Timer0, 0x1_4000, Width::Word, Access::ReadWrite),
    reg(Timer1, 0x1_8000, Width::Word, Access::ReadWrite),
    reg(LedStatus, 0x1_C000, Width::Word, Access::ReadWrite),
    reg(GpioDirection, 0x1_C004, Width::Word, Access::ReadWrite),
    reg(GpioSet, 0x1_C008, Width::Word, Access::Write),
    reg(GpioClear, 0x1_C00C, Width::Word, Access::Write),
    reg(ButtonStatus, 0x1_C010, Width::Word, Access::Read),
    reg(PowerControl, 0x2_4000, Width::Word, Access::ReadWrite),
];
const REV_C_UART0: [RegisterDescriptor; 8] = uart_block(UartPort::Uart0, 0x0000, 4);
const REV_C_UART1: [RegisterDescriptor; 8] = uart_block(UartPort::Uart1, 0x4000, 4);

// Revision D: compact byte-packed map.
const REV_D: [RegisterDescriptor; 6] = [
    reg(LedStatus, 0x10, Width::Half, Access::Write),
    reg(ButtonStatus, 0x12, Width::Half, Access::Read),
    reg(LcdControl, 0x14, Width::Byte, Access::Write),
    reg(LcdData, 0x15, Width::Byte, Access::Write),
    reg(GpioDirection, 0x18, Width::Half, Access::ReadWrite),
    reg(PowerControl, 0x1C, Width::Word, Access::ReadWrite),
];
const REV_D_UART0: [RegisterDescriptor; 8] = uart_block(UartPort::Uart0, 0x00, 1);
const REV_D_UART1: [RegisterDescriptor; 8] = uart_block(UartPort::Uart1, 0x08, 1);

// Revision E: revision C layout with a latch-wired LCD module.
const REV_E: [RegisterDescriptor; 11] = [
    reg(LcdControl, 0x8000, Width::Byte, Access::Write),
    reg(LcdData, 0x8001, Width::Byte, Access::Write),
    reg(InterruptMask, 0x1_0000, Width::Word, Access::ReadWrite),
    reg(Timer0, 0x1_4000, Width::Word, Access::ReadWrite),
    reg(Timer1, 0x1_8000, Width::Word, Access::ReadWrite),
    reg(LedStatus, 0x1_C000, Width::Word, Access::ReadWrite),
    reg(GpioDirection, 0x1_C004, Width::Word, Access::ReadWrite),
    reg(GpioSet, 0x1_C008, Width::Word, Access::Write),
    reg(GpioClear, 0x1_C00C, Width::Word, Access::Write),
    reg(ButtonStatus, 0x1_C010, Width::Word, Access::Read),
    reg(PowerControl, 0x2_4000, Width::Word, Access::ReadWrite),
];

/// Wait units of one visible animation frame on strobe-wired boards
const STROBE_FRAME_UNITS: u32 = 20_000;

/// A shipped board revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardRevision {
    RevA,
    RevB,
    RevC,
    RevD,
    RevE,
}

impl BoardRevision {
    /// Every built-in revision
    pub const ALL: [BoardRevision; 5] = [
        BoardRevision::RevA,
        BoardRevision::RevB,
        BoardRevision::RevC,
        BoardRevision::RevD,
        BoardRevision::RevE,
    ];

    /// Short name (`rev-a` ... `rev-e`)
    pub const fn name(self) -> &'static str {
        match self {
            BoardRevision::RevA => "rev-a",
            BoardRevision::RevB => "rev-b",
            BoardRevision::RevC => "rev-c",
            BoardRevision::RevD => "rev-d",
            BoardRevision::RevE => "rev-e",
        }
    }

    /// Peripheral base address
    pub const fn base(self) -> u32 {
        match self {
            BoardRevision::RevA | BoardRevision::RevB => 0x8000_0000,
            BoardRevision::RevC | BoardRevision::RevE => 0xE000_0000,
            BoardRevision::RevD => 0x4000_0000,
        }
    }

    /// Register map of this revision
    pub fn register_map(self) -> Result<RegisterMap, MapError> {
        let base = self.base();
        match self {
            BoardRevision::RevA => RegisterMap::new(base, &REV_A),
            BoardRevision::RevB => {
                RegisterMap::from_parts(base, &[&REV_B, &REV_B_UART0, &REV_B_UART1])
            }
            BoardRevision::RevC => {
                RegisterMap::from_parts(base, &[&REV_C_UART0, &REV_C_UART1, &REV_C])
            }
            BoardRevision::RevD => {
                RegisterMap::from_parts(base, &[&REV_D_UART0, &REV_D_UART1, &REV_D])
            }
            BoardRevision::RevE => {
                RegisterMap::from_parts(base, &[&REV_C_UART0, &REV_C_UART1, &REV_E])
            }
        }
    }

    /// Complete board configuration of this revision
    pub fn config(self) -> Result<BoardConfig, MapError> {
        let mut config = BoardConfig::new(self.name(), self.register_map()?);

        match self {
            BoardRevision::RevA => {
                config.lcd = LcdConfig::latch();
                config.animation = AnimationSpec::with_waits(5, 1);
            }
            BoardRevision::RevB => {
                config.lcd = LcdConfig::latch();
                config.animation = AnimationSpec::with_waits(3, 1);
            }
            BoardRevision::RevC => {
                config.led_width = 10;
                config.lcd = LcdConfig::strobe();
                config.animation = AnimationSpec::with_waits(5, STROBE_FRAME_UNITS);
            }
            BoardRevision::RevD => {
                config.led_width = 10;
                config.lcd = LcdConfig::strobe();
                config.animation = AnimationSpec::with_waits(3, STROBE_FRAME_UNITS);
            }
            BoardRevision::RevE => {
                config.led_width = 10;
                config.lcd = LcdConfig {
                    command_wait: WaitSpec::new(1, 4),
                    ..LcdConfig::latch()
                };
                config.animation = AnimationSpec::with_waits(5, STROBE_FRAME_UNITS);
            }
        }

        Ok(config)
    }
}

impl fmt::Display for BoardRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown revision name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownRevision;

impl fmt::Display for UnknownRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown board revision; expected rev-a, rev-b, rev-c, rev-d or rev-e")
    }
}

impl core::error::Error for UnknownRevision {}

impl FromStr for BoardRevision {
    type Err = UnknownRevision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        BoardRevision::ALL
            .iter()
            .copied()
            .find(|rev| {
                rev.name().eq_ignore_ascii_case(s) || rev.name()[4..].eq_ignore_ascii_case(s)
            })
            .ok_or(UnknownRevision)
    }
}
