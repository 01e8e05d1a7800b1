//! Register names and descriptors
//!
//! Drivers never deal in addresses. They name a register and the active
//! board revision's [`RegisterMap`](crate::map::RegisterMap) resolves it.

use core::fmt;
use core::str::FromStr;

use devboard_hal::Width;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// UART peripheral identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UartPort {
    Uart0,
    Uart1,
}

/// Registers of a 16550-class UART, in hardware order
///
/// Several of these are mode-dependent aliases on the chip: `Data` is the
/// receive buffer on read, the transmit holding register on write and the
/// divisor latch low byte while DLAB is set; `InterruptEnable` doubles as
/// the divisor latch high byte; `FifoControl` reads back as the interrupt
/// identification register. They are still one register each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartRegister {
    Data,
    InterruptEnable,
    FifoControl,
    LineControl,
    ModemControl,
    LineStatus,
    ModemStatus,
    Scratch,
}

impl UartRegister {
    /// All UART registers in hardware order
    pub const ALL: [UartRegister; 8] = [
        UartRegister::Data,
        UartRegister::InterruptEnable,
        UartRegister::FifoControl,
        UartRegister::LineControl,
        UartRegister::ModemControl,
        UartRegister::LineStatus,
        UartRegister::ModemStatus,
        UartRegister::Scratch,
    ];
}

/// Every register a devboard driver can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RegisterName {
    Uart0Data,
    Uart0InterruptEnable,
    Uart0FifoControl,
    Uart0LineControl,
    Uart0ModemControl,
    Uart0LineStatus,
    Uart0ModemStatus,
    Uart0Scratch,
    Uart1Data,
    Uart1InterruptEnable,
    Uart1FifoControl,
    Uart1LineControl,
    Uart1ModemControl,
    Uart1LineStatus,
    Uart1ModemStatus,
    Uart1Scratch,
    /// LED latch (or GPIO port 0 pin register on GPIO-wired boards)
    LedStatus,
    /// LCD control/instruction register
    LcdControl,
    /// LCD data register
    LcdData,
    /// Push-button input register
    ButtonStatus,
    /// Interrupt controller mask register
    InterruptMask,
    Timer0,
    Timer1,
    GpioDirection,
    GpioSet,
    GpioClear,
    PowerControl,
}

impl RegisterName {
    /// Every register name, in declaration order
    pub const ALL: [RegisterName; 27] = [
        RegisterName::Uart0Data,
        RegisterName::Uart0InterruptEnable,
        RegisterName::Uart0FifoControl,
        RegisterName::Uart0LineControl,
        RegisterName::Uart0ModemControl,
        RegisterName::Uart0LineStatus,
        RegisterName::Uart0ModemStatus,
        RegisterName::Uart0Scratch,
        RegisterName::Uart1Data,
        RegisterName::Uart1InterruptEnable,
        RegisterName::Uart1FifoControl,
        RegisterName::Uart1LineControl,
        RegisterName::Uart1ModemControl,
        RegisterName::Uart1LineStatus,
        RegisterName::Uart1ModemStatus,
        RegisterName::Uart1Scratch,
        RegisterName::LedStatus,
        RegisterName::LcdControl,
        RegisterName::LcdData,
        RegisterName::ButtonStatus,
        RegisterName::InterruptMask,
        RegisterName::Timer0,
        RegisterName::Timer1,
        RegisterName::GpioDirection,
        RegisterName::GpioSet,
        RegisterName::GpioClear,
        RegisterName::PowerControl,
    ];

    /// Name of a register of one of the UARTs
    pub const fn uart(port: UartPort, reg: UartRegister) -> Self {
        use RegisterName::*;
        match (port, reg) {
            (UartPort::Uart0, UartRegister::Data) => Uart0Data,
            (UartPort::Uart0, UartRegister::InterruptEnable) => Uart0InterruptEnable,
            (UartPort::Uart0, UartRegister::FifoControl) => Uart0FifoControl,
            (UartPort::Uart0, UartRegister::LineControl) => Uart0LineControl,
            (UartPort::Uart0, UartRegister::ModemControl) => Uart0ModemControl,
            (UartPort::Uart0, UartRegister::LineStatus) => Uart0LineStatus,
            (UartPort::Uart0, UartRegister::ModemStatus) => Uart0ModemStatus,
            (UartPort::Uart0, UartRegister::Scratch) => Uart0Scratch,
            (UartPort::Uart1, UartRegister::Data) => Uart1Data,
            (UartPort::Uart1, UartRegister::InterruptEnable) => Uart1InterruptEnable,
            (UartPort::Uart1, UartRegister::FifoControl) => Uart1FifoControl,
            (UartPort::Uart1, UartRegister::LineControl) => Uart1LineControl,
            (UartPort::Uart1, UartRegister::ModemControl) => Uart1ModemControl,
            (UartPort::Uart1, UartRegister::LineStatus) => Uart1LineStatus,
            (UartPort::Uart1, UartRegister::ModemStatus) => Uart1ModemStatus,
            (UartPort::Uart1, UartRegister::Scratch) => Uart1Scratch,
        }
    }

    /// Split a UART register name into port and register
    pub const fn as_uart(self) -> Option<(UartPort, UartRegister)> {
        use RegisterName::*;
        let pair = match self {
            Uart0Data => (UartPort::Uart0, UartRegister::Data),
            Uart0InterruptEnable => (UartPort::Uart0, UartRegister::InterruptEnable),
            Uart0FifoControl => (UartPort::Uart0, UartRegister::FifoControl),
            Uart0LineControl => (UartPort::Uart0, UartRegister::LineControl),
            Uart0ModemControl => (UartPort::Uart0, UartRegister::ModemControl),
            Uart0LineStatus => (UartPort::Uart0, UartRegister::LineStatus),
            Uart0ModemStatus => (UartPort::Uart0, UartRegister::ModemStatus),
            Uart0Scratch => (UartPort::Uart0, UartRegister::Scratch),
            Uart1Data => (UartPort::Uart1, UartRegister::Data),
            Uart1InterruptEnable => (UartPort::Uart1, UartRegister::InterruptEnable),
            Uart1FifoControl => (UartPort::Uart1, UartRegister::FifoControl),
            Uart1LineControl => (UartPort::Uart1, UartRegister::LineControl),
            Uart1ModemControl => (UartPort::Uart1, UartRegister::ModemControl),
            Uart1LineStatus => (UartPort::Uart1, UartRegister::LineStatus),
            Uart1ModemStatus => (UartPort::Uart1, UartRegister::ModemStatus),
            Uart1Scratch => (UartPort::Uart1, UartRegister::Scratch),
            _ => return None,
        };
        Some(pair)
    }

    /// Snake-case name, as used in board files
    pub const fn as_str(self) -> &'static str {
        use RegisterName::*;
        match self {
            Uart0Data => "uart0_data",
            Uart0InterruptEnable => "uart0_interrupt_enable",
            Uart0FifoControl => "uart0_fifo_control",
            Uart0LineControl => "uart0_line_control",
            Uart0ModemControl => "uart0_modem_control",
            Uart0LineStatus => "uart0_line_status",
            Uart0ModemStatus => "uart0_modem_status",
            Uart0Scratch => "uart0_scratch",
            Uart1Data => "uart1_data",
            Uart1InterruptEnable => "uart1_interrupt_enable",
            Uart1FifoControl => "uart1_fifo_control",
            Uart1LineControl => "uart1_line_control",
            Uart1ModemControl => "uart1_modem_control",
            Uart1LineStatus => "uart1_line_status",
            Uart1ModemStatus => "uart1_modem_status",
            Uart1Scratch => "uart1_scratch",
            LedStatus => "led_status",
            LcdControl => "lcd_control",
            LcdData => "lcd_data",
            ButtonStatus => "button_status",
            InterruptMask => "interrupt_mask",
            Timer0 => "timer0",
            Timer1 => "timer1",
            GpioDirection => "gpio_direction",
            GpioSet => "gpio_set",
            GpioClear => "gpio_clear",
            PowerControl => "power_control",
        }
    }
}

impl fmt::Display for RegisterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown register name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownRegisterName;

impl fmt::Display for UnknownRegisterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown register name")
    }
}

impl core::error::Error for UnknownRegisterName {}

impl FromStr for RegisterName {
    type Err = UnknownRegisterName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegisterName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or(UnknownRegisterName)
    }
}

/// Direction(s) in which a register may be accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Access {
    Read,
    Write,
    #[default]
    ReadWrite,
}

impl Access {
    /// Register may be read
    pub const fn readable(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    /// Register may be written
    pub const fn writable(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

/// One entry of a register map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegisterDescriptor {
    /// Register name
    pub name: RegisterName,
    /// Byte offset from the board's peripheral base address
    pub offset: u32,
    /// Access width
    #[cfg_attr(feature = "serde", serde(default))]
    pub width: Width,
    /// Permitted access directions
    #[cfg_attr(feature = "serde", serde(default))]
    pub access: Access,
}

impl RegisterDescriptor {
    /// Create a descriptor
    pub const fn new(name: RegisterName, offset: u32, width: Width, access: Access) -> Self {
        Self {
            name,
            offset,
            width,
            access,
        }
    }

    /// First byte offset past this register
    pub const fn end(&self) -> u32 {
        self.offset + self.width.bytes()
    }

    /// Check whether two registers share any byte
    pub const fn overlaps(&self, other: &RegisterDescriptor) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}
