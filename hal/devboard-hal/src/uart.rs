//! UART serial communication abstractions
//!
//! Provides the line configuration of the board's 16550-class UARTs and
//! blocking transmit/receive traits that the UART driver implements.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Input clock of the board UARTs (standard 1.8432 MHz baud crystal)
pub const UART_CLOCK_HZ: u32 = 1_843_200;

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been handed to the transmitter.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Block until the transmitter has drained
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read data from the UART
    ///
    /// Blocks until the buffer is filled or an error occurs.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read a single byte from the UART
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_blocking(&mut buf)?;
        Ok(buf[0])
    }
}

/// UART line configuration
///
/// Set once when the UART is configured; the driver does not support
/// changing it mid-stream without configuring again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UartConfig {
    /// Baud rate divisor (DLM:DLL)
    pub baud_divisor: u16,
    /// Number of data bits per frame
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    /// 38400 baud, 8-N-1
    fn default() -> Self {
        Self {
            baud_divisor: 0x0003,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// Build a configuration for a baud rate at the standard UART clock
    ///
    /// Returns `None` if the rate cannot be reached with a 16-bit divisor.
    pub fn with_baud_rate(baud: u32) -> Option<Self> {
        let divisor = match baud.checked_mul(16) {
            Some(clocks) if clocks > 0 => UART_CLOCK_HZ / clocks,
            _ => return None,
        };
        if divisor == 0 || divisor > u16::MAX as u32 {
            return None;
        }
        Some(Self {
            baud_divisor: divisor as u16,
            ..Self::default()
        })
    }

    /// Effective baud rate at the standard UART clock
    pub fn baud_rate(&self) -> u32 {
        if self.baud_divisor == 0 {
            return 0;
        }
        UART_CLOCK_HZ / (16 * self.baud_divisor as u32)
    }

    /// Low byte of the divisor (DLL)
    pub fn divisor_low(&self) -> u8 {
        self.baud_divisor as u8
    }

    /// High byte of the divisor (DLM)
    pub fn divisor_high(&self) -> u8 {
        (self.baud_divisor >> 8) as u8
    }

    /// Line control register value for this frame format (DLAB clear)
    pub fn line_control(&self) -> u8 {
        let word_length = match self.data_bits {
            DataBits::Five => 0b00,
            DataBits::Six => 0b01,
            DataBits::Seven => 0b10,
            DataBits::Eight => 0b11,
        };
        let stop = match self.stop_bits {
            StopBits::One => 0,
            StopBits::Two => 1 << 2,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Odd => 1 << 3,
            Parity::Even => (1 << 3) | (1 << 4),
        };
        word_length | stop | parity
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StopBits {
    One,
    Two,
}
