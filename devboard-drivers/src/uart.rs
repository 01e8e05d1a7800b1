//! 16550-class UART driver
//!
//! Polled operation only: every transfer spins on a line-status bit. The
//! plain driver waits forever, as the hardware contract demands; a
//! [`BoundedUart`] gives up after a fixed number of status polls and is
//! meant for host-side tests.
//!
//! # Configure sequence
//!
//! | Step | Register | Value |
//! |------|----------|-------|
//! | 1 | IER | `0x00` (interrupts off) |
//! | 2 | LCR | `0x80` (DLAB set) |
//! | 3 | DLL | divisor low byte |
//! | 4 | DLM | divisor high byte |
//! | 5 | LCR | frame format, DLAB clear (`0x03` for 8-N-1) |
//! | 6 | FCR | `0xC7` (FIFOs on and cleared, 14-byte threshold) |
//! | 7 | MCR | `0x03` (DTR, RTS; OUT2 low keeps the IRQ line quiet) |

use devboard_core::config::BoardConfig;
use devboard_core::{HalError, RegisterMap, RegisterName, RegisterWindow, UartPort, UartRegister};
use devboard_hal::{RegisterBus, UartConfig, UartRx, UartTx};
use heapless::Vec;

/// Line status register bits
pub mod lsr {
    /// Receive buffer holds a byte
    pub const DATA_READY: u8 = 0x01;
    /// Receive overrun
    pub const OVERRUN: u8 = 0x02;
    /// Transmit holding register empty
    pub const THR_EMPTY: u8 = 0x20;
    /// Transmitter completely idle
    pub const TX_EMPTY: u8 = 0x40;
}

/// Divisor latch access bit in the line control register
pub const LCR_DLAB: u8 = 0x80;

/// FIFO control: enable, clear both FIFOs, 14-byte receive threshold
pub const FCR_DEFAULT: u8 = 0xC7;

/// Modem control: DTR and RTS asserted, interrupt output disabled
pub const MCR_DEFAULT: u8 = 0x03;

/// Polled UART
pub struct UartDriver<'m, B> {
    window: RegisterWindow<'m, B>,
    port: UartPort,
    config: Option<UartConfig>,
}

impl<'m, B: RegisterBus> UartDriver<'m, B> {
    /// Create an unconfigured driver for one UART of a register map
    pub fn new(map: &'m RegisterMap, bus: B, port: UartPort) -> Self {
        Self {
            window: RegisterWindow::new(map, bus),
            port,
            config: None,
        }
    }

    /// Create an unconfigured driver for one UART of a board
    pub fn for_board(board: &'m BoardConfig, bus: B, port: UartPort) -> Self {
        Self::new(&board.map, bus, port)
    }

    /// Which UART this driver owns
    pub fn port(&self) -> UartPort {
        self.port
    }

    /// Line settings, once configured
    pub fn config(&self) -> Option<&UartConfig> {
        self.config.as_ref()
    }

    /// Check whether `configure` has completed
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Program baud rate and frame format, enable and clear the FIFOs
    ///
    /// Must run before any transfer. Running it again reprograms the UART
    /// from scratch.
    pub fn configure(&mut self, config: UartConfig) -> Result<(), HalError> {
        // A failed sequence leaves the UART in an unknown state
        self.config = None;

        self.write_reg(UartRegister::InterruptEnable, 0x00)?;
        self.write_reg(UartRegister::LineControl, LCR_DLAB)?;
        // DLL and DLM share the data and interrupt-enable addresses
        self.write_reg(UartRegister::Data, config.divisor_low())?;
        self.write_reg(UartRegister::InterruptEnable, config.divisor_high())?;
        self.write_reg(UartRegister::LineControl, config.line_control())?;
        self.write_reg(UartRegister::FifoControl, FCR_DEFAULT)?;
        self.write_reg(UartRegister::ModemControl, MCR_DEFAULT)?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "{} configured: divisor {=u16}, lcr {=u8:#x}",
            self.port,
            config.baud_divisor,
            config.line_control()
        );

        self.config = Some(config);
        Ok(())
    }

    /// Send one byte, waiting for the transmit holding register
    pub fn send_byte(&mut self, byte: u8) -> Result<(), HalError> {
        self.put(byte, None)
    }

    /// Send every byte of a string, in order
    pub fn send_string(&mut self, s: &str) -> Result<(), HalError> {
        self.send_bytes(s.as_bytes())
    }

    /// Send a byte slice, in order
    pub fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), HalError> {
        for &byte in bytes {
            self.put(byte, None)?;
        }
        Ok(())
    }

    /// Receive one byte, waiting for data
    pub fn receive_byte(&mut self) -> Result<u8, HalError> {
        self.get(None)
    }

    /// Receive up to and including a line feed
    ///
    /// Fails with [`HalError::Unbounded`] after `N` bytes without a line
    /// feed; those bytes are consumed.
    pub fn receive_line<const N: usize>(&mut self) -> Result<Vec<u8, N>, HalError> {
        self.line(None)
    }

    /// Wait until the transmitter has shifted out everything
    pub fn wait_idle(&mut self) -> Result<(), HalError> {
        self.wait_for(lsr::TX_EMPTY, None)
    }

    /// Wrap the driver so every wait gives up after `polls` status reads
    pub fn with_poll_budget(self, polls: u32) -> BoundedUart<'m, B> {
        BoundedUart {
            inner: self,
            polls: polls.max(1),
        }
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.window.release()
    }

    fn name(&self, reg: UartRegister) -> RegisterName {
        RegisterName::uart(self.port, reg)
    }

    fn write_reg(&mut self, reg: UartRegister, value: u8) -> Result<(), HalError> {
        let name = self.name(reg);
        self.window.write(name, value as u32)
    }

    fn line_status(&mut self) -> Result<u8, HalError> {
        let name = self.name(UartRegister::LineStatus);
        Ok(self.window.read(name)? as u8)
    }

    fn wait_for(&mut self, bit: u8, budget: Option<u32>) -> Result<(), HalError> {
        if self.config.is_none() {
            return Err(HalError::NotConfigured);
        }
        let mut polls = 0u32;
        loop {
            if self.line_status()? & bit != 0 {
                return Ok(());
            }
            polls = polls.saturating_add(1);
            if budget.is_some_and(|limit| polls >= limit) {
                #[cfg(feature = "defmt")]
                defmt::debug!("{}: no status {=u8:#x} after {=u32} polls", self.port, bit, polls);
                return Err(HalError::Timeout);
            }
            core::hint::spin_loop();
        }
    }

    fn put(&mut self, byte: u8, budget: Option<u32>) -> Result<(), HalError> {
        self.wait_for(lsr::THR_EMPTY, budget)?;
        self.write_reg(UartRegister::Data, byte)
    }

    fn get(&mut self, budget: Option<u32>) -> Result<u8, HalError> {
        self.wait_for(lsr::DATA_READY, budget)?;
        let name = self.name(UartRegister::Data);
        Ok(self.window.read(name)? as u8)
    }

    fn line<const N: usize>(&mut self, budget: Option<u32>) -> Result<Vec<u8, N>, HalError> {
        let mut line = Vec::new();
        loop {
            if line.is_full() {
                return Err(HalError::Unbounded);
            }
            let byte = self.get(budget)?;
            line.push(byte).map_err(|_| HalError::Unbounded)?;
            if byte == b'\n' {
                return Ok(line);
            }
        }
    }

    /// Block for one byte, then take whatever else is already buffered
    fn read_available(&mut self, buf: &mut [u8], budget: Option<u32>) -> Result<usize, HalError> {
        let Some((first, rest)) = buf.split_first_mut() else {
            return Ok(0);
        };
        *first = self.get(budget)?;
        let mut count = 1;
        for slot in rest {
            if self.line_status()? & lsr::DATA_READY == 0 {
                break;
            }
            let name = self.name(UartRegister::Data);
            *slot = self.window.read(name)? as u8;
            count += 1;
        }
        Ok(count)
    }
}

impl<B: RegisterBus> UartTx for UartDriver<'_, B> {
    type Error = HalError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.send_bytes(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.wait_idle()
    }
}

impl<B: RegisterBus> UartRx for UartDriver<'_, B> {
    type Error = HalError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        for slot in buf.iter_mut() {
            *slot = self.get(None)?;
        }
        Ok(buf.len())
    }
}

impl<B: RegisterBus> embedded_io::ErrorType for UartDriver<'_, B> {
    type Error = HalError;
}

impl<B: RegisterBus> embedded_io::Write for UartDriver<'_, B> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.send_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.wait_idle()
    }
}

impl<B: RegisterBus> embedded_io::Read for UartDriver<'_, B> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.read_available(buf, None)
    }
}

/// UART whose waits give up with [`HalError::Timeout`]
///
/// Not part of the hardware contract; use it where a hung device must not
/// hang the caller, such as host tests against a simulator.
pub struct BoundedUart<'m, B> {
    inner: UartDriver<'m, B>,
    polls: u32,
}

impl<'m, B: RegisterBus> BoundedUart<'m, B> {
    /// Status polls allowed per wait
    pub fn poll_budget(&self) -> u32 {
        self.polls
    }

    pub fn configure(&mut self, config: UartConfig) -> Result<(), HalError> {
        self.inner.configure(config)
    }

    pub fn send_byte(&mut self, byte: u8) -> Result<(), HalError> {
        self.inner.put(byte, Some(self.polls))
    }

    pub fn send_string(&mut self, s: &str) -> Result<(), HalError> {
        for &byte in s.as_bytes() {
            self.inner.put(byte, Some(self.polls))?;
        }
        Ok(())
    }

    pub fn receive_byte(&mut self) -> Result<u8, HalError> {
        self.inner.get(Some(self.polls))
    }

    pub fn receive_line<const N: usize>(&mut self) -> Result<Vec<u8, N>, HalError> {
        self.inner.line(Some(self.polls))
    }

    /// Unwrap the plain driver
    pub fn into_inner(self) -> UartDriver<'m, B> {
        self.inner
    }
}

impl<B: RegisterBus> embedded_io::ErrorType for BoundedUart<'_, B> {
    type Error = HalError;
}

impl<B: RegisterBus> embedded_io::Write for BoundedUart<'_, B> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &byte in buf {
            self.inner.put(byte, Some(self.polls))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.wait_for(lsr::TX_EMPTY, Some(self.polls))
    }
}

impl<B: RegisterBus> embedded_io::Read for BoundedUart<'_, B> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.inner.read_available(buf, Some(self.polls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBoard, Op};
    use devboard_core::BoardRevision;

    // Revision C, UART0
    const DATA: u32 = 0xE000_0000;
    const IER: u32 = 0xE000_0004;
    const FCR: u32 = 0xE000_0008;
    const LCR: u32 = 0xE000_000C;
    const MCR: u32 = 0xE000_0010;
    const LSR: u32 = 0xE000_0014;

    const READY: u32 = (lsr::THR_EMPTY | lsr::TX_EMPTY) as u32;
    const READY_RX: u32 = READY | lsr::DATA_READY as u32;

    fn configured<'m>(map: &'m RegisterMap, board: &'m MockBoard) -> UartDriver<'m, &'m MockBoard> {
        let mut uart = UartDriver::new(map, board, UartPort::Uart0);
        uart.configure(UartConfig::default()).unwrap();
        board.clear_log();
        uart
    }

    #[test]
    fn test_configure_sequence() {
        let map = BoardRevision::RevC.register_map().unwrap();
        let board = MockBoard::new();
        let mut uart = UartDriver::new(&map, &board, UartPort::Uart0);

        uart.configure(UartConfig::default()).unwrap();

        assert!(uart.is_configured());
        assert_eq!(
            board.writes().as_slice(),
            &[
                (IER, 0x00),
                (LCR, 0x80),
                (DATA, 0x03),
                (IER, 0x00),
                (LCR, 0x03),
                (FCR, 0xC7),
                (MCR, 0x03),
            ]
        );
    }

    #[test]
    fn test_not_configured() {
        let map = BoardRevision::RevC.register_map().unwrap();
        let board = MockBoard::new();
        board.set(LSR, READY_RX);
        let mut uart = UartDriver::new(&map, &board, UartPort::Uart0);

        assert_eq!(uart.send_byte(b'x'), Err(HalError::NotConfigured));
        assert_eq!(uart.receive_byte(), Err(HalError::NotConfigured));
        assert_eq!(uart.receive_line::<8>(), Err(HalError::NotConfigured));
        assert!(board.ops().is_empty());
    }

    #[test]
    fn test_send_string_hello() {
        let map = BoardRevision::RevC.register_map().unwrap();
        let board = MockBoard::new();
        board.set(LSR, READY);
        let mut uart = configured(&map, &board);

        uart.send_string("Hello").unwrap();

        let expected: [(u32, u32); 5] = [
            (DATA, b'H' as u32),
            (DATA, b'e' as u32),
            (DATA, b'l' as u32),
            (DATA, b'l' as u32),
            (DATA, b'o' as u32),
        ];
        assert_eq!(board.writes().as_slice(), &expected);
        // Exactly one status check per byte when the transmitter is ready
        assert_eq!(board.reads_of(LSR), 5);
    }

    #[test]
    fn test_send_waits_for_thre() {
        let map = BoardRevision::RevC.register_map().unwrap();
        let board = MockBoard::new();
        board.set(LSR, READY);
        let mut uart = configured(&map, &board);
        board.script(LSR, &[0x00, 0x00]);

        uart.send_byte(b'A').unwrap();

        assert_eq!(
            board.ops().as_slice(),
            &[Op::Read(LSR), Op::Read(LSR), Op::Read(LSR), Op::Write(DATA, 0x41)]
        );
    }

    #[test]
    fn test_receive_line_echo() {
        let map = BoardRevision::RevC.register_map().unwrap();
        let board = MockBoard::new();
        board.set(LSR, READY_RX);
        let mut uart = configured(&map, &board);
        board.script(DATA, &[b'e' as u32, b'c' as u32, b'h' as u32, b'o' as u32, b'\n' as u32]);

        let line = uart.receive_line::<16>().unwrap();

        assert_eq!(line.as_slice(), b"echo\n");
        assert_eq!(board.reads_of(DATA), 5);
    }

    #[test]
    fn test_receive_line_bounded() {
        let map = BoardRevision::RevC.register_map().unwrap();
        let board = MockBoard::new();
        board.set(LSR, READY_RX);
        let mut uart = configured(&map, &board);
        board.set(DATA, b'x' as u32);

        assert_eq!(uart.receive_line::<8>(), Err(HalError::Unbounded));
        assert_eq!(board.reads_of(DATA), 8);
    }

    #[test]
    fn test_line_feed_in_last_slot() {
        let map = BoardRevision::RevC.register_map().unwrap();
        let board = MockBoard::new();
        board.set(LSR, READY_RX);
        let mut uart = configured(&map, &board);
        board.script(DATA, &[b'o' as u32, b'k' as u32, b'\n' as u32]);

        assert_eq!(uart.receive_line::<3>().unwrap().as_slice(), b"ok\n");
    }

    #[test]
    fn test_bounded_timeout() {
        let map = BoardRevision::RevC.register_map().unwrap();
        let board = MockBoard::new();
        let mut uart = configured(&map, &board).with_poll_budget(10);

        assert_eq!(uart.send_byte(b'x'), Err(HalError::Timeout));
        assert_eq!(board.reads_of(LSR), 10);
        assert!(board.writes().is_empty());

        assert_eq!(uart.receive_byte(), Err(HalError::Timeout));
    }

    #[test]
    fn test_bounded_passes_when_ready() {
        let map = BoardRevision::RevC.register_map().unwrap();
        let board = MockBoard::new();
        board.set(LSR, READY);
        let mut uart = configured(&map, &board).with_poll_budget(3);

        uart.send_string("ok").unwrap();
        assert_eq!(board.writes_to(DATA).as_slice(), &[b'o' as u32, b'k' as u32]);
    }

    #[test]
    fn test_second_port_byte_spaced() {
        let map = BoardRevision::RevD.register_map().unwrap();
        let board = MockBoard::new();
        board.set(0x4000_000D, READY);
        let mut uart = UartDriver::new(&map, &board, UartPort::Uart1);
        uart.configure(UartConfig::default()).unwrap();
        board.clear_log();

        uart.send_byte(b'!').unwrap();

        assert_eq!(board.writes().as_slice(), &[(0x4000_0008, b'!' as u32)]);
    }

    #[test]
    fn test_board_without_uart() {
        let map = BoardRevision::RevA.register_map().unwrap();
        let board = MockBoard::new();
        let mut uart = UartDriver::new(&map, &board, UartPort::Uart0);

        assert_eq!(
            uart.configure(UartConfig::default()),
            Err(HalError::UnknownRegister(RegisterName::Uart0InterruptEnable))
        );
        assert!(!uart.is_configured());
    }

    #[test]
    fn test_embedded_io_read_takes_buffered_bytes() {
        let map = BoardRevision::RevC.register_map().unwrap();
        let board = MockBoard::new();
        board.set(LSR, READY);
        let mut uart = configured(&map, &board);
        board.script(LSR, &[READY_RX, READY_RX]);
        board.script(DATA, &[b'a' as u32, b'b' as u32]);

        let mut buf = [0u8; 4];
        let n = embedded_io::Read::read(&mut uart, &mut buf).unwrap();

        assert_eq!(&buf[..n], b"ab");
    }

    #[test]
    fn test_embedded_io_write_all() {
        let map = BoardRevision::RevC.register_map().unwrap();
        let board = MockBoard::new();
        board.set(LSR, READY);
        let mut uart = configured(&map, &board);

        embedded_io::Write::write_all(&mut uart, b"hi").unwrap();
        embedded_io::Write::flush(&mut uart).unwrap();

        assert_eq!(board.writes_to(DATA).as_slice(), &[b'h' as u32, b'i' as u32]);
    }

    #[test]
    fn test_hal_traits() {
        fn send<T: UartTx<Error = HalError>>(tx: &mut T) -> Result<(), HalError> {
            tx.write_blocking(b"AT\r")?;
            tx.flush()
        }

        let map = BoardRevision::RevC.register_map().unwrap();
        let board = MockBoard::new();
        board.set(LSR, READY_RX);
        let mut uart = configured(&map, &board);
        board.script(DATA, &[0x4F]);

        send(&mut uart).unwrap();
        assert_eq!(board.writes_to(DATA).len(), 3);
        assert_eq!(UartRx::read_byte(&mut uart), Ok(0x4F));
    }
}
