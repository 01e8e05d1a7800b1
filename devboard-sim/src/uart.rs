//! 16550-class UART model
//!
//! Register-accurate enough for a polled driver: divisor latch behind
//! DLAB, FIFO enable and clear through FCR, and a line status register
//! computed from the receive queue. Transmission is instantaneous unless
//! the transmitter is stalled by the test.

use std::collections::VecDeque;

use devboard_core::UartRegister;
use tracing::{debug, trace};

const LSR_DR: u8 = 0x01;
const LSR_OE: u8 = 0x02;
const LSR_THRE: u8 = 0x20;
const LSR_TEMT: u8 = 0x40;
const LCR_DLAB: u8 = 0x80;

/// Receive FIFO depth in FIFO mode
const FIFO_DEPTH: usize = 16;

/// Simulated UART
#[derive(Debug, Clone, Default)]
pub struct Uart16550 {
    ier: u8,
    lcr: u8,
    mcr: u8,
    scr: u8,
    dll: u8,
    dlm: u8,
    fifo_enabled: bool,
    trigger_level: u8,
    overrun: bool,
    tx_stalled: bool,
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

impl Uart16550 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register read
    pub fn read(&mut self, reg: UartRegister) -> u8 {
        match reg {
            UartRegister::Data if self.dlab() => self.dll,
            UartRegister::Data => {
                let byte = self.rx.pop_front().unwrap_or(0);
                trace!(byte, "uart rx read");
                byte
            }
            UartRegister::InterruptEnable if self.dlab() => self.dlm,
            UartRegister::InterruptEnable => self.ier,
            // Reads back as the interrupt identification register
            UartRegister::FifoControl => {
                let fifo = if self.fifo_enabled { 0xC0 } else { 0x00 };
                fifo | 0x01
            }
            UartRegister::LineControl => self.lcr,
            UartRegister::ModemControl => self.mcr,
            UartRegister::LineStatus => self.line_status(),
            UartRegister::ModemStatus => 0,
            UartRegister::Scratch => self.scr,
        }
    }

    /// Register write
    pub fn write(&mut self, reg: UartRegister, value: u8) {
        match reg {
            UartRegister::Data if self.dlab() => self.dll = value,
            UartRegister::Data => {
                trace!(byte = value, "uart tx");
                self.tx.push(value);
            }
            UartRegister::InterruptEnable if self.dlab() => self.dlm = value,
            UartRegister::InterruptEnable => self.ier = value & 0x0F,
            UartRegister::FifoControl => self.write_fcr(value),
            UartRegister::LineControl => {
                let was_dlab = self.dlab();
                self.lcr = value;
                if was_dlab && !self.dlab() {
                    debug!(divisor = self.divisor(), lcr = value, "uart line settings");
                }
            }
            UartRegister::ModemControl => self.mcr = value & 0x1F,
            UartRegister::LineStatus | UartRegister::ModemStatus => {
                trace!(?reg, value, "write to read-only uart register ignored");
            }
            UartRegister::Scratch => self.scr = value,
        }
    }

    fn write_fcr(&mut self, value: u8) {
        let enable = value & 0x01 != 0;
        if enable != self.fifo_enabled {
            self.rx.clear();
        }
        self.fifo_enabled = enable;
        if enable {
            if value & 0x02 != 0 {
                self.rx.clear();
                self.overrun = false;
            }
            self.trigger_level = [1, 4, 8, 14][(value >> 6) as usize];
        }
    }

    fn line_status(&mut self) -> u8 {
        let mut lsr = 0;
        if !self.rx.is_empty() {
            lsr |= LSR_DR;
        }
        if self.overrun {
            lsr |= LSR_OE;
            // Cleared by reading the line status
            self.overrun = false;
        }
        if !self.tx_stalled {
            lsr |= LSR_THRE | LSR_TEMT;
        }
        lsr
    }

    fn dlab(&self) -> bool {
        self.lcr & LCR_DLAB != 0
    }

    /// Feed bytes into the receiver
    ///
    /// In FIFO mode bytes beyond the FIFO depth are lost and flag an
    /// overrun; without FIFO only the newest byte is kept.
    pub fn receive(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            let capacity = if self.fifo_enabled { FIFO_DEPTH } else { 1 };
            if self.rx.len() >= capacity {
                self.overrun = true;
                if !self.fifo_enabled {
                    self.rx.clear();
                    self.rx.push_back(byte);
                }
                continue;
            }
            self.rx.push_back(byte);
        }
    }

    /// Hold the transmitter busy (THRE and TEMT stay clear)
    pub fn stall_tx(&mut self, stalled: bool) {
        self.tx_stalled = stalled;
    }

    /// Everything transmitted so far
    pub fn transmitted(&self) -> &[u8] {
        &self.tx
    }

    /// Take and forget everything transmitted so far
    pub fn take_transmitted(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }

    /// Bytes waiting in the receiver
    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }

    /// Programmed baud divisor
    pub fn divisor(&self) -> u16 {
        u16::from_le_bytes([self.dll, self.dlm])
    }

    pub fn line_control(&self) -> u8 {
        self.lcr
    }

    pub fn modem_control(&self) -> u8 {
        self.mcr
    }

    pub fn interrupt_enable(&self) -> u8 {
        self.ier
    }

    pub fn fifo_enabled(&self) -> bool {
        self.fifo_enabled
    }

    /// Receive FIFO trigger level in bytes
    pub fn trigger_level(&self) -> u8 {
        self.trigger_level
    }
}
