//! Simulated board
//!
//! Addresses are decoded through the board's own register map, so the
//! simulator always agrees with the drivers about where a register lives
//! and a driver that strays outside the map shows up as a fault.

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, VecDeque};

use devboard_core::config::BoardConfig;
use devboard_core::lcd::LcdProtocol;
use devboard_core::{RegisterDescriptor, RegisterName, UartPort};
use devboard_hal::{RegisterBus, Width};
use tracing::{trace, warn};

use crate::lcd::Hd44780;
use crate::uart::Uart16550;

/// One recorded bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusAccess {
    Read { name: RegisterName, value: u32 },
    Write { name: RegisterName, value: u32 },
    /// Access to an address no register covers
    Fault { address: u32, write: bool },
}

#[derive(Debug)]
struct Devices {
    leds: u32,
    led_history: Vec<u32>,
    buttons: u32,
    button_script: VecDeque<u32>,
    gpio_direction: u32,
    lcd: Hd44780,
    uarts: [Uart16550; 2],
    plain: HashMap<RegisterName, u32>,
    log: Vec<BusAccess>,
}

/// A whole devboard behind a register bus
///
/// Drivers get `&SimBoard` as their bus; interior mutability lets every
/// driver of one board share it.
#[derive(Debug)]
pub struct SimBoard {
    config: BoardConfig,
    devices: RefCell<Devices>,
}

impl SimBoard {
    /// Power on a board
    pub fn new(config: BoardConfig) -> Self {
        let lcd = Hd44780::new(config.lcd.geometry.columns);
        Self {
            config,
            devices: RefCell::new(Devices {
                leds: 0,
                led_history: Vec::new(),
                buttons: 0,
                button_script: VecDeque::new(),
                gpio_direction: 0,
                lcd,
                uarts: [Uart16550::new(), Uart16550::new()],
                plain: HashMap::new(),
                log: Vec::new(),
            }),
        }
    }

    /// Configuration the board was built from
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Current LED pattern
    pub fn leds(&self) -> u32 {
        self.devices.borrow().leds
    }

    /// Every LED pattern written, in order
    pub fn led_history(&self) -> Vec<u32> {
        self.devices.borrow().led_history.clone()
    }

    /// GPIO direction register
    pub fn gpio_direction(&self) -> u32 {
        self.devices.borrow().gpio_direction
    }

    /// Hold a button pattern until changed
    pub fn set_buttons(&self, bits: u32) {
        self.devices.borrow_mut().buttons = bits;
    }

    /// Patterns returned by the next button reads, one per read
    ///
    /// When the script runs out the held pattern is returned again.
    pub fn script_buttons(&self, patterns: &[u32]) {
        self.devices
            .borrow_mut()
            .button_script
            .extend(patterns.iter().copied());
    }

    /// The LCD model
    pub fn lcd(&self) -> Ref<'_, Hd44780> {
        Ref::map(self.devices.borrow(), |d| &d.lcd)
    }

    /// A UART model
    pub fn uart(&self, port: UartPort) -> Ref<'_, Uart16550> {
        Ref::map(self.devices.borrow(), |d| &d.uarts[port_index(port)])
    }

    /// Feed bytes into a UART's receiver
    pub fn send_to_uart(&self, port: UartPort, bytes: &[u8]) {
        self.devices.borrow_mut().uarts[port_index(port)].receive(bytes);
    }

    /// Hold a UART's transmitter busy
    pub fn stall_uart_tx(&self, port: UartPort, stalled: bool) {
        self.devices.borrow_mut().uarts[port_index(port)].stall_tx(stalled);
    }

    /// Take everything a UART has transmitted
    pub fn take_uart_output(&self, port: UartPort) -> Vec<u8> {
        self.devices.borrow_mut().uarts[port_index(port)].take_transmitted()
    }

    /// Every bus transaction so far
    pub fn log(&self) -> Vec<BusAccess> {
        self.devices.borrow().log.clone()
    }

    /// Accesses that hit no register
    pub fn faults(&self) -> Vec<BusAccess> {
        self.devices
            .borrow()
            .log
            .iter()
            .filter(|a| matches!(a, BusAccess::Fault { .. }))
            .copied()
            .collect()
    }

    /// Number of writes to a register
    pub fn write_count(&self, name: RegisterName) -> usize {
        self.devices
            .borrow()
            .log
            .iter()
            .filter(|a| matches!(a, BusAccess::Write { name: n, .. } if *n == name))
            .count()
    }

    pub fn clear_log(&self) {
        self.devices.borrow_mut().log.clear();
    }

    fn decode(&self, address: u32) -> Option<&RegisterDescriptor> {
        let map = &self.config.map;
        map.iter()
            .find(|d| map.base().wrapping_add(d.offset) == address)
    }

    fn read_register(&self, name: RegisterName) -> u32 {
        let mut devices = self.devices.borrow_mut();
        let devices = &mut *devices;

        if let Some((port, reg)) = name.as_uart() {
            return devices.uarts[port_index(port)].read(reg) as u32;
        }

        match name {
            RegisterName::LedStatus => devices.leds,
            RegisterName::ButtonStatus => devices
                .button_script
                .pop_front()
                .unwrap_or(devices.buttons),
            RegisterName::GpioDirection => devices.gpio_direction,
            RegisterName::LcdControl => match self.config.lcd.protocol {
                LcdProtocol::Strobe => devices.lcd.strobe_lines() as u32,
                LcdProtocol::Latch => 0,
            },
            RegisterName::LcdData => match self.config.lcd.protocol {
                LcdProtocol::Strobe => devices.lcd.strobe_bus() as u32,
                LcdProtocol::Latch => 0,
            },
            other => devices.plain.get(&other).copied().unwrap_or(0),
        }
    }

    fn write_register(&self, name: RegisterName, value: u32) {
        let mut devices = self.devices.borrow_mut();
        let devices = &mut *devices;

        if let Some((port, reg)) = name.as_uart() {
            devices.uarts[port_index(port)].write(reg, value as u8);
            return;
        }

        match name {
            RegisterName::LedStatus => set_leds(devices, value),
            RegisterName::GpioSet => {
                let leds = devices.leds | value;
                set_leds(devices, leds);
            }
            RegisterName::GpioClear => {
                let leds = devices.leds & !value;
                set_leds(devices, leds);
            }
            RegisterName::GpioDirection => devices.gpio_direction = value,
            RegisterName::ButtonStatus => {
                warn!("write to button register ignored");
            }
            RegisterName::LcdControl => match self.config.lcd.protocol {
                LcdProtocol::Latch => devices.lcd.latch_control(value as u8),
                LcdProtocol::Strobe => devices.lcd.strobe_control(value as u8),
            },
            RegisterName::LcdData => match self.config.lcd.protocol {
                LcdProtocol::Latch => devices.lcd.latch_data(value as u8),
                LcdProtocol::Strobe => devices.lcd.strobe_data(value as u8),
            },
            other => {
                devices.plain.insert(other, value);
            }
        }
    }

    fn record(&self, access: BusAccess) {
        self.devices.borrow_mut().log.push(access);
    }
}

fn set_leds(devices: &mut Devices, value: u32) {
    devices.leds = value;
    devices.led_history.push(value);
    trace!("leds <- {:#06x}", value);
}

fn port_index(port: UartPort) -> usize {
    match port {
        UartPort::Uart0 => 0,
        UartPort::Uart1 => 1,
    }
}

impl RegisterBus for &SimBoard {
    fn read(&mut self, address: u32, width: Width) -> u32 {
        let Some(desc) = self.decode(address) else {
            warn!("read from unmapped address {:#010x}", address);
            self.record(BusAccess::Fault {
                address,
                write: false,
            });
            return 0;
        };
        let name = desc.name;
        let value = width.truncate(self.read_register(name));
        self.record(BusAccess::Read { name, value });
        value
    }

    fn write(&mut self, address: u32, width: Width, value: u32) {
        let Some(desc) = self.decode(address) else {
            warn!("write to unmapped address {:#010x}", address);
            self.record(BusAccess::Fault {
                address,
                write: true,
            });
            return;
        };
        let name = desc.name;
        let value = width.truncate(value);
        self.write_register(name, value);
        self.record(BusAccess::Write { name, value });
    }
}
