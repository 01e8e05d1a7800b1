//! Recording register bus shared by the driver tests

use core::cell::RefCell;

use devboard_hal::{RegisterBus, Width};
use heapless::{Deque, LinearMap, Vec};

/// One bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read(u32),
    Write(u32, u32),
}

/// Mock board: every register is a latch, with optional scripted reads
///
/// Shared by reference so several drivers can sit on the same board.
#[derive(Default)]
pub struct MockBoard {
    log: RefCell<Vec<Op, 1024>>,
    latches: RefCell<LinearMap<u32, u32, 32>>,
    scripted: RefCell<LinearMap<u32, Deque<u32, 64>, 4>>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read of `address` return `value` until overwritten
    pub fn set(&self, address: u32, value: u32) {
        let _ = self.latches.borrow_mut().insert(address, value);
    }

    /// Queue values returned by successive reads of `address`
    pub fn script(&self, address: u32, values: &[u32]) {
        let mut scripted = self.scripted.borrow_mut();
        if !scripted.contains_key(&address) {
            let _ = scripted.insert(address, Deque::new());
        }
        if let Some(queue) = scripted.get_mut(&address) {
            for v in values {
                queue.push_back(*v).unwrap();
            }
        }
    }

    /// Every transaction in order
    pub fn ops(&self) -> Vec<Op, 1024> {
        self.log.borrow().clone()
    }

    /// Values written to one address, in order
    pub fn writes_to(&self, address: u32) -> Vec<u32, 1024> {
        self.log
            .borrow()
            .iter()
            .filter_map(|op| match op {
                Op::Write(a, v) if *a == address => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Number of reads of one address
    pub fn reads_of(&self, address: u32) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|op| **op == Op::Read(address))
            .count()
    }

    /// All writes, as (address, value)
    pub fn writes(&self) -> Vec<(u32, u32), 1024> {
        self.log
            .borrow()
            .iter()
            .filter_map(|op| match op {
                Op::Write(a, v) => Some((*a, *v)),
                Op::Read(_) => None,
            })
            .collect()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }
}

impl RegisterBus for &MockBoard {
    fn read(&mut self, address: u32, width: Width) -> u32 {
        self.log.borrow_mut().push(Op::Read(address)).unwrap();
        let queued = self
            .scripted
            .borrow_mut()
            .get_mut(&address)
            .and_then(|queue| queue.pop_front());
        let value = match queued {
            Some(v) => v,
            None => self.latches.borrow().get(&address).copied().unwrap_or(0),
        };
        width.truncate(value)
    }

    fn write(&mut self, address: u32, width: Width, value: u32) {
        let value = width.truncate(value);
        self.log.borrow_mut().push(Op::Write(address, value)).unwrap();
        let _ = self.latches.borrow_mut().insert(address, value);
    }
}
