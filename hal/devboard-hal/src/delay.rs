//! Software delay strategies
//!
//! The devboard has no usable real-time clock, so every settling time the
//! peripherals need is expressed in abstract delay *units*. A unit has no
//! fixed wall-clock meaning: on the board it is a handful of spin
//! iterations, in tests it is a counter increment.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Busy-wait delay
///
/// Waits for approximately `units` abstract units without yielding. There is
/// no cancellation and no guarantee of elapsed time; callers use it for
/// short settling gaps (microseconds to milliseconds) only.
pub trait DelayUnit {
    /// Wait for approximately `units` delay units
    fn wait(&mut self, units: u32);
}

impl<T: DelayUnit + ?Sized> DelayUnit for &mut T {
    fn wait(&mut self, units: u32) {
        (**self).wait(units)
    }
}

/// A repeated wait, as found in the board timing tables
///
/// Timing on the devboard is specified as "call the delay routine N times",
/// e.g. five delay calls between animation frames. Keeping calls and units
/// apart preserves that call count for compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WaitSpec {
    /// Number of `wait` calls
    pub calls: u8,
    /// Units passed to each call
    pub units: u32,
}

impl WaitSpec {
    /// No waiting at all
    pub const NONE: Self = Self { calls: 0, units: 0 };

    /// Create a wait of `calls` × `units`
    pub const fn new(calls: u8, units: u32) -> Self {
        Self { calls, units }
    }

    /// Total number of units this wait spends
    pub const fn total_units(&self) -> u64 {
        self.calls as u64 * self.units as u64
    }

    /// Perform the wait on a delay strategy
    pub fn apply<D: DelayUnit + ?Sized>(&self, delay: &mut D) {
        for _ in 0..self.calls {
            delay.wait(self.units);
        }
    }
}

/// Spin-loop delay for the real board
///
/// Burns `iterations_per_unit` spin iterations per unit. The factor is not
/// calibrated against any clock; the default matches the empty counting
/// loop the board firmware has always used (10 iterations per unit).
#[derive(Debug, Clone, Copy)]
pub struct SpinDelay {
    iterations_per_unit: u32,
}

impl Default for SpinDelay {
    fn default() -> Self {
        Self::new(10)
    }
}

impl SpinDelay {
    /// Create a spin delay with a given loop factor
    pub const fn new(iterations_per_unit: u32) -> Self {
        Self {
            iterations_per_unit,
        }
    }
}

impl DelayUnit for SpinDelay {
    fn wait(&mut self, units: u32) {
        let iterations = units as u64 * self.iterations_per_unit as u64;
        for _ in 0..iterations {
            core::hint::spin_loop();
        }
    }
}

/// Delay that returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayUnit for NoDelay {
    fn wait(&mut self, _units: u32) {}
}

/// Delay that only records how it was called
///
/// Used by tests to assert wait sequencing without spending real time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountingDelay {
    /// Number of `wait` calls
    pub calls: u32,
    /// Sum of all units requested
    pub units: u64,
    /// Units of the most recent call
    pub last: Option<u32>,
}

impl CountingDelay {
    /// Create a fresh counter
    pub const fn new() -> Self {
        Self {
            calls: 0,
            units: 0,
            last: None,
        }
    }

    /// Forget everything recorded so far
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl DelayUnit for CountingDelay {
    fn wait(&mut self, units: u32) {
        self.calls += 1;
        self.units += units as u64;
        self.last = Some(units);
    }
}

/// Delay backed by an `embedded-hal` timer
///
/// For boards (or host harnesses) that do have a calibrated delay provider.
/// Each unit is mapped to a fixed number of nanoseconds.
pub struct HalDelay<D> {
    inner: D,
    ns_per_unit: u32,
}

impl<D: embedded_hal::delay::DelayNs> HalDelay<D> {
    /// Wrap a `DelayNs` provider
    pub fn new(inner: D, ns_per_unit: u32) -> Self {
        Self { inner, ns_per_unit }
    }

    /// Release the wrapped provider
    pub fn release(self) -> D {
        self.inner
    }
}

impl<D: embedded_hal::delay::DelayNs> DelayUnit for HalDelay<D> {
    fn wait(&mut self, units: u32) {
        let mut remaining = units as u64 * self.ns_per_unit as u64;
        while remaining > 0 {
            let chunk = remaining.min(u32::MAX as u64);
            self.inner.delay_ns(chunk as u32);
            remaining -= chunk;
        }
    }
}
