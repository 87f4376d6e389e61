//! # Tick Clock
//!
//! Coarsened, wraparound-safe view of the raw tick counter.
//!
//! The raw counter advances at `TICK_HZ`. `TickClock::now()` shifts it right
//! by `TICK_SHIFT` and truncates it to 32 bits, so callers can do interval
//! checks with plain `u32` arithmetic at `COARSE_TICK_HZ` resolution.
//!
//! ## Wraparound
//!
//! A [`Tick`] wraps at 2^32. Elapsed time is always computed with modular
//! subtraction (`current - previous`), which yields the true count across a
//! wrap as long as the true interval is below 2^31 coarse ticks. At 4 Hz
//! that is about 17 years.

use crate::config::TICK_SHIFT;
use crate::sync::TickCounter;

/// A coarse timestamp, in units of `2^TICK_SHIFT` raw ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Tick(pub u32);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Coarsen a raw counter value.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Tick((raw >> TICK_SHIFT) as u32)
    }

    /// Coarse ticks elapsed since `earlier`, correct across a wrap.
    #[inline]
    pub const fn wrapping_since(self, earlier: Tick) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// True once at least `period` coarse ticks have passed since `since`.
    #[inline]
    pub const fn has_elapsed(self, since: Tick, period: u32) -> bool {
        self.wrapping_since(since) >= period
    }

    /// The tick `ticks` later, wrapping past `u32::MAX`.
    #[inline]
    pub const fn wrapping_add(self, ticks: u32) -> Tick {
        Tick(self.0.wrapping_add(ticks))
    }
}

/// Read-only clock over a shared tick counter.
pub struct TickClock<'a, C: TickCounter> {
    counter: &'a C,
}

impl<'a, C: TickCounter> TickClock<'a, C> {
    /// A clock reading `counter`.
    pub const fn new(counter: &'a C) -> Self {
        Self { counter }
    }

    /// Current coarse time.
    #[inline]
    pub fn now(&self) -> Tick {
        Tick::from_raw(self.counter.snapshot())
    }

    /// Current raw counter value.
    #[inline]
    pub fn raw(&self) -> u64 {
        self.counter.snapshot()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SplitTicks;

    #[test]
    fn test_now_divides_raw_by_256() {
        let ticks = SplitTicks::new();
        let clock = TickClock::new(&ticks);
        assert_eq!(clock.now(), Tick(0));

        for _ in 0..255 {
            ticks.advance();
        }
        assert_eq!(clock.now(), Tick(0));

        ticks.advance();
        assert_eq!(clock.now(), Tick(1));
        assert_eq!(clock.raw(), 256);
    }

    #[test]
    fn test_coarse_tick_wraps_at_32_bits() {
        let last_coarse = (u64::from(u32::MAX)) << TICK_SHIFT;
        let ticks = SplitTicks::starting_at(last_coarse + 255);
        let clock = TickClock::new(&ticks);
        assert_eq!(clock.now(), Tick(u32::MAX));

        ticks.advance();
        assert_eq!(clock.now(), Tick(0));
    }

    #[test]
    fn test_elapsed_is_exact_across_wraparound() {
        let intervals = [0u32, 1, 2, 255, 4096, 0x7FFF_FFFF];
        let origins = [0u32, 1, 0x7FFF_FFFF, 0xFFFF_FF00, u32::MAX - 1, u32::MAX];

        for &origin in &origins {
            for &interval in &intervals {
                let previous = Tick(origin);
                let current = previous.wrapping_add(interval);
                assert_eq!(
                    current.wrapping_since(previous),
                    interval,
                    "origin {:#x} interval {:#x}",
                    origin,
                    interval
                );
            }
        }
    }

    #[test]
    fn test_has_elapsed_boundary() {
        let since = Tick(u32::MAX - 1);
        assert!(!since.wrapping_add(3).has_elapsed(since, 4));
        assert!(since.wrapping_add(4).has_elapsed(since, 4));
        assert!(since.wrapping_add(5).has_elapsed(since, 4));
        assert!(since.has_elapsed(since, 0));
    }
}
