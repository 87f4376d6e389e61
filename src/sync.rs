//! # Synchronization Primitives
//!
//! Interrupt-safe tick counters shared between the timer interrupt (single
//! producer) and the run loop (single consumer).
//!
//! The raw counter is 64 bits wide, which a Cortex-M4 cannot load in one
//! access. Each counter type picks a technique for taking an untorn
//! snapshot, and the rest of the crate only sees the [`TickCounter`] trait,
//! so the technique can be swapped per target without touching the
//! scheduler.
//!
//! | Counter | Snapshot technique |
//! |---------|--------------------|
//! | [`SplitTicks`] | double-read-and-compare on the high word |
//! | [`CriticalSectionTicks`] | interrupts masked around the read |

use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::Mutex;

/// A free-running tick counter advanced from interrupt context.
pub trait TickCounter {
    /// Advance the counter by one period. Called only from the timer
    /// interrupt; must be O(1) and never block.
    fn advance(&self);

    /// Take an untorn snapshot of the raw counter.
    fn snapshot(&self) -> u64;
}

impl<T: TickCounter + ?Sized> TickCounter for &T {
    fn advance(&self) {
        (**self).advance()
    }

    fn snapshot(&self) -> u64 {
        (**self).snapshot()
    }
}

// ---------------------------------------------------------------------------
// Double-read-and-compare
// ---------------------------------------------------------------------------

/// 64-bit counter stored as two 32-bit atomic halves.
///
/// The writer only ever runs in the timer interrupt, so it needs no
/// read-modify-write atomics. The reader loads the high word, the low word,
/// then the high word again, and retries if a carry landed in between.
pub struct SplitTicks {
    high: AtomicU32,
    low: AtomicU32,
}

impl SplitTicks {
    /// A counter starting at zero.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// A counter starting at an arbitrary raw value.
    pub const fn starting_at(raw: u64) -> Self {
        Self {
            high: AtomicU32::new((raw >> 32) as u32),
            low: AtomicU32::new(raw as u32),
        }
    }
}

impl Default for SplitTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickCounter for SplitTicks {
    #[inline]
    fn advance(&self) {
        let low = self.low.load(Ordering::Relaxed).wrapping_add(1);
        if low == 0 {
            let high = self.high.load(Ordering::Relaxed).wrapping_add(1);
            self.high.store(high, Ordering::Release);
        }
        self.low.store(low, Ordering::Release);
    }

    #[inline]
    fn snapshot(&self) -> u64 {
        self.snapshot_with(|| {})
    }
}

impl SplitTicks {
    /// Double-read loop. `between` runs after the low word is read and
    /// before the high word is read again, once per pass.
    #[inline]
    fn snapshot_with(&self, mut between: impl FnMut()) -> u64 {
        loop {
            let high = self.high.load(Ordering::Acquire);
            let low = self.low.load(Ordering::Acquire);
            between();
            if self.high.load(Ordering::Acquire) == high {
                return (u64::from(high) << 32) | u64::from(low);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Critical section
// ---------------------------------------------------------------------------

/// 64-bit counter guarded by a critical section.
///
/// Reads mask interrupts for the duration of a single 64-bit load. Keep it
/// for targets where the double-read loop is not an option.
pub struct CriticalSectionTicks {
    ticks: Mutex<Cell<u64>>,
}

impl CriticalSectionTicks {
    /// A counter starting at zero.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// A counter starting at an arbitrary raw value.
    pub const fn starting_at(raw: u64) -> Self {
        Self {
            ticks: Mutex::new(Cell::new(raw)),
        }
    }
}

impl Default for CriticalSectionTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickCounter for CriticalSectionTicks {
    #[inline]
    fn advance(&self) {
        critical_section::with(|cs| {
            let ticks = self.ticks.borrow(cs);
            ticks.set(ticks.get().wrapping_add(1));
        });
    }

    #[inline]
    fn snapshot(&self) -> u64 {
        critical_section::with(|cs| self.ticks.borrow(cs).get())
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ticks_counts_from_zero() {
        let ticks = SplitTicks::new();
        assert_eq!(ticks.snapshot(), 0);
        for _ in 0..300 {
            ticks.advance();
        }
        assert_eq!(ticks.snapshot(), 300);
    }

    #[test]
    fn test_split_ticks_carries_into_high_word() {
        let ticks = SplitTicks::starting_at(0xFFFF_FFFE);
        ticks.advance();
        assert_eq!(ticks.snapshot(), 0xFFFF_FFFF);
        ticks.advance();
        assert_eq!(ticks.snapshot(), 0x1_0000_0000);
        ticks.advance();
        assert_eq!(ticks.snapshot(), 0x1_0000_0001);
    }

    #[test]
    fn test_split_ticks_retries_when_tick_lands_mid_read() {
        let ticks = SplitTicks::starting_at(0xFFFF_FFFF);
        let mut passes = 0;
        let raw = ticks.snapshot_with(|| {
            if passes == 0 {
                ticks.advance();
            }
            passes += 1;
        });
        assert_eq!(passes, 2);
        assert_eq!(raw, 0x1_0000_0000);
    }

    #[test]
    fn test_split_ticks_keeps_read_when_low_word_moves_mid_read() {
        let ticks = SplitTicks::starting_at(0x2_0000_0010);
        let mut passes = 0;
        let raw = ticks.snapshot_with(|| {
            ticks.advance();
            passes += 1;
        });
        assert_eq!(passes, 1);
        assert_eq!(raw, 0x2_0000_0010);
        assert_eq!(ticks.snapshot(), 0x2_0000_0011);
    }

    #[test]
    fn test_split_ticks_wraps_at_full_width() {
        let ticks = SplitTicks::starting_at(u64::MAX);
        ticks.advance();
        assert_eq!(ticks.snapshot(), 0);
    }

    #[test]
    fn test_critical_section_ticks_match_split_ticks() {
        let split = SplitTicks::starting_at(0xFFFF_FF00);
        let guarded = CriticalSectionTicks::starting_at(0xFFFF_FF00);
        for _ in 0..512 {
            split.advance();
            guarded.advance();
            assert_eq!(split.snapshot(), guarded.snapshot());
        }
        assert_eq!(guarded.snapshot(), 0x1_0000_0100);
    }

    #[test]
    fn test_counter_usable_through_reference() {
        let ticks = CriticalSectionTicks::new();
        let by_ref: &dyn TickCounter = &ticks;
        by_ref.advance();
        by_ref.advance();
        assert_eq!((&ticks).snapshot(), 2);
    }
}
