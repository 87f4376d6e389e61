//! # Architecture Abstraction Layer
//!
//! The hardware boundary of the run loop. A [`Board`] knows how to start the
//! periodic tick timer, arm the watchdog, hand out the heartbeat indicator,
//! and read the chip's serial number. Everything above this layer is
//! target-independent and runs in host unit tests.
//!
//! Currently implements the STM32F4 (Cortex-M4) port; other targets add a
//! sibling module.

use embedded_hal::digital::StatefulOutputPin;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod cortex_m4;

/// Hardware watchdog handle. Once started, the device resets unless
/// [`service`](Watchdog::service) is called within the expiry window.
pub trait Watchdog {
    fn service(&mut self);
}

impl<W: Watchdog + ?Sized> Watchdog for &mut W {
    fn service(&mut self) {
        (**self).service()
    }
}

/// Board bring-up and interrupt wiring.
pub trait Board {
    /// Heartbeat LED.
    type Indicator: StatefulOutputPin;
    /// Armed watchdog.
    type Watchdog: Watchdog;

    /// Start a periodic timer interrupt at `tick_hz` that calls `on_tick`
    /// once per period. The callback runs in interrupt context.
    fn start_tick_timer(&mut self, tick_hz: u32, on_tick: fn());

    /// Arm the watchdog with an expiry window of at least `timeout_ms`.
    fn start_watchdog(&mut self, timeout_ms: u32) -> Self::Watchdog;

    /// Take the heartbeat indicator, configured as an output and off.
    fn heartbeat_indicator(&mut self) -> Self::Indicator;

    /// Factory-programmed unique serial number, if the part has one.
    fn serial_number(&self) -> Option<[u8; 12]>;
}
