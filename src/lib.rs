//! # NetLoop: cooperative run loop for a networked Cortex-M4 device
//!
//! NetLoop brings the board up, starts a network protocol stack provided
//! elsewhere, and then runs forever as a cooperative scheduler that services
//! a heartbeat LED, the hardware watchdog, the network stack's polling entry
//! point, and a 2×16 character display showing the current IPv4 address.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │             Firmware entry (main.rs)                    │
//! ├────────────────────────────────────────────────────────┤
//! │            Bring-up (kernel.rs)                         │
//! │   start() · bring_up() · TICKS · on_timer_interrupt()   │
//! ├──────────────┬────────────────────┬───────────────────┤
//! │  Scheduler   │  Display Notifier  │  Network Stack    │
//! │  scheduler.rs│  notifier.rs       │  network.rs       │
//! │  ─ step()    │  ─ check_and_      │  ─ init()         │
//! │  ─ run()     │    refresh()       │  ─ poll()         │
//! ├──────────────┴─────┬──────────────┴───────────────────┤
//! │ Task Table task.rs │ Identity identity.rs · Display    │
//! │ PeriodicTask       │ ConfigStore · IpAddress · LCD buf │
//! ├────────────────────┴───────────────────────────────────┤
//! │   Tick Clock (clock.rs) · Tick Counters (sync.rs)       │
//! │   now() · wrapping_since() · SplitTicks · CS ticks      │
//! ├────────────────────────────────────────────────────────┤
//! │   Arch Port (arch/): Board · Watchdog · SysTick · IWDG  │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Timing Model
//!
//! - SysTick fires at `TICK_HZ` and advances a 64-bit raw counter. That is
//!   the only thing that runs in interrupt context.
//! - The run loop reads a coarsened 32-bit view (`raw >> TICK_SHIFT`) and
//!   decides whether periodic work is due with wrapping subtraction, which is
//!   exact across counter wraparound for intervals below 2^31 ticks.
//! - The watchdog is serviced by the heartbeat task, so every task must
//!   return well within `WATCHDOG_TIMEOUT_MS - HEARTBEAT_PERIOD_MS`.
//!
//! ## Memory Model
//!
//! - **No heap**: task table and report use `heapless::Vec`
//! - **No `alloc`**: pure `core`
//! - **One shared word pair**: the tick counter, read with an untorn
//!   snapshot; everything else is owned by the scheduler's `Context`

#![no_std]

pub mod config;
pub mod error;
pub mod sync;
pub mod clock;
pub mod task;
pub mod identity;
pub mod display;
pub mod notifier;
pub mod network;
pub mod scheduler;
pub mod arch;
pub mod kernel;

pub use error::{Error, Result};
