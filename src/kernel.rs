//! # Kernel
//!
//! Device bring-up and the global tick counter shared with the timer
//! interrupt.
//!
//! ## Startup Sequence
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► Board::take()              ← Board bring-up
//!         └─► kernel::start()
//!               ├─► show banner           ← Line 1 of the display
//!               ├─► start_tick_timer()    ← TickClock init (SysTick)
//!               ├─► ConfigStore::with_mac ← Identity from defaults + serial
//!               ├─► NetworkStack::init()
//!               ├─► start_watchdog()
//!               └─► Scheduler::run()      ← Never returns
//! ```

use embedded_hal::digital::OutputPin;
use log::{error, info, warn};

use crate::arch::Board;
use crate::clock::TickClock;
use crate::config::{BANNER, DEFAULT_MAC, TICK_HZ, WATCHDOG_TIMEOUT_MS};
use crate::display::{CharDisplay, LcdPanel};
use crate::error::Result;
use crate::identity::{ConfigStore, MacAddress};
use crate::network::NetworkStack;
use crate::notifier::DisplayNotifier;
use crate::scheduler::{Context, Scheduler};
use crate::sync::{SplitTicks, TickCounter};

// ---------------------------------------------------------------------------
// Global tick counter
// ---------------------------------------------------------------------------

/// Raw tick counter. Written only by [`on_timer_interrupt`], read only by
/// the run loop through a `TickClock`.
pub static TICKS: SplitTicks = SplitTicks::new();

/// Timer interrupt callback. Registered with the board during bring-up.
pub fn on_timer_interrupt() {
    TICKS.advance();
}

/// The scheduler type produced by bring-up for a given board.
pub type BoardScheduler<'a, C, B, N, P> =
    Scheduler<'a, C, N, P, <B as Board>::Watchdog, <B as Board>::Indicator>;

// ---------------------------------------------------------------------------
// Bring-up
// ---------------------------------------------------------------------------

/// Bring the device up against the global tick counter and start the
/// run loop. **Does not return.**
pub fn start<B, N, P>(mut board: B, stack: N, panel: P) -> !
where
    B: Board,
    N: NetworkStack,
    P: LcdPanel,
{
    match bring_up(&mut board, &TICKS, on_timer_interrupt, stack, panel) {
        Ok(mut scheduler) => scheduler.run(),
        Err(err) => {
            error!("bring-up failed: {}", err);
            loop {
                core::hint::spin_loop();
            }
        }
    }
}

/// Run the startup sequence and return a scheduler ready to run.
///
/// `on_tick` must advance `counter`; it is what the board's timer interrupt
/// calls.
pub fn bring_up<'a, B, C, N, P>(
    board: &mut B,
    counter: &'a C,
    on_tick: fn(),
    mut stack: N,
    panel: P,
) -> Result<BoardScheduler<'a, C, B, N, P>>
where
    B: Board,
    C: TickCounter,
    N: NetworkStack,
    P: LcdPanel,
{
    let mut indicator = board.heartbeat_indicator();
    if indicator.set_low().is_err() {
        warn!("heartbeat indicator did not switch off");
    }

    let mut display = CharDisplay::new(panel);
    display.show_text(0, BANNER)?;

    board.start_tick_timer(TICK_HZ, on_tick);
    let clock = TickClock::new(counter);

    let mac = match board.serial_number() {
        Some(serial) => MacAddress::from_serial(&serial),
        None => {
            warn!("no device serial number; using placeholder MAC");
            MacAddress::new(DEFAULT_MAC)
        }
    };
    let config = ConfigStore::with_mac(mac);
    info!("MAC {} IPv4 {}", config.identity().mac, config.address());

    stack.init(config.identity());

    let watchdog = board.start_watchdog(WATCHDOG_TIMEOUT_MS);

    Scheduler::new(
        clock,
        Context {
            config,
            stack,
            display,
            notifier: DisplayNotifier::new(),
            watchdog,
            indicator,
        },
    )
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    extern crate std;

    use core::convert::Infallible;
    use std::vec::Vec;

    use embedded_hal::digital::{ErrorType, StatefulOutputPin};

    use super::*;
    use crate::arch::Watchdog;
    use crate::config::{HEARTBEAT_PERIOD, TICK_SHIFT};
    use crate::display::DisplayBuffer;
    use crate::identity::NetworkIdentity;
    use crate::sync::CriticalSectionTicks;
    use crate::task::TaskKind;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        IndicatorTaken,
        TickTimer(u32),
        WatchdogArmed(u32),
        StackInit,
    }

    std::thread_local! {
        static EVENTS: core::cell::RefCell<Vec<Event>> = core::cell::RefCell::new(Vec::new());
    }

    fn log_event(event: Event) {
        EVENTS.with(|events| events.borrow_mut().push(event));
    }

    fn take_events() -> Vec<Event> {
        EVENTS.with(|events| core::mem::take(&mut *events.borrow_mut()))
    }

    #[derive(Default)]
    struct FakeLed {
        high: bool,
    }

    impl ErrorType for FakeLed {
        type Error = Infallible;
    }

    impl OutputPin for FakeLed {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    impl StatefulOutputPin for FakeLed {
        fn is_set_high(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(self.high)
        }

        fn is_set_low(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(!self.high)
        }
    }

    struct FakeWatchdog {
        services: u32,
    }

    impl Watchdog for FakeWatchdog {
        fn service(&mut self) {
            self.services += 1;
        }
    }

    struct FakeBoard {
        serial: Option<[u8; 12]>,
        on_tick: Option<fn()>,
    }

    impl Board for FakeBoard {
        type Indicator = FakeLed;
        type Watchdog = FakeWatchdog;

        fn start_tick_timer(&mut self, tick_hz: u32, on_tick: fn()) {
            log_event(Event::TickTimer(tick_hz));
            self.on_tick = Some(on_tick);
        }

        fn start_watchdog(&mut self, timeout_ms: u32) -> FakeWatchdog {
            log_event(Event::WatchdogArmed(timeout_ms));
            FakeWatchdog { services: 0 }
        }

        fn heartbeat_indicator(&mut self) -> FakeLed {
            log_event(Event::IndicatorTaken);
            FakeLed { high: true }
        }

        fn serial_number(&self) -> Option<[u8; 12]> {
            self.serial
        }
    }

    struct RecordingStack {
        initialized_with: Option<NetworkIdentity>,
    }

    impl NetworkStack for RecordingStack {
        fn init(&mut self, identity: &NetworkIdentity) {
            log_event(Event::StackInit);
            self.initialized_with = Some(*identity);
        }

        fn poll(&mut self, _config: &mut ConfigStore) {}
    }

    #[derive(Default)]
    struct RecordingPanel {
        frames: Vec<DisplayBuffer>,
    }

    impl LcdPanel for RecordingPanel {
        fn refresh(&mut self, buffer: &DisplayBuffer) {
            self.frames.push(buffer.clone());
        }
    }

    static BRING_UP_TICKS: CriticalSectionTicks = CriticalSectionTicks::new();

    fn tick_bring_up() {
        BRING_UP_TICKS.advance();
    }

    #[test]
    fn test_bring_up_order() {
        take_events();
        let mut board = FakeBoard {
            serial: Some([7; 12]),
            on_tick: None,
        };
        let stack = RecordingStack {
            initialized_with: None,
        };

        let scheduler = bring_up(
            &mut board,
            &BRING_UP_TICKS,
            tick_bring_up,
            stack,
            RecordingPanel::default(),
        )
        .unwrap();

        assert_eq!(
            take_events(),
            [
                Event::IndicatorTaken,
                Event::TickTimer(TICK_HZ),
                Event::StackInit,
                Event::WatchdogArmed(WATCHDOG_TIMEOUT_MS),
            ]
        );

        let ctx = scheduler.context();
        assert!(!ctx.indicator.high);
        assert_eq!(ctx.watchdog.services, 0);
        assert_eq!(ctx.display.panel().frames.len(), 1);
        assert_eq!(ctx.display.panel().frames[0].line(0), BANNER.as_bytes());

        let initialized = ctx.stack.initialized_with.unwrap();
        assert_eq!(initialized, *ctx.config.identity());
        assert_eq!(initialized.mac, MacAddress::from_serial(&[7; 12]));
        assert_eq!(
            scheduler.tasks().iter().map(|t| t.kind).collect::<Vec<_>>(),
            TaskKind::DEFAULT_ORDER
        );
    }

    #[test]
    fn test_bring_up_without_serial_uses_placeholder_mac() {
        static TICKS_NO_SERIAL: CriticalSectionTicks = CriticalSectionTicks::new();
        let mut board = FakeBoard {
            serial: None,
            on_tick: None,
        };
        let scheduler = bring_up(
            &mut board,
            &TICKS_NO_SERIAL,
            || TICKS_NO_SERIAL.advance(),
            RecordingStack {
                initialized_with: None,
            },
            RecordingPanel::default(),
        )
        .unwrap();

        assert_eq!(scheduler.context().config.identity().mac.octets(), DEFAULT_MAC);
    }

    #[test]
    fn test_registered_tick_callback_drives_heartbeat() {
        static TICKS_DRIVEN: CriticalSectionTicks = CriticalSectionTicks::new();
        let mut board = FakeBoard {
            serial: None,
            on_tick: None,
        };
        let mut scheduler = bring_up(
            &mut board,
            &TICKS_DRIVEN,
            || TICKS_DRIVEN.advance(),
            RecordingStack {
                initialized_with: None,
            },
            RecordingPanel::default(),
        )
        .unwrap();

        let interrupt = board.on_tick.unwrap();
        let raw_per_period = HEARTBEAT_PERIOD << TICK_SHIFT;

        for _ in 0..raw_per_period - 1 {
            interrupt();
        }
        assert!(!scheduler.step().ran(TaskKind::Heartbeat));

        interrupt();
        assert!(scheduler.step().ran(TaskKind::Heartbeat));
        assert_eq!(scheduler.context().watchdog.services, 1);
    }

    #[test]
    fn test_global_counter_advances_from_interrupt_callback() {
        let before = TICKS.snapshot();
        on_timer_interrupt();
        assert!(TICKS.snapshot() > before);
    }
}
