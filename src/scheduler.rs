//! # Scheduler
//!
//! The cooperative run loop. There is one steady state, running, entered
//! after bring-up and left only by a hardware reset.
//!
//! ## Iteration
//!
//! Each call to [`Scheduler::step`]:
//! 1. Samples `TickClock::now()` once.
//! 2. Walks the task table in order and runs every task that is due,
//!    stamping it with the sampled time.
//!
//! With the default table that is: heartbeat + watchdog service when the
//! heartbeat period has elapsed, then the network poll, then the display
//! check. Nothing preempts a step; fairness depends only on every task
//! returning promptly.
//!
//! ## Ownership
//!
//! All mutable state the tasks touch (identity, display, watchdog,
//! indicator, network stack) lives in a [`Context`] owned by the scheduler
//! and passed by reference to each task. The only state shared with
//! interrupt context is the tick counter behind the clock.

use embedded_hal::digital::{Error as _, StatefulOutputPin};
use heapless::Vec;
use log::{debug, info, warn};

use crate::arch::Watchdog;
use crate::clock::{Tick, TickClock};
use crate::config::MAX_TASKS;
use crate::display::{CharDisplay, LcdPanel};
use crate::error::{Error, Result};
use crate::identity::ConfigStore;
use crate::network::NetworkStack;
use crate::notifier::DisplayNotifier;
use crate::sync::TickCounter;
use crate::task::{PeriodicTask, TaskKind};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything the periodic tasks operate on.
pub struct Context<N, P: LcdPanel, W, L> {
    /// Network identity, updated by the stack during polls.
    pub config: ConfigStore,
    /// Network stack polled by the network task.
    pub stack: N,
    /// Character display showing the banner and current address.
    pub display: CharDisplay<P>,
    /// Tracks the last address shown on the display.
    pub notifier: DisplayNotifier,
    /// Armed watchdog, serviced by the heartbeat task.
    pub watchdog: W,
    /// Heartbeat LED.
    pub indicator: L,
}

impl<N, P, W, L> Context<N, P, W, L>
where
    N: NetworkStack,
    P: LcdPanel,
    W: Watchdog,
    L: StatefulOutputPin,
{
    /// Run one task. Returns `true` if the task changed something visible
    /// on the display.
    fn dispatch(&mut self, kind: TaskKind) -> bool {
        match kind {
            TaskKind::Heartbeat => {
                if let Err(err) = self.indicator.toggle() {
                    warn!("heartbeat indicator: {:?}", err.kind());
                }
                self.watchdog.service();
                false
            }
            TaskKind::NetworkPoll => {
                self.stack.poll(&mut self.config);
                false
            }
            TaskKind::DisplayRefresh => self
                .notifier
                .check_and_refresh(self.config.identity(), &mut self.display),
        }
    }
}

// ---------------------------------------------------------------------------
// Step report
// ---------------------------------------------------------------------------

/// What a single iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Clock sample the iteration used.
    pub now: Tick,
    /// Tasks that ran, in the order they ran.
    pub ran: Vec<TaskKind, MAX_TASKS>,
    /// The display was refreshed with a new address.
    pub display_refreshed: bool,
}

impl StepReport {
    pub fn ran(&self, kind: TaskKind) -> bool {
        self.ran.contains(&kind)
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Cooperative run loop: a fixed-capacity table of periodic tasks run in
/// registration order against a shared [`Context`].
pub struct Scheduler<'a, C, N, P, W, L>
where
    C: TickCounter,
    P: LcdPanel,
{
    clock: TickClock<'a, C>,
    tasks: Vec<PeriodicTask, MAX_TASKS>,
    context: Context<N, P, W, L>,
    iterations: u32,
}

impl<'a, C, N, P, W, L> Scheduler<'a, C, N, P, W, L>
where
    C: TickCounter,
    N: NetworkStack,
    P: LcdPanel,
    W: Watchdog,
    L: StatefulOutputPin,
{
    /// A scheduler with the default task table. Every task's period starts
    /// counting from the current clock reading.
    pub fn new(clock: TickClock<'a, C>, context: Context<N, P, W, L>) -> Result<Self> {
        let mut scheduler = Self::empty(clock, context);
        for kind in TaskKind::DEFAULT_ORDER {
            scheduler.register(kind, kind.default_period())?;
        }
        Ok(scheduler)
    }

    /// A scheduler with no tasks.
    pub fn empty(clock: TickClock<'a, C>, context: Context<N, P, W, L>) -> Self {
        Self {
            clock,
            tasks: Vec::new(),
            context,
            iterations: 0,
        }
    }

    /// Append a task to the end of the table (lowest priority so far).
    pub fn register(&mut self, kind: TaskKind, period: u32) -> Result<usize> {
        let now = self.clock.now();
        self.tasks
            .push(PeriodicTask::new(kind, period, now))
            .map_err(|_| Error::task_table_full())?;
        debug!("registered {:?} every {} ticks", kind, period);
        Ok(self.tasks.len() - 1)
    }

    /// Run one iteration of the loop.
    pub fn step(&mut self) -> StepReport {
        let now = self.clock.now();
        let mut report = StepReport {
            now,
            ran: Vec::new(),
            display_refreshed: false,
        };

        for task in self.tasks.iter_mut() {
            if !task.is_due(now) {
                continue;
            }
            task.record_run(now);
            report.display_refreshed |= self.context.dispatch(task.kind);
            // Table and report share MAX_TASKS capacity.
            let _ = report.ran.push(task.kind);
        }

        self.iterations = self.iterations.wrapping_add(1);
        report
    }

    /// Run forever.
    pub fn run(&mut self) -> ! {
        info!("scheduler running with {} tasks", self.tasks.len());
        let now = self.clock.now();
        for task in self.tasks.iter_mut() {
            task.restart(now);
        }
        loop {
            self.step();
        }
    }

    pub fn tasks(&self) -> &[PeriodicTask] {
        &self.tasks
    }

    pub fn context(&self) -> &Context<N, P, W, L> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context<N, P, W, L> {
        &mut self.context
    }

    /// Completed iterations. Wraps.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
