//! # Periodic Tasks
//!
//! The run loop's work is an ordered table of periodic tasks. Each entry
//! has a period in coarse ticks and the timestamp of its last run; a period
//! of zero means "every iteration".
//!
//! The table order is the priority order. The default table puts the
//! heartbeat (which also services the watchdog) first so the worst-case
//! time to the next watchdog service is bounded by one network poll and one
//! display check.
//!
//! ```text
//!   iteration ──► Heartbeat ──► NetworkPoll ──► DisplayRefresh ──┐
//!       ▲          (1 s)         (always)        (always)        │
//!       └────────────────────────────────────────────────────────┘
//! ```

use crate::clock::Tick;
use crate::config::HEARTBEAT_PERIOD;

// ---------------------------------------------------------------------------
// Task kinds
// ---------------------------------------------------------------------------

/// What a task does when it is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Toggle the heartbeat indicator and service the watchdog.
    Heartbeat,
    /// Give the network stack one bounded slice of work.
    NetworkPoll,
    /// Show the IPv4 address if it changed.
    DisplayRefresh,
}

impl TaskKind {
    /// Default table, in priority order.
    pub const DEFAULT_ORDER: [TaskKind; 3] = [
        TaskKind::Heartbeat,
        TaskKind::NetworkPoll,
        TaskKind::DisplayRefresh,
    ];

    /// Default period in coarse ticks.
    pub const fn default_period(self) -> u32 {
        match self {
            TaskKind::Heartbeat => HEARTBEAT_PERIOD,
            TaskKind::NetworkPoll | TaskKind::DisplayRefresh => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Task entry
// ---------------------------------------------------------------------------

/// One row of the scheduler's task table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTask {
    pub kind: TaskKind,

    /// Minimum coarse ticks between runs. `0` runs every iteration.
    pub period: u32,

    /// When the task last ran, or when the table was started.
    pub last_run: Tick,

    /// Completed runs. Wraps.
    pub runs: u32,
}

impl PeriodicTask {
    pub const fn new(kind: TaskKind, period: u32, now: Tick) -> Self {
        Self {
            kind,
            period,
            last_run: now,
            runs: 0,
        }
    }

    /// A task with its kind's default period.
    pub const fn with_default_period(kind: TaskKind, now: Tick) -> Self {
        Self::new(kind, kind.default_period(), now)
    }

    /// True once `period` coarse ticks have passed since the last run,
    /// using wraparound-safe subtraction.
    #[inline]
    pub const fn is_due(&self, now: Tick) -> bool {
        self.period == 0 || now.has_elapsed(self.last_run, self.period)
    }

    /// Stamp the run at `now`.
    pub fn record_run(&mut self, now: Tick) {
        self.last_run = now;
        self.runs = self.runs.wrapping_add(1);
    }

    /// Restart the period from `now` without counting a run.
    pub fn restart(&mut self, now: Tick) {
        self.last_run = now;
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order_and_periods() {
        assert_eq!(
            TaskKind::DEFAULT_ORDER,
            [TaskKind::Heartbeat, TaskKind::NetworkPoll, TaskKind::DisplayRefresh]
        );
        assert_eq!(TaskKind::Heartbeat.default_period(), HEARTBEAT_PERIOD);
        assert_eq!(TaskKind::NetworkPoll.default_period(), 0);
        assert_eq!(TaskKind::DisplayRefresh.default_period(), 0);
    }

    #[test]
    fn test_zero_period_always_due() {
        let task = PeriodicTask::new(TaskKind::NetworkPoll, 0, Tick(100));
        assert!(task.is_due(Tick(100)));
        assert!(task.is_due(Tick(99)));
    }

    #[test]
    fn test_due_at_period_boundary_not_before() {
        let mut task = PeriodicTask::new(TaskKind::Heartbeat, 4, Tick(10));
        assert!(!task.is_due(Tick(13)));
        assert!(task.is_due(Tick(14)));

        task.record_run(Tick(14));
        assert_eq!(task.runs, 1);
        assert!(!task.is_due(Tick(17)));
        assert!(task.is_due(Tick(18)));
    }

    #[test]
    fn test_due_across_wraparound() {
        let start = Tick(u32::MAX - 2);
        let task = PeriodicTask::new(TaskKind::Heartbeat, 4, start);
        assert!(!task.is_due(Tick(u32::MAX)));
        assert!(!task.is_due(Tick(0)));
        assert!(task.is_due(Tick(1)));
        assert!(task.is_due(Tick(2)));
    }

    #[test]
    fn test_restart_does_not_count_run() {
        let mut task = PeriodicTask::with_default_period(TaskKind::Heartbeat, Tick(0));
        task.restart(Tick(50));
        assert_eq!(task.runs, 0);
        assert_eq!(task.last_run, Tick(50));
    }
}
