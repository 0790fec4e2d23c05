//! Timer commands emitted by the quiz machine and a virtual-clock executor.
//!
//! The machine never sleeps. It asks its driver to start or cancel timers,
//! identified by a [`TimerTicket`], and later receives the matching
//! [`QuizEvent`] back. Events whose ticket is no longer live are dropped by
//! the machine, so a driver may deliver late without corrupting state.
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::machine::QuizEvent;

/// Identifier of one scheduled timer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerTicket(pub(crate) u64);

impl TimerTicket {
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Work the driver must perform after an event is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Deliver [`QuizEvent::Tick`] every `period` until cancelled.
    StartCountdown { ticket: TimerTicket, period: Duration },
    CancelCountdown { ticket: TimerTicket },
    /// Deliver [`QuizEvent::FeedbackElapsed`] once after `delay`.
    ScheduleFeedback { ticket: TimerTicket, delay: Duration },
    CancelFeedback { ticket: TimerTicket },
}

/// Wall-clock source for session timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    ticket: TimerTicket,
    due: Duration,
    period: Option<Duration>,
}

impl PendingTimer {
    fn event(&self) -> QuizEvent {
        if self.period.is_some() {
            QuizEvent::Tick(self.ticket)
        } else {
            QuizEvent::FeedbackElapsed(self.ticket)
        }
    }
}

/// Deterministic scheduler driven by an explicit virtual clock.
#[derive(Debug, Clone, Default)]
pub struct VirtualScheduler {
    now: Duration,
    pending: Vec<PendingTimer>,
}

impl VirtualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn has_countdown(&self) -> bool {
        self.pending.iter().any(|timer| timer.period.is_some())
    }

    pub fn apply(&mut self, commands: impl IntoIterator<Item = SchedulerCommand>) {
        for command in commands {
            match command {
                SchedulerCommand::StartCountdown { ticket, period } => {
                    self.pending.push(PendingTimer {
                        ticket,
                        due: self.now + period,
                        period: Some(period),
                    });
                }
                SchedulerCommand::ScheduleFeedback { ticket, delay } => {
                    self.pending.push(PendingTimer {
                        ticket,
                        due: self.now + delay,
                        period: None,
                    });
                }
                SchedulerCommand::CancelCountdown { ticket }
                | SchedulerCommand::CancelFeedback { ticket } => {
                    self.pending.retain(|timer| timer.ticket != ticket);
                }
            }
        }
    }

    /// Pop the earliest timer due at or before `deadline`, moving the clock to it.
    ///
    /// Countdowns re-arm themselves one period later.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<QuizEvent> {
        let (idx, timer) = self
            .pending
            .iter()
            .copied()
            .enumerate()
            .min_by_key(|(_, timer)| (timer.due, timer.ticket))?;
        if timer.due > deadline {
            return None;
        }
        self.now = self.now.max(timer.due);
        match timer.period {
            Some(period) => self.pending[idx].due = timer.due + period,
            None => {
                self.pending.remove(idx);
            }
        }
        Some(timer.event())
    }

    /// Pop the next timer regardless of how far away it is.
    pub fn pop_next(&mut self) -> Option<QuizEvent> {
        self.pop_due(Duration::MAX)
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, instant: Duration) {
        self.now = self.now.max(instant);
    }
}
