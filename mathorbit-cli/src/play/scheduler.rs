use log::debug;
use mathorbit_game::{QuizEvent, SchedulerCommand, TimerTicket};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Runs machine timers as tokio tasks, one per ticket.
///
/// Fired timers arrive on the receiver returned by [`TokioScheduler::new`].
/// Dropping the scheduler aborts every task it still owns.
pub struct TokioScheduler {
    events: UnboundedSender<QuizEvent>,
    tasks: HashMap<TimerTicket, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new() -> (Self, UnboundedReceiver<QuizEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                events,
                tasks: HashMap::new(),
            },
            receiver,
        )
    }

    /// Number of timers that have not finished or been cancelled.
    pub fn active(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }

    pub fn apply(&mut self, commands: impl IntoIterator<Item = SchedulerCommand>) {
        self.tasks.retain(|_, task| !task.is_finished());
        for command in commands {
            match command {
                SchedulerCommand::StartCountdown { ticket, period } => {
                    let task = self.spawn_countdown(ticket, period);
                    self.track(ticket, task);
                }
                SchedulerCommand::ScheduleFeedback { ticket, delay } => {
                    let task = self.spawn_feedback(ticket, delay);
                    self.track(ticket, task);
                }
                SchedulerCommand::CancelCountdown { ticket }
                | SchedulerCommand::CancelFeedback { ticket } => {
                    if let Some(task) = self.tasks.remove(&ticket) {
                        task.abort();
                        debug!(target: "timer", "cancelled timer {}", ticket.id());
                    }
                }
            }
        }
    }

    fn track(&mut self, ticket: TimerTicket, task: JoinHandle<()>) {
        if let Some(previous) = self.tasks.insert(ticket, task) {
            previous.abort();
        }
    }

    fn spawn_countdown(&self, ticket: TimerTicket, period: Duration) -> JoinHandle<()> {
        let events = self.events.clone();
        debug!(target: "timer", "countdown {} every {period:?}", ticket.id());
        tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if events.send(QuizEvent::Tick(ticket)).is_err() {
                    break;
                }
            }
        })
    }

    fn spawn_feedback(&self, ticket: TimerTicket, delay: Duration) -> JoinHandle<()> {
        let events = self.events.clone();
        debug!(target: "timer", "feedback {} after {delay:?}", ticket.id());
        tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = events.send(QuizEvent::FeedbackElapsed(ticket));
        })
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
