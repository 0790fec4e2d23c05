use crate::presets::{Difficulty, GameMode, OperationGroup};
use crate::schedule::{SchedulerCommand, TimerTicket};

/// Input accepted by [`super::QuizMachine::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    SelectGroup(OperationGroup),
    SelectDifficulty(Difficulty),
    SelectMode(GameMode),
    /// Step back within setup
    Back,
    OpenHistory,
    CloseHistory,
    SubmitAnswer(String),
    /// Stop the running session and go to results
    EndSession,
    /// Leave results for a fresh setup
    NewMission,
    Tick(TimerTicket),
    FeedbackElapsed(TimerTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The event has no meaning on the current screen
    WrongView,
    EmptyAnswer,
    FeedbackPending,
    /// Difficulty shares no operator with the chosen group
    Incompatible,
    /// Timer event for a task that was cancelled or replaced
    StaleTimer,
}

/// Result of dispatching one event.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Applied(Vec<SchedulerCommand>),
    Ignored(IgnoreReason),
}

impl Dispatch {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Dispatch::Applied(_))
    }

    #[must_use]
    pub const fn ignored(&self) -> Option<IgnoreReason> {
        match self {
            Dispatch::Ignored(reason) => Some(*reason),
            Dispatch::Applied(_) => None,
        }
    }

    /// Scheduler work to perform; empty when the event was ignored.
    #[must_use]
    pub fn into_commands(self) -> Vec<SchedulerCommand> {
        match self {
            Dispatch::Applied(commands) => commands,
            Dispatch::Ignored(_) => Vec::new(),
        }
    }
}
