//! Math Orbit quiz engine
//!
//! Platform-agnostic core logic for the Math Orbit arithmetic quiz: problem
//! generation, session scoring, persisted history and the screen state
//! machine. Terminals, timers and storage are supplied by the host.

pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod machine;
pub mod numbers;
pub mod presets;
pub mod problem;
pub mod schedule;
pub mod session;
pub mod storage;

pub use config::QuizConfig;
pub use error::QuizError;
pub use history::{HistoryLog, HistoryStore, ProgressPoint, SessionSettings, SessionSummary};
pub use machine::{
    DifficultyOption, Dispatch, Feedback, IgnoreReason, QuizEvent, QuizMachine, QuizState,
    Selections, SessionEnd, SetupStep, View,
};
pub use presets::{Difficulty, GameMode, OperationGroup, Operator};
pub use problem::{Problem, generate_problem, parse_answer};
pub use schedule::{Clock, FixedClock, SchedulerCommand, SystemClock, TimerTicket, VirtualScheduler};
pub use session::{ProblemAttempt, SessionStats};
pub use storage::{MemoryStore, MemoryStoreError};

/// Trait for abstracting string record persistence
/// Platform-specific implementations should provide this
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the record stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Replace the record stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    type Error = T::Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set(key, value)
    }
}
