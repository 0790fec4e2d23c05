//! Tunable quiz settings with defaults and JSON loading.
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    COUNTDOWN_PERIOD_MS, FEEDBACK_DELAY_MS, HISTORY_CAPACITY, HISTORY_KEY, POINTS_PER_CORRECT,
    TIME_LIMIT_SECS,
};
use crate::error::QuizError;

/// Runtime configuration for a quiz machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Seconds on the clock at the start of a timed session
    pub time_limit_secs: u32,
    /// How long answer feedback stays up before the next problem
    pub feedback_delay_ms: u64,
    /// Interval between countdown ticks
    pub countdown_period_ms: u64,
    pub points_per_correct: u32,
    pub history_capacity: usize,
    pub history_key: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: TIME_LIMIT_SECS,
            feedback_delay_ms: FEEDBACK_DELAY_MS,
            countdown_period_ms: COUNTDOWN_PERIOD_MS,
            points_per_correct: POINTS_PER_CORRECT,
            history_capacity: HISTORY_CAPACITY,
            history_key: HISTORY_KEY.to_string(),
        }
    }
}

impl QuizConfig {
    /// Parse a configuration document; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value fails validation.
    pub fn from_json(json: &str) -> Result<Self, QuizError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`QuizError::InvalidConfig`] for a zero time limit, countdown
    /// period or history capacity.
    pub fn validate(&self) -> Result<(), QuizError> {
        ensure_at_least("time_limit_secs", u64::from(self.time_limit_secs), 1)?;
        ensure_at_least("countdown_period_ms", self.countdown_period_ms, 1)?;
        ensure_at_least(
            "history_capacity",
            u64::try_from(self.history_capacity).unwrap_or(u64::MAX),
            1,
        )?;
        Ok(())
    }

    #[must_use]
    pub const fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }

    #[must_use]
    pub const fn countdown_period(&self) -> Duration {
        Duration::from_millis(self.countdown_period_ms)
    }
}

fn ensure_at_least(field: &'static str, value: u64, min: u64) -> Result<(), QuizError> {
    if value < min {
        return Err(QuizError::InvalidConfig { field, min, value });
    }
    Ok(())
}
