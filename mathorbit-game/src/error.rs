use thiserror::Error;

use crate::presets::{Difficulty, OperationGroup};

/// Errors surfaced by the quiz engine.
///
/// None of these are fatal: persistence failures are absorbed by
/// [`crate::HistoryStore`] and a configuration error sends the machine back
/// to setup.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("difficulty {difficulty} shares no operator with group {group}")]
    NoSharedOperator {
        difficulty: Difficulty,
        group: OperationGroup,
    },
    #[error("failed to read history record `{key}`: {reason}")]
    PersistenceRead { key: String, reason: String },
    #[error("failed to write history record `{key}`: {reason}")]
    PersistenceWrite { key: String, reason: String },
    #[error("{field} must be at least {min} (got {value})")]
    InvalidConfig {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("quiz configuration is not valid JSON: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
