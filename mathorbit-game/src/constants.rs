//! Centralized tuning constants for Math Orbit quiz logic.
//!
//! These are the defaults behind [`crate::QuizConfig`]; the generator ranges
//! are fixed and not configurable.

// Scoring and pacing -------------------------------------------------------
pub(crate) const POINTS_PER_CORRECT: u32 = 10;
pub(crate) const TIME_LIMIT_SECS: u32 = 60;
pub(crate) const FEEDBACK_DELAY_MS: u64 = 400;
pub(crate) const COUNTDOWN_PERIOD_MS: u64 = 1_000;

// History ------------------------------------------------------------------
pub const HISTORY_KEY: &str = "mathOrbitHistory";
pub(crate) const HISTORY_CAPACITY: usize = 15;

// Generator ranges ---------------------------------------------------------
pub(crate) const PRODUCT_OPERAND_MIN: i64 = 2;
pub(crate) const PRODUCT_OPERAND_MAX: i64 = 12;
pub(crate) const MASTER_OPERAND_MIN: i64 = 6;
pub(crate) const MASTER_OPERAND_MAX: i64 = 9;

// Feedback copy ------------------------------------------------------------
pub(crate) const FEEDBACK_CORRECT: &str = "Correct!";
pub(crate) const FEEDBACK_INCORRECT_PREFIX: &str = "Not quite! The answer was";
