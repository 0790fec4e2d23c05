//! Per-session outcome tracking.
use serde::{Deserialize, Serialize};

use crate::numbers::percent;
use crate::problem::Problem;

/// A submitted answer and whether it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemAttempt {
    pub problem: Problem,
    pub given: String,
    pub correct: bool,
}

impl ProblemAttempt {
    #[must_use]
    pub fn grade(problem: Problem, given: impl Into<String>) -> Self {
        let given = given.into();
        let correct = problem.is_answered_by(&given);
        Self {
            problem,
            given,
            correct,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub correct: u32,
    pub incorrect: u32,
    pub attempts: Vec<ProblemAttempt>,
}

impl SessionStats {
    pub fn record(&mut self, attempt: ProblemAttempt) {
        if attempt.correct {
            self.correct = self.correct.saturating_add(1);
        } else {
            self.incorrect = self.incorrect.saturating_add(1);
        }
        self.attempts.push(attempt);
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.correct.saturating_add(self.incorrect)
    }

    /// Rounded percentage of correct answers; 0 before any attempt.
    #[must_use]
    pub fn accuracy(&self) -> u32 {
        percent(self.correct, self.total())
    }
}
