use serde::{Deserialize, Serialize};

use crate::constants::{FEEDBACK_CORRECT, FEEDBACK_INCORRECT_PREFIX};
use crate::presets::{Difficulty, GameMode, OperationGroup};
use crate::problem::Problem;
use crate::session::SessionStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetupStep {
    ChooseGroup,
    ChooseDifficulty,
    ChooseMode,
}

/// Screen the quiz is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    Setup(SetupStep),
    Playing,
    Results,
    History,
}

impl Default for View {
    fn default() -> Self {
        View::Setup(SetupStep::ChooseGroup)
    }
}

/// Choices made during setup; all three are set once a session starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    pub group: Option<OperationGroup>,
    pub difficulty: Option<Difficulty>,
    pub mode: Option<GameMode>,
}

impl Selections {
    #[must_use]
    pub const fn complete(&self) -> Option<(OperationGroup, Difficulty, GameMode)> {
        match (self.group, self.difficulty, self.mode) {
            (Some(group), Some(difficulty), Some(mode)) => Some((group, difficulty, mode)),
            _ => None,
        }
    }
}

/// Transient verdict shown after an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    Correct,
    Incorrect { answer: i64 },
}

impl Feedback {
    #[must_use]
    pub const fn is_correct(self) -> bool {
        matches!(self, Feedback::Correct)
    }

    #[must_use]
    pub fn text(self) -> String {
        match self {
            Feedback::Correct => FEEDBACK_CORRECT.to_string(),
            Feedback::Incorrect { answer } => format!("{FEEDBACK_INCORRECT_PREFIX} {answer}"),
        }
    }
}

/// Why the most recent session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionEnd {
    TimeUp,
    StreakBroken,
    Ended,
    /// No problem could be generated for the selection
    Aborted,
}

/// Difficulty choice as offered during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyOption {
    pub difficulty: Difficulty,
    pub selectable: bool,
}

/// Everything a renderer needs to draw the current screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizState {
    pub view: View,
    pub selections: Selections,
    pub problem: Option<Problem>,
    pub score: u32,
    pub streak: u32,
    pub time_left: u32,
    pub stats: SessionStats,
    pub feedback: Option<Feedback>,
    pub last_end: Option<SessionEnd>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_text_reveals_answer() {
        assert_eq!(Feedback::Correct.text(), "Correct!");
        assert_eq!(
            Feedback::Incorrect { answer: 42 }.text(),
            "Not quite! The answer was 42"
        );
    }

    #[test]
    fn selections_complete_only_with_all_three() {
        let mut sel = Selections {
            group: Some(OperationGroup::A),
            difficulty: Some(Difficulty::Hard),
            mode: None,
        };
        assert!(sel.complete().is_none());
        sel.mode = Some(GameMode::Streak);
        assert_eq!(
            sel.complete(),
            Some((OperationGroup::A, Difficulty::Hard, GameMode::Streak))
        );
    }
}
