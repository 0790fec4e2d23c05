//! Fixed quiz presets: operators, operation groups, difficulties and modes.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arithmetic operator of a generated problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// Apply the operator. Division truncates; callers only build exact quotients.
    #[must_use]
    pub const fn apply(self, lhs: i64, rhs: i64) -> i64 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide => lhs / rhs,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Top-level operator pairing offered as the first setup choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationGroup {
    /// Multiplication & division
    A,
    /// Addition & subtraction
    B,
}

impl OperationGroup {
    pub const ALL: [OperationGroup; 2] = [OperationGroup::A, OperationGroup::B];

    #[must_use]
    pub const fn operators(self) -> &'static [Operator] {
        match self {
            OperationGroup::A => &[Operator::Multiply, Operator::Divide],
            OperationGroup::B => &[Operator::Add, Operator::Subtract],
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            OperationGroup::A => "Multiplication & Division",
            OperationGroup::B => "Addition & Subtraction",
        }
    }
}

impl fmt::Display for OperationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationGroup::A => write!(f, "A"),
            OperationGroup::B => write!(f, "B"),
        }
    }
}

/// Difficulty preset bundling an additive operand range and permitted operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Master,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Master,
    ];

    /// Inclusive operand range used for addition and subtraction.
    #[must_use]
    pub const fn range(self) -> (i64, i64) {
        match self {
            Difficulty::Easy => (1, 20),
            Difficulty::Medium => (1, 100),
            Difficulty::Hard => (2, 150),
            Difficulty::Master => (6, 9),
        }
    }

    #[must_use]
    pub const fn operators(self) -> &'static [Operator] {
        match self {
            Difficulty::Easy => &[Operator::Add, Operator::Subtract],
            Difficulty::Medium => &[Operator::Add, Operator::Subtract, Operator::Multiply],
            Difficulty::Hard => &[
                Operator::Add,
                Operator::Subtract,
                Operator::Multiply,
                Operator::Divide,
            ],
            Difficulty::Master => &[Operator::Multiply, Operator::Divide],
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Master => "Master (6-9)",
        }
    }

    /// Short description shown next to the option during setup.
    #[must_use]
    pub const fn blurb(self) -> &'static str {
        match self {
            Difficulty::Easy => "Numbers 1-20",
            Difficulty::Medium => "Up to 100",
            Difficulty::Hard => "Up to 150",
            Difficulty::Master => "Focus on 6-9 (x, /)",
        }
    }

    /// Operators permitted by both this preset and `group`, in preset order.
    #[must_use]
    pub fn shared_operators(self, group: OperationGroup) -> Vec<Operator> {
        let allowed = group.operators();
        self.operators()
            .iter()
            .copied()
            .filter(|op| allowed.contains(op))
            .collect()
    }

    #[must_use]
    pub fn is_compatible_with(self, group: OperationGroup) -> bool {
        self.operators()
            .iter()
            .any(|op| group.operators().contains(op))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
            Difficulty::Master => write!(f, "master"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Countdown against the clock
    Time,
    /// Open-ended drill, ends on request
    Practice,
    /// First miss ends the run
    Streak,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Time, GameMode::Practice, GameMode::Streak];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            GameMode::Time => "Time Challenge",
            GameMode::Practice => "Practice Mode",
            GameMode::Streak => "Streak Mode",
        }
    }

    #[must_use]
    pub const fn is_timed(self) -> bool {
        matches!(self, GameMode::Time)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Time => write!(f, "time"),
            GameMode::Practice => write!(f, "practice"),
            GameMode::Streak => write!(f, "streak"),
        }
    }
}
