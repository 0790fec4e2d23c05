use std::fmt;

use mathorbit_game::Problem;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Answering interface for automated sessions.
pub trait AnswerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Reply to `problem`, or `None` to leave it unanswered.
    fn answer(&mut self, problem: &Problem) -> Option<String>;
}

/// Built-in answering strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnswerStrategy {
    /// Always correct
    Perfect,
    /// Mostly correct, with off-by-one slips and the occasional typo
    Sloppy,
    /// Uniform guesses in 0..=144
    Guesser,
    /// Never answers
    Idle,
    /// Correct for the first `n` problems, wrong afterwards
    MissAfter(u32),
}

impl AnswerStrategy {
    #[must_use]
    pub fn label(self) -> String {
        match self {
            AnswerStrategy::Perfect => "Perfect".to_string(),
            AnswerStrategy::Sloppy => "Sloppy".to_string(),
            AnswerStrategy::Guesser => "Guesser".to_string(),
            AnswerStrategy::Idle => "Idle".to_string(),
            AnswerStrategy::MissAfter(n) => format!("Miss after {n}"),
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn AnswerPolicy + Send> {
        match self {
            AnswerStrategy::Perfect => Box::new(PerfectPolicy),
            AnswerStrategy::Sloppy => Box::new(SloppyPolicy::new(seed)),
            AnswerStrategy::Guesser => Box::new(GuesserPolicy::new(seed)),
            AnswerStrategy::Idle => Box::new(IdlePolicy),
            AnswerStrategy::MissAfter(n) => Box::new(MissAfterPolicy { remaining: n }),
        }
    }
}

impl fmt::Display for AnswerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

struct PerfectPolicy;
struct IdlePolicy;

struct SloppyPolicy {
    rng: ChaCha20Rng,
    accuracy: f64,
}

impl SloppyPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            accuracy: 0.8,
        }
    }
}

struct GuesserPolicy {
    rng: ChaCha20Rng,
}

impl GuesserPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

struct MissAfterPolicy {
    remaining: u32,
}

impl AnswerPolicy for PerfectPolicy {
    fn name(&self) -> &'static str {
        "Perfect"
    }

    fn answer(&mut self, problem: &Problem) -> Option<String> {
        Some(problem.answer.to_string())
    }
}

impl AnswerPolicy for SloppyPolicy {
    fn name(&self) -> &'static str {
        "Sloppy"
    }

    fn answer(&mut self, problem: &Problem) -> Option<String> {
        if self.rng.gen_bool(self.accuracy) {
            return Some(problem.answer.to_string());
        }
        // A stray leading key leaves no leading integer to read.
        if self.rng.gen_ratio(1, 4) {
            return Some(format!("w{}", problem.answer));
        }
        let slip = if self.rng.gen_bool(0.5) { 1 } else { -1 };
        Some((problem.answer + slip).to_string())
    }
}

impl AnswerPolicy for GuesserPolicy {
    fn name(&self) -> &'static str {
        "Guesser"
    }

    fn answer(&mut self, _problem: &Problem) -> Option<String> {
        Some(self.rng.gen_range(0..=144_i64).to_string())
    }
}

impl AnswerPolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn answer(&mut self, _problem: &Problem) -> Option<String> {
        None
    }
}

impl AnswerPolicy for MissAfterPolicy {
    fn name(&self) -> &'static str {
        "MissAfter"
    }

    fn answer(&mut self, problem: &Problem) -> Option<String> {
        if self.remaining == 0 {
            return Some((problem.answer + 1).to_string());
        }
        self.remaining -= 1;
        Some(problem.answer.to_string())
    }
}
