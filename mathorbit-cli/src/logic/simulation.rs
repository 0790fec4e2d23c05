use anyhow::Result;
use chrono::DateTime;
use mathorbit_game::{
    Difficulty, FixedClock, GameMode, HistoryLog, IgnoreReason, MemoryStore, OperationGroup,
    QuizConfig, QuizEvent, QuizMachine, QuizState, View, VirtualScheduler,
};
use std::sync::Arc;
use std::time::Duration;

use crate::logic::policy::AnswerStrategy;

/// Upper bound on machine steps per run; a healthy session needs far fewer.
const MAX_STEPS: usize = 100_000;

/// Declarative plan for one automated quiz session.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub group: OperationGroup,
    pub difficulty: Difficulty,
    pub mode: GameMode,
    pub strategy: AnswerStrategy,
    /// End the session after this many answers
    pub max_answers: Option<u32>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(
        group: OperationGroup,
        difficulty: Difficulty,
        mode: GameMode,
        strategy: AnswerStrategy,
    ) -> Self {
        Self {
            group,
            difficulty,
            mode,
            strategy,
            max_answers: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_answers(mut self, max_answers: u32) -> Self {
        self.max_answers = Some(max_answers);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }

    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "{} / {} / {} / {}",
            self.group,
            self.difficulty,
            self.mode,
            self.strategy.label()
        )
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Complete record of a simulated session.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: AnswerStrategy,
    pub final_state: QuizState,
    pub history: HistoryLog,
    /// Raw history record as written to the store
    pub stored_record: Option<String>,
    pub ignored: Vec<IgnoreReason>,
    /// Virtual time from mode selection to the end of the session
    pub elapsed: Duration,
    pub steps: usize,
}

impl SimulationSummary {
    #[must_use]
    pub fn finished(&self) -> bool {
        self.final_state.view == View::Results
    }
}

/// Headless deterministic runner driving the quiz machine on a virtual clock.
#[derive(Debug, Clone)]
pub struct QuizSimulator {
    config: QuizConfig,
    verbose: bool,
}

impl QuizSimulator {
    #[must_use]
    pub const fn new(config: QuizConfig, verbose: bool) -> Self {
        Self { config, verbose }
    }

    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let store = MemoryStore::default();
        let mut machine = QuizMachine::seeded(store.clone(), seed, self.config.clone())
            .with_clock(FixedClock(DateTime::UNIX_EPOCH));
        let mut scheduler = VirtualScheduler::new();
        let mut policy = plan.strategy.create_policy(seed);
        let mut ignored = Vec::new();
        let mut answered = 0_u32;
        let mut steps = 0_usize;

        if self.verbose {
            println!(
                "🎮 Starting simulation | seed:{seed} plan:{} policy:{}",
                plan.describe(),
                policy.name()
            );
        }

        for event in [
            QuizEvent::SelectGroup(plan.group),
            QuizEvent::SelectDifficulty(plan.difficulty),
            QuizEvent::SelectMode(plan.mode),
        ] {
            let dispatch = machine.dispatch(event);
            if let Some(reason) = dispatch.ignored() {
                ignored.push(reason);
            }
            scheduler.apply(dispatch.into_commands());
        }

        while machine.state().view == View::Playing && steps < MAX_STEPS {
            steps += 1;
            let state = machine.state();

            let event = if state.feedback.is_none() {
                if plan.max_answers.is_some_and(|limit| answered >= limit) {
                    Some(QuizEvent::EndSession)
                } else {
                    state
                        .problem
                        .as_ref()
                        .and_then(|problem| policy.answer(problem))
                        .map(|reply| {
                            answered += 1;
                            QuizEvent::SubmitAnswer(reply)
                        })
                }
            } else {
                None
            };

            // Nothing to say and nothing scheduled: only the player can end it.
            let event = event
                .or_else(|| scheduler.pop_next())
                .unwrap_or(QuizEvent::EndSession);

            let dispatch = machine.dispatch(event);
            if let Some(reason) = dispatch.ignored() {
                ignored.push(reason);
            }
            scheduler.apply(dispatch.into_commands());
        }

        let final_state = machine.state().clone();
        if self.verbose {
            println!(
                "🏁 Finished | score:{} correct:{} incorrect:{} end:{:?} virtual:{:?}",
                final_state.score,
                final_state.stats.correct,
                final_state.stats.incorrect,
                final_state.last_end,
                scheduler.now()
            );
        }

        SimulationSummary {
            seed,
            strategy: plan.strategy,
            history: machine.history().clone(),
            stored_record: store.raw(&self.config.history_key),
            final_state,
            ignored,
            elapsed: scheduler.now(),
            steps,
        }
    }
}
