use colored::Colorize;
use mathorbit_game::{QuizConfig, SessionEnd};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::simulation::{QuizSimulator, SimulationPlan, SimulationSummary};
use crate::scenarios::TestScenario;

/// Aggregate of every iteration of one scenario on one base seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    /// Mean final score across iterations
    pub average_score: u32,
    /// Mean session accuracy across iterations, in percent
    pub average_accuracy: u32,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// How one simulated quiz session went and whether the plan accepted it.
#[derive(Debug, Clone)]
struct IterationOutcome {
    seed: u64,
    end: Option<SessionEnd>,
    score: u32,
    accuracy: u32,
    answered: u32,
    virtual_time: Duration,
    wall_time: Duration,
    rejection: Option<String>,
}

impl IterationOutcome {
    fn from_summary(summary: &SimulationSummary, plan: &SimulationPlan, wall_time: Duration) -> Self {
        let state = &summary.final_state;
        let rejection = plan
            .expectations
            .iter()
            .find_map(|expectation| expectation.evaluate(summary).err())
            .map(|err| format!("{err:#}"));
        Self {
            seed: summary.seed,
            end: state.last_end,
            score: state.score,
            accuracy: state.stats.accuracy(),
            answered: state.stats.total(),
            virtual_time: summary.elapsed,
            wall_time,
            rejection,
        }
    }

    fn headline(&self) -> String {
        let end = self
            .end
            .map_or_else(|| "unfinished".to_string(), |end| format!("{end:?}"));
        format!(
            "seed {} · {end} after {:?} · {} answered · score {} · {}%",
            self.seed, self.virtual_time, self.answered, self.score, self.accuracy
        )
    }
}

impl ScenarioResult {
    fn from_outcomes(scenario_name: &str, seed: u64, outcomes: &[IterationOutcome]) -> Self {
        let failures: Vec<String> = outcomes
            .iter()
            .filter_map(|o| {
                o.rejection
                    .as_ref()
                    .map(|why| format!("{why} ({})", o.headline()))
            })
            .collect();
        let runs = u32::try_from(outcomes.len()).unwrap_or(u32::MAX).max(1);
        let total_score: u64 = outcomes.iter().map(|o| u64::from(o.score)).sum();
        let total_accuracy: u64 = outcomes.iter().map(|o| u64::from(o.accuracy)).sum();
        let performance_data: Vec<Duration> = outcomes.iter().map(|o| o.wall_time).collect();

        Self {
            scenario_name: scenario_name.to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: outcomes.len(),
            successful_iterations: outcomes.len() - failures.len(),
            failures,
            average_score: u32::try_from(total_score / u64::from(runs)).unwrap_or(u32::MAX),
            average_accuracy: u32::try_from(total_accuracy / u64::from(runs)).unwrap_or(100),
            average_duration: performance_data.iter().sum::<Duration>() / runs,
            performance_data,
        }
    }
}

/// Runs catalog scenarios through the simulator across seeds.
pub struct LogicTester {
    simulator: QuizSimulator,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(config: QuizConfig, verbose: bool) -> Self {
        Self {
            simulator: QuizSimulator::new(config, verbose),
            verbose,
        }
    }

    /// One result per base seed; iteration `i` plays seed `base + i`.
    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 {} [{}] from seed {seed}",
                        scenario.name.bright_white(),
                        scenario.plan.describe()
                    );
                }
                let outcomes: Vec<IterationOutcome> = (0..iterations)
                    .map(|i| self.play_once(&scenario.plan, seed.wrapping_add(i as u64)))
                    .collect();
                ScenarioResult::from_outcomes(scenario.name, seed, &outcomes)
            })
            .collect()
    }

    fn play_once(&self, plan: &SimulationPlan, seed: u64) -> IterationOutcome {
        let started = Instant::now();
        let summary = self.simulator.run_plan(plan, seed);
        let outcome = IterationOutcome::from_summary(&summary, plan, started.elapsed());
        if self.verbose {
            match &outcome.rejection {
                None => println!("  ✅ {}", outcome.headline()),
                Some(why) => println!("  ❌ {} | {}", outcome.headline(), why.red()),
            }
        }
        outcome
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
