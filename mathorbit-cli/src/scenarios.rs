//! Catalog of scripted quiz sessions for logic mode.
use anyhow::{Result, ensure};
use mathorbit_game::{Difficulty, GameMode, OperationGroup, Operator, SessionEnd};

use crate::logic::{AnswerStrategy, SimulationPlan, SimulationSummary};

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub plan: SimulationPlan,
}

impl TestScenario {
    fn new(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        plan: SimulationPlan,
    ) -> Self {
        Self {
            key,
            name,
            description,
            plan,
        }
    }
}

pub fn catalog() -> Vec<TestScenario> {
    vec![
        TestScenario::new(
            "smoke",
            "Smoke",
            "Five perfect practice answers, then end the session",
            SimulationPlan::new(
                OperationGroup::B,
                Difficulty::Easy,
                GameMode::Practice,
                AnswerStrategy::Perfect,
            )
            .with_max_answers(5)
            .with_expectation(smoke_expectation),
        ),
        TestScenario::new(
            "easy-practice-bounds",
            "Easy Practice Bounds",
            "Easy addition/subtraction stays within 1-20 and never goes negative",
            SimulationPlan::new(
                OperationGroup::B,
                Difficulty::Easy,
                GameMode::Practice,
                AnswerStrategy::Sloppy,
            )
            .with_max_answers(200)
            .with_expectation(easy_bounds_expectation)
            .with_expectation(accuracy_matches_counts),
        ),
        TestScenario::new(
            "division-integrity",
            "Division Integrity",
            "Every hard division problem has a whole quotient",
            SimulationPlan::new(
                OperationGroup::A,
                Difficulty::Hard,
                GameMode::Practice,
                AnswerStrategy::Perfect,
            )
            .with_max_answers(500)
            .with_expectation(division_expectation),
        ),
        TestScenario::new(
            "master-range",
            "Master Range",
            "Master problems only use factors 6-9",
            SimulationPlan::new(
                OperationGroup::A,
                Difficulty::Master,
                GameMode::Practice,
                AnswerStrategy::Perfect,
            )
            .with_max_answers(300)
            .with_expectation(master_range_expectation),
        ),
        TestScenario::new(
            "streak-break",
            "Streak Break",
            "First miss in streak mode ends the session",
            SimulationPlan::new(
                OperationGroup::A,
                Difficulty::Medium,
                GameMode::Streak,
                AnswerStrategy::MissAfter(5),
            )
            .with_expectation(streak_break_expectation),
        ),
        TestScenario::new(
            "time-expiry",
            "Time Expiry",
            "An unanswered timed session ends after the full countdown",
            SimulationPlan::new(
                OperationGroup::A,
                Difficulty::Hard,
                GameMode::Time,
                AnswerStrategy::Idle,
            )
            .with_expectation(time_expiry_expectation),
        ),
        TestScenario::new(
            "timed-run",
            "Timed Run",
            "A guessing player keeps scoring consistent under the clock",
            SimulationPlan::new(
                OperationGroup::B,
                Difficulty::Medium,
                GameMode::Time,
                AnswerStrategy::Guesser,
            )
            .with_expectation(timed_run_expectation)
            .with_expectation(accuracy_matches_counts),
        ),
    ]
}

pub fn find_scenario(key: &str) -> Option<TestScenario> {
    catalog().into_iter().find(|scenario| scenario.key == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

pub fn scenario_keys() -> Vec<String> {
    catalog()
        .into_iter()
        .map(|scenario| scenario.key.to_string())
        .collect()
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(summary.finished(), "session did not reach results");
    ensure!(
        state.last_end == Some(SessionEnd::Ended),
        "expected an ended session, got {:?}",
        state.last_end
    );
    ensure!(state.stats.correct == 5, "correct {}", state.stats.correct);
    ensure!(state.score == 50, "score {}", state.score);
    ensure!(summary.history.len() == 1, "history {}", summary.history.len());
    ensure!(summary.ignored.is_empty(), "ignored {:?}", summary.ignored);
    let record = summary
        .stored_record
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("history was not persisted"))?;
    ensure!(record.contains("\"Practice Mode\""), "record {record}");
    Ok(())
}

fn easy_bounds_expectation(summary: &SimulationSummary) -> Result<()> {
    for attempt in &summary.final_state.stats.attempts {
        let p = attempt.problem;
        ensure!(
            matches!(p.operator, Operator::Add | Operator::Subtract),
            "unexpected operator in {p}"
        );
        ensure!((1..=20).contains(&p.operand1), "operand out of range in {p}");
        ensure!((1..=20).contains(&p.operand2), "operand out of range in {p}");
        ensure!(p.answer >= 0, "negative answer for {p}");
    }
    ensure!(
        summary.final_state.stats.total() == 200,
        "attempts {}",
        summary.final_state.stats.total()
    );
    Ok(())
}

fn division_expectation(summary: &SimulationSummary) -> Result<()> {
    let mut divisions = 0;
    for attempt in &summary.final_state.stats.attempts {
        let p = attempt.problem;
        if p.operator == Operator::Divide {
            divisions += 1;
            ensure!(p.operand1 % p.operand2 == 0, "{p} is not exact");
            ensure!(p.operand1 / p.operand2 == p.answer, "{p} != {}", p.answer);
        }
    }
    ensure!(divisions > 0, "no division problems generated");
    Ok(())
}

fn master_range_expectation(summary: &SimulationSummary) -> Result<()> {
    for attempt in &summary.final_state.stats.attempts {
        let p = attempt.problem;
        let (lhs, rhs) = match p.operator {
            Operator::Multiply => (p.operand1, p.operand2),
            Operator::Divide => (p.answer, p.operand2),
            other => anyhow::bail!("master produced operator {other}"),
        };
        ensure!((6..=9).contains(&lhs), "factor out of range in {p}");
        ensure!((6..=9).contains(&rhs), "factor out of range in {p}");
    }
    Ok(())
}

fn streak_break_expectation(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(
        state.last_end == Some(SessionEnd::StreakBroken),
        "expected a broken streak, got {:?}",
        state.last_end
    );
    ensure!(state.stats.correct == 5, "correct {}", state.stats.correct);
    ensure!(state.stats.incorrect == 1, "incorrect {}", state.stats.incorrect);
    ensure!(state.streak == 0, "streak {}", state.streak);
    let saved = summary
        .history
        .newest()
        .ok_or_else(|| anyhow::anyhow!("session was not recorded"))?;
    ensure!(saved.accuracy == 83, "accuracy {}", saved.accuracy);
    ensure!(saved.score == 50, "score {}", saved.score);
    Ok(())
}

fn time_expiry_expectation(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(
        state.last_end == Some(SessionEnd::TimeUp),
        "expected time up, got {:?}",
        state.last_end
    );
    ensure!(state.time_left == 0, "time left {}", state.time_left);
    ensure!(state.stats.total() == 0, "attempts {}", state.stats.total());
    ensure!(
        summary.elapsed.as_secs() == 60,
        "virtual time {:?}",
        summary.elapsed
    );
    let saved = summary
        .history
        .newest()
        .ok_or_else(|| anyhow::anyhow!("session was not recorded"))?;
    ensure!(saved.accuracy == 0 && saved.score == 0, "saved {saved:?}");
    Ok(())
}

fn timed_run_expectation(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(
        state.last_end == Some(SessionEnd::TimeUp),
        "expected time up, got {:?}",
        state.last_end
    );
    ensure!(
        state.score == state.stats.correct * 10,
        "score {} for {} correct",
        state.score,
        state.stats.correct
    );
    ensure!(state.stats.total() > 100, "only {} answers", state.stats.total());
    ensure!(
        summary.ignored.is_empty(),
        "ignored events {:?}",
        summary.ignored
    );
    let record = summary.stored_record.as_deref().unwrap_or_default();
    ensure!(record.contains("\"Time Challenge\""), "record {record}");
    Ok(())
}

fn accuracy_matches_counts(summary: &SimulationSummary) -> Result<()> {
    let stats = &summary.final_state.stats;
    let saved = summary
        .history
        .newest()
        .ok_or_else(|| anyhow::anyhow!("session was not recorded"))?;
    ensure!(
        saved.accuracy == stats.accuracy(),
        "saved accuracy {} vs {}",
        saved.accuracy,
        stats.accuracy()
    );
    ensure!(
        stats.attempts.len() == usize::try_from(stats.total()).unwrap_or(usize::MAX),
        "attempt log out of step with counters"
    );
    Ok(())
}
