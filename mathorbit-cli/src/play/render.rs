//! Text rendering of quiz screens.
use colored::Colorize;
use mathorbit_game::{
    DifficultyOption, GameMode, HistoryLog, IgnoreReason, OperationGroup, Operator,
    ProblemAttempt, QuizState, SessionEnd, SetupStep, View,
};
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

fn operator_glyph(operator: Operator) -> char {
    match operator {
        Operator::Add => '+',
        Operator::Subtract => '-',
        Operator::Multiply => '×',
        Operator::Divide => '÷',
    }
}

fn mode_blurb(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Time => "beat the clock",
        GameMode::Practice => "no clock, type `end` to finish",
        GameMode::Streak => "one miss ends the run",
    }
}

fn end_reason(end: SessionEnd) -> &'static str {
    match end {
        SessionEnd::TimeUp => "Time's up!",
        SessionEnd::StreakBroken => "Streak broken",
        SessionEnd::Ended => "Mission ended",
        SessionEnd::Aborted => "Mission aborted",
    }
}

/// Full screen for the current view.
pub fn render_screen(
    state: &QuizState,
    difficulties: &[DifficultyOption],
    history: &HistoryLog,
) -> String {
    let mut out = String::new();
    match state.view {
        View::Setup(step) => render_setup(&mut out, state, step, difficulties),
        View::Playing => render_playing(&mut out, state),
        View::Results => render_results(&mut out, state),
        View::History => render_history(&mut out, history),
    }
    out
}

fn render_setup(
    out: &mut String,
    state: &QuizState,
    step: SetupStep,
    difficulties: &[DifficultyOption],
) {
    let _ = writeln!(out, "{}", "🚀 Math Orbit".bright_cyan().bold());
    match step {
        SetupStep::ChooseGroup => {
            if state.last_end == Some(SessionEnd::Aborted) {
                let _ = writeln!(
                    out,
                    "{}",
                    "⚠️  That mission could not be generated. Pick again.".yellow()
                );
            }
            let _ = writeln!(out, "Choose your mission:");
            for (key, group) in ["A", "B"].into_iter().zip(OperationGroup::ALL) {
                let _ = writeln!(out, "  [{key}] {}", group.name());
            }
            let _ = writeln!(out, "  [H] Mission history");
        }
        SetupStep::ChooseDifficulty => {
            if let Some(group) = state.selections.group {
                let _ = writeln!(out, "Mission: {}", group.name().bold());
            }
            let _ = writeln!(out, "Choose difficulty:");
            for (idx, option) in difficulties.iter().enumerate() {
                let line = format!(
                    "  [{}] {:<14} {}",
                    idx + 1,
                    option.difficulty.name(),
                    option.difficulty.blurb()
                );
                if option.selectable {
                    let _ = writeln!(out, "{line}");
                } else {
                    let _ = writeln!(out, "{} {}", line.dimmed(), "(unavailable)".dimmed());
                }
            }
            let _ = writeln!(out, "  [B] Back");
        }
        SetupStep::ChooseMode => {
            let _ = writeln!(out, "Choose a mode:");
            for (idx, mode) in GameMode::ALL.into_iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  [{}] {:<15} {}",
                    idx + 1,
                    mode.name(),
                    mode_blurb(mode)
                );
            }
            let _ = writeln!(out, "  [B] Back");
        }
    }
}

fn render_playing(out: &mut String, state: &QuizState) {
    if let (Some(group), Some(difficulty)) = (state.selections.group, state.selections.difficulty)
    {
        let _ = writeln!(
            out,
            "{}",
            format!("{} · {}", group.name(), difficulty.name()).dimmed()
        );
    }
    let mut status = Vec::new();
    if state.selections.mode.is_some_and(GameMode::is_timed) {
        status.push(format!("⏱  {}s", state.time_left));
    }
    status.push(format!("⭐ {}", state.score));
    status.push(format!("🔥 {}", state.streak));
    let _ = writeln!(out, "{}", status.join("   "));

    if let Some(problem) = state.problem {
        let _ = writeln!(
            out,
            "  {} {} {} = ?",
            problem.operand1,
            operator_glyph(problem.operator),
            problem.operand2
        );
    }
    if let Some(feedback) = state.feedback {
        let text = feedback.text();
        if feedback.is_correct() {
            let _ = writeln!(out, "{}", format!("✅ {text}").green());
        } else {
            let _ = writeln!(out, "{}", format!("❌ {text}").red());
        }
    }
}

fn render_results(out: &mut String, state: &QuizState) {
    let _ = writeln!(out, "{}", "🏁 Mission complete".bright_cyan().bold());
    if let Some(end) = state.last_end {
        let _ = writeln!(out, "{}", end_reason(end));
    }
    if let Some(feedback) = state.feedback.filter(|f| !f.is_correct()) {
        let _ = writeln!(out, "{}", feedback.text().red());
    }
    let _ = writeln!(
        out,
        "Score: {}   Accuracy: {}%",
        state.score.to_string().bold(),
        state.stats.accuracy()
    );
    let _ = writeln!(
        out,
        "Correct: {}   Incorrect: {}",
        state.stats.correct.to_string().green(),
        state.stats.incorrect.to_string().red()
    );
    if !state.stats.attempts.is_empty() {
        let _ = writeln!(out, "Problem review:");
        for attempt in &state.stats.attempts {
            let _ = writeln!(out, "{}", review_line(attempt));
        }
    }
    let _ = writeln!(out, "  [N] New mission");
}

fn review_line(attempt: &ProblemAttempt) -> String {
    let problem = attempt.problem;
    let worked = format!(
        "{} {} {} = {}",
        problem.operand1,
        operator_glyph(problem.operator),
        problem.operand2,
        problem.answer
    );
    if attempt.correct {
        format!("  ✅ {worked}")
    } else {
        let given = attempt.given.trim();
        let given = if given.is_empty() { "N/A" } else { given };
        format!("  ❌ {worked}  {}", format!("Your answer: {given}").red())
    }
}

fn render_history(out: &mut String, history: &HistoryLog) {
    let _ = writeln!(out, "{}", "📜 Mission history".bright_cyan().bold());
    if history.is_empty() {
        let _ = writeln!(out, "No missions flown yet.");
    }
    for session in history.entries() {
        let _ = writeln!(
            out,
            "  {}  Score {:>4}  Accuracy {:>3}%  {} · {} · {}",
            session.date.format("%Y-%m-%d %H:%M"),
            session.score,
            session.accuracy,
            session.settings.group,
            session.settings.difficulty,
            session.settings.mode
        );
    }
    if history.has_progress() {
        let points = history.progress();
        let best = points.iter().map(|p| p.score).max().unwrap_or(0).max(1);
        let _ = writeln!(out, "Progress:");
        for point in &points {
            let filled = usize::try_from(point.score)
                .unwrap_or(usize::MAX)
                .saturating_mul(BAR_WIDTH)
                / usize::try_from(best).unwrap_or(1);
            let _ = writeln!(
                out,
                "  {:<8} {:<width$} {} ({}%)",
                point.label,
                "█".repeat(filled),
                point.score,
                point.accuracy,
                width = BAR_WIDTH
            );
        }
    }
    let _ = writeln!(out, "  [B] Back");
}

/// Short status line for a countdown tick, when one is worth printing.
pub fn render_countdown(state: &QuizState) -> Option<String> {
    let left = state.time_left;
    if state.view != View::Playing || !(left <= 5 || left % 10 == 0) {
        return None;
    }
    let line = format!("⏱  {left}s left");
    Some(if left <= 5 {
        line.red().to_string()
    } else {
        line
    })
}

/// Hint for an event the machine refused; silent where nothing useful can be said.
pub fn explain_ignored(reason: IgnoreReason) -> Option<&'static str> {
    match reason {
        IgnoreReason::Incompatible => Some("That difficulty is not available for this mission."),
        IgnoreReason::FeedbackPending => Some("Hold on, the next problem is coming."),
        IgnoreReason::WrongView => Some("That does nothing here. Type `help` for options."),
        IgnoreReason::EmptyAnswer | IgnoreReason::StaleTimer => None,
    }
}

pub fn help_text(view: View) -> &'static str {
    match view {
        View::Setup(SetupStep::ChooseGroup) => "Type A or B to pick a mission, H for history, q to quit.",
        View::Setup(_) => "Type the number of an option, or `back`. q quits.",
        View::Playing => "Type your answer and press enter. `end` finishes, `quit` exits.",
        View::Results => "Press enter for a new mission, q to quit.",
        View::History => "Press enter to go back, q to quit.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mathorbit_game::{
        Difficulty, Feedback, FixedClock, MemoryStore, QuizConfig, QuizEvent, QuizMachine,
        SessionSummary, SessionSettings,
    };

    fn plain() {
        colored::control::set_override(false);
    }

    fn machine() -> QuizMachine<MemoryStore, rand_chacha::ChaCha20Rng> {
        QuizMachine::seeded(MemoryStore::default(), 3, QuizConfig::default())
            .with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()))
    }

    fn screen(machine: &QuizMachine<MemoryStore, rand_chacha::ChaCha20Rng>) -> String {
        render_screen(machine.state(), &machine.difficulty_options(), machine.history())
    }

    #[test]
    fn difficulty_screen_marks_unavailable_options() {
        plain();
        let mut machine = machine();
        let _ = machine.dispatch(QuizEvent::SelectGroup(OperationGroup::B));
        let text = screen(&machine);
        assert!(text.contains("Mission: Addition & Subtraction"));
        let master = text.lines().find(|l| l.contains("Master (6-9)")).unwrap();
        assert!(master.contains("(unavailable)"));
        let easy = text.lines().find(|l| l.contains("Easy")).unwrap();
        assert!(!easy.contains("(unavailable)"));
    }

    #[test]
    fn playing_screen_shows_clock_only_when_timed() {
        plain();
        let mut machine = machine();
        let _ = machine.dispatch(QuizEvent::SelectGroup(OperationGroup::A));
        let _ = machine.dispatch(QuizEvent::SelectDifficulty(Difficulty::Hard));
        let _ = machine.dispatch(QuizEvent::SelectMode(GameMode::Time));
        let text = screen(&machine);
        assert!(text.contains("Multiplication & Division · Hard"));
        assert!(text.contains("⏱  60s"));
        assert!(text.contains("= ?"));
        assert!(text.contains('×') || text.contains('÷'));
    }

    #[test]
    fn results_show_missed_answer_and_reason() {
        plain();
        let mut machine = machine();
        let _ = machine.dispatch(QuizEvent::SelectGroup(OperationGroup::B));
        let _ = machine.dispatch(QuizEvent::SelectDifficulty(Difficulty::Easy));
        let _ = machine.dispatch(QuizEvent::SelectMode(GameMode::Streak));
        let answer = machine.state().problem.unwrap().answer;
        let _ = machine.dispatch(QuizEvent::SubmitAnswer((answer + 1).to_string()));
        let text = screen(&machine);
        assert!(text.contains("Streak broken"));
        assert!(text.contains(&Feedback::Incorrect { answer }.text()));
        assert!(text.contains("Accuracy: 0%"));
    }

    #[test]
    fn results_review_every_attempt() {
        plain();
        let mut machine = machine();
        let _ = machine.dispatch(QuizEvent::SelectGroup(OperationGroup::A));
        let _ = machine.dispatch(QuizEvent::SelectDifficulty(Difficulty::Master));
        let _ = machine.dispatch(QuizEvent::SelectMode(GameMode::Practice));
        let first = machine.state().problem.unwrap();
        let _ = machine.dispatch(QuizEvent::SubmitAnswer(first.answer.to_string()));
        let ticket = machine.feedback_ticket().unwrap();
        let _ = machine.dispatch(QuizEvent::FeedbackElapsed(ticket));
        let second = machine.state().problem.unwrap();
        let _ = machine.dispatch(QuizEvent::SubmitAnswer("abc".to_string()));
        let _ = machine.dispatch(QuizEvent::EndSession);

        let text = screen(&machine);
        let review: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("Problem review"))
            .skip(1)
            .take_while(|l| !l.contains("[N]"))
            .collect();
        assert_eq!(review.len(), 2);
        assert!(review[0].starts_with("  ✅"));
        assert!(review[0].ends_with(&format!("= {}", first.answer)));
        assert!(!review[0].contains("Your answer"));
        assert!(review[1].starts_with("  ❌"));
        assert!(review[1].contains(&format!("= {}", second.answer)));
        assert!(review[1].ends_with("Your answer: abc"));
    }

    #[test]
    fn missing_answer_reviews_as_na() {
        plain();
        let problem = mathorbit_game::generate_problem(
            Difficulty::Easy,
            OperationGroup::B,
            &mut <rand_chacha::ChaCha20Rng as rand::SeedableRng>::seed_from_u64(1),
        )
        .unwrap();
        let attempt = ProblemAttempt {
            problem,
            given: "  ".to_string(),
            correct: false,
        };
        assert!(review_line(&attempt).ends_with("Your answer: N/A"));
    }

    #[test]
    fn history_screen_lists_sessions_and_progress() {
        plain();
        let mut log = HistoryLog::default();
        for score in [40, 80] {
            log.prepend(
                SessionSummary {
                    date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
                    score,
                    accuracy: 90,
                    settings: SessionSettings::from_selection(
                        OperationGroup::A,
                        Difficulty::Hard,
                        GameMode::Time,
                    ),
                },
                15,
            );
        }
        let state = QuizState {
            view: View::History,
            ..QuizState::default()
        };
        let text = render_screen(&state, &[], &log);
        assert!(text.contains("2024-05-01 12:00"));
        assert!(text.contains("Multiplication & Division · Hard · Time Challenge"));
        let game2 = text.lines().find(|l| l.contains("Game 2")).unwrap();
        assert_eq!(game2.matches('█').count(), BAR_WIDTH);
        let game1 = text.lines().find(|l| l.contains("Game 1")).unwrap();
        assert_eq!(game1.matches('█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn countdown_lines_are_sparse() {
        plain();
        let mut state = QuizState {
            view: View::Playing,
            time_left: 37,
            ..QuizState::default()
        };
        assert!(render_countdown(&state).is_none());
        state.time_left = 30;
        assert_eq!(render_countdown(&state).as_deref(), Some("⏱  30s left"));
        state.time_left = 3;
        assert!(render_countdown(&state).is_some());
    }
}
