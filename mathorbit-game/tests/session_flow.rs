use chrono::{TimeZone, Utc};
use mathorbit_game::{
    Difficulty, FixedClock, GameMode, HistoryStore, IgnoreReason, MemoryStore, OperationGroup,
    QuizConfig, QuizEvent, QuizMachine, SchedulerCommand, SessionEnd, SetupStep, View,
    VirtualScheduler,
};
use rand_chacha::ChaCha20Rng;
use std::time::Duration;

type Machine = QuizMachine<MemoryStore, ChaCha20Rng>;

fn machine_on(store: MemoryStore, seed: u64) -> Machine {
    QuizMachine::seeded(store, seed, QuizConfig::default())
        .with_clock(FixedClock(Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap()))
}

fn begin(
    machine: &mut Machine,
    sched: &mut VirtualScheduler,
    group: OperationGroup,
    difficulty: Difficulty,
    mode: GameMode,
) {
    for event in [
        QuizEvent::SelectGroup(group),
        QuizEvent::SelectDifficulty(difficulty),
        QuizEvent::SelectMode(mode),
    ] {
        sched.apply(machine.dispatch(event).into_commands());
    }
    assert_eq!(machine.state().view, View::Playing);
}

fn current_answer(machine: &Machine) -> i64 {
    machine.state().problem.unwrap().answer
}

/// Deliver every timer due up to `deadline`.
fn run_until(machine: &mut Machine, sched: &mut VirtualScheduler, deadline: Duration) {
    while let Some(event) = sched.pop_due(deadline) {
        sched.apply(machine.dispatch(event).into_commands());
    }
    sched.advance_to(deadline);
}

#[test]
fn timed_session_expires_after_sixty_ticks() {
    let store = MemoryStore::default();
    let mut machine = machine_on(store.clone(), 42);
    let mut sched = VirtualScheduler::new();
    begin(
        &mut machine,
        &mut sched,
        OperationGroup::A,
        Difficulty::Hard,
        GameMode::Time,
    );

    run_until(&mut machine, &mut sched, Duration::from_millis(59_999));
    assert_eq!(machine.state().view, View::Playing);
    assert_eq!(machine.state().time_left, 1);

    run_until(&mut machine, &mut sched, Duration::from_secs(60));
    assert_eq!(machine.state().view, View::Results);
    assert_eq!(machine.state().last_end, Some(SessionEnd::TimeUp));
    assert!(sched.is_idle());

    let raw = store.raw("mathOrbitHistory").unwrap();
    assert!(raw.contains("\"Time Challenge\""));
    assert!(raw.contains("\"Multiplication & Division\""));
}

#[test]
fn answers_between_ticks_accumulate_score() {
    let mut machine = machine_on(MemoryStore::default(), 3);
    let mut sched = VirtualScheduler::new();
    begin(
        &mut machine,
        &mut sched,
        OperationGroup::B,
        Difficulty::Medium,
        GameMode::Time,
    );

    let mut elapsed = Duration::ZERO;
    for _ in 0..5 {
        let reply = current_answer(&machine).to_string();
        sched.apply(
            machine
                .dispatch(QuizEvent::SubmitAnswer(reply))
                .into_commands(),
        );
        elapsed += Duration::from_millis(500);
        run_until(&mut machine, &mut sched, elapsed);
        assert!(machine.state().feedback.is_none());
    }
    assert_eq!(machine.state().score, 50);
    assert_eq!(machine.state().streak, 5);
    assert_eq!(machine.state().time_left, 58);
}

#[test]
fn streak_session_ends_on_first_miss() {
    let store = MemoryStore::default();
    let mut machine = machine_on(store.clone(), 9);
    let mut sched = VirtualScheduler::new();
    begin(
        &mut machine,
        &mut sched,
        OperationGroup::A,
        Difficulty::Master,
        GameMode::Streak,
    );

    for _ in 0..3 {
        let reply = current_answer(&machine).to_string();
        sched.apply(
            machine
                .dispatch(QuizEvent::SubmitAnswer(reply))
                .into_commands(),
        );
        let deadline = sched.now() + Duration::from_millis(400);
        run_until(&mut machine, &mut sched, deadline);
    }
    sched.apply(
        machine
            .dispatch(QuizEvent::SubmitAnswer("-1".into()))
            .into_commands(),
    );

    assert_eq!(machine.state().view, View::Results);
    assert_eq!(machine.state().last_end, Some(SessionEnd::StreakBroken));
    assert_eq!(machine.state().score, 30);
    assert!(sched.is_idle());

    let reopened = HistoryStore::open(store, &QuizConfig::default());
    let saved = reopened.log().newest().unwrap();
    assert_eq!(saved.score, 30);
    assert_eq!(saved.accuracy, 75);
    assert_eq!(saved.settings.difficulty, "Master (6-9)");
}

#[test]
fn late_feedback_after_session_end_is_ignored() {
    let mut machine = machine_on(MemoryStore::default(), 12);
    let mut sched = VirtualScheduler::new();
    begin(
        &mut machine,
        &mut sched,
        OperationGroup::B,
        Difficulty::Easy,
        GameMode::Practice,
    );
    let reply = current_answer(&machine).to_string();
    let commands = machine
        .dispatch(QuizEvent::SubmitAnswer(reply))
        .into_commands();
    let [SchedulerCommand::ScheduleFeedback { ticket, .. }] = commands.as_slice() else {
        panic!("expected a feedback timer, got {commands:?}");
    };
    let ticket = *ticket;

    let _ = machine.dispatch(QuizEvent::EndSession);
    let _ = machine.dispatch(QuizEvent::NewMission);
    begin(
        &mut machine,
        &mut sched,
        OperationGroup::B,
        Difficulty::Easy,
        GameMode::Practice,
    );
    let problem = machine.state().problem;

    assert_eq!(
        machine
            .dispatch(QuizEvent::FeedbackElapsed(ticket))
            .ignored(),
        Some(IgnoreReason::StaleTimer)
    );
    assert_eq!(machine.state().problem, problem);
}

#[test]
fn double_submit_counts_once() {
    let mut machine = machine_on(MemoryStore::default(), 77);
    let mut sched = VirtualScheduler::new();
    begin(
        &mut machine,
        &mut sched,
        OperationGroup::A,
        Difficulty::Medium,
        GameMode::Practice,
    );
    let reply = current_answer(&machine).to_string();
    sched.apply(
        machine
            .dispatch(QuizEvent::SubmitAnswer(reply.clone()))
            .into_commands(),
    );
    let second = machine.dispatch(QuizEvent::SubmitAnswer(reply));
    assert_eq!(second.ignored(), Some(IgnoreReason::FeedbackPending));
    assert_eq!(machine.state().stats.total(), 1);
    assert_eq!(machine.state().score, 10);
}

#[test]
fn history_keeps_fifteen_newest_sessions() {
    let store = MemoryStore::default();
    let mut machine = machine_on(store.clone(), 1);
    let mut sched = VirtualScheduler::new();
    for round in 0..16_u32 {
        begin(
            &mut machine,
            &mut sched,
            OperationGroup::B,
            Difficulty::Easy,
            GameMode::Practice,
        );
        for _ in 0..round {
            let reply = current_answer(&machine).to_string();
            sched.apply(
                machine
                    .dispatch(QuizEvent::SubmitAnswer(reply))
                    .into_commands(),
            );
            let deadline = sched.now() + Duration::from_millis(400);
            run_until(&mut machine, &mut sched, deadline);
        }
        sched.apply(machine.dispatch(QuizEvent::EndSession).into_commands());
        sched.apply(machine.dispatch(QuizEvent::NewMission).into_commands());
    }
    assert_eq!(
        machine.state().view,
        View::Setup(SetupStep::ChooseGroup)
    );
    let history = machine.history();
    assert_eq!(history.len(), 15);
    assert_eq!(history.newest().unwrap().score, 150);
    assert!(history.entries().iter().all(|s| s.score != 0));

    let reopened = HistoryStore::open(store, &QuizConfig::default());
    assert_eq!(reopened.log(), history);
    assert_eq!(reopened.log().progress()[0].label, "Game 1");
    assert_eq!(reopened.log().progress()[0].score, 10);
}
