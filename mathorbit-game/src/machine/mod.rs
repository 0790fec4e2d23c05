//! Screen-level quiz state machine.
//!
//! [`QuizMachine`] owns every piece of session state. Input arrives as a
//! [`QuizEvent`] through [`QuizMachine::dispatch`]; timers are requested from
//! the driver as [`SchedulerCommand`]s and come back as ticketed events.
mod event;
mod state;

pub use event::{Dispatch, IgnoreReason, QuizEvent};
pub use state::{
    DifficultyOption, Feedback, QuizState, Selections, SessionEnd, SetupStep, View,
};

use log::{debug, error, info};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::KeyValueStore;
use crate::config::QuizConfig;
use crate::history::{HistoryLog, HistoryStore, SessionSettings, SessionSummary};
use crate::presets::{Difficulty, GameMode, OperationGroup};
use crate::problem::generate_problem;
use crate::schedule::{Clock, SchedulerCommand, SystemClock, TimerTicket};
use crate::session::{ProblemAttempt, SessionStats};

/// Quiz engine bound to a history backend and a random source.
pub struct QuizMachine<S, R>
where
    S: KeyValueStore,
    R: Rng,
{
    config: QuizConfig,
    state: QuizState,
    history: HistoryStore<S>,
    rng: R,
    clock: Box<dyn Clock>,
    next_ticket: u64,
    countdown: Option<TimerTicket>,
    feedback_timer: Option<TimerTicket>,
}

impl<S> QuizMachine<S, ChaCha20Rng>
where
    S: KeyValueStore,
{
    /// Machine whose problem sequence is fully determined by `seed`.
    pub fn seeded(store: S, seed: u64, config: QuizConfig) -> Self {
        Self::new(store, ChaCha20Rng::seed_from_u64(seed), config)
    }
}

impl<S, R> QuizMachine<S, R>
where
    S: KeyValueStore,
    R: Rng,
{
    /// Load history from `store` and start on the group selection screen.
    pub fn new(store: S, rng: R, config: QuizConfig) -> Self {
        let history = HistoryStore::open(store, &config);
        Self {
            config,
            state: QuizState::default(),
            history,
            rng,
            clock: Box::new(SystemClock),
            next_ticket: 0,
            countdown: None,
            feedback_timer: None,
        }
    }

    /// Replace the clock used to timestamp finished sessions.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub const fn state(&self) -> &QuizState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryLog {
        self.history.log()
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        self.history.backend()
    }

    /// Ticket of the running countdown, if any.
    #[must_use]
    pub const fn countdown_ticket(&self) -> Option<TimerTicket> {
        self.countdown
    }

    /// Ticket of the pending feedback delay, if any.
    #[must_use]
    pub const fn feedback_ticket(&self) -> Option<TimerTicket> {
        self.feedback_timer
    }

    /// Difficulties with their availability for the chosen group.
    ///
    /// Nothing is selectable before a group is chosen.
    #[must_use]
    pub fn difficulty_options(&self) -> Vec<DifficultyOption> {
        Difficulty::ALL
            .into_iter()
            .map(|difficulty| DifficultyOption {
                difficulty,
                selectable: self
                    .state
                    .selections
                    .group
                    .is_some_and(|group| difficulty.is_compatible_with(group)),
            })
            .collect()
    }

    /// Apply one event and return the timer work it requires.
    pub fn dispatch(&mut self, event: QuizEvent) -> Dispatch {
        debug!(target: "quiz", "{:?} <- {event:?}", self.state.view);
        match (self.state.view, event) {
            (View::Setup(SetupStep::ChooseGroup), QuizEvent::SelectGroup(group)) => {
                self.select_group(group)
            }
            (View::Setup(SetupStep::ChooseDifficulty), QuizEvent::SelectDifficulty(difficulty)) => {
                self.select_difficulty(difficulty)
            }
            (View::Setup(SetupStep::ChooseMode), QuizEvent::SelectMode(mode)) => {
                self.start_session(mode)
            }
            (View::Setup(SetupStep::ChooseDifficulty), QuizEvent::Back) => {
                self.state.view = View::Setup(SetupStep::ChooseGroup);
                Dispatch::Applied(Vec::new())
            }
            (View::Setup(SetupStep::ChooseMode), QuizEvent::Back) => {
                self.state.view = View::Setup(SetupStep::ChooseDifficulty);
                Dispatch::Applied(Vec::new())
            }
            (View::Setup(SetupStep::ChooseGroup), QuizEvent::OpenHistory) => {
                self.state.view = View::History;
                Dispatch::Applied(Vec::new())
            }
            (View::History, QuizEvent::CloseHistory) | (View::Results, QuizEvent::NewMission) => {
                Dispatch::Applied(self.go_to_setup())
            }
            (View::Playing, QuizEvent::SubmitAnswer(raw)) => self.submit(&raw),
            (View::Playing, QuizEvent::EndSession) => self.finish(SessionEnd::Ended),
            (view, QuizEvent::Tick(ticket)) => {
                if view == View::Playing && self.countdown == Some(ticket) {
                    self.tick()
                } else {
                    Dispatch::Ignored(IgnoreReason::StaleTimer)
                }
            }
            (view, QuizEvent::FeedbackElapsed(ticket)) => {
                if view == View::Playing && self.feedback_timer == Some(ticket) {
                    self.next_problem()
                } else {
                    Dispatch::Ignored(IgnoreReason::StaleTimer)
                }
            }
            _ => Dispatch::Ignored(IgnoreReason::WrongView),
        }
    }

    fn select_group(&mut self, group: OperationGroup) -> Dispatch {
        self.state.selections = Selections {
            group: Some(group),
            difficulty: None,
            mode: None,
        };
        self.state.view = View::Setup(SetupStep::ChooseDifficulty);
        Dispatch::Applied(Vec::new())
    }

    fn select_difficulty(&mut self, difficulty: Difficulty) -> Dispatch {
        let compatible = self
            .state
            .selections
            .group
            .is_some_and(|group| difficulty.is_compatible_with(group));
        if !compatible {
            return Dispatch::Ignored(IgnoreReason::Incompatible);
        }
        self.state.selections.difficulty = Some(difficulty);
        self.state.view = View::Setup(SetupStep::ChooseMode);
        Dispatch::Applied(Vec::new())
    }

    fn start_session(&mut self, mode: GameMode) -> Dispatch {
        self.state.selections.mode = Some(mode);
        let mut commands = self.cancel_timers();
        self.state.score = 0;
        self.state.streak = 0;
        self.state.time_left = self.config.time_limit_secs;
        self.state.stats = SessionStats::default();
        self.state.feedback = None;
        self.state.last_end = None;
        self.state.view = View::Playing;

        if let Err(reason) = self.refresh_problem() {
            return self.abort(commands, &reason);
        }

        if mode.is_timed() {
            let ticket = self.issue_ticket();
            self.countdown = Some(ticket);
            commands.push(SchedulerCommand::StartCountdown {
                ticket,
                period: self.config.countdown_period(),
            });
        }
        info!(
            target: "quiz",
            "session started: {:?}/{:?}/{mode:?}",
            self.state.selections.group, self.state.selections.difficulty
        );
        Dispatch::Applied(commands)
    }

    fn submit(&mut self, raw: &str) -> Dispatch {
        if raw.trim().is_empty() {
            return Dispatch::Ignored(IgnoreReason::EmptyAnswer);
        }
        if self.state.feedback.is_some() {
            return Dispatch::Ignored(IgnoreReason::FeedbackPending);
        }
        let Some(problem) = self.state.problem else {
            return Dispatch::Ignored(IgnoreReason::WrongView);
        };

        let attempt = ProblemAttempt::grade(problem, raw);
        let correct = attempt.correct;
        self.state.stats.record(attempt);

        if correct {
            self.state.score = self
                .state
                .score
                .saturating_add(self.config.points_per_correct);
            self.state.streak = self.state.streak.saturating_add(1);
            self.state.feedback = Some(Feedback::Correct);
        } else {
            self.state.streak = 0;
            self.state.feedback = Some(Feedback::Incorrect {
                answer: problem.answer,
            });
            if self.state.selections.mode == Some(GameMode::Streak) {
                return self.finish(SessionEnd::StreakBroken);
            }
        }

        let ticket = self.issue_ticket();
        self.feedback_timer = Some(ticket);
        Dispatch::Applied(vec![SchedulerCommand::ScheduleFeedback {
            ticket,
            delay: self.config.feedback_delay(),
        }])
    }

    fn next_problem(&mut self) -> Dispatch {
        self.feedback_timer = None;
        self.state.feedback = None;
        match self.refresh_problem() {
            Ok(()) => Dispatch::Applied(Vec::new()),
            Err(reason) => self.abort(Vec::new(), &reason),
        }
    }

    fn tick(&mut self) -> Dispatch {
        self.state.time_left = self.state.time_left.saturating_sub(1);
        if self.state.time_left == 0 {
            self.finish(SessionEnd::TimeUp)
        } else {
            Dispatch::Applied(Vec::new())
        }
    }

    fn finish(&mut self, end: SessionEnd) -> Dispatch {
        let commands = self.cancel_timers();
        let accuracy = self.state.stats.accuracy();
        if let Some((group, difficulty, mode)) = self.state.selections.complete() {
            self.history.append(SessionSummary {
                date: self.clock.now(),
                score: self.state.score,
                accuracy,
                settings: SessionSettings::from_selection(group, difficulty, mode),
            });
        }
        info!(
            target: "quiz",
            "session finished ({end:?}): score {} accuracy {accuracy}%",
            self.state.score
        );
        self.state.view = View::Results;
        self.state.last_end = Some(end);
        Dispatch::Applied(commands)
    }

    fn go_to_setup(&mut self) -> Vec<SchedulerCommand> {
        let commands = self.cancel_timers();
        self.state = QuizState {
            time_left: self.config.time_limit_secs,
            ..QuizState::default()
        };
        commands
    }

    fn abort(&mut self, mut commands: Vec<SchedulerCommand>, reason: &str) -> Dispatch {
        error!(target: "quiz", "{reason}; returning to setup");
        commands.extend(self.go_to_setup());
        self.state.last_end = Some(SessionEnd::Aborted);
        Dispatch::Applied(commands)
    }

    fn refresh_problem(&mut self) -> Result<(), String> {
        let (Some(group), Some(difficulty)) =
            (self.state.selections.group, self.state.selections.difficulty)
        else {
            return Err("session started without a group and difficulty".to_string());
        };
        let problem =
            generate_problem(difficulty, group, &mut self.rng).map_err(|err| err.to_string())?;
        self.state.problem = Some(problem);
        Ok(())
    }

    fn cancel_timers(&mut self) -> Vec<SchedulerCommand> {
        let mut commands = Vec::new();
        if let Some(ticket) = self.countdown.take() {
            commands.push(SchedulerCommand::CancelCountdown { ticket });
        }
        if let Some(ticket) = self.feedback_timer.take() {
            commands.push(SchedulerCommand::CancelFeedback { ticket });
        }
        commands
    }

    fn issue_ticket(&mut self) -> TimerTicket {
        self.next_ticket += 1;
        TimerTicket(self.next_ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::FixedClock;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn machine() -> QuizMachine<MemoryStore, ChaCha20Rng> {
        QuizMachine::seeded(MemoryStore::default(), 7, QuizConfig::default())
            .with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()))
    }

    fn start(
        machine: &mut QuizMachine<MemoryStore, ChaCha20Rng>,
        group: OperationGroup,
        difficulty: Difficulty,
        mode: GameMode,
    ) -> Vec<SchedulerCommand> {
        assert!(machine.dispatch(QuizEvent::SelectGroup(group)).is_applied());
        assert!(
            machine
                .dispatch(QuizEvent::SelectDifficulty(difficulty))
                .is_applied()
        );
        machine.dispatch(QuizEvent::SelectMode(mode)).into_commands()
    }

    fn answer(machine: &QuizMachine<MemoryStore, ChaCha20Rng>) -> String {
        machine.state().problem.unwrap().answer.to_string()
    }

    #[test]
    fn starts_on_group_selection() {
        let machine = machine();
        assert_eq!(machine.state().view, View::Setup(SetupStep::ChooseGroup));
        assert!(machine.difficulty_options().iter().all(|o| !o.selectable));
    }

    #[test]
    fn incompatible_difficulty_is_refused() {
        let mut machine = machine();
        let _ = machine.dispatch(QuizEvent::SelectGroup(OperationGroup::A));
        let options = machine.difficulty_options();
        let easy = options
            .iter()
            .find(|o| o.difficulty == Difficulty::Easy)
            .unwrap();
        assert!(!easy.selectable);
        assert_eq!(
            machine
                .dispatch(QuizEvent::SelectDifficulty(Difficulty::Easy))
                .ignored(),
            Some(IgnoreReason::Incompatible)
        );
        assert_eq!(machine.state().view, View::Setup(SetupStep::ChooseDifficulty));
    }

    #[test]
    fn back_walks_setup_steps() {
        let mut machine = machine();
        let _ = machine.dispatch(QuizEvent::SelectGroup(OperationGroup::B));
        let _ = machine.dispatch(QuizEvent::SelectDifficulty(Difficulty::Medium));
        let _ = machine.dispatch(QuizEvent::Back);
        assert_eq!(machine.state().view, View::Setup(SetupStep::ChooseDifficulty));
        let _ = machine.dispatch(QuizEvent::Back);
        assert_eq!(machine.state().view, View::Setup(SetupStep::ChooseGroup));
        assert_eq!(
            machine.dispatch(QuizEvent::Back).ignored(),
            Some(IgnoreReason::WrongView)
        );
    }

    #[test]
    fn timed_mode_starts_countdown() {
        let mut machine = machine();
        let commands = start(
            &mut machine,
            OperationGroup::A,
            Difficulty::Hard,
            GameMode::Time,
        );
        let ticket = machine.countdown_ticket().unwrap();
        assert_eq!(
            commands,
            vec![SchedulerCommand::StartCountdown {
                ticket,
                period: std::time::Duration::from_secs(1),
            }]
        );
        assert_eq!(machine.state().time_left, 60);
        assert!(machine.state().problem.is_some());
    }

    #[test]
    fn practice_mode_has_no_countdown() {
        let mut machine = machine();
        let commands = start(
            &mut machine,
            OperationGroup::B,
            Difficulty::Easy,
            GameMode::Practice,
        );
        assert!(commands.is_empty());
        assert!(machine.countdown_ticket().is_none());
    }

    #[test]
    fn correct_answer_scores_and_schedules_feedback() {
        let mut machine = machine();
        start(
            &mut machine,
            OperationGroup::B,
            Difficulty::Easy,
            GameMode::Practice,
        );
        let reply = format!(" {} ", answer(&machine));
        let commands = machine.dispatch(QuizEvent::SubmitAnswer(reply)).into_commands();
        assert_eq!(machine.state().score, 10);
        assert_eq!(machine.state().streak, 1);
        assert_eq!(machine.state().feedback, Some(Feedback::Correct));
        let ticket = machine.feedback_ticket().unwrap();
        assert!(matches!(
            commands.as_slice(),
            [SchedulerCommand::ScheduleFeedback { ticket: t, .. }] if *t == ticket
        ));
    }

    #[test]
    fn submissions_are_gated() {
        let mut machine = machine();
        start(
            &mut machine,
            OperationGroup::B,
            Difficulty::Easy,
            GameMode::Practice,
        );
        assert_eq!(
            machine
                .dispatch(QuizEvent::SubmitAnswer("   ".into()))
                .ignored(),
            Some(IgnoreReason::EmptyAnswer)
        );
        let reply = answer(&machine);
        let _ = machine.dispatch(QuizEvent::SubmitAnswer(reply.clone()));
        assert_eq!(
            machine.dispatch(QuizEvent::SubmitAnswer(reply)).ignored(),
            Some(IgnoreReason::FeedbackPending)
        );
        assert_eq!(machine.state().stats.total(), 1);
        assert_eq!(machine.state().score, 10);
    }

    #[test]
    fn feedback_elapsed_brings_a_fresh_problem() {
        let mut machine = machine();
        start(
            &mut machine,
            OperationGroup::B,
            Difficulty::Medium,
            GameMode::Practice,
        );
        let _ = machine.dispatch(QuizEvent::SubmitAnswer("abc".into()));
        assert!(matches!(
            machine.state().feedback,
            Some(Feedback::Incorrect { .. })
        ));
        assert_eq!(machine.state().streak, 0);
        let ticket = machine.feedback_ticket().unwrap();
        assert!(
            machine
                .dispatch(QuizEvent::FeedbackElapsed(ticket))
                .is_applied()
        );
        assert!(machine.state().feedback.is_none());
        assert!(machine.feedback_ticket().is_none());
        assert_eq!(
            machine
                .dispatch(QuizEvent::FeedbackElapsed(ticket))
                .ignored(),
            Some(IgnoreReason::StaleTimer)
        );
    }

    #[test]
    fn streak_miss_ends_session_immediately() {
        let mut machine = machine();
        start(
            &mut machine,
            OperationGroup::A,
            Difficulty::Medium,
            GameMode::Streak,
        );
        let reply = answer(&machine);
        let _ = machine.dispatch(QuizEvent::SubmitAnswer(reply));
        let ticket = machine.feedback_ticket().unwrap();
        let _ = machine.dispatch(QuizEvent::FeedbackElapsed(ticket));

        let wrong = (machine.state().problem.unwrap().answer + 1).to_string();
        let commands = machine.dispatch(QuizEvent::SubmitAnswer(wrong)).into_commands();
        assert!(commands.is_empty());
        assert_eq!(machine.state().view, View::Results);
        assert_eq!(machine.state().last_end, Some(SessionEnd::StreakBroken));
        assert_eq!(machine.state().stats.correct, 1);
        assert_eq!(machine.state().stats.incorrect, 1);
        assert!(machine.feedback_ticket().is_none());

        let saved = machine.history().newest().unwrap();
        assert_eq!(saved.score, 10);
        assert_eq!(saved.accuracy, 50);
        assert_eq!(saved.settings.mode, "Streak Mode");
    }

    #[test]
    fn countdown_expiry_records_history() {
        let mut machine = machine();
        start(
            &mut machine,
            OperationGroup::A,
            Difficulty::Master,
            GameMode::Time,
        );
        let ticket = machine.countdown_ticket().unwrap();
        for _ in 0..59 {
            assert!(machine.dispatch(QuizEvent::Tick(ticket)).is_applied());
        }
        assert_eq!(machine.state().time_left, 1);
        let commands = machine.dispatch(QuizEvent::Tick(ticket)).into_commands();
        assert_eq!(commands, vec![SchedulerCommand::CancelCountdown { ticket }]);
        assert_eq!(machine.state().view, View::Results);
        assert_eq!(machine.state().last_end, Some(SessionEnd::TimeUp));
        assert_eq!(machine.history().len(), 1);
        assert_eq!(
            machine.history().newest().unwrap().date,
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
        );
        assert_eq!(
            machine.dispatch(QuizEvent::Tick(ticket)).ignored(),
            Some(IgnoreReason::StaleTimer)
        );
    }

    #[test]
    fn ending_mid_feedback_cancels_both_timers() {
        let mut machine = machine();
        start(
            &mut machine,
            OperationGroup::B,
            Difficulty::Hard,
            GameMode::Time,
        );
        let countdown = machine.countdown_ticket().unwrap();
        let reply = answer(&machine);
        let _ = machine.dispatch(QuizEvent::SubmitAnswer(reply));
        let feedback = machine.feedback_ticket().unwrap();
        let commands = machine.dispatch(QuizEvent::EndSession).into_commands();
        assert_eq!(
            commands,
            vec![
                SchedulerCommand::CancelCountdown { ticket: countdown },
                SchedulerCommand::CancelFeedback { ticket: feedback },
            ]
        );
        assert_eq!(machine.state().last_end, Some(SessionEnd::Ended));
        assert_eq!(
            machine
                .dispatch(QuizEvent::FeedbackElapsed(feedback))
                .ignored(),
            Some(IgnoreReason::StaleTimer)
        );
    }

    #[test]
    fn new_mission_resets_to_setup() {
        let mut machine = machine();
        start(
            &mut machine,
            OperationGroup::B,
            Difficulty::Easy,
            GameMode::Practice,
        );
        let _ = machine.dispatch(QuizEvent::EndSession);
        assert!(machine.dispatch(QuizEvent::NewMission).is_applied());
        let state = machine.state();
        assert_eq!(state.view, View::Setup(SetupStep::ChooseGroup));
        assert_eq!(state.selections, Selections::default());
        assert!(state.problem.is_none());
        assert_eq!(state.stats.total(), 0);
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn history_view_round_trip() {
        let mut machine = machine();
        assert!(machine.dispatch(QuizEvent::OpenHistory).is_applied());
        assert_eq!(machine.state().view, View::History);
        assert_eq!(
            machine
                .dispatch(QuizEvent::SelectGroup(OperationGroup::A))
                .ignored(),
            Some(IgnoreReason::WrongView)
        );
        assert!(machine.dispatch(QuizEvent::CloseHistory).is_applied());
        assert_eq!(machine.state().view, View::Setup(SetupStep::ChooseGroup));
    }

    #[test]
    fn new_session_issues_fresh_countdown_ticket() {
        let mut machine = machine();
        start(
            &mut machine,
            OperationGroup::A,
            Difficulty::Hard,
            GameMode::Time,
        );
        let first = machine.countdown_ticket().unwrap();
        let _ = machine.dispatch(QuizEvent::EndSession);
        let _ = machine.dispatch(QuizEvent::NewMission);
        start(
            &mut machine,
            OperationGroup::A,
            Difficulty::Hard,
            GameMode::Time,
        );
        let second = machine.countdown_ticket().unwrap();
        assert_ne!(first, second);
        assert_eq!(
            machine.dispatch(QuizEvent::Tick(first)).ignored(),
            Some(IgnoreReason::StaleTimer)
        );
        assert_eq!(machine.state().time_left, 60);
    }
}
