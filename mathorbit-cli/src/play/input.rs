//! Maps typed lines to quiz events for the current screen.
use mathorbit_game::{Difficulty, GameMode, OperationGroup, QuizEvent, SetupStep, View};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(QuizEvent),
    Help,
    Quit,
    Unknown,
}

pub fn translate(view: View, line: &str) -> Command {
    let word = line.trim().to_ascii_lowercase();

    // While playing, everything except the escape words is an answer.
    if view == View::Playing {
        return match word.as_str() {
            "end" | "stop" => Command::Event(QuizEvent::EndSession),
            "quit" => Command::Quit,
            "?" | "help" => Command::Help,
            _ => Command::Event(QuizEvent::SubmitAnswer(line.to_string())),
        };
    }

    match word.as_str() {
        "q" | "quit" | "exit" => return Command::Quit,
        "?" | "help" => return Command::Help,
        _ => {}
    }

    let event = match view {
        View::Setup(SetupStep::ChooseGroup) => match word.as_str() {
            "a" | "1" => QuizEvent::SelectGroup(OperationGroup::A),
            "b" | "2" => QuizEvent::SelectGroup(OperationGroup::B),
            "h" | "history" => QuizEvent::OpenHistory,
            _ => return Command::Unknown,
        },
        View::Setup(SetupStep::ChooseDifficulty) => match word.as_str() {
            "1" | "easy" => QuizEvent::SelectDifficulty(Difficulty::Easy),
            "2" | "medium" => QuizEvent::SelectDifficulty(Difficulty::Medium),
            "3" | "hard" => QuizEvent::SelectDifficulty(Difficulty::Hard),
            "4" | "master" => QuizEvent::SelectDifficulty(Difficulty::Master),
            "b" | "back" => QuizEvent::Back,
            _ => return Command::Unknown,
        },
        View::Setup(SetupStep::ChooseMode) => match word.as_str() {
            "1" | "t" | "time" => QuizEvent::SelectMode(GameMode::Time),
            "2" | "p" | "practice" => QuizEvent::SelectMode(GameMode::Practice),
            "3" | "s" | "streak" => QuizEvent::SelectMode(GameMode::Streak),
            "b" | "back" => QuizEvent::Back,
            _ => return Command::Unknown,
        },
        View::Results => match word.as_str() {
            "" | "n" | "new" => QuizEvent::NewMission,
            _ => return Command::Unknown,
        },
        View::History => match word.as_str() {
            "" | "b" | "back" => QuizEvent::CloseHistory,
            _ => return Command::Unknown,
        },
        View::Playing => return Command::Unknown,
    };
    Command::Event(event)
}
