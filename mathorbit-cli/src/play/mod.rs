//! Interactive terminal quiz.
pub mod input;
pub mod render;
pub mod scheduler;

use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, info};
use mathorbit_game::{Dispatch, KeyValueStore, QuizConfig, QuizEvent, QuizMachine, View};
use rand::Rng;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::storage::FileStore;
use input::{Command, translate};
use render::{explain_ignored, help_text, render_countdown, render_screen};
use scheduler::TokioScheduler;

/// Play on the terminal, keeping history under `data_dir`.
pub async fn run(config: QuizConfig, data_dir: &Path, seed: Option<u64>) -> Result<()> {
    let store = FileStore::open(data_dir)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;
    let seed = seed.unwrap_or_else(rand::random);
    info!("playing with seed {seed}, data in {}", store.root().display());

    let mut machine = QuizMachine::seeded(store, seed, config);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_loop(&mut machine, stdin, &mut stdout).await
}

/// Drive `machine` from typed lines and its own timers until quit or end of input.
pub async fn run_loop<S, R, I, W>(
    machine: &mut QuizMachine<S, R>,
    input: I,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore,
    R: Rng,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let (mut scheduler, mut timers) = TokioScheduler::new();
    let mut lines = input.lines();
    draw(machine, out)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    debug!("input closed");
                    break;
                };
                let view = machine.state().view;
                match translate(view, &line) {
                    Command::Quit => break,
                    Command::Help => writeln!(out, "{}", help_text(view))?,
                    Command::Unknown => writeln!(
                        out,
                        "{}",
                        "Unrecognised choice. Type `help` for options.".yellow()
                    )?,
                    Command::Event(event) => step(machine, &mut scheduler, event, out)?,
                }
            }
            Some(event) = timers.recv() => step(machine, &mut scheduler, event, out)?,
        }
        out.flush()?;
    }

    if machine.state().view == View::Playing {
        info!("left mid-session; not recorded");
    }
    debug!("dropping {} live timers", scheduler.active());
    Ok(())
}

fn step<S, R, W>(
    machine: &mut QuizMachine<S, R>,
    scheduler: &mut TokioScheduler,
    event: QuizEvent,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore,
    R: Rng,
    W: Write,
{
    let tick = matches!(event, QuizEvent::Tick(_));
    let before = machine.state().view;
    match machine.dispatch(event) {
        Dispatch::Applied(commands) => {
            scheduler.apply(commands);
            let state = machine.state();
            if tick && state.view == before {
                if let Some(line) = render_countdown(state) {
                    writeln!(out, "{line}")?;
                }
            } else {
                draw(machine, out)?;
            }
        }
        Dispatch::Ignored(reason) => {
            if let Some(hint) = explain_ignored(reason) {
                writeln!(out, "{}", hint.yellow())?;
            }
        }
    }
    Ok(())
}

fn draw<S: KeyValueStore, R: Rng, W: Write>(machine: &QuizMachine<S, R>, out: &mut W) -> Result<()> {
    let screen = render_screen(
        machine.state(),
        &machine.difficulty_options(),
        machine.history(),
    );
    writeln!(out)?;
    write!(out, "{screen}")?;
    Ok(())
}
