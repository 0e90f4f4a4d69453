//! TUI runner - terminal management and the session event loop.
//!
//! This module contains the outermost loop:
//! - Terminal setup and restoration
//! - Key polling and the single inbound event channel
//! - Command dispatch for everything the session asks to run
//!
//! All decisions live in the session; this file only shuttles events.

pub mod views;

use std::io::{self, stdout};
use std::time::Duration;

use crossterm::{
    ExecutableCommand,
    event::{self, Event as TermEvent, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use crate::session::{
    Command, Event, Session, spawn_commands, spawn_git_watcher, spawn_ticker,
};

/// Setup the terminal for TUI mode.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run the session until the operator quits.
///
/// `initial` carries the commands produced by session construction (the
/// first-time setup probe, when applicable).
pub async fn run_session(mut session: Session, initial: Vec<Command>) -> io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let ctx = session.command_context();

    spawn_commands(initial, &ctx, &tx);
    let watcher = spawn_git_watcher(tx.clone());
    let ticker = spawn_ticker(tx.clone());

    let mut terminal = setup_terminal()?;

    // Main event loop: exactly one event is processed to completion per
    // iteration; commands run off-loop and report back through `rx`.
    loop {
        terminal.draw(|frame| views::render(frame, &session))?;

        tokio::select! {
            // Poll for keyboard input
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if event::poll(Duration::from_millis(0))? {
                    match event::read()? {
                        TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                            let commands = session.handle_event(Event::Key(key.code));
                            spawn_commands(commands, &ctx, &tx);
                        }
                        TermEvent::Resize(w, h) => {
                            session.handle_event(Event::Resize(w, h));
                        }
                        _ => {}
                    }
                }
            }
            // Timer ticks and command completions
            msg = rx.recv() => {
                if let Some(ev) = msg {
                    let commands = session.handle_event(ev);
                    spawn_commands(commands, &ctx, &tx);
                }
            }
        }

        if session.should_quit() {
            break;
        }
    }

    watcher.abort();
    ticker.abort();
    restore_terminal()?;

    Ok(())
}
