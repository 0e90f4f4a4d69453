//! View renderers for the session.
//!
//! Views are dumb: they read the session through its accessors and draw.
//! Every decision (what is selectable, what a key does) lives in the
//! session's transition logic.

pub mod cleanup;
pub mod distributions;
pub mod modals;
pub mod release;
pub mod setup;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::session::state::StatusLevel;
use crate::session::{Overlay, Session, SessionState, Tab};

/// Spinner frames for in-flight indicators.
const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Current spinner character for the session.
pub fn spinner(session: &Session) -> char {
    SPINNER[(session.spinner_frame() as usize) % SPINNER.len()]
}

/// Render the whole screen.
pub fn render(frame: &mut Frame, session: &Session) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(5),    // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    render_title_bar(frame, chunks[0], session);

    match session.state() {
        SessionState::TabView => render_active_tab(frame, chunks[1], session),
        SessionState::FirstTimeSetup(phase) => setup::render(frame, chunks[1], session, phase),
        SessionState::GithubRepoCreation(form) => {
            modals::render_repo_create(frame, chunks[1], form)
        }
        SessionState::CommitView(form) => modals::render_commit_view(frame, chunks[1], form),
        SessionState::SmartCommitFileSelection(model) => {
            cleanup::render_file_selection(frame, chunks[1], session, model)
        }
        SessionState::SmartCommitConfirm(model) => {
            modals::render_commit_confirm(frame, chunks[1], session, model)
        }
        SessionState::ConfigRegenerationConsent(pending) => {
            modals::render_consent(frame, chunks[1], pending)
        }
        SessionState::ModeSwitchWarning(ctx) => modals::render_mode_switch(frame, chunks[1], ctx),
        SessionState::PreferencesView(model) => {
            modals::render_preferences(frame, chunks[1], session, model)
        }
        SessionState::RepoCleanupScan(model) => cleanup::render_scan(frame, chunks[1], model),
    }

    render_status_bar(frame, chunks[2], session);

    // The overlay draws on top of whatever state is beneath it.
    if let Some(Overlay::BranchSelection(model)) = session.overlay() {
        modals::render_branch_overlay(frame, model);
    }
}

fn render_active_tab(frame: &mut Frame, area: Rect, session: &Session) {
    match session.tab() {
        Tab::Distributions => distributions::render(frame, area, session),
        Tab::Release => release::render(frame, area, session),
        Tab::Cleanup => cleanup::render(frame, area, session),
        Tab::History => release::render_history(frame, area, session),
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect, session: &Session) {
    let mut spans: Vec<Span> = vec![Span::styled(
        format!(" {} ", session.config().id),
        Style::default().add_modifier(Modifier::BOLD),
    )];

    for tab in Tab::ALL {
        let style = if tab == session.tab() {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(
            format!(" [{}] {} ", tab.index() + 1, tab.title()),
            style,
        ));
    }

    if let Some(model) = session.git_model() {
        spans.push(Span::styled(
            format!("  {} ", model.branch),
            Style::default().fg(Color::Cyan),
        ));
        if model.refreshing {
            spans.push(Span::raw(spinner(session).to_string()));
        }
    } else if session.is_loading_status() {
        spans.push(Span::raw(format!("  {} ", spinner(session))));
    }

    let title = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, session: &Session) {
    let (text, style) = match session.status_message() {
        Some(status) => {
            let color = match status.level {
                StatusLevel::Info => Color::Green,
                StatusLevel::Error => Color::Red,
            };
            (format!(" {}", status.text), Style::default().fg(color))
        }
        None => (
            keybinding_hint(session).to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let bar = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, area);
}

fn keybinding_hint(session: &Session) -> &'static str {
    if session.overlay().is_some() {
        return " j/k:Navigate  Enter:Checkout  Esc:Close";
    }
    match session.state() {
        SessionState::TabView => match session.tab() {
            Tab::Distributions => {
                " Tab/1-4:Switch  j/k:Navigate  Space:Toggle  r:Regenerate  b:Branch  p:Prefs  q:Quit"
            }
            Tab::Release => " Tab/1-4:Switch  R:Release  P:Push  g:Create Repo  q:Quit",
            Tab::Cleanup => " Tab/1-4:Switch  c:Smart Commit  m:Commit  a:Scan  q:Quit",
            Tab::History => " Tab/1-4:Switch  q:Quit",
        },
        SessionState::SmartCommitFileSelection(_) => {
            " j/k:Navigate  Space:Cycle Action  Enter:Continue  Esc:Back"
        }
        SessionState::SmartCommitConfirm(_) => " y:Commit  n:Cancel",
        SessionState::ConfigRegenerationConsent(_) => " y:Apply  n:Cancel",
        SessionState::ModeSwitchWarning(_) => " y:Switch to generated files  n:Keep custom files",
        SessionState::CommitView(_) => " Type message  Enter:Commit  Esc:Back",
        SessionState::PreferencesView(_) => " j/k:Navigate  Space:Toggle  Esc:Back",
        SessionState::GithubRepoCreation(_) => " Type name  Tab:Visibility  Enter:Create  Esc:Back",
        SessionState::RepoCleanupScan(_) => " Esc:Back",
        SessionState::FirstTimeSetup(_) => " Enter:Continue  Esc:Back",
    }
}

/// Centered rectangle for modal overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Clear an area before drawing a modal into it.
pub fn clear_area(frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);
}
