//! Distributions tab - per-channel toggles and name-check status.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::config::schema::Channel;
use crate::session::Session;

/// Render the distributions tab.
pub fn render(frame: &mut Frame, area: Rect, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let items: Vec<ListItem> = Channel::ALL
        .iter()
        .enumerate()
        .map(|(i, channel)| {
            let enabled = session.config().distributions.is_enabled(*channel);
            let marker = if enabled { "[x]" } else { "[ ]" };
            let detail = channel_detail(session, *channel);

            let mut style = Style::default();
            if i == session.dist_cursor() {
                style = style.add_modifier(Modifier::BOLD).bg(Color::DarkGray);
            }
            if !enabled {
                style = style.fg(Color::Gray);
            }

            ListItem::new(Line::from(vec![
                Span::raw(format!(" {} ", marker)),
                Span::raw(channel.display_name()),
                Span::styled(detail, Style::default().fg(Color::DarkGray)),
            ]))
            .style(style)
        })
        .collect();

    let mode_note = if session.config().custom_files_mode {
        " Distributions (custom files mode: toggles locked)"
    } else {
        " Distributions"
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(mode_note));
    frame.render_widget(list, chunks[0]);

    let check_line = match session.name_check() {
        Some(check) => match &check.result {
            Ok(availability) => availability.summary(&check.name),
            Err(e) => format!("{}: check failed ({})", check.name, e),
        },
        None => String::new(),
    };
    let check = Paragraph::new(check_line)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Registry "));
    frame.render_widget(check, chunks[1]);
}

fn channel_detail(session: &Session, channel: Channel) -> String {
    let config = session.config();
    match channel {
        Channel::GithubRelease => match &config.info.repository {
            Some(repo) => format!("  ({})", repo),
            None => "  (no repository configured)".to_string(),
        },
        Channel::Npm => match config.npm_package_name() {
            Some(name) => format!("  ({})", name),
            None => "  (no package name)".to_string(),
        },
        Channel::Homebrew => match &config.distributions.homebrew.tap {
            Some(tap) => format!("  ({})", tap),
            None => "  (no tap configured)".to_string(),
        },
    }
}
