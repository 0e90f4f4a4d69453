//! Release tab and release history.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::session::Session;

/// Render the release tab.
pub fn render(frame: &mut Frame, area: Rect, session: &Session) {
    let config = session.config();
    let channels = config.distributions.enabled_channels();

    let mut lines = vec![Line::from(""), Line::from(" Channels:")];
    if channels.is_empty() {
        lines.push(Line::from(Span::styled(
            "   none enabled",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for channel in &channels {
            lines.push(Line::from(format!("   - {}", channel.display_name())));
        }
    }

    lines.push(Line::from(""));
    let last = config
        .releases
        .last()
        .map(|r| format!(" Last release: {}", r.version))
        .unwrap_or_else(|| " No releases yet".to_string());
    lines.push(Line::from(last));

    if session.is_releasing() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {} Release in progress...", super::spinner(session)),
            Style::default().fg(Color::Yellow),
        )));
    }

    let release =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Release "));
    frame.render_widget(release, area);
}

/// Render the release history tab.
pub fn render_history(frame: &mut Frame, area: Rect, session: &Session) {
    let releases = &session.config().releases;

    if releases.is_empty() {
        let empty = Paragraph::new(" No releases recorded")
            .block(Block::default().borders(Borders::ALL).title(" History "));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = releases
        .iter()
        .rev()
        .map(|record| {
            let channels: Vec<&str> = record.channels.iter().map(|c| c.as_str()).collect();
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {:<10}", record.version),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(record.published_at.format("%Y-%m-%d %H:%M ").to_string()),
                Span::styled(channels.join(", "), Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" History "));
    frame.render_widget(list, area);
}
