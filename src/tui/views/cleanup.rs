//! Cleanup tab - changed files with categories, the smart-commit file
//! selection, and the scan summary.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::cleanup::Category;
use crate::session::state::{FileSelectionModel, ScanModel};
use crate::session::Session;

fn category_color(category: Category) -> Color {
    match category {
        Category::Auto => Color::Green,
        Category::Docs => Color::Yellow,
        Category::Ignore => Color::Red,
        Category::Other => Color::Gray,
    }
}

/// Render the cleanup tab.
pub fn render(frame: &mut Frame, area: Rect, session: &Session) {
    let Some(model) = session.git_model() else {
        let text = if session.is_loading_status() {
            format!(" {} Reading working-tree status...", super::spinner(session))
        } else {
            " Enter this tab to load working-tree status".to_string()
        };
        let placeholder =
            Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Cleanup "));
        frame.render_widget(placeholder, area);
        return;
    };

    if model.items.is_empty() {
        let clean = Paragraph::new(" Working tree is clean")
            .block(Block::default().borders(Borders::ALL).title(" Cleanup "));
        frame.render_widget(clean, area);
        return;
    }

    let items: Vec<ListItem> = model
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut style = Style::default();
            if i == session.cleanup_cursor() {
                style = style.add_modifier(Modifier::BOLD).bg(Color::DarkGray);
            }
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {} ", item.file.code)),
                Span::raw(item.file.path.clone()),
                Span::styled(
                    format!("  [{}]", item.file.category.label()),
                    Style::default().fg(category_color(item.file.category)),
                ),
            ]))
            .style(style)
        })
        .collect();

    let title = format!(" Cleanup ({} changed) ", model.items.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

/// Render the smart-commit per-file action selection.
pub fn render_file_selection(
    frame: &mut Frame,
    area: Rect,
    session: &Session,
    model: &FileSelectionModel,
) {
    let empty = Vec::new();
    let items = session
        .git_model()
        .map(|m| &m.items)
        .unwrap_or(&empty);

    let rows: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let action = model
                .decisions
                .get(&item.file.path)
                .copied()
                .unwrap_or(item.action);

            let mut style = Style::default();
            if i == model.cursor {
                style = style.add_modifier(Modifier::BOLD).bg(Color::DarkGray);
            }
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {:<7}", action.label()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(item.file.path.clone()),
                Span::styled(
                    format!("  [{}]", item.file.category.label()),
                    Style::default().fg(category_color(item.file.category)),
                ),
            ]))
            .style(style)
        })
        .collect();

    let list = List::new(rows).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Smart Commit: choose actions "),
    );
    frame.render_widget(list, area);
}

/// Render the repository scan summary.
pub fn render_scan(frame: &mut Frame, area: Rect, model: &ScanModel) {
    let text = match (&model.summary, model.scanning) {
        (_, true) => " Scanning working tree...".to_string(),
        (Some(summary), false) => format!(
            " {} changed files\n\n   auto-committable: {}\n   documentation:    {}\n   ignorable:        {}\n   other:            {}",
            summary.total, summary.auto, summary.docs, summary.ignorable, summary.other
        ),
        (None, false) => " No scan results".to_string(),
    };

    let scan = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Repository Scan "));
    frame.render_widget(scan, area);
}
