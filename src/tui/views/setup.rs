//! First-time setup wizard views.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::session::state::{SetupForm, SetupPhase};
use crate::session::Session;

/// Render the setup phase.
pub fn render(frame: &mut Frame, area: Rect, session: &Session, phase: &SetupPhase) {
    match phase {
        SetupPhase::Detecting => {
            let text = format!(
                " {} Inspecting the project...\n\n   r: retry    Esc: skip setup",
                super::spinner(session)
            );
            let block = Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).title(" First-time setup "));
            frame.render_widget(block, area);
        }
        SetupPhase::CustomFileChoice {
            found,
            keep_selected,
            ..
        } => {
            let names: Vec<&str> = found.iter().map(|k| k.file_name()).collect();
            let keep_style = selected_style(*keep_selected);
            let overwrite_style = selected_style(!*keep_selected);

            let lines = vec![
                Line::from(format!(" Found existing pipeline files: {}", names.join(", "))),
                Line::from(""),
                Line::from(" These files were not generated by distui."),
                Line::from(""),
                Line::from(vec![
                    Span::styled("  [ Keep my files ]", keep_style),
                    Span::raw("   "),
                    Span::styled("[ Let distui manage them ]", overwrite_style),
                ]),
            ];
            let block = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title(" First-time setup "));
            frame.render_widget(block, area);
        }
        SetupPhase::ManualEntry(form) => render_form(frame, area, form, " Project details "),
        SetupPhase::AutoDetectedConfirm(form) => {
            let lines = vec![
                Line::from(" Detected project settings:"),
                Line::from(""),
                Line::from(format!("   package:    {}", form.package_name)),
                Line::from(format!("   binary:     {}", form.binary_name)),
                Line::from(format!("   repository: {}", form.repository)),
                Line::from(""),
                Line::from(" y: use these    e: edit"),
            ];
            let block = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title(" First-time setup "));
            frame.render_widget(block, area);
        }
        SetupPhase::Verifying(form) => {
            let text = format!(
                " {} Checking registry for \"{}\"...",
                super::spinner(session),
                form.package_name
            );
            let block = Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).title(" First-time setup "));
            frame.render_widget(block, area);
        }
    }
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_form(frame: &mut Frame, area: Rect, form: &SetupForm, title: &str) {
    let field = |label: &str, value: &str, focused: bool| {
        let style = if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("   {:<12}", label), style),
            Span::raw(value.to_string()),
            Span::raw(if focused { "_" } else { "" }),
        ])
    };

    let lines = vec![
        Line::from(""),
        field("package:", &form.package_name, form.focus == 0),
        field("binary:", &form.binary_name, form.focus == 1),
        field("repository:", &form.repository, form.focus == 2),
        Line::from(""),
        Line::from(" Tab: next field    Enter: verify and finish"),
    ];

    let block =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(block, area);
}
