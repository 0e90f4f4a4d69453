//! Modal and sub-view renderers: confirmations, warnings, forms, and the
//! branch-selection overlay.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::session::state::{
    BranchModel, CommitForm, ConfirmModel, ModeSwitchContext, PendingGeneration, PrefsModel,
    RepoCreateForm,
};
use crate::session::Session;

use super::{centered_rect, clear_area};

/// Render the manual commit view.
pub fn render_commit_view(frame: &mut Frame, area: Rect, form: &CommitForm) {
    let lines = vec![
        Line::from(""),
        Line::from(" Commit message:"),
        Line::from(format!("   {}_", form.message)),
        Line::from(""),
        Line::from(if form.running {
            " Committing..."
        } else {
            " Enter: stage everything and commit"
        }),
    ];
    let block =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Commit "));
    frame.render_widget(block, area);
}

/// Render the smart-commit confirmation.
pub fn render_commit_confirm(
    frame: &mut Frame,
    area: Rect,
    session: &Session,
    model: &ConfirmModel,
) {
    let mut lines = vec![
        Line::from(format!(" Message: {}", model.plan.message)),
        Line::from(""),
        Line::from(format!(" Commit ({}):", model.plan.to_commit.len())),
    ];
    for file in &model.plan.to_commit {
        lines.push(Line::from(format!("   + {}", file.path)));
    }
    if !model.plan.ignore_additions.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            " Add to ignore file ({}):",
            model.plan.ignore_additions.len()
        )));
        for path in &model.plan.ignore_additions {
            lines.push(Line::from(Span::styled(
                format!("   - {}", path),
                Style::default().fg(Color::Red),
            )));
        }
    }
    if model.running {
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            " {} Committing...",
            super::spinner(session)
        )));
    }

    let block = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Confirm smart commit "));
    frame.render_widget(block, area);
}

/// Render the regeneration consent view.
pub fn render_consent(frame: &mut Frame, area: Rect, pending: &PendingGeneration) {
    let mut lines = vec![Line::from(" Reconcile pipeline files with the distribution settings?")];
    lines.push(Line::from(""));

    for kind in &pending.report.to_generate {
        lines.push(Line::from(format!(
            "   generate {} ({})",
            kind.file_name(),
            kind.display_name()
        )));
    }
    for kind in &pending.report.to_delete {
        lines.push(Line::from(Span::styled(
            format!("   delete   {} ({})", kind.file_name(), kind.display_name()),
            Style::default().fg(Color::Red),
        )));
    }
    for kind in &pending.overwrite {
        lines.push(Line::from(Span::styled(
            format!("   replace  {} (currently hand-authored)", kind.file_name()),
            Style::default().fg(Color::Yellow),
        )));
    }

    let block = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Regenerate configuration "));
    frame.render_widget(block, area);
}

/// Render the mode-switch warning.
pub fn render_mode_switch(frame: &mut Frame, area: Rect, ctx: &ModeSwitchContext) {
    let mut lines = vec![
        Line::from(Span::styled(
            " Custom files mode",
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow),
        )),
        Line::from(""),
    ];

    if ctx.attempted_toggle.is_some() {
        lines.push(Line::from(
            " This project keeps hand-written pipeline files, so distribution",
        ));
        lines.push(Line::from(
            " toggles are locked. Switch to distui-managed files to continue.",
        ));
    } else {
        lines.push(Line::from(
            " Applying these changes will replace hand-written pipeline files",
        ));
        lines.push(Line::from(" with generated ones."));
    }

    let block = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Warning "));
    frame.render_widget(block, area);
}

/// Render the preferences view.
pub fn render_preferences(frame: &mut Frame, area: Rect, session: &Session, model: &PrefsModel) {
    let build = &session.config().build;
    let rows = [
        ("Run tests before release", build.run_tests_before_release),
        ("Clean build output before release", build.clean_dist),
        ("Push before release", build.push_before_release),
        ("Custom files mode", session.config().custom_files_mode),
    ];

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let marker = if *value { "[x]" } else { "[ ]" };
            let mut style = Style::default();
            if i == model.cursor {
                style = style.add_modifier(Modifier::BOLD).bg(Color::DarkGray);
            }
            ListItem::new(format!(" {} {}", marker, label)).style(style)
        })
        .collect();

    let list =
        List::new(items).block(Block::default().borders(Borders::ALL).title(" Preferences "));
    frame.render_widget(list, area);
}

/// Render the repository-creation form.
pub fn render_repo_create(frame: &mut Frame, area: Rect, form: &RepoCreateForm) {
    let visibility = if form.private { "private" } else { "public" };
    let lines = vec![
        Line::from(""),
        Line::from(format!("   name:       {}_", form.name)),
        Line::from(format!("   visibility: {}", visibility)),
        Line::from(""),
        Line::from(if form.running {
            " Creating repository..."
        } else {
            " Enter: create and push"
        }),
    ];
    let block = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Create repository "));
    frame.render_widget(block, area);
}

/// Render the branch-selection overlay on top of the current view.
pub fn render_branch_overlay(frame: &mut Frame, model: &BranchModel) {
    let area = centered_rect(40, 50, frame.area());
    clear_area(frame, area);

    if model.loading {
        let loading = Paragraph::new(" Loading branches...")
            .block(Block::default().borders(Borders::ALL).title(" Branches "));
        frame.render_widget(loading, area);
        return;
    }

    let items: Vec<ListItem> = model
        .branches
        .iter()
        .enumerate()
        .map(|(i, branch)| {
            let mut style = Style::default();
            if i == model.cursor {
                style = style.add_modifier(Modifier::BOLD).bg(Color::DarkGray);
            }
            ListItem::new(format!(" {}", branch)).style(style)
        })
        .collect();

    let title = if model.switching {
        " Branches (switching...) "
    } else {
        " Branches "
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}
