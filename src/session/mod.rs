//! The configuration session: a nested, modal state machine coordinating
//! user input, asynchronous external commands, background polling, and
//! persisted-configuration mutation.
//!
//! The session is Elm-shaped: `handle_event` consumes one event, mutates
//! state, and returns the commands to dispatch. It is the only component
//! with externally observable side effects (config saves, artifact
//! writes); everything slow runs as a command off the event loop.

pub mod command;
pub mod event;
pub mod state;
mod update;

pub use command::{
    Command, CommandContext, TICK_INTERVAL, WATCH_INTERVAL, spawn_commands, spawn_git_watcher,
    spawn_ticker,
};
pub use event::{CommandOutcome, Event, SetupProbe, StatusSnapshot};
pub use state::{GitModel, Overlay, SessionState, StatusMessage, Tab};

use std::path::PathBuf;

use crate::config::schema::{GlobalConfig, ProjectConfig};
use crate::config::ConfigStore;
use crate::registry::NameAvailability;
use crate::session::state::{SetupPhase, StatusLevel};

/// Last package-name availability result, kept for the distributions view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCheckDisplay {
    pub name: String,
    pub result: Result<NameAvailability, String>,
}

/// The configuration session. Owns the project config for the duration of
/// a run; single writer, single mailbox.
pub struct Session {
    /// Project configuration; persisted through `persist()` only
    config: ProjectConfig,
    /// Operator identity and defaults
    global: GlobalConfig,
    /// Persistence handle
    store: ConfigStore,
    /// Project root external tools run in
    project_root: PathBuf,
    /// Active view
    state: SessionState,
    /// Modal overlay; intercepts input when present
    overlay: Option<Overlay>,
    /// Active tab of the main view
    tab: Tab,
    /// Cached working-tree model; None until the first status load
    git: Option<GitModel>,
    /// A first status load is in flight
    git_loading: bool,
    /// Transient status line
    status: Option<StatusMessage>,
    /// Cursor on the distributions tab
    dist_cursor: usize,
    /// Cursor on the cleanup tab
    cleanup_cursor: usize,
    /// Last npm name-availability result
    name_check: Option<NameCheckDisplay>,
    /// A release (verify or execute) is in flight
    releasing: bool,
    /// Terminal size bookkeeping
    window: (u16, u16),
    /// Spinner frame, advanced on ticks
    spinner_frame: u8,
    /// The loop should exit
    should_quit: bool,
}

impl Session {
    /// Create a session for a project.
    ///
    /// Returns the initial commands to dispatch: a setup probe when
    /// first-time setup has not been completed yet.
    pub fn new(
        project_root: PathBuf,
        store: ConfigStore,
        global: GlobalConfig,
        config: ProjectConfig,
    ) -> (Self, Vec<Command>) {
        let mut commands = Vec::new();
        let state = if config.first_time_setup_completed {
            SessionState::TabView
        } else {
            commands.push(Command::ProbeSetup);
            SessionState::FirstTimeSetup(SetupPhase::Detecting)
        };

        let session = Self {
            config,
            global,
            store,
            project_root,
            state,
            overlay: None,
            tab: Tab::Distributions,
            git: None,
            git_loading: false,
            status: None,
            dist_cursor: 0,
            cleanup_cursor: 0,
            name_check: None,
            releasing: false,
            window: (0, 0),
            spinner_frame: 0,
            should_quit: false,
        };

        (session, commands)
    }

    /// Context snapshot for dispatching this session's commands.
    pub fn command_context(&self) -> CommandContext {
        CommandContext {
            project_root: self.project_root.clone(),
        }
    }

    /// Whether the loop should exit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// The active view.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The modal overlay, if any.
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// The active tab.
    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// The cached working-tree model, if loaded.
    pub fn git_model(&self) -> Option<&GitModel> {
        self.git.as_ref()
    }

    /// A first status load is in flight.
    pub fn is_loading_status(&self) -> bool {
        self.git_loading
    }

    /// The transient status line, if showing.
    pub fn status_message(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// The project configuration (read-only for views).
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Cursor on the distributions tab.
    pub fn dist_cursor(&self) -> usize {
        self.dist_cursor
    }

    /// Cursor on the cleanup tab.
    pub fn cleanup_cursor(&self) -> usize {
        self.cleanup_cursor
    }

    /// Last npm name-availability result.
    pub fn name_check(&self) -> Option<&NameCheckDisplay> {
        self.name_check.as_ref()
    }

    /// A release is in flight.
    pub fn is_releasing(&self) -> bool {
        self.releasing
    }

    /// Spinner frame for in-flight indicators.
    pub fn spinner_frame(&self) -> u8 {
        self.spinner_frame
    }

    /// Last known terminal size.
    pub fn window(&self) -> (u16, u16) {
        self.window
    }

    /// Save the project config atomically.
    ///
    /// Every mutating transition funnels through here; a failed save is
    /// surfaced as a status message and the session keeps running.
    fn persist(&mut self) {
        if let Err(e) = self.store.save_project(&self.config) {
            tracing::error!(error = %e, "failed to persist project config");
            self.show_error(format!("Save failed: {}", e));
        }
    }

    /// Show an info-level status line.
    fn show_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage::info(text));
    }

    /// Show an error-level status line.
    fn show_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage::error(text));
    }

    /// Whether the current status line is an error.
    pub fn has_error_status(&self) -> bool {
        matches!(
            self.status,
            Some(StatusMessage {
                level: StatusLevel::Error,
                ..
            })
        )
    }
}
