//! Event dispatch and state transitions for the configuration session.
//!
//! One event is processed to completion per call; handlers mutate the
//! session and return the commands to dispatch. Input is routed to the
//! overlay first, then to the active state. Command failures become timed
//! status messages and never change the active state.

use chrono::Utc;
use crossterm::event::KeyCode;

use crate::cleanup::{build_items, partition};
use crate::config::schema::{Channel, ReleaseRecord};
use crate::drift;
use crate::registry::NameAvailability;
use crate::session::command::{Command, next_version};
use crate::session::event::{CommandOutcome, Event, SetupProbe};
use crate::session::state::{
    BranchModel, CommitForm, ConfirmModel, FileSelectionModel, GitModel, ModeSwitchContext,
    Overlay, PendingGeneration, PrefsModel, RepoCreateForm, ScanModel, ScanSummary, SessionState,
    SetupForm, SetupPhase, Tab,
};
use crate::session::{NameCheckDisplay, Session};

impl Session {
    /// Process one event; returns the commands to dispatch.
    pub fn handle_event(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Tick => {
                self.on_tick();
                Vec::new()
            }
            Event::Resize(w, h) => {
                self.window = (w, h);
                Vec::new()
            }
            Event::WatcherTick => self.on_watcher_tick(),
            Event::Command(outcome) => self.on_command(outcome),
            Event::Key(key) => self.on_key(key),
        }
    }

    fn on_tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);

        if let Some(status) = &mut self.status {
            status.remaining_ticks = status.remaining_ticks.saturating_sub(1);
            if status.remaining_ticks == 0 {
                self.status = None;
            }
        }
    }

    /// Watcher ticks refresh the cached status, but never force the first
    /// load: before the cache is initialized the tick is a no-op.
    fn on_watcher_tick(&mut self) -> Vec<Command> {
        match &mut self.git {
            Some(model) if !model.refreshing => {
                model.refreshing = true;
                vec![Command::RefreshStatus]
            }
            _ => Vec::new(),
        }
    }

    // ---------- key dispatch ----------

    fn on_key(&mut self, key: KeyCode) -> Vec<Command> {
        // The overlay takes input priority over whatever is beneath it.
        if self.overlay.is_some() {
            return self.on_overlay_key(key);
        }

        match self.state.clone() {
            SessionState::TabView => self.on_tab_key(key),
            SessionState::FirstTimeSetup(phase) => self.on_setup_key(phase, key),
            SessionState::GithubRepoCreation(form) => self.on_repo_create_key(form, key),
            SessionState::CommitView(form) => self.on_commit_view_key(form, key),
            SessionState::SmartCommitFileSelection(model) => {
                self.on_file_selection_key(model, key)
            }
            SessionState::SmartCommitConfirm(model) => self.on_confirm_key(model, key),
            SessionState::ConfigRegenerationConsent(pending) => self.on_consent_key(pending, key),
            SessionState::ModeSwitchWarning(ctx) => self.on_mode_switch_key(ctx, key),
            SessionState::PreferencesView(model) => self.on_prefs_key(model, key),
            SessionState::RepoCleanupScan(model) => self.on_scan_key(model, key),
        }
    }

    fn on_overlay_key(&mut self, key: KeyCode) -> Vec<Command> {
        let Some(Overlay::BranchSelection(mut model)) = self.overlay.clone() else {
            return Vec::new();
        };

        match key {
            KeyCode::Esc => {
                // Outstanding branch results are ignored once closed.
                self.overlay = None;
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !model.branches.is_empty() {
                    model.cursor = (model.cursor + 1).min(model.branches.len() - 1);
                }
                self.overlay = Some(Overlay::BranchSelection(model));
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                model.cursor = model.cursor.saturating_sub(1);
                self.overlay = Some(Overlay::BranchSelection(model));
                Vec::new()
            }
            KeyCode::Enter => {
                if model.loading || model.switching || model.branches.is_empty() {
                    self.overlay = Some(Overlay::BranchSelection(model));
                    return Vec::new();
                }
                let branch = model.branches[model.cursor].clone();
                model.switching = true;
                self.overlay = Some(Overlay::BranchSelection(model));
                vec![Command::SwitchBranch(branch)]
            }
            _ => {
                self.overlay = Some(Overlay::BranchSelection(model));
                Vec::new()
            }
        }
    }

    fn on_tab_key(&mut self, key: KeyCode) -> Vec<Command> {
        match key {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            KeyCode::Tab => self.switch_to_tab(self.tab.next()),
            KeyCode::BackTab => self.switch_to_tab(self.tab.prev()),
            KeyCode::Right | KeyCode::Char('l') => self.switch_to_tab(self.tab.next()),
            KeyCode::Left | KeyCode::Char('h') => self.switch_to_tab(self.tab.prev()),
            KeyCode::Char(c @ '1'..='4') => {
                let index = (c as usize) - ('1' as usize);
                match Tab::from_index(index) {
                    Some(tab) => self.switch_to_tab(tab),
                    None => Vec::new(),
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(1);
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor(-1);
                Vec::new()
            }
            KeyCode::Char(' ') | KeyCode::Enter if self.tab == Tab::Distributions => {
                match Channel::ALL.get(self.dist_cursor).copied() {
                    Some(channel) => self.toggle_channel(channel),
                    None => Vec::new(),
                }
            }
            KeyCode::Char('r') if self.tab == Tab::Distributions => self.request_regeneration(),
            KeyCode::Char('p') => {
                self.state = SessionState::PreferencesView(PrefsModel::default());
                Vec::new()
            }
            KeyCode::Char('b') => {
                self.overlay = Some(Overlay::BranchSelection(BranchModel {
                    loading: true,
                    ..Default::default()
                }));
                vec![Command::LoadBranches]
            }
            KeyCode::Char('c') if self.tab == Tab::Cleanup => self.open_smart_commit(),
            KeyCode::Char('m') if self.tab == Tab::Cleanup => {
                self.state = SessionState::CommitView(CommitForm::default());
                Vec::new()
            }
            KeyCode::Char('a') if self.tab == Tab::Cleanup => self.open_scan(),
            KeyCode::Char('R') if self.tab == Tab::Release => self.start_release(),
            KeyCode::Char('P') if self.tab == Tab::Release => vec![Command::Push],
            KeyCode::Char('g') if self.tab == Tab::Release => {
                self.state = SessionState::GithubRepoCreation(RepoCreateForm {
                    name: self.config.id.clone(),
                    ..Default::default()
                });
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.tab {
            Tab::Distributions => {
                let max = Channel::ALL.len().saturating_sub(1);
                self.dist_cursor = step(self.dist_cursor, delta, max);
            }
            Tab::Cleanup => {
                let len = self.git.as_ref().map(|m| m.items.len()).unwrap_or(0);
                let max = len.saturating_sub(1);
                self.cleanup_cursor = step(self.cleanup_cursor, delta, max);
            }
            _ => {}
        }
    }

    /// Switch tabs; entering the cleanup tab loads or refreshes the
    /// working-tree cache.
    fn switch_to_tab(&mut self, tab: Tab) -> Vec<Command> {
        self.tab = tab;
        if tab == Tab::Cleanup {
            return self.ensure_git_model();
        }
        Vec::new()
    }

    /// First entry issues the full load; later entries only refresh.
    fn ensure_git_model(&mut self) -> Vec<Command> {
        if self.git.is_some() {
            return self.refresh_git();
        }
        if self.git_loading {
            return Vec::new();
        }
        self.git_loading = true;
        vec![Command::LoadStatus]
    }

    fn refresh_git(&mut self) -> Vec<Command> {
        match &mut self.git {
            Some(model) if !model.refreshing => {
                model.refreshing = true;
                vec![Command::RefreshStatus]
            }
            _ => Vec::new(),
        }
    }

    // ---------- distributions ----------

    /// Toggle a distribution channel.
    ///
    /// With custom-files mode on, the toggle is rejected without touching
    /// the config and the session shows the mode-switch warning instead.
    fn toggle_channel(&mut self, channel: Channel) -> Vec<Command> {
        if self.config.custom_files_mode {
            self.state = SessionState::ModeSwitchWarning(ModeSwitchContext {
                attempted_toggle: Some(channel),
                pending: None,
            });
            return Vec::new();
        }
        self.apply_toggle(channel)
    }

    fn apply_toggle(&mut self, channel: Channel) -> Vec<Command> {
        let enabled = !self.config.distributions.is_enabled(channel);
        self.config.distributions.set_enabled(channel, enabled);
        self.persist();

        let mut commands = Vec::new();
        if channel == Channel::Npm && enabled {
            if let Some(name) = self.config.npm_package_name() {
                commands.push(Command::CheckPackageName {
                    name: name.to_string(),
                    owner: self.global.npm_owner.clone(),
                });
            }
        }
        if channel == Channel::Homebrew && enabled {
            if let Some(name) = self.formula_name() {
                commands.push(Command::CheckFormulaName { name });
            }
        }

        // The toggle may have changed which artifacts are required.
        let pending = self.compute_pending(Some(channel));
        if !pending.is_empty() {
            self.state = SessionState::ConfigRegenerationConsent(pending);
        }

        commands
    }

    /// Effective Homebrew formula name, if any can be derived.
    fn formula_name(&self) -> Option<String> {
        self.config
            .distributions
            .homebrew
            .formula_name
            .clone()
            .or_else(|| self.config.info.binary_name.clone())
            .or_else(|| self.config.info.module.clone())
    }

    fn compute_pending(&self, triggered_by: Option<Channel>) -> PendingGeneration {
        let report = drift::detect_changes(&self.project_root, &self.config);
        let required = drift::required_artifacts(&self.config);
        let overwrite: Vec<_> = drift::hand_authored_artifacts(&self.project_root)
            .into_iter()
            .filter(|kind| required.contains(kind))
            .collect();

        PendingGeneration {
            report,
            overwrite,
            triggered_by,
        }
    }

    fn request_regeneration(&mut self) -> Vec<Command> {
        let pending = self.compute_pending(None);
        if pending.is_empty() {
            self.show_status("Pipeline artifacts are up to date");
            return Vec::new();
        }
        self.state = SessionState::ConfigRegenerationConsent(pending);
        Vec::new()
    }

    fn on_consent_key(&mut self, pending: PendingGeneration, key: KeyCode) -> Vec<Command> {
        match key {
            KeyCode::Char('y') | KeyCode::Enter => {
                if !pending.overwrite.is_empty() {
                    // Replacing hand-authored files always routes through
                    // the mode-switch warning first.
                    self.state = SessionState::ModeSwitchWarning(ModeSwitchContext {
                        attempted_toggle: None,
                        pending: Some(pending),
                    });
                    return Vec::new();
                }
                self.apply_generation(pending)
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.revert_trigger(&pending);
                self.state = SessionState::TabView;
                Vec::new()
            }
            _ => {
                self.state = SessionState::ConfigRegenerationConsent(pending);
                Vec::new()
            }
        }
    }

    /// Declining a toggle-triggered regeneration reverts the toggle.
    fn revert_trigger(&mut self, pending: &PendingGeneration) {
        if let Some(channel) = pending.triggered_by {
            let enabled = self.config.distributions.is_enabled(channel);
            self.config.distributions.set_enabled(channel, !enabled);
            self.persist();
        }
    }

    fn apply_generation(&mut self, pending: PendingGeneration) -> Vec<Command> {
        self.state = SessionState::TabView;

        let mut actions = match drift::apply(&self.project_root, &self.config, &pending.report) {
            Ok(actions) => actions,
            Err(e) => {
                self.show_error(format!("Regeneration failed: {}", e));
                return Vec::new();
            }
        };

        if !pending.overwrite.is_empty() {
            match drift::force_generate(&self.project_root, &self.config, &pending.overwrite) {
                Ok(mut more) => actions.append(&mut more),
                Err(e) => {
                    self.show_error(format!("Regeneration failed: {}", e));
                    return Vec::new();
                }
            }
        }

        if actions.is_empty() {
            self.show_status("Nothing to regenerate");
        } else {
            self.show_status(actions.join(", "));
        }
        Vec::new()
    }

    fn on_mode_switch_key(&mut self, ctx: ModeSwitchContext, key: KeyCode) -> Vec<Command> {
        match key {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.config.custom_files_mode = false;
                self.state = SessionState::TabView;

                if let Some(pending) = ctx.pending {
                    self.persist();
                    self.apply_generation(pending)
                } else if let Some(channel) = ctx.attempted_toggle {
                    // apply_toggle persists the combined change.
                    self.apply_toggle(channel)
                } else {
                    self.persist();
                    Vec::new()
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                if let Some(pending) = &ctx.pending {
                    self.revert_trigger(pending);
                }
                self.state = SessionState::TabView;
                Vec::new()
            }
            _ => {
                self.state = SessionState::ModeSwitchWarning(ctx);
                Vec::new()
            }
        }
    }

    // ---------- cleanup & commits ----------

    fn open_smart_commit(&mut self) -> Vec<Command> {
        let items = match &self.git {
            Some(model) => model.items.clone(),
            None => {
                self.show_status("Working-tree status is still loading");
                return self.ensure_git_model();
            }
        };
        if items.is_empty() {
            self.show_status("Working tree is clean");
            return Vec::new();
        }
        self.state =
            SessionState::SmartCommitFileSelection(FileSelectionModel::from_items(&items));
        Vec::new()
    }

    fn open_scan(&mut self) -> Vec<Command> {
        match &self.git {
            Some(model) => {
                self.state = SessionState::RepoCleanupScan(ScanModel {
                    scanning: false,
                    summary: Some(ScanSummary::from_items(&model.items)),
                });
                Vec::new()
            }
            None => {
                self.state = SessionState::RepoCleanupScan(ScanModel {
                    scanning: true,
                    summary: None,
                });
                self.ensure_git_model()
            }
        }
    }

    fn on_file_selection_key(&mut self, mut model: FileSelectionModel, key: KeyCode) -> Vec<Command> {
        let items = self
            .git
            .as_ref()
            .map(|m| m.items.clone())
            .unwrap_or_default();

        match key {
            KeyCode::Esc => {
                self.state = SessionState::TabView;
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !items.is_empty() {
                    model.cursor = (model.cursor + 1).min(items.len() - 1);
                }
                self.state = SessionState::SmartCommitFileSelection(model);
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                model.cursor = model.cursor.saturating_sub(1);
                self.state = SessionState::SmartCommitFileSelection(model);
                Vec::new()
            }
            KeyCode::Char(' ') => {
                if let Some(item) = items.get(model.cursor) {
                    let current = model
                        .decisions
                        .get(&item.file.path)
                        .copied()
                        .unwrap_or(item.action);
                    model
                        .decisions
                        .insert(item.file.path.clone(), current.cycled());
                }
                self.state = SessionState::SmartCommitFileSelection(model);
                Vec::new()
            }
            KeyCode::Enter | KeyCode::Char('c') => {
                let decided = model.apply_to(&items);
                match partition(&decided) {
                    Ok(plan) => {
                        self.state = SessionState::SmartCommitConfirm(ConfirmModel {
                            plan,
                            running: false,
                        });
                    }
                    Err(e) => {
                        self.show_error(e.to_string());
                        self.state = SessionState::SmartCommitFileSelection(model);
                    }
                }
                Vec::new()
            }
            _ => {
                self.state = SessionState::SmartCommitFileSelection(model);
                Vec::new()
            }
        }
    }

    fn on_confirm_key(&mut self, mut model: ConfirmModel, key: KeyCode) -> Vec<Command> {
        match key {
            KeyCode::Char('y') | KeyCode::Enter if !model.running => {
                model.running = true;
                let plan = model.plan.clone();
                self.state = SessionState::SmartCommitConfirm(model);
                vec![Command::RunSmartCommit(plan)]
            }
            KeyCode::Char('n') | KeyCode::Esc if !model.running => {
                self.state = SessionState::TabView;
                Vec::new()
            }
            _ => {
                self.state = SessionState::SmartCommitConfirm(model);
                Vec::new()
            }
        }
    }

    fn on_commit_view_key(&mut self, mut form: CommitForm, key: KeyCode) -> Vec<Command> {
        match key {
            KeyCode::Esc if !form.running => {
                self.state = SessionState::TabView;
                Vec::new()
            }
            KeyCode::Char(c) if !form.running => {
                form.message.push(c);
                self.state = SessionState::CommitView(form);
                Vec::new()
            }
            KeyCode::Backspace if !form.running => {
                form.message.pop();
                self.state = SessionState::CommitView(form);
                Vec::new()
            }
            KeyCode::Enter if !form.running => {
                // Empty message: rejected locally, no state change.
                if form.message.trim().is_empty() {
                    self.state = SessionState::CommitView(form);
                    return Vec::new();
                }
                let message = form.message.clone();
                form.running = true;
                self.state = SessionState::CommitView(form);
                vec![Command::CommitAll { message }]
            }
            _ => {
                self.state = SessionState::CommitView(form);
                Vec::new()
            }
        }
    }

    fn on_scan_key(&mut self, model: ScanModel, key: KeyCode) -> Vec<Command> {
        match key {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                self.state = SessionState::TabView;
                Vec::new()
            }
            _ => {
                self.state = SessionState::RepoCleanupScan(model);
                Vec::new()
            }
        }
    }

    // ---------- preferences ----------

    fn on_prefs_key(&mut self, mut model: PrefsModel, key: KeyCode) -> Vec<Command> {
        match key {
            KeyCode::Esc => {
                self.state = SessionState::TabView;
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                model.cursor = (model.cursor + 1).min(PrefsModel::ROWS - 1);
                self.state = SessionState::PreferencesView(model);
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                model.cursor = model.cursor.saturating_sub(1);
                self.state = SessionState::PreferencesView(model);
                Vec::new()
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                match model.cursor {
                    0 => {
                        self.config.build.run_tests_before_release =
                            !self.config.build.run_tests_before_release;
                    }
                    1 => self.config.build.clean_dist = !self.config.build.clean_dist,
                    2 => {
                        self.config.build.push_before_release =
                            !self.config.build.push_before_release;
                    }
                    _ => {
                        // The explicit mode switch; no warning needed here.
                        self.config.custom_files_mode = !self.config.custom_files_mode;
                    }
                }
                self.persist();
                self.state = SessionState::PreferencesView(model);
                Vec::new()
            }
            _ => {
                self.state = SessionState::PreferencesView(model);
                Vec::new()
            }
        }
    }

    // ---------- repository creation ----------

    fn on_repo_create_key(&mut self, mut form: RepoCreateForm, key: KeyCode) -> Vec<Command> {
        match key {
            KeyCode::Esc if !form.running => {
                self.state = SessionState::TabView;
                Vec::new()
            }
            KeyCode::Tab if !form.running => {
                form.private = !form.private;
                self.state = SessionState::GithubRepoCreation(form);
                Vec::new()
            }
            KeyCode::Char(c) if !form.running => {
                form.name.push(c);
                self.state = SessionState::GithubRepoCreation(form);
                Vec::new()
            }
            KeyCode::Backspace if !form.running => {
                form.name.pop();
                self.state = SessionState::GithubRepoCreation(form);
                Vec::new()
            }
            KeyCode::Enter if !form.running => {
                if form.name.trim().is_empty() {
                    self.state = SessionState::GithubRepoCreation(form);
                    return Vec::new();
                }
                let name = form.name.trim().to_string();
                let private = form.private;
                form.running = true;
                self.state = SessionState::GithubRepoCreation(form);
                vec![Command::CreateRepo { name, private }]
            }
            _ => {
                self.state = SessionState::GithubRepoCreation(form);
                Vec::new()
            }
        }
    }

    // ---------- release ----------

    fn start_release(&mut self) -> Vec<Command> {
        if self.releasing {
            return Vec::new();
        }
        if self.config.distributions.enabled_channels().is_empty() {
            self.show_error("No distribution channels enabled");
            return Vec::new();
        }

        self.releasing = true;
        let mut commands = Vec::new();
        if self.config.build.push_before_release {
            commands.push(Command::Push);
        }
        // The verify step follows the test run when tests are enabled.
        if self.config.build.run_tests_before_release {
            commands.push(Command::RunTests);
        } else {
            commands.push(Command::VerifyReleaseConfig);
        }
        commands
    }

    // ---------- first-time setup ----------

    fn on_setup_key(&mut self, phase: SetupPhase, key: KeyCode) -> Vec<Command> {
        match phase {
            SetupPhase::Detecting => match key {
                KeyCode::Esc => {
                    // Skip setup without marking it complete.
                    self.state = SessionState::TabView;
                    Vec::new()
                }
                KeyCode::Char('r') => {
                    self.state = SessionState::FirstTimeSetup(SetupPhase::Detecting);
                    vec![Command::ProbeSetup]
                }
                _ => {
                    self.state = SessionState::FirstTimeSetup(SetupPhase::Detecting);
                    Vec::new()
                }
            },
            SetupPhase::CustomFileChoice {
                found,
                detected,
                mut keep_selected,
            } => match key {
                KeyCode::Left
                | KeyCode::Right
                | KeyCode::Char('h')
                | KeyCode::Char('l')
                | KeyCode::Tab => {
                    keep_selected = !keep_selected;
                    self.state = SessionState::FirstTimeSetup(SetupPhase::CustomFileChoice {
                        found,
                        detected,
                        keep_selected,
                    });
                    Vec::new()
                }
                KeyCode::Enter => {
                    if keep_selected {
                        self.apply_detected(&detected);
                        self.config.custom_files_mode = true;
                        self.config.first_time_setup_completed = true;
                        self.persist();
                        self.state = SessionState::TabView;
                        self.show_status("Keeping existing pipeline files");
                        Vec::new()
                    } else {
                        self.state = SessionState::FirstTimeSetup(SetupPhase::ManualEntry(
                            SetupForm::from_detected(&detected),
                        ));
                        Vec::new()
                    }
                }
                _ => {
                    self.state = SessionState::FirstTimeSetup(SetupPhase::CustomFileChoice {
                        found,
                        detected,
                        keep_selected,
                    });
                    Vec::new()
                }
            },
            SetupPhase::ManualEntry(mut form) => match key {
                KeyCode::Tab => {
                    form.focus = (form.focus + 1) % SetupForm::FIELDS;
                    self.state = SessionState::FirstTimeSetup(SetupPhase::ManualEntry(form));
                    Vec::new()
                }
                KeyCode::BackTab => {
                    form.focus = (form.focus + SetupForm::FIELDS - 1) % SetupForm::FIELDS;
                    self.state = SessionState::FirstTimeSetup(SetupPhase::ManualEntry(form));
                    Vec::new()
                }
                KeyCode::Char(c) => {
                    form.focused_field_mut().push(c);
                    self.state = SessionState::FirstTimeSetup(SetupPhase::ManualEntry(form));
                    Vec::new()
                }
                KeyCode::Backspace => {
                    form.focused_field_mut().pop();
                    self.state = SessionState::FirstTimeSetup(SetupPhase::ManualEntry(form));
                    Vec::new()
                }
                KeyCode::Enter => {
                    // Required field missing: rejected locally, no change.
                    if form.package_name.trim().is_empty() {
                        self.state = SessionState::FirstTimeSetup(SetupPhase::ManualEntry(form));
                        return Vec::new();
                    }
                    self.start_setup_verification(form)
                }
                _ => {
                    self.state = SessionState::FirstTimeSetup(SetupPhase::ManualEntry(form));
                    Vec::new()
                }
            },
            SetupPhase::AutoDetectedConfirm(form) => match key {
                KeyCode::Char('y') | KeyCode::Enter => self.start_setup_verification(form),
                KeyCode::Char('e') | KeyCode::Esc => {
                    self.state = SessionState::FirstTimeSetup(SetupPhase::ManualEntry(form));
                    Vec::new()
                }
                _ => {
                    self.state = SessionState::FirstTimeSetup(SetupPhase::AutoDetectedConfirm(form));
                    Vec::new()
                }
            },
            SetupPhase::Verifying(form) => match key {
                KeyCode::Esc => {
                    // The in-flight result will be ignored by this state.
                    self.state = SessionState::FirstTimeSetup(SetupPhase::ManualEntry(form));
                    Vec::new()
                }
                _ => {
                    self.state = SessionState::FirstTimeSetup(SetupPhase::Verifying(form));
                    Vec::new()
                }
            },
        }
    }

    fn start_setup_verification(&mut self, form: SetupForm) -> Vec<Command> {
        let name = form.package_name.trim().to_string();
        let owner = self.global.npm_owner.clone();
        self.state = SessionState::FirstTimeSetup(SetupPhase::Verifying(form));
        vec![Command::CheckPackageName { name, owner }]
    }

    fn apply_detected(&mut self, detected: &crate::session::state::DetectedProject) {
        if self.config.info.module.is_none() {
            self.config.info.module = detected.module.clone();
        }
        if self.config.info.binary_name.is_none() {
            self.config.info.binary_name = detected.binary.clone();
        }
        if self.config.info.repository.is_none() {
            self.config.info.repository = detected.repository.clone();
        }
    }

    fn complete_setup(&mut self, form: SetupForm, availability: NameAvailability) {
        let package = form.package_name.trim().to_string();

        self.config.info.module = Some(package.clone());
        let binary = form.binary_name.trim();
        self.config.info.binary_name = if binary.is_empty() {
            Some(package.clone())
        } else {
            Some(binary.to_string())
        };
        let repository = form.repository.trim();
        if !repository.is_empty() {
            self.config.info.repository = Some(repository.to_string());
        }
        self.config.distributions.npm.package_name = Some(package.clone());
        for channel in self.global.default_channels.clone() {
            self.config.distributions.set_enabled(channel, true);
        }
        self.config.first_time_setup_completed = true;
        self.persist();

        self.state = SessionState::TabView;
        match availability {
            NameAvailability::Taken { .. } => self.show_error(availability.summary(&package)),
            _ => self.show_status(availability.summary(&package)),
        }
        self.name_check = Some(NameCheckDisplay {
            name: package,
            result: Ok(availability),
        });
    }

    // ---------- command completions ----------

    fn on_command(&mut self, outcome: CommandOutcome) -> Vec<Command> {
        match outcome {
            CommandOutcome::StatusLoaded(result) => self.on_status_loaded(result),
            CommandOutcome::BranchesLoaded(result) => {
                if let Some(Overlay::BranchSelection(mut model)) = self.overlay.clone() {
                    match result {
                        Ok(branches) => {
                            model.loading = false;
                            model.branches = branches;
                            model.cursor = 0;
                            self.overlay = Some(Overlay::BranchSelection(model));
                        }
                        Err(e) => {
                            self.overlay = None;
                            self.show_error(format!("Branch listing failed: {}", e));
                        }
                    }
                }
                Vec::new()
            }
            CommandOutcome::BranchSwitched(result) => match result {
                Ok(branch) => {
                    self.overlay = None;
                    if let Some(model) = &mut self.git {
                        model.branch = branch.clone();
                    }
                    self.show_status(format!("Switched to {}", branch));
                    self.refresh_git()
                }
                Err(e) => {
                    if let Some(Overlay::BranchSelection(mut model)) = self.overlay.clone() {
                        model.switching = false;
                        self.overlay = Some(Overlay::BranchSelection(model));
                    }
                    self.show_error(format!("Checkout failed: {}", e));
                    Vec::new()
                }
            },
            CommandOutcome::CommitFinished(result) => self.on_commit_finished(result),
            CommandOutcome::PushFinished(result) => {
                match result {
                    Ok(()) => self.show_status("Pushed"),
                    Err(e) => self.show_error(format!("Push failed: {}", e)),
                }
                Vec::new()
            }
            CommandOutcome::NameChecked { name, result } => {
                self.name_check = Some(NameCheckDisplay {
                    name: name.clone(),
                    result: result.clone(),
                });

                if let SessionState::FirstTimeSetup(SetupPhase::Verifying(form)) =
                    self.state.clone()
                {
                    match result {
                        Ok(availability) => self.complete_setup(form, availability),
                        Err(e) => {
                            self.show_error(format!("Registry check failed: {}", e));
                            self.state =
                                SessionState::FirstTimeSetup(SetupPhase::ManualEntry(form));
                        }
                    }
                } else if let Ok(availability) = &result {
                    self.show_status(availability.summary(&name));
                } else if let Err(e) = &result {
                    self.show_error(format!("Registry check failed: {}", e));
                }
                Vec::new()
            }
            CommandOutcome::FormulaChecked { name, result } => {
                match result {
                    Ok(true) => self.show_error(format!(
                        "Formula {} already exists in homebrew-core",
                        name
                    )),
                    Ok(false) => self.show_status(format!("Formula name {} is free", name)),
                    Err(e) => self.show_error(format!("Formula check failed: {}", e)),
                }
                Vec::new()
            }
            CommandOutcome::TestsFinished(result) => {
                if !self.releasing {
                    return Vec::new();
                }
                match result {
                    Ok(()) => {
                        self.show_status("Tests passed");
                        vec![Command::VerifyReleaseConfig]
                    }
                    Err(e) => {
                        self.releasing = false;
                        self.show_error(format!("Tests failed: {}", e));
                        Vec::new()
                    }
                }
            }
            CommandOutcome::SetupProbed(result) => self.on_setup_probed(result),
            CommandOutcome::RepoCreated(result) => {
                if let SessionState::GithubRepoCreation(mut form) = self.state.clone() {
                    match result {
                        Ok(url) => {
                            if let Some(slug) = crate::session::command::parse_repo_slug(&url) {
                                self.config.info.repository = Some(slug);
                            }
                            self.persist();
                            self.state = SessionState::TabView;
                            self.show_status(format!("Repository created: {}", url));
                        }
                        Err(e) => {
                            form.running = false;
                            self.state = SessionState::GithubRepoCreation(form);
                            self.show_error(format!("Repository creation failed: {}", e));
                        }
                    }
                }
                Vec::new()
            }
            CommandOutcome::ReleaseVerified(result) => {
                if !self.releasing {
                    return Vec::new();
                }
                match result {
                    Ok(()) => {
                        let version =
                            next_version(self.config.releases.last().map(|r| r.version.as_str()));
                        self.show_status(format!("Config valid; releasing {}", version));
                        vec![Command::RunRelease {
                            version,
                            clean: self.config.build.clean_dist,
                        }]
                    }
                    Err(e) => {
                        self.releasing = false;
                        self.show_error(format!("Release config invalid: {}", e));
                        Vec::new()
                    }
                }
            }
            CommandOutcome::ReleaseFinished { version, result } => {
                self.releasing = false;
                match result {
                    Ok(()) => {
                        self.config.releases.push(ReleaseRecord {
                            version: version.clone(),
                            channels: self.config.distributions.enabled_channels(),
                            published_at: Utc::now(),
                        });
                        self.persist();
                        self.show_status(format!("Released {}", version));
                    }
                    Err(e) => self.show_error(format!("Release failed: {}", e)),
                }
                Vec::new()
            }
        }
    }

    fn on_status_loaded(
        &mut self,
        result: Result<crate::session::event::StatusSnapshot, String>,
    ) -> Vec<Command> {
        self.git_loading = false;

        match result {
            Ok(snapshot) => {
                let items = build_items(&snapshot.entries, self.config.cleanup_rules.as_deref());
                self.cleanup_cursor = self.cleanup_cursor.min(items.len().saturating_sub(1));
                self.git = Some(GitModel {
                    branch: snapshot.branch,
                    items,
                    refreshing: false,
                });

                if let SessionState::RepoCleanupScan(mut model) = self.state.clone() {
                    model.scanning = false;
                    model.summary = self
                        .git
                        .as_ref()
                        .map(|m| ScanSummary::from_items(&m.items));
                    self.state = SessionState::RepoCleanupScan(model);
                }
            }
            Err(e) => {
                if let Some(model) = &mut self.git {
                    model.refreshing = false;
                }
                self.show_error(format!("Status read failed: {}", e));
            }
        }
        Vec::new()
    }

    fn on_commit_finished(&mut self, result: Result<String, String>) -> Vec<Command> {
        match result {
            Ok(hash) => {
                match self.state.clone() {
                    SessionState::SmartCommitConfirm(_) | SessionState::CommitView(_) => {
                        self.state = SessionState::TabView;
                    }
                    _ => {}
                }
                self.show_status(format!("Committed {}", hash));
                self.refresh_git()
            }
            Err(e) => {
                // The pre-attempt view stays active; the operator may
                // retry. Partial staging is left as-is.
                match self.state.clone() {
                    SessionState::SmartCommitConfirm(mut model) => {
                        model.running = false;
                        self.state = SessionState::SmartCommitConfirm(model);
                    }
                    SessionState::CommitView(mut form) => {
                        form.running = false;
                        self.state = SessionState::CommitView(form);
                    }
                    _ => {}
                }
                self.show_error(format!("Commit failed: {}", e));
                Vec::new()
            }
        }
    }

    fn on_setup_probed(&mut self, result: Result<SetupProbe, String>) -> Vec<Command> {
        // Only the detecting phase cares; anything else abandoned the probe.
        if !matches!(
            self.state,
            SessionState::FirstTimeSetup(SetupPhase::Detecting)
        ) {
            return Vec::new();
        }

        match result {
            Ok(probe) => {
                if !probe.hand_authored.is_empty() {
                    self.state = SessionState::FirstTimeSetup(SetupPhase::CustomFileChoice {
                        found: probe.hand_authored,
                        detected: probe.detected,
                        keep_selected: true,
                    });
                } else if !probe.generated.is_empty() {
                    // Artifacts are already distui-authored; nothing to set up.
                    self.apply_detected(&probe.detected);
                    self.config.first_time_setup_completed = true;
                    self.persist();
                    self.state = SessionState::TabView;
                    self.show_status("Existing distui pipeline detected");
                } else if !probe.detected.is_empty() {
                    self.state = SessionState::FirstTimeSetup(SetupPhase::AutoDetectedConfirm(
                        SetupForm::from_detected(&probe.detected),
                    ));
                } else {
                    self.state =
                        SessionState::FirstTimeSetup(SetupPhase::ManualEntry(SetupForm::default()));
                }
            }
            Err(e) => {
                self.show_error(format!("Project detection failed: {}", e));
            }
        }
        Vec::new()
    }
}

/// Step a cursor by a delta, clamped to `0..=max`.
fn step(cursor: usize, delta: isize, max: usize) -> usize {
    if delta >= 0 {
        cursor.saturating_add(delta as usize).min(max)
    } else {
        cursor.saturating_sub(delta.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::CleanupAction;
    use crate::config::schema::{GlobalConfig, ProjectConfig, ProjectInfo};
    use crate::config::ConfigStore;
    use crate::drift::{ArtifactKind, GENERATED_MARKER};
    use crate::git::{FileStatus, StatusEntry};
    use crate::session::event::StatusSnapshot;
    use crate::session::state::{DetectedProject, STATUS_TICKS};
    use tempfile::TempDir;

    struct Fixture {
        session: Session,
        #[allow(dead_code)]
        store_dir: TempDir,
        project_dir: TempDir,
        store: ConfigStore,
    }

    fn fixture_with(mutate: impl FnOnce(&mut ProjectConfig)) -> Fixture {
        let store_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        let store = ConfigStore::with_root(store_dir.path().to_path_buf());

        let mut config = ProjectConfig::new(
            "demo",
            ProjectInfo {
                path: project_dir.path().to_path_buf(),
                module: Some("demo".to_string()),
                binary_name: Some("demo".to_string()),
                repository: Some("octocat/demo".to_string()),
            },
        );
        config.first_time_setup_completed = true;
        mutate(&mut config);

        let (session, _) = Session::new(
            project_dir.path().to_path_buf(),
            store.clone(),
            GlobalConfig::default(),
            config,
        );

        Fixture {
            session,
            store_dir,
            project_dir,
            store,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(|_| {})
    }

    fn key(session: &mut Session, code: KeyCode) -> Vec<Command> {
        session.handle_event(Event::Key(code))
    }

    fn status_event(paths: &[(&str, &str)]) -> Event {
        let entries = paths
            .iter()
            .map(|(path, code)| StatusEntry {
                path: path.to_string(),
                code: code.to_string(),
                status: FileStatus::from_porcelain(code),
            })
            .collect();
        Event::Command(CommandOutcome::StatusLoaded(Ok(StatusSnapshot {
            branch: "main".to_string(),
            entries,
        })))
    }

    // ==================== Cleanup tab & watcher ====================

    #[test]
    fn test_first_cleanup_entry_issues_load() {
        let mut fx = fixture();

        let commands = key(&mut fx.session, KeyCode::Char('3'));
        assert_eq!(commands, vec![Command::LoadStatus]);
        assert!(fx.session.is_loading_status());

        // Re-entering while the load is in flight issues nothing.
        key(&mut fx.session, KeyCode::Char('1'));
        let commands = key(&mut fx.session, KeyCode::Char('3'));
        assert!(commands.is_empty());
    }

    #[test]
    fn test_later_cleanup_entries_refresh() {
        let mut fx = fixture();
        key(&mut fx.session, KeyCode::Char('3'));
        fx.session.handle_event(status_event(&[("a.go", "??")]));

        key(&mut fx.session, KeyCode::Char('1'));
        let commands = key(&mut fx.session, KeyCode::Char('3'));
        assert_eq!(commands, vec![Command::RefreshStatus]);
    }

    #[test]
    fn test_status_loaded_builds_model() {
        let mut fx = fixture();
        key(&mut fx.session, KeyCode::Char('3'));
        fx.session
            .handle_event(status_event(&[("a.go", "??"), ("image.png", "??")]));

        let model = fx.session.git_model().unwrap();
        assert_eq!(model.branch, "main");
        assert_eq!(model.items.len(), 2);
        assert!(!fx.session.is_loading_status());
    }

    #[test]
    fn test_watcher_tick_is_noop_before_first_load() {
        let mut fx = fixture();
        let commands = fx.session.handle_event(Event::WatcherTick);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_watcher_tick_refreshes_after_load() {
        let mut fx = fixture();
        key(&mut fx.session, KeyCode::Char('3'));
        fx.session.handle_event(status_event(&[("a.go", "??")]));

        let commands = fx.session.handle_event(Event::WatcherTick);
        assert_eq!(commands, vec![Command::RefreshStatus]);

        // No double dispatch while a refresh is in flight.
        let commands = fx.session.handle_event(Event::WatcherTick);
        assert!(commands.is_empty());
    }

    // ==================== Distribution toggles ====================

    #[test]
    fn test_mode_switch_guard_never_mutates_config() {
        let mut fx = fixture_with(|c| c.custom_files_mode = true);
        let before = fx.session.config().clone();

        let commands = key(&mut fx.session, KeyCode::Char(' '));
        assert!(commands.is_empty());
        assert!(matches!(
            fx.session.state(),
            SessionState::ModeSwitchWarning(_)
        ));
        assert_eq!(fx.session.config(), &before);
        // Nothing was persisted either.
        assert!(!fx.store.project_path("demo").exists());
    }

    #[test]
    fn test_toggle_persists_immediately() {
        let mut fx = fixture();

        key(&mut fx.session, KeyCode::Char(' '));
        assert!(fx.session.config().distributions.github_release.enabled);
        assert!(fx.store.project_path("demo").exists());
    }

    #[test]
    fn test_enabling_npm_starts_name_check() {
        let mut fx = fixture();
        key(&mut fx.session, KeyCode::Char('j'));

        let commands = key(&mut fx.session, KeyCode::Char(' '));
        assert!(commands.iter().any(|c| matches!(
            c,
            Command::CheckPackageName { name, .. } if name == "demo"
        )));
    }

    #[test]
    fn test_toggle_with_drift_requests_consent() {
        let mut fx = fixture();
        key(&mut fx.session, KeyCode::Char('j'));
        key(&mut fx.session, KeyCode::Char('j'));

        key(&mut fx.session, KeyCode::Char(' '));
        match fx.session.state() {
            SessionState::ConfigRegenerationConsent(pending) => {
                assert_eq!(
                    pending.report.to_generate,
                    vec![ArtifactKind::PipelineDescriptor]
                );
                assert!(pending.report.to_delete.is_empty());
                assert_eq!(pending.triggered_by, Some(Channel::Homebrew));
            }
            other => panic!("Expected consent state, got: {:?}", other),
        }
    }

    #[test]
    fn test_declining_consent_reverts_toggle() {
        let mut fx = fixture();
        key(&mut fx.session, KeyCode::Char('j'));
        key(&mut fx.session, KeyCode::Char('j'));
        key(&mut fx.session, KeyCode::Char(' '));

        key(&mut fx.session, KeyCode::Char('n'));
        assert!(!fx.session.config().distributions.homebrew.enabled);
        assert!(matches!(fx.session.state(), SessionState::TabView));
    }

    #[test]
    fn test_confirming_consent_writes_marker_bearing_artifact() {
        let mut fx = fixture();
        key(&mut fx.session, KeyCode::Char('j'));
        key(&mut fx.session, KeyCode::Char('j'));
        key(&mut fx.session, KeyCode::Char(' '));

        key(&mut fx.session, KeyCode::Char('y'));
        assert!(matches!(fx.session.state(), SessionState::TabView));

        let descriptor = fx.project_dir.path().join(".goreleaser.yaml");
        let content = std::fs::read_to_string(descriptor).unwrap();
        assert!(content.contains(GENERATED_MARKER));

        // Regeneration-needed is cleared: a fresh request reports up to date.
        key(&mut fx.session, KeyCode::Char('r'));
        assert!(matches!(fx.session.state(), SessionState::TabView));
        assert_eq!(
            fx.session.status_message().unwrap().text,
            "Pipeline artifacts are up to date"
        );
    }

    #[test]
    fn test_regeneration_with_hand_authored_file_warns_first() {
        let mut fx = fixture_with(|c| c.distributions.homebrew.enabled = true);
        std::fs::write(
            fx.project_dir.path().join(".goreleaser.yaml"),
            "my own pipeline\n",
        )
        .unwrap();

        key(&mut fx.session, KeyCode::Char('r'));
        assert!(matches!(
            fx.session.state(),
            SessionState::ConfigRegenerationConsent(_)
        ));

        key(&mut fx.session, KeyCode::Char('y'));
        assert!(matches!(
            fx.session.state(),
            SessionState::ModeSwitchWarning(_)
        ));

        // Accepting replaces the file and leaves custom-files mode off.
        key(&mut fx.session, KeyCode::Char('y'));
        let content =
            std::fs::read_to_string(fx.project_dir.path().join(".goreleaser.yaml")).unwrap();
        assert!(content.contains(GENERATED_MARKER));
        assert!(!fx.session.config().custom_files_mode);
    }

    #[test]
    fn test_mode_switch_accept_applies_rejected_toggle() {
        let mut fx = fixture_with(|c| c.custom_files_mode = true);

        key(&mut fx.session, KeyCode::Char(' '));
        assert!(matches!(
            fx.session.state(),
            SessionState::ModeSwitchWarning(_)
        ));

        key(&mut fx.session, KeyCode::Char('y'));
        assert!(!fx.session.config().custom_files_mode);
        assert!(fx.session.config().distributions.github_release.enabled);
    }

    #[test]
    fn test_mode_switch_decline_changes_nothing() {
        let mut fx = fixture_with(|c| c.custom_files_mode = true);
        let before = fx.session.config().clone();

        key(&mut fx.session, KeyCode::Char(' '));
        key(&mut fx.session, KeyCode::Char('n'));

        assert_eq!(fx.session.config(), &before);
        assert!(matches!(fx.session.state(), SessionState::TabView));
    }

    // ==================== Smart commit ====================

    fn seed_cleanup(fx: &mut Fixture) {
        key(&mut fx.session, KeyCode::Char('3'));
        fx.session.handle_event(status_event(&[
            ("a.go", "??"),
            ("README.md", "??"),
            ("image.png", "??"),
            ("notes.txt", "??"),
            ("b.go", "??"),
        ]));
        // Clear the refresh flag left by entering the tab.
        if let Some(model) = fx.session.git_model() {
            assert!(!model.refreshing);
        }
    }

    #[test]
    fn test_smart_commit_defaults_commit_only_source() {
        let mut fx = fixture();
        seed_cleanup(&mut fx);

        key(&mut fx.session, KeyCode::Char('c'));
        assert!(matches!(
            fx.session.state(),
            SessionState::SmartCommitFileSelection(_)
        ));

        key(&mut fx.session, KeyCode::Enter);
        match fx.session.state() {
            SessionState::SmartCommitConfirm(model) => {
                let committed: Vec<&str> = model
                    .plan
                    .to_commit
                    .iter()
                    .map(|f| f.path.as_str())
                    .collect();
                assert_eq!(committed, vec!["a.go", "b.go"]);
                assert_eq!(model.plan.ignore_additions, vec!["image.png".to_string()]);
                assert_eq!(model.plan.message, "Update source code");
            }
            other => panic!("Expected confirm state, got: {:?}", other),
        }
    }

    #[test]
    fn test_smart_commit_confirm_dispatches_plan() {
        let mut fx = fixture();
        seed_cleanup(&mut fx);
        key(&mut fx.session, KeyCode::Char('c'));
        key(&mut fx.session, KeyCode::Enter);

        let commands = key(&mut fx.session, KeyCode::Char('y'));
        assert!(matches!(commands.as_slice(), [Command::RunSmartCommit(_)]));

        // Double-confirm while running dispatches nothing.
        let commands = key(&mut fx.session, KeyCode::Char('y'));
        assert!(commands.is_empty());
    }

    #[test]
    fn test_commit_failure_keeps_view_and_shows_error() {
        let mut fx = fixture();
        seed_cleanup(&mut fx);
        key(&mut fx.session, KeyCode::Char('c'));
        key(&mut fx.session, KeyCode::Enter);
        key(&mut fx.session, KeyCode::Char('y'));

        fx.session
            .handle_event(Event::Command(CommandOutcome::CommitFinished(Err(
                "pre-commit hook failed".to_string(),
            ))));

        match fx.session.state() {
            SessionState::SmartCommitConfirm(model) => assert!(!model.running),
            other => panic!("Expected confirm state, got: {:?}", other),
        }
        assert!(fx.session.has_error_status());
    }

    #[test]
    fn test_commit_success_returns_to_tabs() {
        let mut fx = fixture();
        seed_cleanup(&mut fx);
        key(&mut fx.session, KeyCode::Char('c'));
        key(&mut fx.session, KeyCode::Enter);
        key(&mut fx.session, KeyCode::Char('y'));

        fx.session
            .handle_event(Event::Command(CommandOutcome::CommitFinished(Ok(
                "abc1234".to_string()
            ))));

        assert!(matches!(fx.session.state(), SessionState::TabView));
        assert!(
            fx.session
                .status_message()
                .unwrap()
                .text
                .contains("abc1234")
        );
    }

    #[test]
    fn test_file_selection_cycle_overrides_default() {
        let mut fx = fixture();
        seed_cleanup(&mut fx);
        key(&mut fx.session, KeyCode::Char('c'));

        // Cursor on "a.go": Commit -> Skip.
        key(&mut fx.session, KeyCode::Char(' '));
        match fx.session.state() {
            SessionState::SmartCommitFileSelection(model) => {
                assert_eq!(model.decisions.get("a.go"), Some(&CleanupAction::Skip));
            }
            other => panic!("Expected selection state, got: {:?}", other),
        }
    }

    #[test]
    fn test_manual_commit_rejects_empty_message() {
        let mut fx = fixture();
        seed_cleanup(&mut fx);

        key(&mut fx.session, KeyCode::Char('m'));
        let commands = key(&mut fx.session, KeyCode::Enter);
        assert!(commands.is_empty());
        assert!(matches!(fx.session.state(), SessionState::CommitView(_)));
        assert!(fx.session.status_message().is_none());
    }

    // ==================== Status messages ====================

    #[test]
    fn test_status_message_expires_after_fixed_ticks() {
        let mut fx = fixture();
        fx.session
            .handle_event(Event::Command(CommandOutcome::PushFinished(Err(
                "no upstream".to_string()
            ))));
        assert!(fx.session.has_error_status());

        for _ in 0..STATUS_TICKS {
            fx.session.handle_event(Event::Tick);
        }
        assert!(fx.session.status_message().is_none());
    }

    #[test]
    fn test_failure_does_not_change_state() {
        let mut fx = fixture();
        fx.session
            .handle_event(Event::Command(CommandOutcome::PushFinished(Err(
                "remote hung up".to_string()
            ))));

        assert!(matches!(fx.session.state(), SessionState::TabView));
        assert!(fx.session.has_error_status());
    }

    // ==================== Persistence discipline ====================

    #[test]
    fn test_navigational_transitions_do_not_save() {
        let mut fx = fixture();

        key(&mut fx.session, KeyCode::Tab);
        key(&mut fx.session, KeyCode::Char('1'));
        key(&mut fx.session, KeyCode::Char('p'));
        key(&mut fx.session, KeyCode::Esc);

        assert!(!fx.store.project_path("demo").exists());
    }

    #[test]
    fn test_preference_toggle_persists() {
        let mut fx = fixture();

        key(&mut fx.session, KeyCode::Char('p'));
        key(&mut fx.session, KeyCode::Char(' '));

        assert!(!fx.session.config().build.run_tests_before_release);
        let saved = fx.store.load_project("demo").unwrap().unwrap();
        assert!(!saved.build.run_tests_before_release);
    }

    // ==================== Overlay ====================

    #[test]
    fn test_overlay_intercepts_input() {
        let mut fx = fixture();

        let commands = key(&mut fx.session, KeyCode::Char('b'));
        assert_eq!(commands, vec![Command::LoadBranches]);
        assert!(fx.session.overlay().is_some());

        // 'q' would quit in the tab view; the overlay swallows it.
        key(&mut fx.session, KeyCode::Char('q'));
        assert!(!fx.session.should_quit());
    }

    #[test]
    fn test_branch_selection_flow() {
        let mut fx = fixture();
        key(&mut fx.session, KeyCode::Char('b'));

        fx.session
            .handle_event(Event::Command(CommandOutcome::BranchesLoaded(Ok(vec![
                "main".to_string(),
                "dev".to_string(),
            ]))));

        key(&mut fx.session, KeyCode::Char('j'));
        let commands = key(&mut fx.session, KeyCode::Enter);
        assert_eq!(commands, vec![Command::SwitchBranch("dev".to_string())]);

        fx.session
            .handle_event(Event::Command(CommandOutcome::BranchSwitched(Ok(
                "dev".to_string()
            ))));
        assert!(fx.session.overlay().is_none());
    }

    #[test]
    fn test_closed_overlay_ignores_stale_results() {
        let mut fx = fixture();
        key(&mut fx.session, KeyCode::Char('b'));
        key(&mut fx.session, KeyCode::Esc);
        assert!(fx.session.overlay().is_none());

        // The abandoned listing arrives; nothing reopens.
        fx.session
            .handle_event(Event::Command(CommandOutcome::BranchesLoaded(Ok(vec![
                "main".to_string(),
            ]))));
        assert!(fx.session.overlay().is_none());
    }

    // ==================== First-time setup ====================

    fn setup_fixture() -> Fixture {
        let store_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        let store = ConfigStore::with_root(store_dir.path().to_path_buf());
        let config = ProjectConfig::new("demo", ProjectInfo::default());

        let (session, commands) = Session::new(
            project_dir.path().to_path_buf(),
            store.clone(),
            GlobalConfig {
                npm_owner: Some("octocat".to_string()),
                ..Default::default()
            },
            config,
        );
        assert_eq!(commands, vec![Command::ProbeSetup]);

        Fixture {
            session,
            store_dir,
            project_dir,
            store,
        }
    }

    fn probe(
        hand_authored: Vec<ArtifactKind>,
        generated: Vec<ArtifactKind>,
        detected: DetectedProject,
    ) -> Event {
        Event::Command(CommandOutcome::SetupProbed(Ok(SetupProbe {
            hand_authored,
            generated,
            detected,
        })))
    }

    #[test]
    fn test_setup_hand_authored_branch() {
        let mut fx = setup_fixture();
        fx.session.handle_event(probe(
            vec![ArtifactKind::PipelineDescriptor],
            vec![],
            DetectedProject::default(),
        ));

        assert!(matches!(
            fx.session.state(),
            SessionState::FirstTimeSetup(SetupPhase::CustomFileChoice { .. })
        ));

        // Keeping the files enables custom mode and completes setup.
        key(&mut fx.session, KeyCode::Enter);
        assert!(fx.session.config().custom_files_mode);
        assert!(fx.session.config().first_time_setup_completed);
        assert!(matches!(fx.session.state(), SessionState::TabView));
    }

    #[test]
    fn test_setup_generated_branch_skips_setup() {
        let mut fx = setup_fixture();
        fx.session.handle_event(probe(
            vec![],
            vec![ArtifactKind::PipelineDescriptor],
            DetectedProject {
                module: Some("demo".to_string()),
                ..Default::default()
            },
        ));

        assert!(fx.session.config().first_time_setup_completed);
        assert!(!fx.session.config().custom_files_mode);
        assert!(matches!(fx.session.state(), SessionState::TabView));
    }

    #[test]
    fn test_setup_manual_branch_with_detection() {
        let mut fx = setup_fixture();
        fx.session.handle_event(probe(
            vec![],
            vec![],
            DetectedProject {
                module: Some("demo".to_string()),
                binary: Some("demo".to_string()),
                repository: Some("octocat/demo".to_string()),
            },
        ));

        assert!(matches!(
            fx.session.state(),
            SessionState::FirstTimeSetup(SetupPhase::AutoDetectedConfirm(_))
        ));

        let commands = key(&mut fx.session, KeyCode::Char('y'));
        assert!(matches!(
            commands.as_slice(),
            [Command::CheckPackageName { name, .. }] if name == "demo"
        ));
        assert!(matches!(
            fx.session.state(),
            SessionState::FirstTimeSetup(SetupPhase::Verifying(_))
        ));
    }

    #[test]
    fn test_setup_owned_name_completes_affirmatively() {
        let mut fx = setup_fixture();
        fx.session.handle_event(probe(
            vec![],
            vec![],
            DetectedProject {
                module: Some("demo".to_string()),
                ..Default::default()
            },
        ));
        key(&mut fx.session, KeyCode::Char('y'));

        fx.session
            .handle_event(Event::Command(CommandOutcome::NameChecked {
                name: "demo".to_string(),
                result: Ok(NameAvailability::Owned {
                    version: "1.0.0".to_string(),
                }),
            }));

        assert!(fx.session.config().first_time_setup_completed);
        assert!(matches!(fx.session.state(), SessionState::TabView));
        // Affirmative status; no error state entered.
        assert!(!fx.session.has_error_status());
        assert!(
            fx.session
                .status_message()
                .unwrap()
                .text
                .contains("yours")
        );
    }

    #[test]
    fn test_setup_manual_entry_requires_package_name() {
        let mut fx = setup_fixture();
        fx.session
            .handle_event(probe(vec![], vec![], DetectedProject::default()));

        assert!(matches!(
            fx.session.state(),
            SessionState::FirstTimeSetup(SetupPhase::ManualEntry(_))
        ));

        let commands = key(&mut fx.session, KeyCode::Enter);
        assert!(commands.is_empty());
        assert!(matches!(
            fx.session.state(),
            SessionState::FirstTimeSetup(SetupPhase::ManualEntry(_))
        ));
    }

    // ==================== Release ====================

    #[test]
    fn test_release_requires_enabled_channel() {
        let mut fx = fixture();
        key(&mut fx.session, KeyCode::Char('2'));

        let commands = key(&mut fx.session, KeyCode::Char('R'));
        assert!(commands.is_empty());
        assert!(fx.session.has_error_status());
    }

    #[test]
    fn test_release_flow_appends_history() {
        let mut fx = fixture_with(|c| {
            c.distributions.github_release.enabled = true;
            c.build.run_tests_before_release = false;
        });
        key(&mut fx.session, KeyCode::Char('2'));

        let commands = key(&mut fx.session, KeyCode::Char('R'));
        assert_eq!(
            commands,
            vec![Command::Push, Command::VerifyReleaseConfig]
        );
        assert!(fx.session.is_releasing());

        let commands = fx
            .session
            .handle_event(Event::Command(CommandOutcome::ReleaseVerified(Ok(()))));
        assert!(matches!(
            commands.as_slice(),
            [Command::RunRelease { version, .. }] if version == "v0.1.0"
        ));

        fx.session
            .handle_event(Event::Command(CommandOutcome::ReleaseFinished {
                version: "v0.1.0".to_string(),
                result: Ok(()),
            }));

        assert!(!fx.session.is_releasing());
        assert_eq!(fx.session.config().releases.len(), 1);
        assert_eq!(fx.session.config().releases[0].version, "v0.1.0");

        let saved = fx.store.load_project("demo").unwrap().unwrap();
        assert_eq!(saved.releases.len(), 1);
    }

    #[test]
    fn test_release_runs_tests_before_verify() {
        let mut fx = fixture_with(|c| c.distributions.github_release.enabled = true);
        key(&mut fx.session, KeyCode::Char('2'));

        // run_tests_before_release defaults to true.
        let commands = key(&mut fx.session, KeyCode::Char('R'));
        assert_eq!(commands, vec![Command::Push, Command::RunTests]);

        let commands = fx
            .session
            .handle_event(Event::Command(CommandOutcome::TestsFinished(Ok(()))));
        assert_eq!(commands, vec![Command::VerifyReleaseConfig]);

        // A test failure aborts the release.
        key(&mut fx.session, KeyCode::Char('R'));
        fx.session
            .handle_event(Event::Command(CommandOutcome::ReleaseVerified(Err(
                "aborted".to_string()
            ))));
        key(&mut fx.session, KeyCode::Char('R'));
        fx.session
            .handle_event(Event::Command(CommandOutcome::TestsFinished(Err(
                "1 test failed".to_string()
            ))));
        assert!(!fx.session.is_releasing());
        assert!(fx.session.has_error_status());
        assert!(fx.session.config().releases.is_empty());
    }

    #[test]
    fn test_setup_applies_default_channels() {
        let store_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        let store = ConfigStore::with_root(store_dir.path().to_path_buf());
        let config = ProjectConfig::new("demo", ProjectInfo::default());

        let (mut session, _) = Session::new(
            project_dir.path().to_path_buf(),
            store,
            GlobalConfig {
                default_channels: vec![Channel::GithubRelease],
                ..Default::default()
            },
            config,
        );

        session.handle_event(probe(
            vec![],
            vec![],
            DetectedProject {
                module: Some("demo".to_string()),
                ..Default::default()
            },
        ));
        session.handle_event(Event::Key(KeyCode::Char('y')));
        session.handle_event(Event::Command(CommandOutcome::NameChecked {
            name: "demo".to_string(),
            result: Ok(NameAvailability::Available),
        }));

        assert!(session.config().first_time_setup_completed);
        assert!(session.config().distributions.github_release.enabled);
    }

    #[test]
    fn test_release_verify_failure_resets() {
        let mut fx = fixture_with(|c| {
            c.distributions.github_release.enabled = true;
            c.build.run_tests_before_release = false;
        });
        key(&mut fx.session, KeyCode::Char('2'));
        key(&mut fx.session, KeyCode::Char('R'));

        fx.session
            .handle_event(Event::Command(CommandOutcome::ReleaseVerified(Err(
                "bad config".to_string()
            ))));

        assert!(!fx.session.is_releasing());
        assert!(fx.session.has_error_status());
        assert!(matches!(fx.session.state(), SessionState::TabView));
    }
}
