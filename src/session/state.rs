//! Session state: the tagged union of active views, the modal overlay,
//! and the per-view support models.
//!
//! Exactly one state is active at a time. A sub-view's supporting model
//! lives inside its enum variant: entering the state allocates it, leaving
//! the state discards it. The overlay, when present, intercepts all input
//! before the underlying state sees it.

use std::collections::BTreeMap;

use crate::cleanup::{CleanupAction, CleanupItem, CommitPlan};
use crate::config::schema::Channel;
use crate::drift::{ArtifactKind, DriftReport};

/// Tabs of the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Distributions,
    Release,
    Cleanup,
    History,
}

impl Tab {
    /// All tabs, in display order.
    pub const ALL: [Tab; 4] = [Tab::Distributions, Tab::Release, Tab::Cleanup, Tab::History];

    /// Zero-based tab index.
    pub fn index(&self) -> usize {
        match self {
            Tab::Distributions => 0,
            Tab::Release => 1,
            Tab::Cleanup => 2,
            Tab::History => 3,
        }
    }

    /// Tab for a zero-based index, if in range.
    pub fn from_index(index: usize) -> Option<Tab> {
        Tab::ALL.get(index).copied()
    }

    /// The tab to the right, wrapping.
    pub fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    /// The tab to the left, wrapping.
    pub fn prev(&self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    /// Title shown in the tab bar.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Distributions => "Distributions",
            Tab::Release => "Release",
            Tab::Cleanup => "Cleanup",
            Tab::History => "History",
        }
    }
}

/// Cached working-tree model, built from the last status read.
#[derive(Debug, Clone, Default)]
pub struct GitModel {
    /// Currently checked-out branch
    pub branch: String,
    /// Changed files with categories and default actions
    pub items: Vec<CleanupItem>,
    /// A refresh command is in flight
    pub refreshing: bool,
}

/// Facts auto-detected from the project tree during setup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectedProject {
    pub module: Option<String>,
    pub binary: Option<String>,
    pub repository: Option<String>,
}

impl DetectedProject {
    /// Whether detection produced anything worth confirming.
    pub fn is_empty(&self) -> bool {
        self.module.is_none() && self.binary.is_none() && self.repository.is_none()
    }
}

/// Editable fields of the first-time setup form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupForm {
    pub package_name: String,
    pub binary_name: String,
    pub repository: String,
    /// Focused field: 0 package, 1 binary, 2 repository
    pub focus: usize,
}

impl SetupForm {
    /// Number of editable fields.
    pub const FIELDS: usize = 3;

    /// Prefill from detection results.
    pub fn from_detected(detected: &DetectedProject) -> Self {
        Self {
            package_name: detected.module.clone().unwrap_or_default(),
            binary_name: detected.binary.clone().unwrap_or_default(),
            repository: detected.repository.clone().unwrap_or_default(),
            focus: 0,
        }
    }

    /// Mutable access to the focused field.
    pub fn focused_field_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.package_name,
            1 => &mut self.binary_name,
            _ => &mut self.repository,
        }
    }
}

/// Phases of the first-time setup flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupPhase {
    /// Asynchronous artifact/metadata probe in flight
    Detecting,
    /// Hand-authored pipeline files found: keep them or let distui generate
    CustomFileChoice {
        found: Vec<ArtifactKind>,
        detected: DetectedProject,
        keep_selected: bool,
    },
    /// Manual field entry
    ManualEntry(SetupForm),
    /// Detection produced values; confirm or drop into manual entry
    AutoDetectedConfirm(SetupForm),
    /// Final asynchronous registry verification in flight
    Verifying(SetupForm),
}

/// Manual commit view model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitForm {
    pub message: String,
    /// The commit command is in flight
    pub running: bool,
}

/// Per-file decision map for the smart-commit wizard.
///
/// Decisions are keyed by path so a background status refresh cannot
/// misalign them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelectionModel {
    pub cursor: usize,
    pub decisions: BTreeMap<String, CleanupAction>,
}

impl FileSelectionModel {
    /// Seed decisions from the current cleanup items' defaults.
    pub fn from_items(items: &[CleanupItem]) -> Self {
        Self {
            cursor: 0,
            decisions: items
                .iter()
                .map(|item| (item.file.path.clone(), item.action))
                .collect(),
        }
    }

    /// Items with the wizard's decisions applied.
    pub fn apply_to(&self, items: &[CleanupItem]) -> Vec<CleanupItem> {
        items
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if let Some(action) = self.decisions.get(&item.file.path) {
                    item.action = *action;
                }
                item
            })
            .collect()
    }
}

/// Smart-commit confirmation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmModel {
    pub plan: CommitPlan,
    /// The commit command is in flight
    pub running: bool,
}

/// Repository-creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoCreateForm {
    pub name: String,
    pub private: bool,
    /// The create command is in flight
    pub running: bool,
}

/// Files to generate/delete, held between "requested" and
/// "confirmed/cancelled".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingGeneration {
    /// Detector output
    pub report: DriftReport,
    /// Hand-authored artifacts that would be replaced; requires the
    /// mode-switch warning before anything is written
    pub overwrite: Vec<ArtifactKind>,
    /// The channel toggle that caused this request, if any; declining
    /// reverts it
    pub triggered_by: Option<Channel>,
}

impl PendingGeneration {
    /// Nothing to do.
    pub fn is_empty(&self) -> bool {
        self.report.is_empty() && self.overwrite.is_empty()
    }
}

/// Why the mode-switch warning is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSwitchContext {
    /// A toggle was rejected because custom-files mode is on
    pub attempted_toggle: Option<Channel>,
    /// A confirmed regeneration needs to replace hand-authored files
    pub pending: Option<PendingGeneration>,
}

/// Preferences view model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefsModel {
    pub cursor: usize,
}

impl PrefsModel {
    /// Number of preference rows.
    pub const ROWS: usize = 4;
}

/// Cleanup-scan summary counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total: usize,
    pub auto: usize,
    pub docs: usize,
    pub ignorable: usize,
    pub other: usize,
}

impl ScanSummary {
    /// Tally cleanup items by category.
    pub fn from_items(items: &[CleanupItem]) -> Self {
        let mut summary = ScanSummary {
            total: items.len(),
            ..Default::default()
        };
        for item in items {
            match item.file.category {
                crate::cleanup::Category::Auto => summary.auto += 1,
                crate::cleanup::Category::Docs => summary.docs += 1,
                crate::cleanup::Category::Ignore => summary.ignorable += 1,
                crate::cleanup::Category::Other => summary.other += 1,
            }
        }
        summary
    }
}

/// Repository cleanup scan model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanModel {
    /// Waiting for a fresh status read
    pub scanning: bool,
    pub summary: Option<ScanSummary>,
}

/// Branch-selection overlay model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchModel {
    pub branches: Vec<String>,
    pub cursor: usize,
    pub loading: bool,
    /// A checkout command is in flight
    pub switching: bool,
}

/// Modal overlay; takes input priority over the underlying state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    BranchSelection(BranchModel),
}

/// The active view of the configuration session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Main tabbed view
    TabView,
    /// First-time setup wizard
    FirstTimeSetup(SetupPhase),
    /// Remote repository creation
    GithubRepoCreation(RepoCreateForm),
    /// Manual commit with a typed message
    CommitView(CommitForm),
    /// Per-file action selection for the smart commit
    SmartCommitFileSelection(FileSelectionModel),
    /// Smart-commit plan confirmation
    SmartCommitConfirm(ConfirmModel),
    /// Consent to generate/delete pipeline artifacts
    ConfigRegenerationConsent(PendingGeneration),
    /// Custom-files mode blocks the requested change
    ModeSwitchWarning(ModeSwitchContext),
    /// Build and cleanup preferences
    PreferencesView(PrefsModel),
    /// Working-tree scan summary
    RepoCleanupScan(ScanModel),
}

/// Severity of a transient status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// Ticks a status message stays visible (at the 500ms UI tick).
pub const STATUS_TICKS: u8 = 8;

/// A transient, time-limited status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub remaining_ticks: u8,
}

impl StatusMessage {
    /// New info-level message with the standard duration.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Info,
            remaining_ticks: STATUS_TICKS,
        }
    }

    /// New error-level message with the standard duration.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Error,
            remaining_ticks: STATUS_TICKS,
        }
    }
}
