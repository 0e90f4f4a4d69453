//! The session's inbound event surface.
//!
//! Everything the session reacts to arrives as one of these: key input,
//! resize bookkeeping, timer ticks, and command completions. Completion
//! variants carry enough identity for the session to know what they
//! complete; results from abandoned commands are simply ignored by states
//! that no longer care.

use crossterm::event::KeyCode;

use crate::drift::ArtifactKind;
use crate::git::StatusEntry;
use crate::registry::NameAvailability;
use crate::session::state::DetectedProject;

/// A snapshot of the working tree produced by a status command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Currently checked-out branch
    pub branch: String,
    /// Changed paths with porcelain codes
    pub entries: Vec<StatusEntry>,
}

/// First-time setup probe results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupProbe {
    /// Managed artifacts present without the ownership marker
    pub hand_authored: Vec<ArtifactKind>,
    /// Managed artifacts present with the ownership marker
    pub generated: Vec<ArtifactKind>,
    /// Facts detected from the project tree
    pub detected: DetectedProject,
}

/// Completion of one asynchronous command.
///
/// Error sides are plain strings: the text the failing tool produced,
/// already flattened for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A status load or refresh finished
    StatusLoaded(Result<StatusSnapshot, String>),
    /// Branch listing finished
    BranchesLoaded(Result<Vec<String>, String>),
    /// Branch checkout finished; carries the branch name
    BranchSwitched(Result<String, String>),
    /// A commit (smart or manual) finished; carries the short hash
    CommitFinished(Result<String, String>),
    /// Push finished
    PushFinished(Result<(), String>),
    /// Package-name availability check finished
    NameChecked {
        name: String,
        result: Result<NameAvailability, String>,
    },
    /// Homebrew formula-name collision check finished; true means a
    /// formula with this name already exists in homebrew-core
    FormulaChecked {
        name: String,
        result: Result<bool, String>,
    },
    /// Pre-release test run finished
    TestsFinished(Result<(), String>),
    /// First-time setup probe finished
    SetupProbed(Result<SetupProbe, String>),
    /// Remote repository creation finished; carries the repo URL
    RepoCreated(Result<String, String>),
    /// Release-config validation finished
    ReleaseVerified(Result<(), String>),
    /// Release execution finished
    ReleaseFinished {
        version: String,
        result: Result<(), String>,
    },
}

/// One event dequeued by the session's loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Key press from the terminal
    Key(KeyCode),
    /// Terminal resized; affects only rendering bookkeeping
    Resize(u16, u16),
    /// UI tick (spinner frames, status-message expiry)
    Tick,
    /// Background git watcher tick
    WatcherTick,
    /// An asynchronous command completed
    Command(CommandOutcome),
}
