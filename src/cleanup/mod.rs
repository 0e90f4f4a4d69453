//! Working-tree cleanup: categorization, action decisions, and the
//! smart-commit partitioner.

pub mod categorize;
pub mod partition;

pub use categorize::{Category, categorize};
pub use partition::{CommitPlan, execute_plan, partition};

use crate::config::schema::CategoryRule;
use crate::git::{FileStatus, StatusEntry};

/// A changed file with its derived category.
///
/// Produced fresh on every status read; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitFile {
    /// Path relative to the repository root
    pub path: String,
    /// Raw porcelain status code
    pub code: String,
    /// Parsed status
    pub status: FileStatus,
    /// Derived category
    pub category: Category,
}

/// What the operator decided to do with a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupAction {
    /// Include in the smart commit
    Commit,
    /// Leave untouched
    Skip,
    /// Add to the ignore file (and untrack if tracked)
    Ignore,
}

impl CleanupAction {
    /// Default action for a category.
    pub fn default_for(category: Category) -> Self {
        match category {
            Category::Auto => CleanupAction::Commit,
            Category::Ignore => CleanupAction::Ignore,
            Category::Docs | Category::Other => CleanupAction::Skip,
        }
    }

    /// Next action in the cycle used by the file-selection view.
    pub fn cycled(&self) -> Self {
        match self {
            CleanupAction::Commit => CleanupAction::Skip,
            CleanupAction::Skip => CleanupAction::Ignore,
            CleanupAction::Ignore => CleanupAction::Commit,
        }
    }

    /// Short label shown in the file-selection view.
    pub fn label(&self) -> &'static str {
        match self {
            CleanupAction::Commit => "commit",
            CleanupAction::Skip => "skip",
            CleanupAction::Ignore => "ignore",
        }
    }
}

/// A changed file plus the operator's chosen action.
///
/// Lives only inside the active session state and is rebuilt whenever the
/// working-tree status is refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupItem {
    pub file: GitFile,
    pub action: CleanupAction,
}

/// Build cleanup items from raw status entries, deriving categories and
/// default actions.
pub fn build_items(entries: &[StatusEntry], rules: Option<&[CategoryRule]>) -> Vec<CleanupItem> {
    entries
        .iter()
        .map(|entry| {
            let category = categorize(&entry.path, rules);
            CleanupItem {
                file: GitFile {
                    path: entry.path.clone(),
                    code: entry.code.clone(),
                    status: entry.status,
                    category,
                },
                action: CleanupAction::default_for(category),
            }
        })
        .collect()
}
