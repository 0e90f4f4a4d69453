//! Smart-commit partitioner.
//!
//! Splits the operator's per-file decisions into a commit set and a set of
//! ignore-file additions, generates a commit message from the committed
//! extensions, and executes the plan against git in one commit.

use crate::cleanup::{CleanupAction, CleanupItem, GitFile};
use crate::git::GitClient;
use crate::{Error, Result};

/// The computed outcome of partitioning cleanup decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPlan {
    /// Files staged and committed together
    pub to_commit: Vec<GitFile>,
    /// Paths appended to the ignore file (tracked ones are also untracked)
    pub ignore_additions: Vec<String>,
    /// Generated commit message
    pub message: String,
}

/// Broad content classes used for message generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentClass {
    Source,
    Docs,
    Config,
    Other,
}

fn classify(path: &str) -> ContentClass {
    let ext = path
        .rsplit(['/', '\\'])
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some(
            "go" | "rs" | "py" | "js" | "ts" | "jsx" | "tsx" | "c" | "h" | "cc" | "cpp" | "hpp"
            | "java" | "rb" | "sh" | "swift" | "kt" | "zig" | "mod" | "sum",
        ) => ContentClass::Source,
        Some("md" | "rst" | "adoc") => ContentClass::Docs,
        Some("toml" | "yaml" | "yml" | "json" | "ini") => ContentClass::Config,
        _ => ContentClass::Other,
    }
}

/// Generate a commit message from the committed paths.
///
/// Picks the most specific applicable description; deterministic given the
/// same extension set.
pub fn commit_message_for(paths: &[&str]) -> String {
    let mut has_source = false;
    let mut has_docs = false;
    let mut has_config = false;

    for path in paths {
        match classify(path) {
            ContentClass::Source => has_source = true,
            ContentClass::Docs => has_docs = true,
            ContentClass::Config => has_config = true,
            ContentClass::Other => {}
        }
    }

    let message = match (has_source, has_docs, has_config) {
        (true, true, _) => "Update source and documentation",
        (true, false, _) => "Update source code",
        (false, true, _) => "Update documentation",
        (false, false, true) => "Update project configuration",
        (false, false, false) => "Update project files",
    };
    message.to_string()
}

/// Partition cleanup decisions into a commit plan.
///
/// Files with action `Ignore` become ignore additions; files with action
/// `Commit` form the commit set. An empty commit set is an error; there is
/// nothing to commit.
pub fn partition(items: &[CleanupItem]) -> Result<CommitPlan> {
    let mut to_commit = Vec::new();
    let mut ignore_additions = Vec::new();

    for item in items {
        match item.action {
            CleanupAction::Commit => to_commit.push(item.file.clone()),
            CleanupAction::Ignore => ignore_additions.push(item.file.path.clone()),
            CleanupAction::Skip => {}
        }
    }

    if to_commit.is_empty() {
        return Err(Error::NoFilesToCommit);
    }

    let paths: Vec<&str> = to_commit.iter().map(|f| f.path.as_str()).collect();
    let message = commit_message_for(&paths);

    Ok(CommitPlan {
        to_commit,
        ignore_additions,
        message,
    })
}

/// Execute a commit plan against git.
///
/// Ignore additions are applied idempotently; already-tracked ignored files
/// are untracked so future status reads stop reporting them, without
/// deleting their history. Commit files are staged (delete-aware) and
/// committed together. Any failing step aborts the whole operation with the
/// underlying tool's error text; partial staging is not rolled back.
///
/// Returns the short hash of the created commit.
pub fn execute_plan(git: &GitClient, plan: &CommitPlan) -> Result<String> {
    for path in &plan.ignore_additions {
        git.append_ignore(path)?;
        if git.is_tracked(path) {
            git.untrack(path)?;
        }
    }

    for file in &plan.to_commit {
        if file.status.is_deletion() {
            git.stage_deletion(&file.path)?;
        } else {
            git.stage(&file.path)?;
        }
    }

    git.commit(&plan.message)
}
