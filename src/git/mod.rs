//! Git subprocess client.
//!
//! Queries working-tree status and performs staging, commit, push, and
//! branch operations by shelling out to the `git` binary. The client is
//! synchronous; slow calls are dispatched off the event loop by the
//! session's command layer.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{Error, Result};

/// Parsed status of a single changed path, from `git status --porcelain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Content changed (staged or unstaged)
    Modified,
    /// Newly added to the index
    Added,
    /// Deleted from the working tree or index
    Deleted,
    /// Renamed in the index
    Renamed,
    /// Not tracked by git
    Untracked,
    /// Unmerged (conflict markers present)
    Conflicted,
    /// Anything the parser does not recognize
    Unknown,
}

impl FileStatus {
    /// Map a two-character porcelain `XY` code to a status.
    pub fn from_porcelain(code: &str) -> Self {
        let mut chars = code.chars();
        let index = chars.next().unwrap_or(' ');
        let worktree = chars.next().unwrap_or(' ');

        match (index, worktree) {
            ('?', '?') => FileStatus::Untracked,
            ('U', _) | (_, 'U') | ('A', 'A') | ('D', 'D') => FileStatus::Conflicted,
            ('D', _) | (_, 'D') => FileStatus::Deleted,
            ('R', _) => FileStatus::Renamed,
            ('A', _) => FileStatus::Added,
            ('M', _) | (_, 'M') => FileStatus::Modified,
            _ => FileStatus::Unknown,
        }
    }

    /// Whether staging this file requires the delete-aware call.
    pub fn is_deletion(&self) -> bool {
        matches!(self, FileStatus::Deleted)
    }
}

/// A single changed path reported by the status reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Path relative to the repository root
    pub path: String,
    /// Raw two-character porcelain code
    pub code: String,
    /// Parsed status
    pub status: FileStatus,
}

/// Parse `git status --porcelain` output into status entries.
///
/// Rename lines (`R  old -> new`) report the new path.
pub fn parse_porcelain(output: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();

    for line in output.lines() {
        if line.len() < 4 {
            continue;
        }
        let code = &line[..2];
        let mut path = line[3..].to_string();

        // Rename entries carry "old -> new"; keep the new path.
        if let Some((_, new_path)) = path.split_once(" -> ") {
            path = new_path.to_string();
        }

        // Porcelain quotes paths containing special characters.
        if path.starts_with('"') && path.ends_with('"') && path.len() >= 2 {
            path = path[1..path.len() - 1].to_string();
        }

        entries.push(StatusEntry {
            path,
            code: code.to_string(),
            status: FileStatus::from_porcelain(code),
        });
    }

    entries
}

/// Synchronous git client bound to one repository.
#[derive(Debug, Clone)]
pub struct GitClient {
    /// Path to the repository root
    repo_path: PathBuf,
}

impl GitClient {
    /// Create a client for the given repository.
    pub fn new(repo_path: &Path) -> Self {
        Self {
            repo_path: repo_path.to_path_buf(),
        }
    }

    /// The repository this client is bound to.
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Run git with the given arguments, returning trimmed stdout.
    ///
    /// A non-zero exit surfaces stderr as the error text.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .map_err(|e| Error::tool("git", format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool("git", stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// Check if the bound path is inside a git repository.
    pub fn is_repo(&self) -> bool {
        Command::new("git")
            .args(["rev-parse", "--git-dir"])
            .current_dir(&self.repo_path)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Read the working-tree status.
    pub fn status(&self) -> Result<Vec<StatusEntry>> {
        let stdout = self.run(&["status", "--porcelain"])?;
        Ok(parse_porcelain(&stdout))
    }

    /// Name of the currently checked-out branch.
    ///
    /// Works on a repository with no commits yet; a detached HEAD falls
    /// back to the short commit hash.
    pub fn current_branch(&self) -> Result<String> {
        let branch = self.run(&["branch", "--show-current"])?;
        if !branch.is_empty() {
            return Ok(branch);
        }
        self.run(&["rev-parse", "--short", "HEAD"])
    }

    /// List local branch names.
    pub fn local_branches(&self) -> Result<Vec<String>> {
        let stdout = self.run(&["branch", "--format=%(refname:short)"])?;
        Ok(stdout
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    /// Check out the named branch.
    pub fn checkout(&self, branch: &str) -> Result<()> {
        self.run(&["checkout", branch])?;
        Ok(())
    }

    /// Stage a path for commit.
    pub fn stage(&self, path: &str) -> Result<()> {
        self.run(&["add", "--", path])?;
        Ok(())
    }

    /// Stage every change in the working tree, including deletions.
    pub fn stage_all(&self) -> Result<()> {
        self.run(&["add", "-A"])?;
        Ok(())
    }

    /// Stage the removal of a deleted path.
    pub fn stage_deletion(&self, path: &str) -> Result<()> {
        self.run(&["rm", "--cached", "--ignore-unmatch", "--quiet", "--", path])?;
        Ok(())
    }

    /// Stop tracking a path without deleting its history or the file itself.
    pub fn untrack(&self, path: &str) -> Result<()> {
        self.run(&["rm", "--cached", "--force", "--quiet", "--", path])?;
        Ok(())
    }

    /// Whether a path is tracked by git.
    pub fn is_tracked(&self, path: &str) -> bool {
        Command::new("git")
            .args(["ls-files", "--error-unmatch", "--", path])
            .current_dir(&self.repo_path)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Commit currently staged files with the given message.
    ///
    /// Returns the short hash of the created commit.
    pub fn commit(&self, message: &str) -> Result<String> {
        self.run(&["commit", "-m", message])?;
        self.run(&["rev-parse", "--short", "HEAD"])
    }

    /// Push the current branch to its upstream.
    pub fn push(&self) -> Result<String> {
        self.run(&["push"])
    }

    /// Whether the repository has at least one configured remote.
    pub fn has_remote(&self) -> bool {
        self.run(&["remote"])
            .map(|out| !out.is_empty())
            .unwrap_or(false)
    }

    /// URL of the `origin` remote, if configured.
    pub fn remote_url(&self) -> Option<String> {
        self.run(&["remote", "get-url", "origin"]).ok()
    }

    /// Append a path to `.gitignore`, skipping paths already listed.
    ///
    /// Returns `true` if the entry was newly added.
    pub fn append_ignore(&self, path: &str) -> Result<bool> {
        let ignore_path = self.repo_path.join(".gitignore");

        let existing = if ignore_path.exists() {
            fs::read_to_string(&ignore_path)?
        } else {
            String::new()
        };

        if existing.lines().any(|line| line.trim() == path) {
            return Ok(false);
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&ignore_path)?;

        if !existing.is_empty() && !existing.ends_with('\n') {
            writeln!(file)?;
        }
        writeln!(file, "{}", path)?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_git_repo() -> TempDir {
        let temp = TempDir::new().unwrap();

        Command::new("git")
            .args(["init"])
            .current_dir(temp.path())
            .output()
            .expect("Failed to init git repo");

        Command::new("git")
            .args(["config", "user.email", "test@test.com"])
            .current_dir(temp.path())
            .output()
            .expect("Failed to configure git");

        Command::new("git")
            .args(["config", "user.name", "Test"])
            .current_dir(temp.path())
            .output()
            .expect("Failed to configure git");

        temp
    }

    #[test]
    fn test_from_porcelain_codes() {
        assert_eq!(FileStatus::from_porcelain("??"), FileStatus::Untracked);
        assert_eq!(FileStatus::from_porcelain(" M"), FileStatus::Modified);
        assert_eq!(FileStatus::from_porcelain("M "), FileStatus::Modified);
        assert_eq!(FileStatus::from_porcelain("A "), FileStatus::Added);
        assert_eq!(FileStatus::from_porcelain(" D"), FileStatus::Deleted);
        assert_eq!(FileStatus::from_porcelain("D "), FileStatus::Deleted);
        assert_eq!(FileStatus::from_porcelain("R "), FileStatus::Renamed);
        assert_eq!(FileStatus::from_porcelain("UU"), FileStatus::Conflicted);
        assert_eq!(FileStatus::from_porcelain("AA"), FileStatus::Conflicted);
    }

    #[test]
    fn test_parse_porcelain_basic() {
        let output = " M src/main.rs\n?? notes.txt\nD  gone.go\n";
        let entries = parse_porcelain(output);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].path, "src/main.rs");
        assert_eq!(entries[0].status, FileStatus::Modified);
        assert_eq!(entries[1].path, "notes.txt");
        assert_eq!(entries[1].status, FileStatus::Untracked);
        assert_eq!(entries[2].path, "gone.go");
        assert_eq!(entries[2].status, FileStatus::Deleted);
    }

    #[test]
    fn test_parse_porcelain_rename_keeps_new_path() {
        let output = "R  old_name.rs -> new_name.rs\n";
        let entries = parse_porcelain(output);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "new_name.rs");
        assert_eq!(entries[0].status, FileStatus::Renamed);
    }

    #[test]
    fn test_parse_porcelain_quoted_path() {
        let output = "?? \"with space.md\"\n";
        let entries = parse_porcelain(output);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "with space.md");
    }

    #[test]
    fn test_parse_porcelain_empty() {
        assert!(parse_porcelain("").is_empty());
    }

    #[test]
    fn test_is_repo() {
        let temp = create_git_repo();
        assert!(GitClient::new(temp.path()).is_repo());

        let plain = TempDir::new().unwrap();
        assert!(!GitClient::new(plain.path()).is_repo());
    }

    #[test]
    fn test_status_and_commit() {
        let temp = create_git_repo();
        let git = GitClient::new(temp.path());

        std::fs::write(temp.path().join("a.go"), "package main\n").unwrap();

        let status = git.status().unwrap();
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].path, "a.go");
        assert_eq!(status[0].status, FileStatus::Untracked);

        git.stage("a.go").unwrap();
        let hash = git.commit("Add a.go").unwrap();
        assert!(!hash.is_empty());

        assert!(git.status().unwrap().is_empty());
        assert!(git.is_tracked("a.go"));
    }

    #[test]
    fn test_append_ignore_is_idempotent() {
        let temp = create_git_repo();
        let git = GitClient::new(temp.path());

        assert!(git.append_ignore("dist/").unwrap());
        assert!(!git.append_ignore("dist/").unwrap());

        let content = std::fs::read_to_string(temp.path().join(".gitignore")).unwrap();
        let matches = content.lines().filter(|l| *l == "dist/").count();
        assert_eq!(matches, 1);
    }

    #[test]
    fn test_append_ignore_preserves_existing_entries() {
        let temp = create_git_repo();
        let git = GitClient::new(temp.path());

        std::fs::write(temp.path().join(".gitignore"), "target/").unwrap();
        assert!(git.append_ignore("*.log").unwrap());

        let content = std::fs::read_to_string(temp.path().join(".gitignore")).unwrap();
        assert!(content.lines().any(|l| l == "target/"));
        assert!(content.lines().any(|l| l == "*.log"));
    }

    #[test]
    fn test_commit_failure_surfaces_stderr() {
        let temp = create_git_repo();
        let git = GitClient::new(temp.path());

        // Nothing staged: commit must fail with git's own message.
        let err = git.commit("empty").unwrap_err();
        match err {
            Error::Tool { tool, .. } => assert_eq!(tool, "git"),
            other => panic!("Expected Tool error, got: {:?}", other),
        }
    }

    #[test]
    fn test_local_branches_and_current_branch() {
        let temp = create_git_repo();
        let git = GitClient::new(temp.path());

        std::fs::write(temp.path().join("f"), "x").unwrap();
        git.stage("f").unwrap();
        git.commit("init").unwrap();

        let current = git.current_branch().unwrap();
        let branches = git.local_branches().unwrap();
        assert!(branches.contains(&current));
    }
}
