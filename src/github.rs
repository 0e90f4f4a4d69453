//! Hosting-provider operations via the `gh` CLI.
//!
//! The session treats every operation here as a fallible black box with a
//! textual outcome: is the operator authenticated, does a remote
//! repository exist, create one. Nothing in this module mutates session
//! state; results flow back through the command layer.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{Error, Result};

/// Client for the `gh` CLI, bound to one project directory.
#[derive(Debug, Clone)]
pub struct GithubClient {
    project_path: PathBuf,
}

impl GithubClient {
    /// Create a client running `gh` from the given project directory.
    pub fn new(project_path: &Path) -> Self {
        Self {
            project_path: project_path.to_path_buf(),
        }
    }

    /// Run gh with the given arguments, returning trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("gh")
            .args(args)
            .current_dir(&self.project_path)
            .output()
            .map_err(|e| Error::tool("gh", format!("failed to run gh: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool("gh", stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// Whether the operator has an authenticated gh session.
    pub fn is_authenticated(&self) -> bool {
        self.run(&["auth", "status"]).is_ok()
    }

    /// Whether `owner/name` exists on the host.
    pub fn repo_exists(&self, slug: &str) -> bool {
        self.run(&["repo", "view", slug, "--json", "name"]).is_ok()
    }

    /// Create a repository from the current directory and push to it.
    ///
    /// Returns the new repository's URL.
    pub fn create_repo(&self, name: &str, private: bool) -> Result<String> {
        let visibility = if private { "--private" } else { "--public" };
        self.run(&[
            "repo",
            "create",
            name,
            visibility,
            "--source",
            ".",
            "--push",
        ])
    }
}
