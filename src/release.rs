//! Release-builder operations via the `goreleaser` CLI.
//!
//! Validates the generated pipeline descriptor and executes releases.
//! Both operations are fallible black boxes; the session only sees
//! success-or-failure plus the tool's text.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{Error, Result};

/// Client for the release builder, bound to one project directory.
#[derive(Debug, Clone)]
pub struct ReleaseBuilder {
    project_path: PathBuf,
}

impl ReleaseBuilder {
    /// Create a builder running from the given project directory.
    pub fn new(project_path: &Path) -> Self {
        Self {
            project_path: project_path.to_path_buf(),
        }
    }

    /// Run goreleaser with the given arguments, returning combined output.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("goreleaser")
            .args(args)
            .current_dir(&self.project_path)
            .output()
            .map_err(|e| Error::tool("goreleaser", format!("failed to run goreleaser: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool("goreleaser", stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// Validate the pipeline descriptor without building anything.
    pub fn check(&self) -> Result<String> {
        self.run(&["check"])
    }

    /// Execute a full release.
    ///
    /// `clean` removes previous build output first (the `clean_dist`
    /// preference).
    pub fn release(&self, clean: bool) -> Result<String> {
        if clean {
            self.run(&["release", "--clean"])
        } else {
            self.run(&["release"])
        }
    }
}
