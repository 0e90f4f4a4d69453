//! Common test utilities for distui integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's `~/.config/distui/` directory.

#![allow(dead_code)]

use std::process::Command as StdCommand;

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated directories.
///
/// Each `TestEnv` creates two temporary directories:
/// - `project_dir`: Acts as the project root (a real git repository)
/// - `config_dir`: Holds distui's config tree (via `DISTUI_CONFIG_DIR`)
///
/// The `distui()` method returns a `Command` that sets `DISTUI_CONFIG_DIR`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub project_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with a git repository inside.
    pub fn new() -> Self {
        let env = Self {
            project_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        };
        env.git(&["init"]);
        env.git(&["config", "user.email", "test@test.com"]);
        env.git(&["config", "user.name", "Test"]);
        env
    }

    /// Run git in the project directory.
    pub fn git(&self, args: &[&str]) {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(self.project_dir.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Write a file inside the project directory.
    pub fn write_file(&self, name: &str, contents: &str) {
        std::fs::write(self.project_dir.path().join(name), contents).unwrap();
    }

    /// Get a Command for the distui binary with an isolated config tree.
    pub fn distui(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_distui"));
        cmd.current_dir(self.project_dir.path());
        cmd.env("DISTUI_CONFIG_DIR", self.config_dir.path());
        cmd
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
