//! TOML schema definitions for the global config and per-project configs.
//!
//! This module provides:
//! - Rust structs representing the persisted schema
//! - Validation functions
//! - Default values
//! - The distribution-channel vocabulary shared with the session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cleanup::categorize::Category;

/// A distribution channel a project can publish to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    /// GitHub release on the source-control host
    GithubRelease,
    /// npm package registry
    Npm,
    /// Homebrew formula repository
    Homebrew,
}

impl Channel {
    /// All channels, in display order.
    pub const ALL: [Channel; 3] = [Channel::GithubRelease, Channel::Npm, Channel::Homebrew];

    /// Stable string form used in release history and status text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::GithubRelease => "github-release",
            Channel::Npm => "npm",
            Channel::Homebrew => "homebrew",
        }
    }

    /// Human-readable channel name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Channel::GithubRelease => "GitHub Releases",
            Channel::Npm => "npm Registry",
            Channel::Homebrew => "Homebrew Tap",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator identity and default-channel preferences, stored globally.
///
/// These settings are safe to sync across machines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// GitHub username used for repository creation
    pub github_user: Option<String>,

    /// npm account name used for "owned" package detection
    pub npm_owner: Option<String>,

    /// Channels enabled by default on newly detected projects
    pub default_channels: Vec<Channel>,
}

/// Detected facts about the project on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    /// Absolute path to the project root
    pub path: PathBuf,

    /// Module / package name detected from the project manifest
    pub module: Option<String>,

    /// Name of the built binary
    pub binary_name: Option<String>,

    /// Repository slug (owner/name), if a remote is configured
    pub repository: Option<String>,
}

/// GitHub release channel settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubReleaseConfig {
    pub enabled: bool,
    /// Create releases as drafts for manual review
    pub draft: bool,
}

/// npm registry channel settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpmConfig {
    pub enabled: bool,
    /// Published package name; falls back to the detected module name
    pub package_name: Option<String>,
}

/// Homebrew formula channel settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomebrewConfig {
    pub enabled: bool,
    /// Tap repository slug (owner/homebrew-tap)
    pub tap: Option<String>,
    /// Formula name; falls back to the binary name
    pub formula_name: Option<String>,
}

/// Per-channel distribution settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Distributions {
    pub github_release: GithubReleaseConfig,
    pub npm: NpmConfig,
    pub homebrew: HomebrewConfig,
}

impl Distributions {
    /// Whether the given channel is enabled.
    pub fn is_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::GithubRelease => self.github_release.enabled,
            Channel::Npm => self.npm.enabled,
            Channel::Homebrew => self.homebrew.enabled,
        }
    }

    /// Set the enabled flag for the given channel.
    pub fn set_enabled(&mut self, channel: Channel, enabled: bool) {
        match channel {
            Channel::GithubRelease => self.github_release.enabled = enabled,
            Channel::Npm => self.npm.enabled = enabled,
            Channel::Homebrew => self.homebrew.enabled = enabled,
        }
    }

    /// Channels currently enabled, in display order.
    pub fn enabled_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }
}

/// Build and release preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildPrefs {
    /// Run the test suite before invoking the release builder
    pub run_tests_before_release: bool,

    /// Remove previous build output before releasing
    pub clean_dist: bool,

    /// Push the release commit and tags before building
    pub push_before_release: bool,
}

impl Default for BuildPrefs {
    fn default() -> Self {
        Self {
            run_tests_before_release: true,
            clean_dist: true,
            push_before_release: true,
        }
    }
}

/// A user-supplied categorization rule for the cleanup view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Rule name shown in the preferences view (e.g. "code", "docs")
    pub name: String,

    /// Category files matching this rule fall into
    pub category: Category,

    /// Extensions matched against the path suffix, without the leading dot
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Glob patterns matched against the whole path
    #[serde(default)]
    pub globs: Vec<String>,
}

/// One completed release, kept in the project's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    /// Version tag that was released
    pub version: String,

    /// Channels the release was published to
    pub channels: Vec<Channel>,

    /// When the release finished
    pub published_at: DateTime<Utc>,
}

/// Root persisted entity for one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Unique, filesystem-safe identifier; also the config file stem
    pub id: String,

    /// Detected project metadata
    pub info: ProjectInfo,

    /// Per-channel distribution settings
    pub distributions: Distributions,

    /// Build and release preferences
    pub build: BuildPrefs,

    /// The operator keeps hand-written pipeline files; disables regeneration
    pub custom_files_mode: bool,

    /// First-time setup has been completed for this project
    pub first_time_setup_completed: bool,

    /// Custom categorization rules; built-in table is used when absent
    pub cleanup_rules: Option<Vec<CategoryRule>>,

    /// Release history, newest last
    pub releases: Vec<ReleaseRecord>,
}

impl ProjectConfig {
    /// Create a config for a newly detected project.
    pub fn new(id: impl Into<String>, info: ProjectInfo) -> Self {
        Self {
            id: id.into(),
            info,
            ..Default::default()
        }
    }

    /// Validate the config shape.
    ///
    /// A config without a usable identifier must fail the load outright;
    /// callers treat the project as undetected rather than guessing.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("project id is required".to_string());
        }
        if self
            .id
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        {
            return Err(format!("project id is not filesystem-safe: {:?}", self.id));
        }
        Ok(())
    }

    /// Effective npm package name (explicit setting or detected module).
    pub fn npm_package_name(&self) -> Option<&str> {
        self.distributions
            .npm
            .package_name
            .as_deref()
            .or(self.info.module.as_deref())
    }
}
