//! Distui - an interactive release-orchestration library for the `distui` CLI.
//!
//! This library provides the core functionality for the `distui` tool,
//! including working-tree cleanup, config drift detection, and the
//! configuration session state machine that drives the TUI.

pub mod cleanup;
pub mod cli;
pub mod config;
pub mod drift;
pub mod git;
pub mod github;
pub mod logging;
pub mod registry;
pub mod release;
pub mod session;
pub mod tui;

/// Library-level error type for distui operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Not a git repository: {0}")]
    NotAGitRepo(String),

    #[error("No files selected for commit")]
    NoFilesToCommit,

    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a tool failure from an external command's stderr.
    pub fn tool(tool: &str, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for distui operations.
pub type Result<T> = std::result::Result<T, Error>;
