//! Command-line interface definitions.

use clap::Parser;
use std::path::PathBuf;

/// Version string with build metadata from the build script.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DISTUI_GIT_COMMIT"),
    ", built ",
    env!("DISTUI_BUILD_TIMESTAMP"),
    ")"
);

/// distui - reconcile release configuration and publish across channels.
#[derive(Debug, Parser)]
#[command(name = "distui", version = VERSION, about)]
pub struct Cli {
    /// Project directory (defaults to $DISTUI_PROJECT, then the current directory)
    #[arg(short = 'C', long = "project", env = "DISTUI_PROJECT")]
    pub project_path: Option<PathBuf>,

    /// Print the config drift report and exit without starting the TUI
    #[arg(long)]
    pub check_only: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
