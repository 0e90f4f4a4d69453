//! Distui CLI - interactive release orchestration for small projects.

use std::env;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use distui::cli::Cli;
use distui::config::{ConfigStore, ProjectConfig, ProjectInfo, sanitize_project_id};
use distui::git::GitClient;
use distui::session::Session;
use distui::{drift, logging, tui};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let project_root = resolve_project_path(cli.project_path);

    let git = GitClient::new(&project_root);
    if !git.is_repo() {
        eprintln!(
            "Error: {} is not a git repository",
            project_root.display()
        );
        process::exit(1);
    }

    let store = match ConfigStore::from_env() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let global = match store.load_global() {
        Ok(global) => global,
        Err(e) => {
            eprintln!("Error: failed to load global config: {}", e);
            process::exit(1);
        }
    };

    let mut id = sanitize_project_id(
        project_root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project"),
    );
    if id.is_empty() {
        id = "project".to_string();
    }

    // A malformed project file means the project is treated as undetected;
    // first-time setup runs again rather than guessing at missing fields.
    let config = match store.load_project(&id) {
        Ok(Some(config)) => config,
        Ok(None) => new_project_config(&id, &project_root),
        Err(e) => {
            eprintln!("Warning: ignoring unreadable project config: {}", e);
            new_project_config(&id, &project_root)
        }
    };

    if cli.check_only {
        print_drift_report(&project_root, &config);
        return;
    }

    let _log_guard = match logging::setup_logging(&store.root().join("logs"), cli.debug) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    let (session, initial) = Session::new(project_root, store, global, config);

    if let Err(e) = tui::run_session(session, initial).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Resolve the project path: --project flag (or $DISTUI_PROJECT via clap)
/// falls back to the current working directory.
fn resolve_project_path(explicit_path: Option<PathBuf>) -> PathBuf {
    match explicit_path {
        Some(path) => {
            if !path.exists() {
                eprintln!(
                    "Error: specified project path does not exist: {}",
                    path.display()
                );
                process::exit(1);
            }
            path
        }
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn new_project_config(id: &str, project_root: &PathBuf) -> ProjectConfig {
    ProjectConfig::new(
        id,
        ProjectInfo {
            path: project_root.clone(),
            ..Default::default()
        },
    )
}

/// Print the drift report for scripting use (`--check-only`).
fn print_drift_report(project_root: &PathBuf, config: &ProjectConfig) {
    let report = drift::detect_changes(project_root, config);

    if report.is_empty() {
        println!("pipeline artifacts are up to date");
        return;
    }

    for kind in &report.to_generate {
        println!("generate: {}", kind.file_name());
    }
    for kind in &report.to_delete {
        println!("delete:   {}", kind.file_name());
    }
    process::exit(1);
}
