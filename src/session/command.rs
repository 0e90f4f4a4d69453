//! Asynchronous commands and their executor.
//!
//! A command is a unit of work that runs off the event loop and enqueues
//! exactly one completion event back onto it. Commands never mutate
//! session state; only the loop does, when it dequeues the completion.
//! There is no cancellation: a state transition that abandons a command
//! simply ignores its eventual result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::cleanup::{CommitPlan, execute_plan};
use crate::drift;
use crate::git::GitClient;
use crate::github::GithubClient;
use crate::registry;
use crate::release::ReleaseBuilder;
use crate::session::event::{CommandOutcome, Event, SetupProbe, StatusSnapshot};
use crate::session::state::DetectedProject;

/// Interval between background git watcher ticks.
pub const WATCH_INTERVAL: Duration = Duration::from_secs(5);

/// Interval between UI ticks (spinner frames, status expiry).
pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Everything a command needs to run, snapshotted at dispatch time.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Project root the external tools run in
    pub project_root: PathBuf,
}

/// A dispatched unit of asynchronous work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// First working-tree status load
    LoadStatus,
    /// Lightweight status refresh (same completion as LoadStatus)
    RefreshStatus,
    /// List local branches for the selection overlay
    LoadBranches,
    /// Check out the named branch
    SwitchBranch(String),
    /// Execute a smart-commit plan
    RunSmartCommit(CommitPlan),
    /// Stage everything and commit with the given message
    CommitAll { message: String },
    /// Push the current branch
    Push,
    /// npm name-availability check
    CheckPackageName {
        name: String,
        owner: Option<String>,
    },
    /// Homebrew formula-name collision check
    CheckFormulaName { name: String },
    /// Run the project's test suite before a release
    RunTests,
    /// First-time setup probe (artifacts + project detection)
    ProbeSetup,
    /// Create the remote repository and push
    CreateRepo { name: String, private: bool },
    /// Validate the pipeline descriptor
    VerifyReleaseConfig,
    /// Execute a release
    RunRelease { version: String, clean: bool },
}

impl Command {
    /// Short label for tracing.
    pub fn label(&self) -> &'static str {
        match self {
            Command::LoadStatus => "load-status",
            Command::RefreshStatus => "refresh-status",
            Command::LoadBranches => "load-branches",
            Command::SwitchBranch(_) => "switch-branch",
            Command::RunSmartCommit(_) => "smart-commit",
            Command::CommitAll { .. } => "commit-all",
            Command::Push => "push",
            Command::CheckPackageName { .. } => "check-package-name",
            Command::CheckFormulaName { .. } => "check-formula-name",
            Command::RunTests => "run-tests",
            Command::ProbeSetup => "probe-setup",
            Command::CreateRepo { .. } => "create-repo",
            Command::VerifyReleaseConfig => "verify-release-config",
            Command::RunRelease { .. } => "run-release",
        }
    }

    /// Run the command to completion, producing its single result event.
    ///
    /// Never panics across the loop boundary; every failure is flattened
    /// into the outcome's error string.
    pub fn execute(self, ctx: &CommandContext) -> Event {
        let git = GitClient::new(&ctx.project_root);

        let outcome = match self {
            Command::LoadStatus | Command::RefreshStatus => {
                CommandOutcome::StatusLoaded(read_snapshot(&git))
            }
            Command::LoadBranches => {
                CommandOutcome::BranchesLoaded(git.local_branches().map_err(|e| e.to_string()))
            }
            Command::SwitchBranch(branch) => CommandOutcome::BranchSwitched(
                git.checkout(&branch)
                    .map(|_| branch.clone())
                    .map_err(|e| e.to_string()),
            ),
            Command::RunSmartCommit(plan) => CommandOutcome::CommitFinished(
                execute_plan(&git, &plan).map_err(|e| e.to_string()),
            ),
            Command::CommitAll { message } => CommandOutcome::CommitFinished(
                git.stage_all()
                    .and_then(|_| git.commit(&message))
                    .map_err(|e| e.to_string()),
            ),
            Command::Push => {
                CommandOutcome::PushFinished(git.push().map(|_| ()).map_err(|e| e.to_string()))
            }
            Command::CheckPackageName { name, owner } => {
                let result = registry::check_npm_name(&name, owner.as_deref())
                    .map_err(|e| e.to_string());
                CommandOutcome::NameChecked { name, result }
            }
            Command::CheckFormulaName { name } => {
                let result = registry::check_brew_formula(&name).map_err(|e| e.to_string());
                CommandOutcome::FormulaChecked { name, result }
            }
            Command::RunTests => CommandOutcome::TestsFinished(run_test_suite(&ctx.project_root)),
            Command::ProbeSetup => {
                CommandOutcome::SetupProbed(Ok(probe_setup(&ctx.project_root, &git)))
            }
            Command::CreateRepo { name, private } => {
                let gh = GithubClient::new(&ctx.project_root);
                let result = if !gh.is_authenticated() {
                    Err("gh is not authenticated; run `gh auth login`".to_string())
                } else if gh.repo_exists(&name) {
                    Err(format!("repository {} already exists", name))
                } else {
                    gh.create_repo(&name, private).map_err(|e| e.to_string())
                };
                CommandOutcome::RepoCreated(result)
            }
            Command::VerifyReleaseConfig => {
                let builder = ReleaseBuilder::new(&ctx.project_root);
                CommandOutcome::ReleaseVerified(
                    builder.check().map(|_| ()).map_err(|e| e.to_string()),
                )
            }
            Command::RunRelease { version, clean } => {
                let builder = ReleaseBuilder::new(&ctx.project_root);
                let result = builder.release(clean).map(|_| ()).map_err(|e| e.to_string());
                CommandOutcome::ReleaseFinished { version, result }
            }
        };

        Event::Command(outcome)
    }
}

/// Read branch and status together for the cached git model.
fn read_snapshot(git: &GitClient) -> Result<StatusSnapshot, String> {
    let branch = git.current_branch().map_err(|e| e.to_string())?;
    let entries = git.status().map_err(|e| e.to_string())?;
    Ok(StatusSnapshot { branch, entries })
}

/// Run the project's test suite, picked by manifest kind.
///
/// A project without a recognized manifest has no suite to run; that
/// counts as success so the release is not blocked.
fn run_test_suite(root: &Path) -> Result<(), String> {
    let (program, args): (&str, &[&str]) = if root.join("go.mod").exists() {
        ("go", &["test", "./..."])
    } else if root.join("Cargo.toml").exists() {
        ("cargo", &["test", "--quiet"])
    } else {
        return Ok(());
    };

    let output = std::process::Command::new(program)
        .args(args)
        .current_dir(root)
        .output()
        .map_err(|e| format!("failed to run {}: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(stderr.trim().to_string());
    }
    Ok(())
}

/// Probe the project tree for first-time setup.
///
/// Infallible by construction: detection failures just leave fields empty.
fn probe_setup(root: &Path, git: &GitClient) -> SetupProbe {
    SetupProbe {
        hand_authored: drift::hand_authored_artifacts(root),
        generated: drift::generated_artifacts(root),
        detected: detect_project(root, git),
    }
}

/// Detect module name, binary name and repository slug from the tree.
pub fn detect_project(root: &Path, git: &GitClient) -> DetectedProject {
    let mut detected = DetectedProject::default();

    if let Ok(content) = std::fs::read_to_string(root.join("go.mod")) {
        if let Some(module) = parse_go_module(&content) {
            detected.binary = Some(module.clone());
            detected.module = Some(module);
        }
    } else if let Ok(content) = std::fs::read_to_string(root.join("Cargo.toml")) {
        if let Some(name) = parse_cargo_name(&content) {
            detected.binary = Some(name.clone());
            detected.module = Some(name);
        }
    }

    if detected.module.is_none() {
        detected.module = root
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string());
    }

    detected.repository = git.remote_url().as_deref().and_then(parse_repo_slug);

    detected
}

/// Last path segment of the `module` directive in a go.mod file.
fn parse_go_module(content: &str) -> Option<String> {
    let line = content
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("module "))?;
    let path = line.trim_start_matches("module ").trim();
    path.rsplit('/').next().map(|s| s.to_string())
}

/// Package name from a Cargo.toml.
fn parse_cargo_name(content: &str) -> Option<String> {
    let doc: toml::Value = content.parse().ok()?;
    doc.get("package")?
        .get("name")?
        .as_str()
        .map(|s| s.to_string())
}

/// Extract `owner/name` from an ssh or https remote URL.
pub fn parse_repo_slug(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches(".git");

    let path = if let Some(rest) = trimmed.strip_prefix("git@") {
        rest.split_once(':').map(|(_, path)| path)?
    } else if let Some(rest) = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
    {
        rest.split_once('/').map(|(_, path)| path)?
    } else {
        return None;
    };

    let mut parts = path.split('/');
    let owner = parts.next()?;
    let name = parts.next()?;
    if owner.is_empty() || name.is_empty() {
        return None;
    }
    Some(format!("{}/{}", owner, name))
}

/// Spawn each command on the blocking pool; completions flow back through
/// the session's single event channel.
pub fn spawn_commands(
    commands: Vec<Command>,
    ctx: &CommandContext,
    tx: &UnboundedSender<Event>,
) {
    for command in commands {
        let ctx = ctx.clone();
        let tx = tx.clone();
        tracing::debug!(command = command.label(), "dispatching command");
        tokio::task::spawn_blocking(move || {
            let event = command.execute(&ctx);
            // The loop may already be gone on shutdown; nothing to do then.
            let _ = tx.send(event);
        });
    }
}

/// Spawn the background git watcher.
///
/// A self-rescheduling timer for the lifetime of the session: each tick
/// enqueues a `WatcherTick` and sleeps again. The session decides whether
/// a tick triggers a refresh (it never does before the first status load).
pub fn spawn_git_watcher(tx: UnboundedSender<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(WATCH_INTERVAL).await;
            if tx.send(Event::WatcherTick).is_err() {
                break;
            }
        }
    })
}

/// Spawn the UI ticker driving spinners and status-message expiry.
pub fn spawn_ticker(tx: UnboundedSender<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(TICK_INTERVAL).await;
            if tx.send(Event::Tick).is_err() {
                break;
            }
        }
    })
}

/// Next version tag after the given one (patch bump), or the first tag.
pub fn next_version(last: Option<&str>) -> String {
    let Some(last) = last else {
        return "v0.1.0".to_string();
    };

    let numbers: Vec<u64> = last
        .trim_start_matches('v')
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect();

    match numbers.as_slice() {
        [major, minor, patch, ..] => format!("v{}.{}.{}", major, minor, patch + 1),
        _ => "v0.1.0".to_string(),
    }
}
