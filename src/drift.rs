//! Config drift detection and pipeline artifact generation.
//!
//! distui manages two artifacts in the project tree: the release-pipeline
//! descriptor (`.goreleaser.yaml`) and the npm package manifest
//! (`package.json`). Artifacts written by distui embed an ownership marker;
//! that marker is the sole signal deciding whether a file may be silently
//! regenerated or deleted. Files without the marker are hand-authored and
//! are never touched automatically.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;

use crate::Result;
use crate::config::schema::ProjectConfig;

/// Ownership marker embedded in every generated artifact.
pub const GENERATED_MARKER: &str = "Generated by distui";

/// A file distui knows how to generate and reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Release-pipeline descriptor consumed by the release builder
    PipelineDescriptor,
    /// npm package manifest
    PackageManifest,
}

impl ArtifactKind {
    /// All managed artifacts.
    pub const ALL: [ArtifactKind; 2] =
        [ArtifactKind::PipelineDescriptor, ArtifactKind::PackageManifest];

    /// File name of the artifact inside the project root.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::PipelineDescriptor => ".goreleaser.yaml",
            ArtifactKind::PackageManifest => "package.json",
        }
    }

    /// Human-readable name for status text and the consent view.
    pub fn display_name(&self) -> &'static str {
        match self {
            ArtifactKind::PipelineDescriptor => "pipeline descriptor",
            ArtifactKind::PackageManifest => "package manifest",
        }
    }

    /// Full path of the artifact for a given project root.
    pub fn path_in(&self, root: &Path) -> PathBuf {
        root.join(self.file_name())
    }
}

/// On-disk state of one managed artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    /// File does not exist
    Absent,
    /// File exists and carries the ownership marker
    Generated,
    /// File exists without the marker; owned by the operator
    HandAuthored,
}

/// Inspect an artifact on disk.
pub fn artifact_state(root: &Path, kind: ArtifactKind) -> ArtifactState {
    let path = kind.path_in(root);
    match fs::read_to_string(&path) {
        Ok(content) if content.contains(GENERATED_MARKER) => ArtifactState::Generated,
        Ok(_) => ArtifactState::HandAuthored,
        Err(_) => ArtifactState::Absent,
    }
}

/// Whether the declared distribution settings require this artifact.
fn required(kind: ArtifactKind, config: &ProjectConfig) -> bool {
    let dist = &config.distributions;
    match kind {
        ArtifactKind::PipelineDescriptor => {
            dist.github_release.enabled || dist.homebrew.enabled
        }
        ArtifactKind::PackageManifest => dist.npm.enabled,
    }
}

/// Artifacts the current distribution settings call for.
pub fn required_artifacts(config: &ProjectConfig) -> Vec<ArtifactKind> {
    ArtifactKind::ALL
        .into_iter()
        .filter(|kind| required(*kind, config))
        .collect()
}

/// What must change to bring the artifacts in line with the settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriftReport {
    /// Artifacts to (re)generate
    pub to_generate: Vec<ArtifactKind>,
    /// Generated artifacts whose channel was disabled
    pub to_delete: Vec<ArtifactKind>,
}

impl DriftReport {
    /// No drift detected.
    pub fn is_empty(&self) -> bool {
        self.to_generate.is_empty() && self.to_delete.is_empty()
    }
}

/// Compare declared distribution settings against the artifacts on disk.
///
/// Rules, per artifact:
/// - absent and required: generate
/// - present, distui-authored, no longer required: delete
/// - present, distui-authored, required, content stale: regenerate
/// - present without marker: never touched; the session routes through the
///   mode-switch confirmation before anything may replace it
///
/// Running detection twice with no intervening change yields identical
/// output.
pub fn detect_changes(root: &Path, config: &ProjectConfig) -> DriftReport {
    let mut report = DriftReport::default();

    for kind in ArtifactKind::ALL {
        let state = artifact_state(root, kind);
        let needed = required(kind, config);

        match (state, needed) {
            (ArtifactState::Absent, true) => report.to_generate.push(kind),
            (ArtifactState::Generated, false) => report.to_delete.push(kind),
            (ArtifactState::Generated, true) => {
                let on_disk = fs::read_to_string(kind.path_in(root)).unwrap_or_default();
                if on_disk != render_artifact(kind, config) {
                    report.to_generate.push(kind);
                }
            }
            _ => {}
        }
    }

    report
}

/// Managed artifacts currently present without the ownership marker.
///
/// Used by first-time setup and by the regeneration flow to decide whether
/// the mode-switch warning applies.
pub fn hand_authored_artifacts(root: &Path) -> Vec<ArtifactKind> {
    ArtifactKind::ALL
        .into_iter()
        .filter(|kind| artifact_state(root, *kind) == ArtifactState::HandAuthored)
        .collect()
}

/// Managed artifacts currently present with the ownership marker.
pub fn generated_artifacts(root: &Path) -> Vec<ArtifactKind> {
    ArtifactKind::ALL
        .into_iter()
        .filter(|kind| artifact_state(root, *kind) == ArtifactState::Generated)
        .collect()
}

/// Render an artifact's content from the project settings.
pub fn render_artifact(kind: ArtifactKind, config: &ProjectConfig) -> String {
    match kind {
        ArtifactKind::PipelineDescriptor => render_pipeline_descriptor(config),
        ArtifactKind::PackageManifest => render_package_manifest(config),
    }
}

fn render_pipeline_descriptor(config: &ProjectConfig) -> String {
    let name = config.info.module.as_deref().unwrap_or(&config.id);
    let binary = config.info.binary_name.as_deref().unwrap_or(name);

    let mut out = String::new();
    out.push_str(&format!(
        "# {}. Do not edit; regenerate from the distributions tab.\n",
        GENERATED_MARKER
    ));
    out.push_str("version: 2\n");
    out.push_str(&format!("project_name: {}\n", name));
    out.push_str("builds:\n");
    out.push_str("  - main: .\n");
    out.push_str(&format!("    binary: {}\n", binary));
    out.push_str("    env:\n      - CGO_ENABLED=0\n");
    out.push_str("    goos:\n      - linux\n      - darwin\n      - windows\n");
    out.push_str("    goarch:\n      - amd64\n      - arm64\n");

    if config.distributions.github_release.enabled {
        out.push_str("release:\n");
        if let Some(repo) = config.info.repository.as_deref() {
            if let Some((owner, repo_name)) = repo.split_once('/') {
                out.push_str("  github:\n");
                out.push_str(&format!("    owner: {}\n", owner));
                out.push_str(&format!("    name: {}\n", repo_name));
            }
        }
        let draft = config.distributions.github_release.draft;
        out.push_str(&format!("  draft: {}\n", draft));
    }

    if config.distributions.homebrew.enabled {
        let formula = config
            .distributions
            .homebrew
            .formula_name
            .as_deref()
            .unwrap_or(binary);
        out.push_str("brews:\n");
        out.push_str(&format!("  - name: {}\n", formula));
        if let Some(tap) = config.distributions.homebrew.tap.as_deref() {
            if let Some((owner, repo_name)) = tap.split_once('/') {
                out.push_str("    repository:\n");
                out.push_str(&format!("      owner: {}\n", owner));
                out.push_str(&format!("      name: {}\n", repo_name));
            }
        }
    }

    out
}

fn render_package_manifest(config: &ProjectConfig) -> String {
    let name = config.npm_package_name().unwrap_or(&config.id).to_string();
    let binary = config
        .info
        .binary_name
        .clone()
        .unwrap_or_else(|| config.id.clone());
    let repository = config.info.repository.as_deref().map(|r| format!("github:{}", r));

    let mut bin = serde_json::Map::new();
    bin.insert(binary.clone(), json!(format!("bin/{}", binary)));

    let mut manifest = json!({
        "//": format!("{}. Do not edit; regenerate from the distributions tab.", GENERATED_MARKER),
        "name": name,
        "version": "0.0.0",
        "files": ["bin/"],
    });
    manifest["bin"] = serde_json::Value::Object(bin);
    if let Some(repo) = repository {
        manifest["repository"] = json!(repo);
    }

    // to_string_pretty on a Value orders keys alphabetically; rendering is
    // deterministic, which the stale-content check relies on.
    let mut text = serde_json::to_string_pretty(&manifest).unwrap_or_default();
    text.push('\n');
    text
}

/// Apply a drift report: write generated files and delete obsolete ones.
///
/// Deletion re-checks the marker so a hand-authored file that appeared
/// since detection is never removed. Returns one description line per
/// action, for the status message.
pub fn apply(root: &Path, config: &ProjectConfig, report: &DriftReport) -> Result<Vec<String>> {
    let mut actions = Vec::new();

    for kind in &report.to_generate {
        let content = render_artifact(*kind, config);
        fs::write(kind.path_in(root), content)?;
        actions.push(format!("generated {}", kind.file_name()));
    }

    for kind in &report.to_delete {
        if artifact_state(root, *kind) == ArtifactState::Generated {
            fs::remove_file(kind.path_in(root))?;
            actions.push(format!("deleted {}", kind.file_name()));
        }
    }

    Ok(actions)
}

/// Overwrite the given artifacts with freshly rendered content,
/// regardless of their current ownership state.
///
/// Only the session's mode-switch confirmation path calls this; it is the
/// single place a hand-authored file may be replaced.
pub fn force_generate(
    root: &Path,
    config: &ProjectConfig,
    kinds: &[ArtifactKind],
) -> Result<Vec<String>> {
    let mut actions = Vec::new();
    for kind in kinds {
        fs::write(kind.path_in(root), render_artifact(*kind, config))?;
        actions.push(format!("replaced {}", kind.file_name()));
    }
    Ok(actions)
}
