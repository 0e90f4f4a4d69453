//! Configuration persistence.
//!
//! One global config plus one file per project, keyed by its sanitized
//! identifier. All writes are atomic: serialize to a temp file in the
//! target directory, then rename over the target. On rename failure the
//! temp file is removed and the original error propagated.
//!
//! ## Layout
//!
//! - `<config-root>/config.toml`: operator identity, channel defaults
//! - `<config-root>/projects/<id>.toml`: per-project settings
//!
//! The root is `~/.config/distui` (via `dirs`), overridable through the
//! `DISTUI_CONFIG_DIR` environment variable for tests and scripting.

pub mod schema;

pub use schema::{
    BuildPrefs, CategoryRule, Channel, Distributions, GithubReleaseConfig, GlobalConfig,
    HomebrewConfig, NpmConfig, ProjectConfig, ProjectInfo, ReleaseRecord,
};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Environment variable overriding the config root directory.
pub const CONFIG_DIR_ENV: &str = "DISTUI_CONFIG_DIR";

/// Write `contents` to `path` atomically (temp file + rename).
///
/// The temp file is created in the target's directory so the rename never
/// crosses a filesystem boundary. If the rename fails, the temp file is
/// removed and the original error is returned.
pub fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::Other(format!("no parent directory for {}", path.display())))?;
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;

    // persist() renames over the target; on failure the returned temp file
    // handle is dropped here, which deletes it.
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Reduce an arbitrary project name to a unique, filesystem-safe identifier.
///
/// Lowercases, maps runs of non-alphanumeric characters to single dashes,
/// and trims leading/trailing dashes.
pub fn sanitize_project_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    let mut last_dash = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            id.push('-');
            last_dash = true;
        }
    }

    id.trim_end_matches('-').to_string()
}

/// Handle to the on-disk configuration tree.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    /// Resolve the store root: `DISTUI_CONFIG_DIR` > XDG config dir.
    pub fn from_env() -> Result<Self> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(Self::with_root(PathBuf::from(dir)));
        }

        let base = dirs::config_dir()
            .ok_or_else(|| Error::Other("could not determine config directory".to_string()))?;
        Ok(Self::with_root(base.join("distui")))
    }

    /// Create a store rooted at an explicit directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the global config file.
    pub fn global_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Path of a project's config file.
    pub fn project_path(&self, id: &str) -> PathBuf {
        self.root.join("projects").join(format!("{}.toml", id))
    }

    /// Load the global config; a missing file yields the defaults.
    pub fn load_global(&self) -> Result<GlobalConfig> {
        let path = self.global_path();
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        let text = fs::read_to_string(&path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Save the global config atomically.
    pub fn save_global(&self, config: &GlobalConfig) -> Result<()> {
        let text = toml::to_string_pretty(config)?;
        atomic_write(&self.global_path(), &text)
    }

    /// Load a project config by id.
    ///
    /// Returns `Ok(None)` when no file exists. A malformed file or a file
    /// without a usable identifier fails the load outright; no partial
    /// object is exposed and the caller treats the project as undetected.
    pub fn load_project(&self, id: &str) -> Result<Option<ProjectConfig>> {
        let path = self.project_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&path)?;
        let config: ProjectConfig = toml::from_str(&text)?;
        config.validate().map_err(Error::InvalidConfig)?;
        Ok(Some(config))
    }

    /// Save a project config atomically. Validation failures never write.
    pub fn save_project(&self, config: &ProjectConfig) -> Result<()> {
        config.validate().map_err(Error::InvalidConfig)?;
        let text = toml::to_string_pretty(config)?;
        atomic_write(&self.project_path(&config.id), &text)
    }
}
