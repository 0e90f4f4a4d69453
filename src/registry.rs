//! Package-registry lookups for first-time setup and channel toggles.
//!
//! This module answers one question per registry: does a package or
//! formula with this name already exist, and if so at what version and
//! under whose account. The HTTP shell is thin; the interpretation of the
//! registry's response is a pure function so the decision logic is
//! testable without a network.

use serde::Deserialize;
use thiserror::Error;

/// npm registry base URL.
const NPM_REGISTRY_BASE: &str = "https://registry.npmjs.org";

/// Homebrew formulae API base URL.
const BREW_API_BASE: &str = "https://formulae.brew.sh/api/formula";

/// Errors that can occur during a registry lookup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Network or other HTTP error
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Unexpected status code from the registry
    #[error("Registry returned HTTP {0}")]
    UnexpectedStatus(u16),

    /// Failed to parse the registry response
    #[error("Failed to parse registry response: {0}")]
    ParseError(String),
}

/// Outcome of a name-availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameAvailability {
    /// No package with this name exists
    Available,
    /// The name exists and is maintained by the operator's own account
    Owned { version: String },
    /// The name exists under someone else's account
    Taken { version: String },
}

impl NameAvailability {
    /// Status-line text for the distributions view.
    pub fn summary(&self, name: &str) -> String {
        match self {
            NameAvailability::Available => format!("{} is available", name),
            NameAvailability::Owned { version } => {
                format!("{} is yours (published {})", name, version)
            }
            NameAvailability::Taken { version } => {
                format!("{} is taken (latest {})", name, version)
            }
        }
    }

    /// Whether publishing under this name can proceed.
    pub fn is_publishable(&self) -> bool {
        !matches!(self, NameAvailability::Taken { .. })
    }
}

/// npm package metadata (only the fields we care about).
#[derive(Debug, Clone, Deserialize)]
pub struct PackageMetadata {
    /// Package name
    pub name: String,
    /// Maintainer accounts
    #[serde(default)]
    pub maintainers: Vec<Maintainer>,
    /// Dist tags; `latest` carries the current version
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: DistTags,
}

/// One maintainer entry from package metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Maintainer {
    pub name: String,
}

/// Dist-tag map from package metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistTags {
    #[serde(default)]
    pub latest: Option<String>,
}

/// Decide availability from parsed package metadata.
///
/// A package maintained by `owner` counts as owned; anything else counts
/// as taken.
pub fn interpret_package_metadata(
    meta: &PackageMetadata,
    owner: Option<&str>,
) -> NameAvailability {
    let version = meta
        .dist_tags
        .latest
        .clone()
        .unwrap_or_else(|| "unknown".to_string());

    let owned = owner
        .map(|owner| meta.maintainers.iter().any(|m| m.name == owner))
        .unwrap_or(false);

    if owned {
        NameAvailability::Owned { version }
    } else {
        NameAvailability::Taken { version }
    }
}

/// Check whether a package name is available on the npm registry.
///
/// `owner` is the operator's npm account name, used to distinguish "taken
/// by me" from "taken by someone else".
pub fn check_npm_name(
    name: &str,
    owner: Option<&str>,
) -> Result<NameAvailability, RegistryError> {
    let url = format!("{}/{}", NPM_REGISTRY_BASE, name);

    match ureq::get(&url).call() {
        Ok(resp) => {
            let meta: PackageMetadata = resp
                .into_json()
                .map_err(|e| RegistryError::ParseError(e.to_string()))?;
            Ok(interpret_package_metadata(&meta, owner))
        }
        Err(ureq::Error::Status(404, _)) => Ok(NameAvailability::Available),
        Err(ureq::Error::Status(code, _)) => Err(RegistryError::UnexpectedStatus(code)),
        Err(e) => Err(RegistryError::HttpError(e.to_string())),
    }
}

/// Check whether a formula name already exists in homebrew-core.
pub fn check_brew_formula(name: &str) -> Result<bool, RegistryError> {
    let url = format!("{}/{}.json", BREW_API_BASE, name);

    match ureq::get(&url).call() {
        Ok(_) => Ok(true),
        Err(ureq::Error::Status(404, _)) => Ok(false),
        Err(ureq::Error::Status(code, _)) => Err(RegistryError::UnexpectedStatus(code)),
        Err(e) => Err(RegistryError::HttpError(e.to_string())),
    }
}
