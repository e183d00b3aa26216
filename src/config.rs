//! Run configuration
//!
//! Loaded from a JSON file (the default `./config.json`) or, when the path ends
//! in `.toml`, from TOML. Both formats share the same keys.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Labels attached to PRs the automation stops handling
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// PR has a plan diff and needs a human
    pub ignore: String,
    /// PR has merge conflicts
    pub conflict: String,
    /// Our approval was dismissed
    pub dismissed: String,
    /// Plan runner found no project to plan
    pub no_project: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            ignore: "automerge_ignore".to_string(),
            conflict: "automerge_conflict".to_string(),
            dismissed: "automerge_dismissed".to_string(),
            no_project: "automerge_no_project".to_string(),
        }
    }
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub access token
    pub access_token: String,
    /// Owner (user or organization) of all repos
    pub owner: String,
    /// Login the token acts as; used to find our own reviews
    pub github_user: String,
    /// Repository names to scan
    pub repos: Vec<String>,
    /// Title patterns, matched from the start of the PR title
    pub filters: Vec<String>,
    /// GitHub Enterprise host (None for github.com)
    pub api_host: Option<String>,
    /// Label names
    pub labels: Labels,
}

/// On-disk shape; every key optional so a missing one can be named
#[derive(Debug, Deserialize)]
struct RawConfig {
    access_token: Option<String>,
    owner: Option<String>,
    github_user: Option<String>,
    repos: Option<Vec<String>>,
    filters: Option<Vec<String>>,
    api_host: Option<String>,
    #[serde(default)]
    labels: Labels,
}

fn require<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| Error::MissingConfigKey(key.to_string()))
}

impl Config {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "error reading config file at {}: {e}",
                path.display()
            ))
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml(&content)
        } else {
            Self::from_json(&content)
        }
        .map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse a JSON config document
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("invalid JSON: {e}")))?;
        Self::validate(raw)
    }

    /// Parse a TOML config document
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("invalid TOML: {e}")))?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self> {
        Ok(Self {
            access_token: require(raw.access_token, "access_token")?,
            owner: require(raw.owner, "owner")?,
            github_user: require(raw.github_user, "github_user")?,
            repos: require(raw.repos, "repos")?,
            filters: require(raw.filters, "filters")?,
            api_host: raw.api_host,
            labels: raw.labels,
        })
    }
}
