//! Core types for automerge-triage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pull request matched by the title filters
///
/// Only identity and resource locators are kept. Remote attributes such as the
/// mergeable state are fetched on demand and never cached here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Repository the PR belongs to
    pub repo: String,
    /// PR title
    pub title: String,
    /// API URL of the PR resource (`.../pulls/{n}`)
    pub url: String,
    /// API URL of the underlying issue resource (`.../issues/{n}`)
    pub issue_url: String,
    /// API URL for posting issue comments
    pub comments_url: String,
    /// Web URL for the PR
    pub html_url: String,
}

impl PullRequest {
    /// `PR 12 in repo infra`, as used in log lines
    pub fn describe(&self) -> String {
        format!("PR {} in repo {}", self.number, self.repo)
    }
}

/// A comment on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrComment {
    /// Comment ID
    pub id: u64,
    /// Comment body text
    pub body: String,
}

/// State of a submitted review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    /// Review approved the PR
    Approved,
    /// Review requested changes
    ChangesRequested,
    /// Review only commented
    Commented,
    /// An earlier approval was dismissed
    Dismissed,
    /// Review not submitted yet
    Pending,
    /// Any state this crate does not know about
    #[serde(other)]
    Other,
}

/// A review on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Login of the reviewer (None for deleted accounts)
    pub user: Option<String>,
    /// Review state
    pub state: ReviewState,
    /// When the review was submitted
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Mergeable state computed by GitHub
///
/// GitHub computes this asynchronously after every push or check completion,
/// so it reads `unknown` for a while after a PR changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeableState {
    /// Not computed yet
    Unknown,
    /// Head branch is behind the base branch
    Behind,
    /// Blocked by required reviews or checks (also the plan runner's lock)
    Blocked,
    /// Merge conflicts
    Dirty,
    /// Ready to merge
    Clean,
    /// Any other value reported by the API (`unstable`, `has_hooks`, `draft`, ...)
    Other(String),
}

impl MergeableState {
    /// Parse the API's string form; `None` means not computed yet
    pub fn from_api(value: Option<&str>) -> Self {
        match value {
            None | Some("unknown") => Self::Unknown,
            Some("behind") => Self::Behind,
            Some("blocked") => Self::Blocked,
            Some("dirty") => Self::Dirty,
            Some("clean") => Self::Clean,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for MergeableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Behind => write!(f, "behind"),
            Self::Blocked => write!(f, "blocked"),
            Self::Dirty => write!(f, "dirty"),
            Self::Clean => write!(f, "clean"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    /// Squash all commits into one
    Squash,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
        }
    }
}
