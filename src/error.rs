//! Error types for automerge-triage
//!
//! Every `Err` that reaches the binary ends the run. Per-PR problems that
//! should not stop the batch are reported as outcome values instead.

use thiserror::Error;

/// Errors that abort the run
#[derive(Error, Debug)]
pub enum Error {
    /// Config file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// A required config key is absent
    #[error("error reading key \"{0}\" from config")]
    MissingConfigKey(String),

    /// The filter list in the config is empty
    #[error("no filters to match, please provide at least one")]
    NoFilters,

    /// A title filter is not a valid regular expression
    #[error("invalid filter pattern '{pattern}': {source}")]
    InvalidFilter {
        /// The offending pattern
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// A GitHub call answered with a status other than the expected one
    #[error("failed to {action}: status {status}, reason: {reason}")]
    UnexpectedStatus {
        /// What was attempted (e.g. "merge PR 12 in repo infra")
        action: String,
        /// HTTP status code returned
        status: u16,
        /// Response body, as returned by the API
        reason: String,
    },

    /// Octocrab error
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;
