//! Remote repository gateway
//!
//! Typed operations on the hosting service. The triage and dispatch engines
//! only talk to [`PlatformService`], so tests can swap in a scripted mock.

mod github;

pub use github::{GitHubService, last_page_url};

use crate::config::Config;
use crate::error::Result;
use crate::types::{MergeMethod, MergeableState, PrComment, PullRequest, Review};
use async_trait::async_trait;

/// Platform service trait for PR operations
///
/// Every method maps to a single REST call (two for paginated comments). A
/// response with an unexpected status is returned as an error; whether that
/// error ends the run is decided by the caller.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// List open PRs of a repository owned by the configured owner
    async fn list_pull_requests(&self, repo: &str) -> Result<Vec<PullRequest>>;

    /// Most recent comment of a PR, resolving pagination to the last page
    async fn latest_comment(&self, pr: &PullRequest) -> Result<Option<PrComment>>;

    /// Current mergeable state, read fresh from the PR resource
    async fn mergeable_state(&self, pr: &PullRequest) -> Result<MergeableState>;

    /// Reviews submitted on a PR, oldest first
    async fn list_reviews(&self, pr: &PullRequest) -> Result<Vec<Review>>;

    /// Post a comment on a PR
    async fn create_comment(&self, pr: &PullRequest, body: &str) -> Result<()>;

    /// Add a label to a PR
    async fn add_label(&self, pr: &PullRequest, label: &str) -> Result<()>;

    /// Submit an approving review as the token's user
    async fn approve(&self, pr: &PullRequest) -> Result<()>;

    /// Ask GitHub to merge the base branch into the PR branch
    async fn update_branch(&self, pr: &PullRequest) -> Result<()>;

    /// Merge a PR with the specified method
    async fn merge(&self, pr: &PullRequest, method: MergeMethod) -> Result<()>;

    /// Close the PR's issue resource without merging
    async fn close(&self, pr: &PullRequest) -> Result<()>;
}

/// Create the GitHub-backed service described by the config
pub fn create_platform_service(config: &Config) -> Result<Box<dyn PlatformService>> {
    let service = GitHubService::new(
        &config.access_token,
        config.owner.clone(),
        config.api_host.clone(),
    )?;
    Ok(Box::new(service))
}
