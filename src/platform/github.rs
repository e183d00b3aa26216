//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{MergeMethod, MergeableState, PrComment, PullRequest, Review, ReviewState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use reqwest::header::LINK;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Per-call timeout, applied to both the octocrab and the raw client
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Page size when listing repository PRs
const PR_PAGE_SIZE: u8 = 100;

/// Page size when listing PR comments
const COMMENT_PAGE_SIZE: u8 = 50;

#[derive(Deserialize)]
struct IssueComment {
    id: u64,
    body: Option<String>,
}

impl From<IssueComment> for PrComment {
    fn from(c: IssueComment) -> Self {
        Self {
            id: c.id,
            body: c.body.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct PullDetail {
    mergeable_state: Option<String>,
}

#[derive(Deserialize)]
struct ReviewUser {
    login: String,
}

#[derive(Deserialize)]
struct PullReview {
    user: Option<ReviewUser>,
    state: ReviewState,
    submitted_at: Option<DateTime<Utc>>,
}

impl From<PullReview> for Review {
    fn from(r: PullReview) -> Self {
        Self {
            user: r.user.map(|u| u.login),
            state: r.state,
            submitted_at: r.submitted_at,
        }
    }
}

/// GitHub service using octocrab for listing and raw requests for PR resources
///
/// Repository PR listing goes through octocrab. Everything addressed by a PR's
/// own resource URL (comments, mergeable state, reviews, merge, close) is a raw
/// request so the expected status code of each call can be checked exactly.
pub struct GitHubService {
    client: Octocrab,
    /// Owner of every listed repository
    owner: String,
    /// Token for raw HTTP requests
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, host: Option<String>) -> Result<Self> {
        let base_uri = host.map(|h| format!("https://{h}/api/v3"));
        Self::build(token, owner, base_uri.as_deref())
    }

    /// Create a service whose octocrab client talks to an arbitrary API root
    pub fn with_base_uri(token: &str, owner: String, base_uri: &str) -> Result<Self> {
        Self::build(token, owner, Some(base_uri))
    }

    fn build(token: &str, owner: String, base_uri: Option<&str>) -> Result<Self> {
        let timeout = Some(Duration::from_secs(REQUEST_TIMEOUT_SECS));
        let mut builder = Octocrab::builder()
            .personal_token(token.to_string())
            .set_connect_timeout(timeout)
            .set_read_timeout(timeout);

        if let Some(base_url) = base_uri {
            builder = builder
                .base_uri(base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("automerge-triage")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            owner,
            token: token.to_string(),
            http_client,
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Fetch one page of comments, returning it with the `rel="last"` link if any
    async fn comment_page(
        &self,
        pr: &PullRequest,
        url: &str,
    ) -> Result<(Vec<IssueComment>, Option<String>)> {
        let response = self.request(Method::GET, url).send().await?;
        let response = expect_status(
            response,
            StatusCode::OK,
            format!("list comments of {}", pr.describe()),
        )
        .await?;

        let last = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(last_page_url);
        let comments = response.json().await?;
        Ok((comments, last))
    }
}

/// Fail with `UnexpectedStatus` unless the response has the expected status
async fn expect_status(
    response: Response,
    expected: StatusCode,
    action: String,
) -> Result<Response> {
    if response.status() == expected {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let reason = response.text().await.unwrap_or_default();
    Err(Error::UnexpectedStatus {
        action,
        status,
        reason,
    })
}

/// Extract the `rel="last"` target from an RFC 8288 `Link` header
///
/// GitHub omits the header entirely on single-page results, and omits
/// `rel="last"` when the current page already is the last one.
pub fn last_page_url(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == r#"rel="last""#) {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok().map(String::from)
    })
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(repo: &str, pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    let issue_url = pr
        .issue_url
        .as_ref()
        .map_or_else(|| pr.url.replace("/pulls/", "/issues/"), ToString::to_string);
    let comments_url = pr
        .comments_url
        .as_ref()
        .map_or_else(|| format!("{issue_url}/comments"), ToString::to_string);

    PullRequest {
        number: pr.number,
        repo: repo.to_string(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        url: pr.url.clone(),
        issue_url,
        comments_url,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn list_pull_requests(&self, repo: &str) -> Result<Vec<PullRequest>> {
        debug!(owner = %self.owner, repo, "listing open PRs");
        let first_page = self
            .client
            .pulls(&self.owner, repo)
            .list()
            .state(octocrab::params::State::Open)
            .per_page(PR_PAGE_SIZE)
            .send()
            .await?;

        let prs = self.client.all_pages(first_page).await?;
        let result: Vec<PullRequest> = prs.iter().map(|pr| pr_from_octocrab(repo, pr)).collect();
        debug!(repo, count = result.len(), "listed open PRs");
        Ok(result)
    }

    async fn latest_comment(&self, pr: &PullRequest) -> Result<Option<PrComment>> {
        debug!(pr_number = pr.number, repo = %pr.repo, "fetching latest comment");
        let url = format!("{}?per_page={COMMENT_PAGE_SIZE}", pr.comments_url);
        let (comments, last_page) = self.comment_page(pr, &url).await?;

        if let Some(last_url) = last_page {
            debug!(pr_number = pr.number, %last_url, "following pagination to last page");
            let (last_comments, _) = self.comment_page(pr, &last_url).await?;
            if let Some(comment) = last_comments.into_iter().last() {
                return Ok(Some(comment.into()));
            }
        }

        Ok(comments.into_iter().last().map(Into::into))
    }

    async fn mergeable_state(&self, pr: &PullRequest) -> Result<MergeableState> {
        let response = self.request(Method::GET, &pr.url).send().await?;
        let response = expect_status(
            response,
            StatusCode::OK,
            format!("get info for {}", pr.describe()),
        )
        .await?;

        let detail: PullDetail = response.json().await?;
        let state = MergeableState::from_api(detail.mergeable_state.as_deref());
        debug!(pr_number = pr.number, %state, "read mergeable state");
        Ok(state)
    }

    async fn list_reviews(&self, pr: &PullRequest) -> Result<Vec<Review>> {
        let url = format!("{}/reviews?per_page=100", pr.url);
        let response = self.request(Method::GET, &url).send().await?;
        let response = expect_status(
            response,
            StatusCode::OK,
            format!("check if {} is approved", pr.describe()),
        )
        .await?;

        let reviews: Vec<PullReview> = response.json().await?;
        debug!(pr_number = pr.number, count = reviews.len(), "listed reviews");
        Ok(reviews.into_iter().map(Into::into).collect())
    }

    async fn create_comment(&self, pr: &PullRequest, body: &str) -> Result<()> {
        debug!(pr_number = pr.number, body, "creating PR comment");
        let response = self
            .request(Method::POST, &pr.comments_url)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?;
        expect_status(
            response,
            StatusCode::CREATED,
            format!("add comment to {}", pr.describe()),
        )
        .await?;
        Ok(())
    }

    async fn add_label(&self, pr: &PullRequest, label: &str) -> Result<()> {
        debug!(pr_number = pr.number, label, "adding label");
        let url = format!("{}/labels", pr.issue_url);
        let response = self
            .request(Method::POST, &url)
            .json(&[label])
            .send()
            .await?;
        expect_status(
            response,
            StatusCode::OK,
            format!("set label {label} to {}", pr.describe()),
        )
        .await?;
        Ok(())
    }

    async fn approve(&self, pr: &PullRequest) -> Result<()> {
        debug!(pr_number = pr.number, "submitting approval");
        let url = format!("{}/reviews", pr.url);
        let response = self
            .request(Method::POST, &url)
            .json(&serde_json::json!({ "event": "APPROVE" }))
            .send()
            .await?;
        expect_status(
            response,
            StatusCode::OK,
            format!("approve {}", pr.describe()),
        )
        .await?;
        Ok(())
    }

    async fn update_branch(&self, pr: &PullRequest) -> Result<()> {
        debug!(pr_number = pr.number, "updating branch");
        let url = format!("{}/update-branch", pr.url);
        let response = self.request(Method::PUT, &url).send().await?;
        expect_status(
            response,
            StatusCode::ACCEPTED,
            format!("update branch in {}", pr.describe()),
        )
        .await?;
        Ok(())
    }

    async fn merge(&self, pr: &PullRequest, method: MergeMethod) -> Result<()> {
        debug!(pr_number = pr.number, %method, "merging PR");
        let url = format!("{}/merge", pr.url);
        let response = self
            .request(Method::PUT, &url)
            .json(&serde_json::json!({ "merge_method": method.to_string() }))
            .send()
            .await?;
        expect_status(
            response,
            StatusCode::OK,
            format!("merge {}", pr.describe()),
        )
        .await?;
        debug!(pr_number = pr.number, "merge complete");
        Ok(())
    }

    async fn close(&self, pr: &PullRequest) -> Result<()> {
        debug!(pr_number = pr.number, "closing PR");
        let response = self
            .request(Method::PATCH, &pr.issue_url)
            .json(&serde_json::json!({ "state": "closed" }))
            .send()
            .await?;
        expect_status(
            response,
            StatusCode::OK,
            format!("close {}", pr.describe()),
        )
        .await?;
        Ok(())
    }
}
