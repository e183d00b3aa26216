//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use automerge_triage::error::{Error, Result};
use automerge_triage::platform::PlatformService;
use automerge_triage::types::{
    MergeMethod, MergeableState, PrComment, PullRequest, Review, ReviewState,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// One recorded platform call, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListPrs(String),
    LatestComment(u64),
    MergeableState(u64),
    ListReviews(u64),
    CreateComment { pr: u64, body: String },
    AddLabel { pr: u64, label: String },
    Approve(u64),
    UpdateBranch(u64),
    Merge { pr: u64, method: MergeMethod },
    Close(u64),
}

/// Simple mock platform service for testing
///
/// This manually implements `PlatformService` rather than using mockall.
///
/// Features:
/// - Configurable responses per repo / PR number
/// - Scripted mergeable-state sequences (the last state repeats)
/// - Ordered call log for verification
/// - Error injection for failure path testing
#[derive(Default)]
pub struct MockPlatformService {
    prs: Mutex<HashMap<String, Vec<PullRequest>>>,
    comments: Mutex<HashMap<u64, PrComment>>,
    mergeable_states: Mutex<HashMap<u64, VecDeque<MergeableState>>>,
    reviews: Mutex<HashMap<u64, Vec<Review>>>,
    calls: Mutex<Vec<Call>>,
    // Error injection
    error_on_list_prs: Mutex<Option<String>>,
    error_on_latest_comment: Mutex<Option<String>>,
    error_on_mergeable_state: Mutex<Option<String>>,
    error_on_list_reviews: Mutex<Option<String>>,
    error_on_create_comment: Mutex<Option<String>>,
    error_on_add_label: Mutex<Option<String>>,
    error_on_approve: Mutex<Option<String>>,
    error_on_update_branch: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
    error_on_close: Mutex<Option<String>>,
}

fn injected(slot: &Mutex<Option<String>>) -> Result<()> {
    match slot.lock().unwrap().as_ref() {
        Some(msg) => Err(Error::GitHubApi(msg.clone())),
        None => Ok(()),
    }
}

impl MockPlatformService {
    pub fn new() -> Self {
        Self::default()
    }

    // === Response setup ===

    /// Set the open PRs of a repo
    pub fn set_prs(&self, repo: &str, prs: Vec<PullRequest>) {
        self.prs.lock().unwrap().insert(repo.to_string(), prs);
    }

    /// Set the latest comment of a PR
    pub fn set_latest_comment(&self, pr_number: u64, body: &str) {
        self.comments.lock().unwrap().insert(
            pr_number,
            PrComment {
                id: pr_number * 1000,
                body: body.to_string(),
            },
        );
    }

    /// Script the mergeable states returned by successive reads
    pub fn set_mergeable_states(&self, pr_number: u64, states: Vec<MergeableState>) {
        self.mergeable_states
            .lock()
            .unwrap()
            .insert(pr_number, states.into());
    }

    /// Set the reviews of a PR
    pub fn set_reviews(&self, pr_number: u64, reviews: Vec<Review>) {
        self.reviews.lock().unwrap().insert(pr_number, reviews);
    }

    /// Mark a PR as approved by `user`
    pub fn approve_as(&self, pr_number: u64, user: &str) {
        self.set_reviews(pr_number, vec![review(user, ReviewState::Approved)]);
    }

    // === Error injection methods ===

    pub fn fail_list_prs(&self, msg: &str) {
        *self.error_on_list_prs.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_latest_comment(&self, msg: &str) {
        *self.error_on_latest_comment.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_mergeable_state(&self, msg: &str) {
        *self.error_on_mergeable_state.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_list_reviews(&self, msg: &str) {
        *self.error_on_list_reviews.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_create_comment(&self, msg: &str) {
        *self.error_on_create_comment.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_add_label(&self, msg: &str) {
        *self.error_on_add_label.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_approve(&self, msg: &str) {
        *self.error_on_approve.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_update_branch(&self, msg: &str) {
        *self.error_on_update_branch.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_close(&self, msg: &str) {
        *self.error_on_close.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification methods ===

    /// All calls, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change remote state, in order (reads filtered out)
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| {
                !matches!(
                    c,
                    Call::ListPrs(_)
                        | Call::LatestComment(_)
                        | Call::MergeableState(_)
                        | Call::ListReviews(_)
                )
            })
            .collect()
    }

    /// Comment bodies posted on a PR, in order
    pub fn comments_on(&self, pr_number: u64) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateComment { pr, body } if pr == pr_number => Some(body),
                _ => None,
            })
            .collect()
    }

    /// Labels added to a PR, in order
    pub fn labels_on(&self, pr_number: u64) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AddLabel { pr, label } if pr == pr_number => Some(label),
                _ => None,
            })
            .collect()
    }

    /// Count calls matching a predicate
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }

    /// Get count of merge calls for a PR
    pub fn merge_call_count(&self, pr_number: u64) -> usize {
        self.count(|c| matches!(c, Call::Merge { pr, .. } if *pr == pr_number))
    }

    /// Get count of approve calls for a PR
    pub fn approve_call_count(&self, pr_number: u64) -> usize {
        self.count(|c| *c == Call::Approve(pr_number))
    }

    /// Assert that `merge` was NOT called for a specific PR
    pub fn assert_merge_not_called(&self, pr_number: u64) {
        let calls = self.calls();
        assert!(
            !calls
                .iter()
                .any(|c| matches!(c, Call::Merge { pr, .. } if *pr == pr_number)),
            "Expected merge({pr_number}) NOT to be called but it was: {calls:?}"
        );
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Build a review by `user` in `state`
pub fn review(user: &str, state: ReviewState) -> Review {
    Review {
        user: Some(user.to_string()),
        state,
        submitted_at: None,
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn list_pull_requests(&self, repo: &str) -> Result<Vec<PullRequest>> {
        self.record(Call::ListPrs(repo.to_string()));
        injected(&self.error_on_list_prs)?;
        Ok(self
            .prs
            .lock()
            .unwrap()
            .get(repo)
            .cloned()
            .unwrap_or_default())
    }

    async fn latest_comment(&self, pr: &PullRequest) -> Result<Option<PrComment>> {
        self.record(Call::LatestComment(pr.number));
        injected(&self.error_on_latest_comment)?;
        Ok(self.comments.lock().unwrap().get(&pr.number).cloned())
    }

    async fn mergeable_state(&self, pr: &PullRequest) -> Result<MergeableState> {
        self.record(Call::MergeableState(pr.number));
        injected(&self.error_on_mergeable_state)?;

        let mut states = self.mergeable_states.lock().unwrap();
        let queue = states.get_mut(&pr.number).ok_or_else(|| {
            Error::GitHubApi(format!(
                "mergeable_state: no response configured for PR #{}",
                pr.number
            ))
        })?;
        let state = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        state.ok_or_else(|| Error::GitHubApi(format!("empty state script for PR #{}", pr.number)))
    }

    async fn list_reviews(&self, pr: &PullRequest) -> Result<Vec<Review>> {
        self.record(Call::ListReviews(pr.number));
        injected(&self.error_on_list_reviews)?;
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_comment(&self, pr: &PullRequest, body: &str) -> Result<()> {
        self.record(Call::CreateComment {
            pr: pr.number,
            body: body.to_string(),
        });
        injected(&self.error_on_create_comment)
    }

    async fn add_label(&self, pr: &PullRequest, label: &str) -> Result<()> {
        self.record(Call::AddLabel {
            pr: pr.number,
            label: label.to_string(),
        });
        injected(&self.error_on_add_label)
    }

    async fn approve(&self, pr: &PullRequest) -> Result<()> {
        self.record(Call::Approve(pr.number));
        injected(&self.error_on_approve)
    }

    async fn update_branch(&self, pr: &PullRequest) -> Result<()> {
        self.record(Call::UpdateBranch(pr.number));
        injected(&self.error_on_update_branch)
    }

    async fn merge(&self, pr: &PullRequest, method: MergeMethod) -> Result<()> {
        self.record(Call::Merge {
            pr: pr.number,
            method,
        });
        injected(&self.error_on_merge)
    }

    async fn close(&self, pr: &PullRequest) -> Result<()> {
        self.record(Call::Close(pr.number));
        injected(&self.error_on_close)
    }
}
