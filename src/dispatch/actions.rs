//! Action dispatcher - the fixed action sequence for each worklist
//!
//! Every method handles one PR and returns `Err` only for failures that must
//! end the run (branch update, approval, merge). Everything else, including
//! timeouts and failed comment or label posts, is logged and reported as a
//! [`PrOutcome`] so the rest of the batch keeps going.

use crate::config::Labels;
use crate::dispatch::approval::{ApprovalState, approval_state};
use crate::dispatch::poll::{Gate, PollPhase, PollSettings, ReadinessPoller};
use crate::error::Result;
use crate::platform::PlatformService;
use crate::progress::{Clock, ProgressCallback};
use crate::types::{MergeMethod, MergeableState, PullRequest};
use tracing::{info, warn};

/// Trigger phrase asking the plan runner to plan
pub const PLAN_COMMENT: &str = "atlantis plan";

/// Trigger phrase asking the plan runner to release its lock
pub const UNLOCK_COMMENT: &str = "atlantis unlock";

/// Marker left on PRs that automation stops handling
pub const IGNORE_COMMENT: &str = "This PR will be ignored by automerge";

/// Comment left on a PR superseded by a newer dependency version
pub const SUPERSEDED_COMMENT: &str =
    "This PR will be closed since there is a new version of this dependency";

/// What happened to one PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrOutcome {
    /// A plan trigger comment was posted
    PlanRequested,
    /// The PR was ready but the plan trigger comment could not be posted
    PlanCommentFailed,
    /// PR has conflicts; the unlock, ignore and label sequence ran
    ///
    /// Failed posts inside the sequence are logged, not reported here.
    Conflict,
    /// PR has a diff; the unlock, ignore and label sequence ran
    ///
    /// Failed posts inside the sequence are logged, not reported here.
    Ignored,
    /// PR was squash-merged
    Merged,
    /// Our approval was dismissed; labelled instead of merged
    ApprovalDismissed,
    /// PR was closed as superseded
    Closed,
    /// PR was superseded but closing it failed
    CloseFailed,
    /// An approval was submitted
    Approved,
    /// PR was already approved by the acting user
    AlreadyApproved,
    /// A readiness wait ran out of time
    TimedOut(PollPhase),
    /// The mergeable state could not be read
    Unreadable(String),
}

/// Drives PRs through their action sequences
pub struct Dispatcher<'a> {
    platform: &'a dyn PlatformService,
    clock: &'a dyn Clock,
    progress: &'a dyn ProgressCallback,
    acting_user: &'a str,
    labels: &'a Labels,
    settings: PollSettings,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher with default poll settings
    pub fn new(
        platform: &'a dyn PlatformService,
        clock: &'a dyn Clock,
        progress: &'a dyn ProgressCallback,
        acting_user: &'a str,
        labels: &'a Labels,
    ) -> Self {
        Self {
            platform,
            clock,
            progress,
            acting_user,
            labels,
            settings: PollSettings::default(),
        }
    }

    /// Replace the poll settings
    #[must_use]
    pub fn with_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    const fn poller(&self) -> ReadinessPoller<'a> {
        ReadinessPoller::new(self.platform, self.clock, self.progress, self.settings)
    }

    /// To-plan bucket: unlock conflicted PRs, ask the plan runner to plan the rest
    ///
    /// The plan comment waits for `blocked` so two trigger comments never race
    /// the plan runner's workspace lock.
    pub async fn plan(&self, pr: &PullRequest) -> Result<PrOutcome> {
        let state = match self.platform.mergeable_state(pr).await {
            Ok(state) => state,
            Err(e) => {
                warn!(pr = pr.number, repo = %pr.repo, error = %e, "Failed to get info for pull request, skipping");
                return Ok(PrOutcome::Unreadable(e.to_string()));
            }
        };

        if state == MergeableState::Dirty {
            info!(pr = pr.number, repo = %pr.repo, "Is dirty, there are conflicts, ignoring...");
            self.comment_pair(pr, UNLOCK_COMMENT, IGNORE_COMMENT).await;
            self.label(pr, &self.labels.conflict).await;
            return Ok(PrOutcome::Conflict);
        }

        if let Err(skip) = self
            .poller()
            .wait_for(pr, Gate::PlanLock)
            .await?
            .into_state()
        {
            return Ok(skip);
        }

        if self.comment(pr, PLAN_COMMENT).await {
            Ok(PrOutcome::PlanRequested)
        } else {
            Ok(PrOutcome::PlanCommentFailed)
        }
    }

    /// Has-diff bucket: release the lock and hand the PR to a human
    pub async fn ignore(&self, pr: &PullRequest) -> PrOutcome {
        self.comment_pair(pr, UNLOCK_COMMENT, IGNORE_COMMENT).await;
        self.label(pr, &self.labels.ignore).await;
        PrOutcome::Ignored
    }

    /// No-changes bucket: approve if needed and squash-merge once `clean`
    ///
    /// One deadline covers waiting for a known state and waiting for `clean`.
    pub async fn merge(&self, pr: &PullRequest) -> Result<PrOutcome> {
        info!(pr = pr.number, repo = %pr.repo, "*** PR {} ***", pr.number);
        let poller = self.poller();
        let deadline = poller.start();

        let state = match poller.resolve(pr, deadline).await?.into_state() {
            Ok(state) => state,
            Err(skip) => return Ok(skip),
        };

        match self.approval(pr).await? {
            ApprovalState::Dismissed => {
                info!(pr = pr.number, repo = %pr.repo, "Dismissed, check why ignoring...");
                self.label(pr, &self.labels.dismissed).await;
                return Ok(PrOutcome::ApprovalDismissed);
            }
            ApprovalState::Approved => {
                info!(pr = pr.number, repo = %pr.repo, "Approved already");
            }
            ApprovalState::NotApproved | ApprovalState::NoReview => {
                info!(pr = pr.number, repo = %pr.repo, "Needs approving...");
                self.platform.approve(pr).await?;
                info!(pr = pr.number, repo = %pr.repo, "PR Approved");
            }
        }

        if let Err(skip) = poller
            .await_gate(pr, Gate::Merge, state, deadline)
            .await
            .into_state()
        {
            return Ok(skip);
        }

        info!(pr = pr.number, repo = %pr.repo, "merging now");
        self.platform.merge(pr, MergeMethod::Squash).await?;
        info!(pr = pr.number, repo = %pr.repo, "merged!");
        Ok(PrOutcome::Merged)
    }

    /// To-be-closed bucket: explain, release the lock, close
    pub async fn close(&self, pr: &PullRequest) -> PrOutcome {
        self.comment_pair(pr, SUPERSEDED_COMMENT, UNLOCK_COMMENT)
            .await;

        match self.platform.close(pr).await {
            Ok(()) => {
                info!(pr = pr.number, repo = %pr.repo, title = %pr.title, "Closed PR");
                PrOutcome::Closed
            }
            Err(e) => {
                warn!(pr = pr.number, repo = %pr.repo, title = %pr.title, error = %e, "Failed to close PR");
                PrOutcome::CloseFailed
            }
        }
    }

    /// Approve-all mode: approve unless the acting user already has
    ///
    /// A dismissed approval counts as handled and is not re-submitted.
    pub async fn approve_if_needed(&self, pr: &PullRequest) -> Result<PrOutcome> {
        let state = self.approval(pr).await?;
        if !state.needs_approval() {
            info!(pr = pr.number, repo = %pr.repo, ?state, "nothing to approve");
            return Ok(if state == ApprovalState::Dismissed {
                PrOutcome::ApprovalDismissed
            } else {
                PrOutcome::AlreadyApproved
            });
        }

        self.platform.approve(pr).await?;
        info!(pr = pr.number, repo = %pr.repo, "PR Approved");
        Ok(PrOutcome::Approved)
    }

    async fn approval(&self, pr: &PullRequest) -> Result<ApprovalState> {
        let reviews = self.platform.list_reviews(pr).await?;
        Ok(approval_state(&reviews, self.acting_user))
    }

    /// Post an unlock-style comment, give the plan runner time to react, post the next
    async fn comment_pair(&self, pr: &PullRequest, first: &str, second: &str) {
        self.comment(pr, first).await;
        self.clock.sleep(self.settings.settle_delay).await;
        self.comment(pr, second).await;
    }

    /// Post a comment; `false` if the post failed (already logged)
    async fn comment(&self, pr: &PullRequest, body: &str) -> bool {
        match self.platform.create_comment(pr, body).await {
            Ok(()) => {
                info!(pr = pr.number, repo = %pr.repo, body, "Commented");
                true
            }
            Err(e) => {
                warn!(pr = pr.number, repo = %pr.repo, body, error = %e, "Failed to add comment to pull request");
                false
            }
        }
    }

    async fn label(&self, pr: &PullRequest, label: &str) {
        match self.platform.add_label(pr, label).await {
            Ok(()) => info!(pr = pr.number, repo = %pr.repo, label, "Label set"),
            Err(e) => {
                warn!(pr = pr.number, repo = %pr.repo, label, error = %e, "Failed to set label");
            }
        }
    }
}
