//! Orchestrator - fetch, triage and dispatch a whole batch
//!
//! Strictly sequential: each PR is classified, polled and acted on before the
//! next one starts. Per-PR results are returned for callers and tests; the log
//! stream stays the audit trail.

use crate::config::Config;
use crate::dispatch::{Dispatcher, PollSettings, PrOutcome};
use crate::error::Result;
use crate::platform::PlatformService;
use crate::progress::{Clock, ProgressCallback};
use crate::triage::{build_worklists, fetch_pull_requests};
use crate::types::PullRequest;
use tracing::info;

/// Everything a run needs, injected by the caller
pub struct RunContext<'a> {
    /// Remote repository gateway
    pub platform: &'a dyn PlatformService,
    /// Time source for polling and comment pacing
    pub clock: &'a dyn Clock,
    /// Status reporting
    pub progress: &'a dyn ProgressCallback,
    /// Validated configuration
    pub config: &'a Config,
    /// Poll timing
    pub settings: PollSettings,
}

/// Outcome for one PR of the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrReport {
    /// PR number
    pub number: u64,
    /// Repository name
    pub repo: String,
    /// What happened
    pub outcome: PrOutcome,
}

impl PrReport {
    fn new(pr: &PullRequest, outcome: PrOutcome) -> Self {
        Self {
            number: pr.number,
            repo: pr.repo.clone(),
            outcome,
        }
    }
}

impl RunContext<'_> {
    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(
            self.platform,
            self.clock,
            self.progress,
            &self.config.github_user,
            &self.config.labels,
        )
        .with_settings(self.settings)
    }

    async fn fetch(&self) -> Result<Vec<PullRequest>> {
        fetch_pull_requests(self.platform, &self.config.repos, &self.config.filters).await
    }
}

/// Triage every matching PR and run its action sequence
///
/// Order: merge candidates first, then PRs with diffs, then PRs to plan,
/// then superseded PRs. The first fatal error ends the run.
pub async fn run_triage(ctx: &RunContext<'_>) -> Result<Vec<PrReport>> {
    let prs = ctx.fetch().await?;
    let worklists = build_worklists(ctx.platform, &prs, &ctx.config.labels).await?;
    let dispatcher = ctx.dispatcher();
    let mut reports = Vec::with_capacity(worklists.len());

    if worklists.is_empty() {
        ctx.progress
            .on_message("No pull requests need an action this run")
            .await;
        return Ok(reports);
    }

    if !worklists.no_changes.is_empty() {
        ctx.progress.on_section("Merging what's possible").await;
        for pr in &worklists.no_changes {
            reports.push(PrReport::new(pr, dispatcher.merge(pr).await?));
        }
    }

    if !worklists.with_diffs.is_empty() {
        ctx.progress.on_section("Unlocking PR").await;
        for pr in &worklists.with_diffs {
            reports.push(PrReport::new(pr, dispatcher.ignore(pr).await));
        }
    }

    if worklists.to_plan().next().is_some() {
        ctx.progress.on_section("Commenting to plan PRs").await;
        for pr in worklists.to_plan() {
            reports.push(PrReport::new(pr, dispatcher.plan(pr).await?));
        }
    }

    if !worklists.to_be_closed.is_empty() {
        ctx.progress.on_section("Closing old PRs").await;
        for pr in &worklists.to_be_closed {
            reports.push(PrReport::new(pr, dispatcher.close(pr).await));
        }
    }

    Ok(reports)
}

/// Approve every matching PR the acting user has not approved yet
///
/// No classification and no readiness waits happen in this mode.
pub async fn run_approve_all(ctx: &RunContext<'_>) -> Result<Vec<PrReport>> {
    let prs = ctx.fetch().await?;
    let dispatcher = ctx.dispatcher();
    ctx.progress.on_section("Only Approving Now").await;

    let mut reports = Vec::with_capacity(prs.len());
    for pr in &prs {
        reports.push(PrReport::new(pr, dispatcher.approve_if_needed(pr).await?));
    }

    if reports.iter().any(|r| r.outcome == PrOutcome::Approved) {
        info!("All completed");
    } else {
        info!("Nothing to be approved");
    }
    Ok(reports)
}
