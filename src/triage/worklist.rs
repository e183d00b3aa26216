//! Worklists - sort fetched PRs into per-verdict buckets

use super::classify::{TriageVerdict, WorklistBucket, classify};
use crate::config::Labels;
use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::PullRequest;
use tracing::{info, warn};

/// Run-scoped buckets of PRs, built once and consumed once
#[derive(Debug, Clone, Default)]
pub struct Worklists {
    /// PRs without any comment
    pub no_comments: Vec<PullRequest>,
    /// PRs whose plan shows a diff
    pub with_diffs: Vec<PullRequest>,
    /// PRs with a clean plan; merge candidates
    pub no_changes: Vec<PullRequest>,
    /// PRs whose plan or apply failed
    pub errored: Vec<PullRequest>,
    /// PRs superseded by a newer dependency version
    pub to_be_closed: Vec<PullRequest>,
}

impl Worklists {
    /// Add a PR to the bucket for `verdict`; returns false when the verdict has none
    pub fn push(&mut self, verdict: TriageVerdict, pr: PullRequest) -> bool {
        let Some(bucket) = verdict.bucket() else {
            return false;
        };
        match bucket {
            WorklistBucket::NoComments => self.no_comments.push(pr),
            WorklistBucket::WithDiffs => self.with_diffs.push(pr),
            WorklistBucket::NoChanges => self.no_changes.push(pr),
            WorklistBucket::Errored => self.errored.push(pr),
            WorklistBucket::ToBeClosed => self.to_be_closed.push(pr),
        }
        true
    }

    /// PRs that need a plan comment: new ones first, then errored ones
    pub fn to_plan(&self) -> impl Iterator<Item = &PullRequest> {
        self.no_comments.iter().chain(self.errored.iter())
    }

    /// Total number of PRs across all buckets
    pub fn len(&self) -> usize {
        self.no_comments.len()
            + self.with_diffs.len()
            + self.no_changes.len()
            + self.errored.len()
            + self.to_be_closed.len()
    }

    /// Check if every bucket is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classify every PR and sort it into a worklist
///
/// A failed comment listing aborts the run. PRs where the plan runner found no
/// project get the `no_project` label right away; the label is best effort.
pub async fn build_worklists(
    platform: &dyn PlatformService,
    prs: &[PullRequest],
    labels: &Labels,
) -> Result<Worklists> {
    let mut worklists = Worklists::default();

    for pr in prs {
        let latest = platform.latest_comment(pr).await?;
        let verdict = classify(latest.as_ref());

        match verdict {
            TriageVerdict::Unrecognized => {
                warn!(pr = pr.number, repo = %pr.repo, %verdict, "{}", verdict.description());
            }
            TriageVerdict::NoProjectsPlanned => {
                info!(pr = pr.number, repo = %pr.repo, %verdict, "{}", verdict.description());
                if let Err(e) = platform.add_label(pr, &labels.no_project).await {
                    warn!(pr = pr.number, repo = %pr.repo, error = %e, "failed to set label");
                }
            }
            _ => {
                info!(pr = pr.number, repo = %pr.repo, %verdict, "{}", verdict.description());
            }
        }

        worklists.push(verdict, pr.clone());
    }

    Ok(worklists)
}
