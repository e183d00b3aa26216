//! Classifier - map a PR's latest comment to a single verdict
//!
//! Pure functions, no I/O. Several rules can match the same body (an error
//! comment often quotes a partial plan), so rules are tried in a fixed
//! priority order and the first match wins.

use crate::types::PrComment;
use regex::Regex;
use std::sync::LazyLock;

/// Triage outcome for one PR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriageVerdict {
    /// No comment yet; the plan runner never ran
    NoComments,
    /// Plan shows infrastructure or output changes
    HasDiff,
    /// Plan or apply failed, or the plan was discarded
    HasError,
    /// Plan found no drift, or apply completed
    NoChanges,
    /// The dependency bot opened a newer PR superseding this one
    NewerVersionAvailable,
    /// A trigger comment is the latest one; the plan runner is still working
    StillRunning,
    /// A previous run already marked this PR as ignored
    AlreadyIgnored,
    /// The plan runner found no project to plan
    NoProjectsPlanned,
    /// Nothing matched
    Unrecognized,
}

/// Worklist a verdict sends its PR to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorklistBucket {
    /// New PRs that need a first plan
    NoComments,
    /// PRs with a diff, to be unlocked and ignored
    WithDiffs,
    /// Merge candidates
    NoChanges,
    /// PRs to re-plan after an error
    Errored,
    /// Superseded PRs to close
    ToBeClosed,
}

impl TriageVerdict {
    /// Worklist for this verdict, or `None` when the PR is left alone this run
    pub const fn bucket(self) -> Option<WorklistBucket> {
        match self {
            Self::NoComments => Some(WorklistBucket::NoComments),
            Self::HasDiff => Some(WorklistBucket::WithDiffs),
            Self::HasError => Some(WorklistBucket::Errored),
            Self::NoChanges => Some(WorklistBucket::NoChanges),
            Self::NewerVersionAvailable => Some(WorklistBucket::ToBeClosed),
            Self::StillRunning
            | Self::AlreadyIgnored
            | Self::NoProjectsPlanned
            | Self::Unrecognized => None,
        }
    }

    /// Log line describing the verdict
    pub const fn description(self) -> &'static str {
        match self {
            Self::NoComments => "No Comments, new pr.",
            Self::HasDiff => "There are diffs or conflicts.",
            Self::HasError => "Has errors.",
            Self::NoChanges => "No changes.",
            Self::NewerVersionAvailable => {
                "This PR will be closed since there is a new version of this dependency"
            }
            Self::StillRunning => "Atlantis is still working here, ignoring this PR for now.",
            Self::AlreadyIgnored => "Will be ignored, there are diffs",
            Self::NoProjectsPlanned => {
                "Will be ignored, 0 projects planned, usually due to modules update or no file changed, check and close them yourself please"
            }
            Self::Unrecognized => "*** Not match, please check why!!! ***",
        }
    }
}

impl std::fmt::Display for TriageVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NoComments => "no-comments",
            Self::HasDiff => "has-diff",
            Self::HasError => "has-error",
            Self::NoChanges => "no-changes",
            Self::NewerVersionAvailable => "newer-version",
            Self::StillRunning => "still-running",
            Self::AlreadyIgnored => "already-ignored",
            Self::NoProjectsPlanned => "no-projects-planned",
            Self::Unrecognized => "unrecognized",
        };
        write!(f, "{name}")
    }
}

// Rules in priority order. Each pattern is an alternation of markers.
static RULES: LazyLock<Vec<(TriageVerdict, Regex)>> = LazyLock::new(|| {
    [
        (
            TriageVerdict::HasDiff,
            r"Plan: \d+ to add, \d+ to change, \d+ to destroy\.|Changes to Outputs",
        ),
        (
            TriageVerdict::HasError,
            concat!(
                r"Plan Error|Plan Failed|Continued plan output from previous comment\.",
                r"|via the Atlantis UI",
                r"|All Atlantis locks for this PR have been unlocked and plans discarded",
                r"|Renovate will not automatically rebase this PR",
                r"|Apply Failed|Apply Error",
            ),
        ),
        (
            TriageVerdict::NoChanges,
            r"No changes\. Your infrastructure matches the configuration|Apply complete!",
        ),
        (TriageVerdict::NewerVersionAvailable, r"A newer version of"),
        (TriageVerdict::StillRunning, r"atlantis plan|atlantis apply"),
        (
            TriageVerdict::AlreadyIgnored,
            r"This PR will be ignored by automerge",
        ),
        (TriageVerdict::NoProjectsPlanned, r"Ran Plan for 0 projects"),
    ]
    .into_iter()
    .map(|(verdict, pattern)| {
        (
            verdict,
            Regex::new(pattern).expect("triage rule patterns are valid"),
        )
    })
    .collect()
});

/// Classify a single comment body
pub fn classify_body(body: &str) -> TriageVerdict {
    RULES
        .iter()
        .find(|(_, pattern)| pattern.is_match(body))
        .map_or(TriageVerdict::Unrecognized, |(verdict, _)| *verdict)
}

/// Classify a PR from its latest comment
///
/// `None` means the PR has no comments at all.
pub fn classify(latest: Option<&PrComment>) -> TriageVerdict {
    latest.map_or(TriageVerdict::NoComments, |comment| {
        classify_body(&comment.body)
    })
}
