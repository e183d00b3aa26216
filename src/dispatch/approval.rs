//! Approval state of a PR as seen by the acting user

use crate::types::{Review, ReviewState};

/// Whether the acting user has approved a PR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    /// Latest review by the acting user is not an approval
    NotApproved,
    /// Latest review by the acting user approves the PR
    Approved,
    /// Our approval was dismissed (new commits, or a human dismissed it)
    Dismissed,
    /// The acting user never reviewed this PR
    NoReview,
}

impl ApprovalState {
    /// True when an approval should be submitted
    pub const fn needs_approval(self) -> bool {
        matches!(self, Self::NotApproved | Self::NoReview)
    }
}

/// Derive the approval state from a PR's reviews
///
/// Only reviews authored by `acting_user` count. The most recent one wins,
/// ordered by submission time and then by list position.
pub fn approval_state(reviews: &[Review], acting_user: &str) -> ApprovalState {
    reviews
        .iter()
        .enumerate()
        .filter(|(_, r)| r.user.as_deref() == Some(acting_user))
        .max_by_key(|(index, r)| (r.submitted_at, *index))
        .map_or(ApprovalState::NoReview, |(_, review)| match review.state {
            ReviewState::Approved => ApprovalState::Approved,
            ReviewState::Dismissed => ApprovalState::Dismissed,
            _ => ApprovalState::NotApproved,
        })
}
