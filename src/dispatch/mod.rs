//! Dispatch: per-verdict action sequences gated on GitHub readiness
//!
//! - `poll` - bounded waits on the mergeable state (pure transition + loop)
//! - `approval` - approval state of the acting user (pure)
//! - `actions` - the dispatcher issuing comments, labels, approvals, merges

mod actions;
mod approval;
mod poll;

pub use actions::{
    Dispatcher, IGNORE_COMMENT, PLAN_COMMENT, PrOutcome, SUPERSEDED_COMMENT, UNLOCK_COMMENT,
};
pub use approval::{ApprovalState, approval_state};
pub use poll::{
    Gate, PollDecision, PollOutcome, PollPhase, PollSettings, ReadinessPoller, next_step,
};
