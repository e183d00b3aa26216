//! automerge-triage: unattended triage of dependency-bot pull requests
//!
//! Classifies each matching PR by its latest plan-runner comment and drives it
//! through plan, unlock, label, approve, merge or close actions.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod platform;
pub mod progress;
pub mod run;
pub mod triage;
pub mod types;
