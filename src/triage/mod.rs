//! Triage: fetch matching PRs, classify them, sort them into worklists
//!
//! Three steps, leaves first:
//! 1. Fetch - list PRs per repository and keep titles matching a filter
//! 2. Classify - pure mapping from the latest comment to a verdict
//! 3. Worklists - run-scoped buckets consumed by the dispatcher

mod classify;
mod fetch;
mod worklist;

pub use classify::{TriageVerdict, WorklistBucket, classify, classify_body};
pub use fetch::{compile_filters, fetch_pull_requests};
pub use worklist::{Worklists, build_worklists};
