//! Injected capabilities for status reporting and time
//!
//! The engine never owns a console or calls `tokio::time` directly. The binary
//! passes a spinner-backed [`ProgressCallback`] and [`TokioClock`]; tests pass
//! [`NoopProgress`] and a virtual clock.

use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Receives phased status updates while a run progresses
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// A new section of the run begins (e.g. "Merging what's possible")
    async fn on_section(&self, title: &str);

    /// A bounded wait begins; implementations may show a spinner
    async fn on_wait_start(&self, message: &str);

    /// The current wait ended, whatever the outcome
    async fn on_wait_end(&self);

    /// Free-form status line
    async fn on_message(&self, message: &str);
}

/// Progress sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_section(&self, _title: &str) {}
    async fn on_wait_start(&self, _message: &str) {}
    async fn on_wait_end(&self) {}
    async fn on_message(&self, _message: &str) {}
}

/// Source of wall-clock time and sleeping
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;

    /// Suspend for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by tokio's timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
