//! Readiness poller - bounded waits on GitHub's mergeable state
//!
//! GitHub recomputes `mergeable_state` asynchronously after every push or
//! check completion. The poller turns that into a bounded synchronous
//! precondition so the dispatcher can act on a settled state.
//!
//! Two phases share one deadline:
//! 1. Resolve - re-read while the state is `unknown`. A resolved `behind`
//!    state triggers a branch update.
//! 2. Gate - re-read until the state equals the gate's target.
//!
//! The decision of what to do next is the pure [`next_step`]; the loop
//! around it only sleeps and re-reads through the injected clock.

use crate::dispatch::actions::PrOutcome;
use crate::error::Result;
use crate::platform::PlatformService;
use crate::progress::{Clock, ProgressCallback};
use crate::types::{MergeableState, PullRequest};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Timing knobs for polling and comment pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Wall-clock budget covering both phases of one wait
    pub budget: Duration,
    /// Re-read interval while the state is `unknown`
    pub resolve_interval: Duration,
    /// Re-read interval while waiting for `clean` before a merge
    pub merge_interval: Duration,
    /// Re-read interval while waiting for the plan runner's lock
    pub plan_interval: Duration,
    /// Pause between an unlock comment and the comment that follows it
    pub settle_delay: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(120),
            resolve_interval: Duration::from_secs(1),
            merge_interval: Duration::from_secs(1),
            plan_interval: Duration::from_secs(4),
            settle_delay: Duration::from_secs(4),
        }
    }
}

/// Target state the second phase waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// `blocked`: the plan runner holds the workspace lock
    PlanLock,
    /// `clean`: every check passed and the PR can be merged
    Merge,
}

impl Gate {
    /// State that opens the gate
    pub const fn target(self) -> MergeableState {
        match self {
            Self::PlanLock => MergeableState::Blocked,
            Self::Merge => MergeableState::Clean,
        }
    }

    /// Re-read interval while waiting at this gate
    pub const fn interval(self, settings: &PollSettings) -> Duration {
        match self {
            Self::PlanLock => settings.plan_interval,
            Self::Merge => settings.merge_interval,
        }
    }

    const fn wait_message(self) -> &'static str {
        match self {
            Self::PlanLock => "Waiting for all checks to pass...",
            Self::Merge => "Waiting for checks to pass...",
        }
    }
}

/// Which phase of a wait is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Waiting for the state to leave `unknown`
    Resolve,
    /// Waiting for the gate's target state
    Gate(Gate),
}

impl std::fmt::Display for PollPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolve => write!(f, "step 1 (resolve mergeable state)"),
            Self::Gate(gate) => write!(f, "step 2 (wait for {})", gate.target()),
        }
    }
}

/// What the poll loop should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    /// The phase is satisfied
    Ready,
    /// Sleep for the given interval, then re-read
    Continue(Duration),
    /// Deadline passed; give up on this PR
    TimedOut,
}

/// Result of a wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The phase completed with this state
    Ready(MergeableState),
    /// The deadline elapsed during the given phase
    TimedOut(PollPhase),
    /// The state could not be read
    Unreadable(String),
}

impl PollOutcome {
    /// The ready state, or the skip outcome the dispatcher should report
    pub fn into_state(self) -> std::result::Result<MergeableState, PrOutcome> {
        match self {
            Self::Ready(state) => Ok(state),
            Self::TimedOut(phase) => Err(PrOutcome::TimedOut(phase)),
            Self::Unreadable(reason) => Err(PrOutcome::Unreadable(reason)),
        }
    }
}

/// Transition function of the poll loop
///
/// A satisfied phase is ready even past the deadline. Otherwise the wait
/// times out once `now` reaches `deadline`. The sleep never runs past the
/// deadline, so a wait overshoots it by at most one read.
pub fn next_step(
    phase: PollPhase,
    state: &MergeableState,
    now: Instant,
    deadline: Instant,
    settings: &PollSettings,
) -> PollDecision {
    let satisfied = match phase {
        PollPhase::Resolve => *state != MergeableState::Unknown,
        PollPhase::Gate(gate) => *state == gate.target(),
    };

    if satisfied {
        PollDecision::Ready
    } else if now >= deadline {
        PollDecision::TimedOut
    } else {
        let interval = match phase {
            PollPhase::Resolve => settings.resolve_interval,
            PollPhase::Gate(gate) => gate.interval(settings),
        };
        PollDecision::Continue(interval.min(deadline.saturating_duration_since(now)))
    }
}

/// Polls one PR's mergeable state through the injected clock
pub struct ReadinessPoller<'a> {
    platform: &'a dyn PlatformService,
    clock: &'a dyn Clock,
    progress: &'a dyn ProgressCallback,
    settings: PollSettings,
}

impl<'a> ReadinessPoller<'a> {
    /// Create a poller
    pub const fn new(
        platform: &'a dyn PlatformService,
        clock: &'a dyn Clock,
        progress: &'a dyn ProgressCallback,
        settings: PollSettings,
    ) -> Self {
        Self {
            platform,
            clock,
            progress,
            settings,
        }
    }

    /// Deadline for a wait starting now
    pub fn start(&self) -> Instant {
        self.clock.now() + self.settings.budget
    }

    /// Phase 1: wait until the state is known; update the branch if behind
    ///
    /// A failed branch update is fatal and returned as `Err`. Timeouts and
    /// failed reads are outcomes.
    pub async fn resolve(&self, pr: &PullRequest, deadline: Instant) -> Result<PollOutcome> {
        let state = match self.platform.mergeable_state(pr).await {
            Ok(state) => state,
            Err(e) => return Ok(self.unreadable(pr, &e.to_string())),
        };

        self.progress
            .on_wait_start("Waiting for mergeable state to return...")
            .await;
        let outcome = self.poll(pr, PollPhase::Resolve, state, deadline).await;
        self.progress.on_wait_end().await;

        if outcome == PollOutcome::Ready(MergeableState::Behind) {
            info!(pr = pr.number, repo = %pr.repo, "PR is behind, updating branch");
            self.platform.update_branch(pr).await?;
        }
        Ok(outcome)
    }

    /// Phase 2: wait until the state equals the gate's target
    pub async fn await_gate(
        &self,
        pr: &PullRequest,
        gate: Gate,
        state: MergeableState,
        deadline: Instant,
    ) -> PollOutcome {
        self.progress.on_wait_start(gate.wait_message()).await;
        let outcome = self.poll(pr, PollPhase::Gate(gate), state, deadline).await;
        self.progress.on_wait_end().await;
        outcome
    }

    /// Both phases under one fresh deadline
    pub async fn wait_for(&self, pr: &PullRequest, gate: Gate) -> Result<PollOutcome> {
        let deadline = self.start();
        match self.resolve(pr, deadline).await? {
            PollOutcome::Ready(state) => Ok(self.await_gate(pr, gate, state, deadline).await),
            other => Ok(other),
        }
    }

    async fn poll(
        &self,
        pr: &PullRequest,
        phase: PollPhase,
        mut state: MergeableState,
        deadline: Instant,
    ) -> PollOutcome {
        loop {
            match next_step(phase, &state, self.clock.now(), deadline, &self.settings) {
                PollDecision::Ready => return PollOutcome::Ready(state),
                PollDecision::TimedOut => {
                    warn!(
                        pr = pr.number,
                        repo = %pr.repo,
                        %state,
                        "Timeout expired waiting for state to be green at {phase}, skipping"
                    );
                    return PollOutcome::TimedOut(phase);
                }
                PollDecision::Continue(delay) => {
                    self.clock.sleep(delay).await;
                    state = match self.platform.mergeable_state(pr).await {
                        Ok(state) => state,
                        Err(e) => return self.unreadable(pr, &e.to_string()),
                    };
                }
            }
        }
    }

    fn unreadable(&self, pr: &PullRequest, reason: &str) -> PollOutcome {
        warn!(pr = pr.number, repo = %pr.repo, reason, "Failed to get info for pull request, skipping");
        PollOutcome::Unreadable(reason.to_string())
    }
}
