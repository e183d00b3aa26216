//! Shared fixtures for unit and integration tests

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::{Call, MockPlatformService, review};

use async_trait::async_trait;
use automerge_triage::config::{Config, Labels};
use automerge_triage::progress::Clock;
use automerge_triage::types::PullRequest;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Login the tests act as
pub const BOT_USER: &str = "automerge-bot";

/// Build a PR with GitHub-shaped resource URLs
pub fn make_pr(repo: &str, number: u64, title: &str) -> PullRequest {
    make_pr_at("https://api.github.com", repo, number, title)
}

/// Build a PR whose resource URLs live under `base`
pub fn make_pr_at(base: &str, repo: &str, number: u64, title: &str) -> PullRequest {
    let url = format!("{base}/repos/acme/{repo}/pulls/{number}");
    let issue_url = format!("{base}/repos/acme/{repo}/issues/{number}");
    PullRequest {
        number,
        repo: repo.to_string(),
        title: title.to_string(),
        url,
        comments_url: format!("{issue_url}/comments"),
        issue_url,
        html_url: format!("https://github.com/acme/{repo}/pull/{number}"),
    }
}

/// Config for `repos` with a Renovate-style filter
pub fn test_config(repos: &[&str]) -> Config {
    Config {
        access_token: "ghp_test".to_string(),
        owner: "acme".to_string(),
        github_user: BOT_USER.to_string(),
        repos: repos.iter().map(ToString::to_string).collect(),
        filters: vec![r"chore\(deps\)".to_string()],
        api_host: None,
        labels: Labels::default(),
    }
}

/// Virtual clock: `sleep` returns immediately and advances `now`
pub struct FakeClock {
    start: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Virtual time spent sleeping so far
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap()
    }

    /// Every sleep, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
        self.sleeps.lock().unwrap().push(duration);
    }
}
