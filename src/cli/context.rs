//! Shared command context for CLI commands
//!
//! Loads the config and creates the platform service, the setup shared by
//! the triage and approve-all commands.

use crate::cli::CliProgress;
use automerge_triage::config::Config;
use automerge_triage::dispatch::PollSettings;
use automerge_triage::error::Result;
use automerge_triage::platform::{PlatformService, create_platform_service};
use automerge_triage::progress::TokioClock;
use automerge_triage::run::RunContext;
use std::path::Path;
use tracing::info;

/// Shared context for CLI commands that interact with GitHub
pub struct CommandContext {
    /// Validated configuration
    pub config: Config,
    /// Platform service (GitHub)
    pub platform: Box<dyn PlatformService>,
    /// Spinner-backed progress reporting
    pub progress: CliProgress,
    clock: TokioClock,
}

impl CommandContext {
    /// Load the config at `path` and connect to GitHub
    pub fn new(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Attempting to open config file");
        let config = Config::load(path)?;
        let platform = create_platform_service(&config)?;

        Ok(Self {
            config,
            platform,
            progress: CliProgress::new(),
            clock: TokioClock,
        })
    }

    /// Borrow the context as the engine's run context
    pub fn run_context(&self) -> RunContext<'_> {
        RunContext {
            platform: self.platform.as_ref(),
            clock: &self.clock,
            progress: &self.progress,
            config: &self.config,
            settings: PollSettings::default(),
        }
    }
}
