//! automerge - triage and auto-merge dependency-bot PRs

mod cli;

use crate::cli::approve::run_approve_all_command;
use crate::cli::context::CommandContext;
use crate::cli::style::Stylize;
use crate::cli::triage::run_triage_command;
use anstream::{eprintln, println};
use automerge_triage::config::DEFAULT_CONFIG_PATH;
use automerge_triage::error::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// GitHub PR auto-merger
#[derive(Parser)]
#[command(
    name = "automerge",
    version,
    about = "GitHub PR auto-merger for dependency-bot PRs planned by Atlantis",
    after_help = "Thanks for flying automerge"
)]
struct Cli {
    /// JSON file holding the GitHub access token, repos and filters (.toml also accepted)
    #[arg(
        long = "config-file",
        visible_alias = "config_file",
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_PATH
    )]
    config_file: PathBuf,

    /// Approve all PRs that match the filters in the config
    #[arg(long = "approve-all", visible_alias = "approve_all")]
    approve_all: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("automerge_triage=info,automerge=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = CommandContext::new(&cli.config_file)?;

    if cli.approve_all {
        run_approve_all_command(&ctx).await
    } else {
        run_triage_command(&ctx).await
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %e, "run aborted");
                eprintln!("{} {e}", "Error:".error());
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("{}", "Exiting by user request.".muted());
            ExitCode::SUCCESS
        }
    }
}
