//! Triage command - classify matching PRs and act on each

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use automerge_triage::dispatch::PrOutcome;
use automerge_triage::error::Result;
use automerge_triage::run::run_triage;

/// Run the default triage command
pub async fn run_triage_command(ctx: &CommandContext) -> Result<()> {
    let reports = run_triage(&ctx.run_context()).await?;

    let skipped = reports
        .iter()
        .filter(|r| {
            matches!(
                r.outcome,
                PrOutcome::TimedOut(_) | PrOutcome::Unreadable(_) | PrOutcome::PlanCommentFailed
            )
        })
        .count();
    if skipped > 0 {
        println!(
            "{}",
            format!("{skipped} PR(s) skipped, they will be retried next run").warn()
        );
    }

    println!();
    println!("{} {}", check(), "All done, exiting".emphasis());
    println!();
    Ok(())
}
