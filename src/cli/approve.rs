//! Approve-all command - approve every matching PR, no triage

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use automerge_triage::dispatch::PrOutcome;
use automerge_triage::error::Result;
use automerge_triage::run::{PrReport, run_approve_all};

/// Run the approve-all command
///
/// An empty run is already reported by the run's log line, so only a
/// non-zero approval count is printed.
pub async fn run_approve_all_command(ctx: &CommandContext) -> Result<()> {
    let reports = run_approve_all(&ctx.run_context()).await?;

    if let Some(line) = summary_line(&reports) {
        println!("{line}");
    }
    Ok(())
}

fn summary_line(reports: &[PrReport]) -> Option<String> {
    let approved = reports
        .iter()
        .filter(|r| r.outcome == PrOutcome::Approved)
        .count();
    (approved > 0).then(|| {
        format!(
            "{} {} PR(s) approved",
            check(),
            approved.to_string().accent()
        )
    })
}
