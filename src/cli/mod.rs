//! CLI commands and terminal output

pub mod approve;
pub mod context;
pub mod style;
pub mod triage;

use crate::cli::style::{Stylize, spinner_style};
use anstream::println;
use async_trait::async_trait;
use automerge_triage::progress::ProgressCallback;
use indicatif::ProgressBar;
use std::sync::Mutex;
use std::time::Duration;

/// Progress reporting for the terminal
///
/// Sections print as bold banners; bounded waits show a spinner that is
/// cleared when the wait ends.
#[derive(Default)]
pub struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Create a progress reporter with no active spinner
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_section(&self, title: &str) {
        println!();
        println!("{}", title.emphasis());
        println!();
    }

    async fn on_wait_start(&self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut slot) = self.spinner.lock()
            && let Some(previous) = slot.replace(spinner)
        {
            previous.finish_and_clear();
        }
    }

    async fn on_wait_end(&self) {
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(spinner) = slot.take()
        {
            spinner.finish_and_clear();
        }
    }

    async fn on_message(&self, message: &str) {
        println!("{message}");
    }
}
