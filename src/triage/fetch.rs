//! PR fetcher - list open PRs and keep those whose title matches a filter

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::PullRequest;
use regex::Regex;
use tracing::info;

/// Compile title filters, anchored at the start of the title
///
/// An empty filter list is an error: without filters every PR in every
/// repository would be touched.
pub fn compile_filters(filters: &[String]) -> Result<Vec<Regex>> {
    if filters.is_empty() {
        return Err(Error::NoFilters);
    }

    filters
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{pattern})")).map_err(|source| Error::InvalidFilter {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Fetch every open PR in `repos` whose title matches at least one filter
///
/// Results follow repository order, then API order. A PR is appended once per
/// matching filter; no de-duplication is done here. Any listing failure aborts
/// the whole fetch.
pub async fn fetch_pull_requests(
    platform: &dyn PlatformService,
    repos: &[String],
    filters: &[String],
) -> Result<Vec<PullRequest>> {
    let filters = compile_filters(filters)?;
    let mut matched = Vec::new();

    for repo in repos {
        info!(repo = %repo, "fetching all PRs");
        let prs = platform.list_pull_requests(repo).await?;

        for pr in prs {
            for filter in &filters {
                if filter.is_match(&pr.title) {
                    matched.push(pr.clone());
                }
            }
        }
    }

    info!(count = matched.len(), "all pull requests fetched");
    Ok(matched)
}
