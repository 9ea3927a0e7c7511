//! Pipeline orchestration: extract → dedup → normalize → load.
//!
//! Stages pass typed values directly; the pipeline owns the in-memory
//! candidate and article lists for the duration of one run, and nothing
//! outlives the run except the stored rows.

use chrono::Local;
use futures::stream::{self, StreamExt};

use crate::config::Config;
use crate::dedup::dedup_by_url;
use crate::model::RawCandidate;
use crate::normalize::normalize_all;
use crate::source::{self, Source};
use crate::storage::Database;

/// Bounded fan-out across sources. Sources are independent; the only shared
/// state is the candidate list merged after every fetch completes.
const MAX_CONCURRENT_SOURCES: usize = 4;

/// Outcome of one pipeline cycle.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    /// Candidates produced by all sources combined.
    pub extracted: usize,
    /// Candidates surviving URL deduplication.
    pub unique: usize,
    /// Rows actually inserted (as distinct from already-known URLs).
    pub inserted: usize,
}

/// Execute one full pipeline cycle against an open store.
///
/// A source that fails entirely degrades output completeness but is not
/// fatal. Total input absence is the one escalated failure: when no source
/// contributes a single candidate, the run errors so the scheduler sees it.
pub async fn run(
    config: &Config,
    db: &Database,
    client: &reqwest::Client,
) -> anyhow::Result<RunSummary> {
    let candidates = extract_all(config, client).await;
    let extracted = candidates.len();

    if candidates.is_empty() {
        anyhow::bail!("No candidates extracted from any source");
    }

    let candidates = dedup_by_url(candidates);
    let unique = candidates.len();

    let now = Local::now().naive_local();
    let articles = normalize_all(candidates, now);

    let inserted = db.insert_articles(&articles).await?;
    tracing::info!(
        extracted = extracted,
        unique = unique,
        inserted = inserted,
        "Pipeline run complete"
    );

    Ok(RunSummary {
        extracted,
        unique,
        inserted,
    })
}

/// Extract candidates from every configured source concurrently.
///
/// Completion of all source fetches is the synchronization barrier before
/// dedup. Candidate order is preserved within each source; cross-source
/// order follows completion order, which dedup does not depend on.
pub async fn extract_all(config: &Config, client: &reqwest::Client) -> Vec<RawCandidate> {
    let sources: Vec<Source> = source::from_config(config);
    let page_delay = config.page_delay();

    stream::iter(sources)
        .map(|src| {
            let client = client.clone();
            async move { src.extract(&client, page_delay).await }
        })
        .buffer_unordered(MAX_CONCURRENT_SOURCES)
        .collect::<Vec<Vec<RawCandidate>>>()
        .await
        .into_iter()
        .flatten()
        .collect()
}
