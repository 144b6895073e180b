mod json;
mod sqlite;

pub use json::JsonFileStore;
pub use sqlite::SqliteStore;

use crate::{normalize::normalize_url, ArticleRecord, PipelineError};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Result of merging a batch into the stored collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppendOutcome {
    /// Size of the collection after the merge.
    pub merged: usize,
    /// Records from the batch that were actually added.
    pub inserted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub total: usize,
    pub negative: usize,
}

/// Append-only collection of articles, at most one per normalized URL.
#[async_trait::async_trait]
pub trait ArticleStore: Send + Sync {
    async fn load(&self) -> Result<Vec<ArticleRecord>, PipelineError>;

    /// Normalizes every record's URL, drops the ones already stored or seen
    /// earlier in the batch and persists the rest in one all-or-nothing step.
    async fn append(&self, new_records: Vec<ArticleRecord>)
        -> Result<AppendOutcome, PipelineError>;

    async fn existing_keys(&self) -> Result<HashSet<String>, PipelineError> {
        Ok(self
            .load()
            .await?
            .iter()
            .map(|r| normalize_url(&r.url))
            .collect())
    }

    async fn stats(&self) -> Result<StoreStats, PipelineError> {
        let records = self.load().await?;
        Ok(StoreStats {
            total: records.len(),
            negative: records.iter().filter(|r| r.is_negative()).count(),
        })
    }
}

/// Keeps the records of `batch` whose normalized URL is neither in `existing`
/// nor repeated earlier in the batch. Kept records carry the normalized URL.
pub(crate) fn select_new(
    existing: &HashSet<String>,
    batch: Vec<ArticleRecord>,
) -> Vec<ArticleRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(batch.len());
    for mut record in batch {
        let key = normalize_url(&record.url);
        if key.is_empty() {
            warn!("Skip record without url: {}", record.title);
            continue;
        }
        if existing.contains(&key) || !seen.insert(key.clone()) {
            debug!("Skip duplicate {}", key);
            continue;
        }
        record.url = key;
        kept.push(record);
    }
    kept
}
