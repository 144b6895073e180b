use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, info};

pub mod article;
pub mod classifier;
pub mod config;
pub mod error_log;
pub mod fetch;
pub mod normalize;
pub mod sentiment;
pub mod sources;
pub mod store;
pub mod text;

mod db_utils;
mod error;
mod utils;

pub use article::ArticleRecord;
pub use classifier::{Classification, Classifier};
pub use config::{ClassifierConfig, FetchConfig, RunOptions};
pub use error::PipelineError;
pub use error_log::ErrorLog;
pub use fetch::Fetcher;
pub use sources::{Source, SourceKind};
pub use store::{AppendOutcome, ArticleStore, JsonFileStore, SqliteStore, StoreStats};
pub use utils::DateRange;

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub source: String,
    /// Listing entries inside the date range.
    pub found: usize,
    /// Entries not stored yet whose article page could be fetched.
    pub scraped: usize,
    /// Articles classified and handed to the store.
    pub processed: usize,
    /// Negative verdicts among the processed articles.
    pub negative: usize,
    pub inserted: usize,
    /// Whole collection after the run.
    pub total: usize,
    pub total_negative: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source          : {}", self.source)?;
        writeln!(f, "Found           : {}", self.found)?;
        writeln!(f, "Scraped         : {}", self.scraped)?;
        writeln!(f, "Processed       : {}", self.processed)?;
        writeln!(f, "Negative        : {}", self.negative)?;
        writeln!(f, "Inserted        : {}", self.inserted)?;
        writeln!(f, "Total Stored    : {}", self.total)?;
        writeln!(f, "Total Negative  : {}", self.total_negative)?;
        Ok(())
    }
}

/// One scrape-classify-store pass over the last `options.days` days.
///
/// Listing and article failures go to `errors` and are skipped; storage
/// failures abort the run before anything is written.
pub async fn run_pipeline(
    source: &dyn Source,
    fetcher: &Fetcher,
    store: &dyn ArticleStore,
    classifier: &Classifier,
    errors: &ErrorLog,
    options: &RunOptions,
    today: NaiveDate,
) -> Result<RunSummary, PipelineError> {
    let range = DateRange::last_days(options.days, today);
    info!(
        "[{}] Scraping articles from {} to {}",
        source.name(),
        range.start,
        range.end
    );

    let known = store.existing_keys().await?;
    info!("[{}] {} articles already stored", source.name(), known.len());

    let listing = source
        .fetch_listing(fetcher, &range, options.max_pages)
        .await;
    for (url, e) in &listing.failures {
        errors
            .record(url, format!("Failed to fetch listing: {}", e))
            .await;
    }

    let mut summary = RunSummary {
        source: source.name().to_string(),
        found: listing.entries.len(),
        ..RunSummary::default()
    };

    let mut processed = vec![];
    for mut entry in listing.entries {
        if known.contains(&normalize::normalize_url(&entry.url)) {
            debug!("Already stored {}", entry.url);
            continue;
        }

        let page = match source.fetch_article(fetcher, &entry.url).await {
            Ok(page) => page,
            Err(e) => {
                errors
                    .record(&entry.url, format!("Failed to scrape article content: {}", e))
                    .await;
                continue;
            }
        };
        entry.content = page.content;
        if entry.author.is_none() {
            entry.author = page.author;
        }
        entry.published_date = entry.published_date.or(page.published_date);
        if !range.admits(entry.published_date) {
            debug!("Out of range {}", entry.url);
            continue;
        }
        summary.scraped += 1;

        let mut entry = text::clean_article(entry);
        if entry.content.chars().count() < options.min_content_len {
            errors
                .record(&entry.url, "Article content too short or empty")
                .await;
            continue;
        }

        let verdict = classifier.classify(&entry.content);
        entry.source = source.name().to_string();
        entry.annotate(verdict, utils::get_now());
        if verdict.is_negative {
            summary.negative += 1;
            info!(
                "[{}] NEGATIVE {} (score: {}, sentiment: {:.2})",
                processed.len() + 1,
                entry.title,
                verdict.negative_score,
                verdict.sentiment_score
            );
        } else {
            info!("[{}] {}", processed.len() + 1, entry.title);
        }
        processed.push(entry);
    }
    summary.processed = processed.len();

    let outcome = store.append(processed).await?;
    let stats = store.stats().await?;
    summary.inserted = outcome.inserted;
    summary.total = stats.total;
    summary.total_negative = stats.negative;

    Ok(summary)
}
