use crate::classifier::Classification;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One news article as it moves from the listing page to the stored collection.
///
/// Classification fields are private: they are filled once by [`ArticleRecord::annotate`]
/// and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredArticle", into = "StoredArticle")]
pub struct ArticleRecord {
    pub title: String,
    pub url: String,
    pub published_date: Option<NaiveDate>,
    pub summary: String,
    pub content: String,
    pub author: Option<String>,

    negative_score: Option<u32>,
    sentiment_score: Option<f64>,
    is_negative: Option<bool>,

    pub source: String,
    processed_at: Option<DateTime<FixedOffset>>,

    /// Fields written by other pipeline versions, kept as they were.
    pub extra: serde_json::Map<String, serde_json::Value>,

    // Legacy date text as read from disk, written back verbatim while it still holds.
    stored_published_date: Option<String>,
    stored_processed_at: Option<String>,
}

impl ArticleRecord {
    pub fn new<T, U>(title: T, url: U) -> ArticleRecord
    where
        T: Into<String>,
        U: Into<String>,
    {
        ArticleRecord {
            title: title.into(),
            url: url.into(),
            published_date: None,
            summary: String::new(),
            content: String::new(),
            author: None,
            negative_score: None,
            sentiment_score: None,
            is_negative: None,
            source: String::new(),
            processed_at: None,
            extra: serde_json::Map::new(),
            stored_published_date: None,
            stored_processed_at: None,
        }
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> ArticleRecord {
        self.published_date = date;
        self
    }

    pub fn with_summary<S: Into<String>>(mut self, summary: S) -> ArticleRecord {
        self.summary = summary.into();
        self
    }

    pub fn with_content<S: Into<String>>(mut self, content: S) -> ArticleRecord {
        self.content = content.into();
        self
    }

    /// Records the classifier's verdict. A record is classified at most once,
    /// later calls leave the first result in place.
    pub fn annotate(&mut self, classification: Classification, processed_at: DateTime<FixedOffset>) {
        if self.is_classified() {
            return;
        }
        self.negative_score = Some(classification.negative_score);
        self.sentiment_score = Some(classification.sentiment_score);
        self.is_negative = Some(classification.is_negative);
        self.processed_at = Some(processed_at);
        self.stored_processed_at = None;
    }

    pub fn is_classified(&self) -> bool {
        self.is_negative.is_some()
    }

    pub fn negative_score(&self) -> Option<u32> {
        self.negative_score
    }

    pub fn sentiment_score(&self) -> Option<f64> {
        self.sentiment_score
    }

    /// Unclassified records count as not negative.
    pub fn is_negative(&self) -> bool {
        self.is_negative.unwrap_or(false)
    }

    pub fn processed_at(&self) -> Option<DateTime<FixedOffset>> {
        self.processed_at
    }
}

impl fmt::Display for ArticleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title           : {}", self.title)?;
        writeln!(f, "Url             : {}", self.url)?;
        if let Some(d) = self.published_date.as_ref() {
            writeln!(f, "Published Date  : {}", d)?;
        } else {
            writeln!(f, "Published Date  : None")?;
        };
        writeln!(f, "Source          : {}", self.source)?;
        match (self.negative_score, self.sentiment_score) {
            (Some(score), Some(sentiment)) => writeln!(
                f,
                "Verdict         : {} (score: {}, sentiment: {:.2})",
                if self.is_negative() { "NEGATIVE" } else { "OK" },
                score,
                sentiment
            )?,
            _ => writeln!(f, "Verdict         : None")?,
        }

        Ok(())
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// On-disk shape of a record.
///
/// Older runs wrote free-text publication dates and timestamps without an
/// offset; both are read leniently instead of failing the whole collection.
#[derive(Serialize, Deserialize)]
struct StoredArticle {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    published_date: Option<String>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    negative_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sentiment_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_negative: Option<bool>,
    #[serde(default)]
    source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    processed_at: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

fn read_date(raw: &str) -> Option<NaiveDate> {
    crate::sources::parse_date(raw)
}

/// RFC 3339 first, then a naive timestamp taken as local time.
fn read_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|ts| ts.with_timezone(ts.offset()))
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|r| !r.trim().is_empty())
}

impl From<StoredArticle> for ArticleRecord {
    fn from(stored: StoredArticle) -> Self {
        let raw_date = non_empty(stored.published_date);
        let published_date = raw_date.as_deref().and_then(read_date);
        let canonical_date = published_date.map(|d| d.format(DATE_FORMAT).to_string());
        let stored_published_date = raw_date.filter(|raw| Some(raw) != canonical_date.as_ref());

        let raw_timestamp = non_empty(stored.processed_at);
        let processed_at = raw_timestamp.as_deref().and_then(read_timestamp);
        let stored_processed_at =
            raw_timestamp.filter(|raw| DateTime::parse_from_rfc3339(raw.trim()).is_err());

        ArticleRecord {
            title: stored.title,
            url: stored.url,
            published_date,
            summary: stored.summary,
            content: stored.content,
            author: stored.author,
            negative_score: stored.negative_score,
            sentiment_score: stored.sentiment_score,
            is_negative: stored.is_negative,
            source: stored.source,
            processed_at,
            extra: stored.extra,
            stored_published_date,
            stored_processed_at,
        }
    }
}

impl From<ArticleRecord> for StoredArticle {
    fn from(record: ArticleRecord) -> Self {
        let published_date = match record.stored_published_date {
            Some(raw) if read_date(&raw) == record.published_date => raw,
            _ => record
                .published_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        };
        let processed_at = record
            .stored_processed_at
            .or_else(|| record.processed_at.map(|ts| ts.to_rfc3339()));
        StoredArticle {
            title: record.title,
            url: record.url,
            published_date: Some(published_date),
            summary: record.summary,
            content: record.content,
            author: record.author,
            negative_score: record.negative_score,
            sentiment_score: record.sentiment_score,
            is_negative: record.is_negative,
            source: record.source,
            processed_at,
            extra: record.extra,
        }
    }
}
