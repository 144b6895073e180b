mod antara;
mod bisnis;
mod idxchannel;
mod jakartapost;

pub use antara::AntaraSource;
pub use bisnis::BisnisSource;
pub use idxchannel::IdxChannelSource;
pub use jakartapost::JakartaPostSource;

use crate::{
    fetch::Fetcher, normalize::normalize_url, utils::DateRange, ArticleRecord, PipelineError,
};
use chrono::NaiveDate;
use itertools::Itertools;
use lazy_regex::regex;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

/// Which portal a run scrapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    Antara,
    #[value(name = "idxchannel")]
    IdxChannel,
    Bisnis,
    #[value(name = "jakartapost")]
    JakartaPost,
}

impl SourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Antara => "antara",
            SourceKind::IdxChannel => "idxchannel",
            SourceKind::Bisnis => "bisnis",
            SourceKind::JakartaPost => "jakartapost",
        }
    }

    pub fn build(&self) -> Box<dyn Source> {
        match self {
            SourceKind::Antara => Box::new(AntaraSource),
            SourceKind::IdxChannel => Box::new(IdxChannelSource),
            SourceKind::Bisnis => Box::new(BisnisSource),
            SourceKind::JakartaPost => Box::new(JakartaPostSource),
        }
    }
}

/// One listing page to visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub url: String,
    /// Pages of the same group are consecutive pages of one index.
    pub group: String,
    /// Date every entry of the page was published on, when the index is per day.
    pub date: Option<NaiveDate>,
    pub paginated: bool,
}

/// Entries found on the listing pages plus the pages that failed.
#[derive(Debug, Default)]
pub struct Listing {
    pub entries: Vec<ArticleRecord>,
    pub failures: Vec<(String, PipelineError)>,
}

/// What an article page adds to its listing entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticlePage {
    pub content: String,
    pub author: Option<String>,
    pub published_date: Option<NaiveDate>,
}

/// A news portal: where its listings live and how to read them.
///
/// Parsing is synchronous over the fetched body so it can be tested on
/// fixtures; the provided `fetch_*` methods drive a [`Fetcher`].
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    fn listing_pages(&self, range: &DateRange, max_pages: u32) -> Vec<ListingPage>;

    fn parse_listing(
        &self,
        body: &str,
        page: &ListingPage,
    ) -> Result<Vec<ArticleRecord>, PipelineError>;

    fn parse_article(&self, doc: &Html) -> ArticlePage;

    /// Walks the listing pages in order. A group stops at its first empty
    /// page, at its first failed page, or once a paginated page holds only
    /// entries older than the range.
    async fn fetch_listing(&self, fetcher: &Fetcher, range: &DateRange, max_pages: u32) -> Listing {
        let mut listing = Listing::default();
        let mut exhausted: HashSet<String> = HashSet::new();

        for page in self.listing_pages(range, max_pages) {
            if exhausted.contains(&page.group) {
                continue;
            }

            let entries = match fetcher.get_text(&page.url).await {
                Ok(body) => self.parse_listing(&body, &page),
                Err(e) => Err(e),
            };
            let entries = match entries {
                Ok(entries) => entries,
                Err(e) => {
                    listing.failures.push((page.url.clone(), e));
                    exhausted.insert(page.group);
                    continue;
                }
            };

            debug!("{} entries on {}", entries.len(), page.url);
            if entries.is_empty() || (page.paginated && all_older(&entries, range)) {
                exhausted.insert(page.group.clone());
            }
            listing
                .entries
                .extend(entries.into_iter().filter(|e| range.admits(e.published_date)));
        }

        listing.entries = dedup_entries(listing.entries);
        info!("[{}] {} entries in listing", self.name(), listing.entries.len());
        listing
    }

    async fn fetch_article(&self, fetcher: &Fetcher, url: &str) -> Result<ArticlePage, PipelineError> {
        let body = fetcher.get_text(url).await?;
        let page = {
            let doc = Html::parse_document(&body);
            self.parse_article(&doc)
        };
        Ok(page)
    }
}

fn all_older(entries: &[ArticleRecord], range: &DateRange) -> bool {
    let mut dated = entries.iter().filter_map(|e| e.published_date).peekable();
    dated.peek().is_some() && dated.all(|d| d < range.start)
}

/// Keeps the first entry for every normalized URL.
pub(crate) fn dedup_entries(entries: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    entries
        .into_iter()
        .filter(|e| !e.url.trim().is_empty())
        .unique_by(|e| normalize_url(&e.url))
        .collect()
}

const E: &str = "Invalid selector";
lazy_static! {
    static ref P: Selector = Selector::parse("p").expect(E);
    static ref A: Selector = Selector::parse("a[href]").expect(E);
    static ref TIME: Selector = Selector::parse("time").expect(E);
    static ref ENTRY_TITLE: Vec<Selector> = selectors(&[
        "h1", "h2", "h3", ".title", "[class*='title']", ".headline",
    ]);
    static ref ENTRY_DATE: Vec<Selector> = selectors(&["[class*='date']", "[class*='time']"]);
    static ref ENTRY_SUMMARY: Vec<Selector> =
        selectors(&[".summary", ".excerpt", ".description", "[class*='summary']"]);
    static ref ENTRY_AUTHOR: Vec<Selector> = selectors(&["[class*='author']", "[rel='author']"]);
    static ref PAGE_AUTHOR: Vec<Selector> = selectors(&[
        ".author", "[class*='author']", "[rel='author']", ".byline", "[class*='byline']",
    ]);
    static ref PAGE_DATE: Vec<Selector> =
        selectors(&[".date", "[class*='date']", ".published", "[class*='publish']"]);
    static ref META_PUBLISHED: Selector =
        Selector::parse(r#"meta[property="article:published_time"]"#).expect(E);
    static ref FALLBACK_CONTAINERS: Vec<Selector> =
        selectors(&["main", "[role='main']", "article", "body"]);
}

pub(crate) fn selectors(raw: &[&str]) -> Vec<Selector> {
    raw.iter()
        .map(|s| Selector::parse(s).expect(E))
        .collect()
}

/// Whitespace-collapsed text of an element.
pub(crate) fn text_of(el: ElementRef) -> String {
    el.text().flat_map(str::split_whitespace).join(" ")
}

fn first_text(el: ElementRef, candidates: &[Selector]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|s| el.select(s).next())
        .map(text_of)
        .find(|t| !t.is_empty())
}

/// Non-empty `<p>` texts of `el`, one paragraph per block.
pub(crate) fn paragraphs(el: ElementRef) -> String {
    el.select(&P)
        .map(text_of)
        .filter(|p| !p.is_empty())
        .join("\n\n")
}

/// Body of the first container whose paragraphs hold more than `min_chars`,
/// falling back to the page's main area.
pub(crate) fn extract_body(doc: &Html, containers: &[Selector], min_chars: usize) -> String {
    containers
        .iter()
        .chain(FALLBACK_CONTAINERS.iter())
        .filter_map(|s| doc.select(s).next())
        .map(paragraphs)
        .find(|body| body.chars().count() > min_chars)
        .unwrap_or_else(|| {
            FALLBACK_CONTAINERS
                .iter()
                .filter_map(|s| doc.select(s).next())
                .map(paragraphs)
                .find(|body| !body.is_empty())
                .unwrap_or_default()
        })
}

pub(crate) fn page_author(doc: &Html) -> Option<String> {
    first_text(doc.root_element(), &PAGE_AUTHOR)
}

/// Publication date from `article:published_time`, a `<time datetime>` or a
/// date-looking element.
pub(crate) fn page_date(doc: &Html) -> Option<NaiveDate> {
    doc.select(&META_PUBLISHED)
        .filter_map(|m| m.value().attr("content"))
        .chain(doc.select(&TIME).filter_map(|t| t.value().attr("datetime")))
        .find_map(parse_date)
        .or_else(|| first_text(doc.root_element(), &PAGE_DATE).and_then(|t| parse_date(&t)))
}

/// Absolute form of `href` against `base`, without the fragment.
pub(crate) fn absolute_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Listing entry from a card-like element: link, title, date, summary, author.
pub(crate) fn listing_entry(el: ElementRef, base: &Url) -> Option<ArticleRecord> {
    let link = if el.value().name() == "a" && el.value().attr("href").is_some() {
        el
    } else {
        el.select(&A).next()?
    };
    let url = absolute_url(base, link.value().attr("href")?)?;

    let title = first_text(el, &ENTRY_TITLE).unwrap_or_else(|| text_of(link));
    let date = el
        .select(&TIME)
        .next()
        .and_then(|t| {
            t.value()
                .attr("datetime")
                .and_then(parse_date)
                .or_else(|| parse_date(&text_of(t)))
        })
        .or_else(|| first_text(el, &ENTRY_DATE).and_then(|t| parse_date(&t)));

    let mut entry = ArticleRecord::new(title, url)
        .with_date(date)
        .with_summary(first_text(el, &ENTRY_SUMMARY).unwrap_or_default());
    entry.author = first_text(el, &ENTRY_AUTHOR);
    Some(entry)
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    let month = match name.trim_end_matches('.') {
        "jan" | "january" | "januari" => 1,
        "feb" | "february" | "februari" | "pebruari" => 2,
        "mar" | "march" | "maret" => 3,
        "apr" | "april" => 4,
        "may" | "mei" => 5,
        "jun" | "june" | "juni" => 6,
        "jul" | "july" | "juli" => 7,
        "aug" | "agu" | "agt" | "ags" | "august" | "agustus" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "okt" | "october" | "oktober" => 10,
        "nov" | "november" | "nopember" => 11,
        "dec" | "des" | "december" | "desember" => 12,
        _ => return None,
    };
    Some(month)
}

/// Calendar date from the formats the portals print: ISO timestamps,
/// `17/02/2024`, `17 Februari 2024` (English or Indonesian month, optional
/// weekday prefix) and `February 17, 2024`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Some(c) = regex!(r"(\d{4})-(\d{2})-(\d{2})").captures(raw) {
        return NaiveDate::from_ymd_opt(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?);
    }
    if let Some(c) = regex!(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").captures(raw) {
        return NaiveDate::from_ymd_opt(c[3].parse().ok()?, c[2].parse().ok()?, c[1].parse().ok()?);
    }
    if let Some(c) = regex!(r"\b(\d{1,2})\s+(\p{L}+\.?)\s+(\d{4})\b").captures(raw) {
        if let Some(month) = month_number(&c[2]) {
            return NaiveDate::from_ymd_opt(c[3].parse().ok()?, month, c[1].parse().ok()?);
        }
    }
    if let Some(c) = regex!(r"\b(\p{L}+\.?)\s+(\d{1,2}),?\s+(\d{4})\b").captures(raw) {
        if let Some(month) = month_number(&c[1]) {
            return NaiveDate::from_ymd_opt(c[3].parse().ok()?, month, c[2].parse().ok()?);
        }
    }
    None
}
