use super::{extract_body, page_author, page_date, parse_date, selectors, ArticlePage, ListingPage, Source};
use crate::{utils::DateRange, ArticleRecord, PipelineError};
use chrono::{DateTime, NaiveDate};
use lazy_regex::regex;
use lazy_static::lazy_static;
use quick_xml::{events::Event, Reader};
use scraper::{Html, Selector};

const FEED_URL: &str = "https://en.antaranews.com/rss/news";

lazy_static! {
    static ref BODY: Vec<Selector> = selectors(&[
        "article",
        ".post-content",
        ".entry-content",
        ".article-content",
        ".content",
        r#"[itemprop="articleBody"]"#,
        ".post",
        ".news-content",
    ]);
}

/// Antara English service, read from its RSS feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AntaraSource;

#[derive(Default)]
struct FeedItem {
    title: String,
    link: String,
    pub_date: String,
    description: String,
}

impl FeedItem {
    fn set(&mut self, tag: &[u8], text: String) {
        match tag {
            b"title" => self.title = text,
            b"link" => self.link = text,
            b"pubDate" => self.pub_date = text,
            b"description" => self.description = text,
            _ => {}
        }
    }

    fn into_record(self) -> Option<ArticleRecord> {
        if self.link.trim().is_empty() {
            return None;
        }
        Some(
            ArticleRecord::new(self.title, self.link.trim())
                .with_date(feed_date(&self.pub_date))
                .with_summary(self.description),
        )
    }
}

fn feed_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc2822(raw.trim())
        .map(|d| d.naive_local().date())
        .ok()
        .or_else(|| parse_date(raw))
}

/// `<item>` entries of an RSS document.
pub(crate) fn parse_feed(xml: &str) -> Result<Vec<ArticleRecord>, PipelineError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut records = vec![];
    let mut item: Option<FeedItem> = None;
    let mut tag: Vec<u8> = vec![];

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.name().as_ref() == b"item" {
                    item = Some(FeedItem::default());
                } else {
                    tag = e.name().as_ref().to_vec();
                }
            }
            Event::Text(e) => {
                if let Some(item) = item.as_mut() {
                    item.set(&tag, e.unescape()?.into_owned());
                }
            }
            Event::CData(e) => {
                if let Some(item) = item.as_mut() {
                    item.set(&tag, String::from_utf8_lossy(&e).into_owned());
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"item" {
                    if let Some(record) = item.take().and_then(FeedItem::into_record) {
                        records.push(record);
                    }
                }
                tag.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

/// Drops the `ANTARA - ` / `Jakarta (ANTARA) - ` dateline.
fn strip_dateline(body: &str) -> String {
    regex!(r"^\s*(?:[\p{L} .]*\(ANTARA\)|ANTARA)\s*-\s*")
        .replace(body, "")
        .into_owned()
}

impl Source for AntaraSource {
    fn name(&self) -> &str {
        "antara"
    }

    fn listing_pages(&self, _range: &DateRange, _max_pages: u32) -> Vec<ListingPage> {
        vec![ListingPage {
            url: FEED_URL.to_string(),
            group: "rss".to_string(),
            date: None,
            paginated: false,
        }]
    }

    fn parse_listing(
        &self,
        body: &str,
        _page: &ListingPage,
    ) -> Result<Vec<ArticleRecord>, PipelineError> {
        parse_feed(body)
    }

    fn parse_article(&self, doc: &Html) -> ArticlePage {
        ArticlePage {
            content: strip_dateline(&extract_body(doc, &BODY, 100)),
            author: page_author(doc),
            published_date: page_date(doc),
        }
    }
}
