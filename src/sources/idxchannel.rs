use super::{
    extract_body, listing_entry, page_author, page_date, selectors, ArticlePage,
    ListingPage, Source,
};
use crate::{utils::DateRange, ArticleRecord, PipelineError};
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use url::Url;

const BASE_URL: &str = "https://www.idxchannel.com";
const INDEX_URL: &str = "https://www.idxchannel.com/indeks";

const E: &str = "Invalid selector";
lazy_static! {
    static ref ENTRIES: Vec<Selector> = selectors(&[
        ".list-berita article",
        ".news-list article",
        ".article-list .item",
        ".list-news .item",
        ".bt-con",
        "article",
    ]);
    static ref BASE: Url = Url::parse(BASE_URL).expect("Invalid base url");
    static ref LINKS: Selector = Selector::parse("a[href]").expect(E);
    static ref BODY: Vec<Selector> = selectors(&[
        "article .content",
        ".article-content",
        ".post-content",
        ".entry-content",
        "[class*='article-body']",
        "[class*='content-body']",
        ".detail-text",
        ".read-content",
    ]);
}

/// IDX Channel, through its per-day article index.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdxChannelSource;

fn is_article_link(href: &str) -> bool {
    ["/read/", "/news/", "/article/"]
        .iter()
        .any(|p| href.contains(p))
}

impl Source for IdxChannelSource {
    fn name(&self) -> &str {
        "idxchannel"
    }

    fn listing_pages(&self, range: &DateRange, _max_pages: u32) -> Vec<ListingPage> {
        range
            .days()
            .map(|day| ListingPage {
                url: format!("{}?date={}&idkanal=", INDEX_URL, day.format("%d/%m/%Y")),
                group: day.to_string(),
                date: Some(day),
                paginated: false,
            })
            .collect()
    }

    /// Every entry takes the date of the index page it is listed on.
    fn parse_listing(
        &self,
        body: &str,
        page: &ListingPage,
    ) -> Result<Vec<ArticleRecord>, PipelineError> {
        let doc = Html::parse_document(body);

        let mut entries: Vec<ArticleRecord> = ENTRIES
            .iter()
            .map(|s| {
                doc.select(s)
                    .filter_map(|el| listing_entry(el, &BASE))
                    .collect::<Vec<_>>()
            })
            .find(|found| !found.is_empty())
            .unwrap_or_else(|| {
                doc.select(&LINKS)
                    .filter(|a| a.value().attr("href").map_or(false, is_article_link))
                    .filter_map(|a| listing_entry(a, &BASE))
                    .collect()
            });

        entries.retain(|e| !e.title.is_empty());
        for entry in &mut entries {
            entry.published_date = page.date;
        }
        Ok(entries)
    }

    fn parse_article(&self, doc: &Html) -> ArticlePage {
        ArticlePage {
            content: extract_body(doc, &BODY, 0),
            author: page_author(doc),
            published_date: page_date(doc),
        }
    }
}
