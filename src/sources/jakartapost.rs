use super::{
    extract_body, listing_entry, page_author, page_date, selectors, ArticlePage, ListingPage,
    Source,
};
use crate::{utils::DateRange, ArticleRecord, PipelineError};
use chrono::NaiveDate;
use lazy_regex::regex;
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use url::Url;

const BASE_URL: &str = "https://www.thejakartapost.com";

const CATEGORIES: [(&str, &str); 4] = [
    ("company", "https://www.thejakartapost.com/business/companies/latest"),
    ("market", "https://www.thejakartapost.com/index.php/business/markets"),
    ("regulation", "https://www.thejakartapost.com/index.php/business/regulations"),
    ("economy", "https://www.thejakartapost.com/index.php/business/economy"),
];

const E: &str = "Invalid selector";
lazy_static! {
    static ref BASE: Url = Url::parse(BASE_URL).expect("Invalid base url");
    static ref ENTRIES: Vec<Selector> = selectors(&[
        ".article-list article",
        ".news-list article",
        ".post-list article",
        ".latest-news article",
        ".content article",
        "article.post",
        "article.news",
        ".category article",
    ]);
    static ref LINKS: Selector = Selector::parse("a[href]").expect(E);
    static ref BODY: Vec<Selector> = selectors(&[
        ".article-content",
        ".post-content",
        ".entry-content",
        ".content-body",
        "article .content",
        ".article-body",
        ".detail-text",
    ]);
}

/// The Jakarta Post business desk, one paginated listing per category.
#[derive(Debug, Clone, Copy, Default)]
pub struct JakartaPostSource;

/// Article pages carry their publication date as `/YYYY/MM/DD/` in the path.
pub(crate) fn date_from_url(url: &str) -> Option<NaiveDate> {
    let c = regex!(r"/(\d{4})/(\d{2})/(\d{2})/").captures(url)?;
    NaiveDate::from_ymd_opt(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)
}

/// Bare `thejakartapost.com` links point at the same articles as `www.`.
fn canonical_host(mut entry: ArticleRecord) -> ArticleRecord {
    if let Some(rest) = entry.url.strip_prefix("https://thejakartapost.com") {
        entry.url = format!("{}{}", BASE_URL, rest);
    }
    entry
}

fn page_url(first: &str, n: u32) -> String {
    if n <= 1 {
        return first.to_string();
    }
    match Url::parse(first) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("page", &n.to_string());
            url.to_string()
        }
        Err(_) => format!("{}?page={}", first, n),
    }
}

impl Source for JakartaPostSource {
    fn name(&self) -> &str {
        "jakartapost"
    }

    fn listing_pages(&self, _range: &DateRange, max_pages: u32) -> Vec<ListingPage> {
        CATEGORIES
            .iter()
            .flat_map(|(category, first)| {
                (1..=max_pages.max(1)).map(move |n| ListingPage {
                    url: page_url(first, n),
                    group: category.to_string(),
                    date: None,
                    paginated: true,
                })
            })
            .collect()
    }

    fn parse_listing(
        &self,
        body: &str,
        page: &ListingPage,
    ) -> Result<Vec<ArticleRecord>, PipelineError> {
        let doc = Html::parse_document(body);

        let found = ENTRIES
            .iter()
            .map(|s| {
                doc.select(s)
                    .filter_map(|el| listing_entry(el, &BASE))
                    .collect::<Vec<_>>()
            })
            .find(|found| !found.is_empty())
            .unwrap_or_else(|| {
                doc.select(&LINKS)
                    .filter(|a| a.value().attr("href").map_or(false, |h| h.contains("/business/")))
                    .filter_map(|a| listing_entry(a, &BASE))
                    .collect()
            });

        Ok(found
            .into_iter()
            .map(canonical_host)
            .filter_map(|mut entry| {
                let url_date = date_from_url(&entry.url)?;
                entry.published_date = entry.published_date.or(Some(url_date));
                entry
                    .extra
                    .insert("category".to_string(), page.group.clone().into());
                Some(entry)
            })
            .filter(|entry| !entry.title.is_empty())
            .collect())
    }

    fn parse_article(&self, doc: &Html) -> ArticlePage {
        ArticlePage {
            content: extract_body(doc, &BODY, 0),
            author: page_author(doc),
            published_date: page_date(doc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Invalid date")
    }

    fn page(group: &str) -> ListingPage {
        ListingPage {
            url: String::new(),
            group: group.to_string(),
            date: None,
            paginated: true,
        }
    }

    #[test]
    fn pages_per_category() {
        let range = DateRange::last_days(2, date("2024-02-17"));
        let pages = JakartaPostSource.listing_pages(&range, 3);
        assert_eq!(pages.len(), 12);
        assert_eq!(
            pages[0].url,
            "https://www.thejakartapost.com/business/companies/latest"
        );
        assert_eq!(
            pages[1].url,
            "https://www.thejakartapost.com/business/companies/latest?page=2"
        );
        assert_eq!(pages[3].group, "market");
    }

    #[test]
    fn listing_keeps_dated_article_urls() {
        let html = r#"<html><body><div class="latest-news">
            <article>
                <a href="/business/2024/02/17/garuda-posts-wider-loss.html">
                    <h2 class="title">Garuda posts wider loss</h2>
                </a>
                <span class="date">February 16, 2024</span>
            </article>
            <article>
                <a href="https://thejakartapost.com/business/2024/02/15/tin-exports-slump.html">Tin exports slump</a>
            </article>
            <article>
                <a href="/business/companies">Companies</a>
            </article>
        </div></body></html>"#;

        let entries = JakartaPostSource
            .parse_listing(html, &page("company"))
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].url,
            "https://www.thejakartapost.com/business/2024/02/17/garuda-posts-wider-loss.html"
        );
        assert_eq!(entries[0].title, "Garuda posts wider loss");
        assert_eq!(entries[0].published_date, Some(date("2024-02-16")));
        assert_eq!(entries[0].extra["category"], "company");
        assert_eq!(
            entries[1].url,
            "https://www.thejakartapost.com/business/2024/02/15/tin-exports-slump.html"
        );
        assert_eq!(entries[1].published_date, Some(date("2024-02-15")));
    }

    #[test]
    fn article_page() {
        let html = Html::parse_document(
            r#"<html><body>
                <div class="byline">Divya Karyza</div>
                <div class="detail-text">
                    <p>State-owned flag carrier Garuda Indonesia booked a wider net loss.</p>
                    <p>The airline blamed rising fuel costs.</p>
                </div>
                <span class="date">Sat, February 17, 2024</span>
            </body></html>"#,
        );
        let page = JakartaPostSource.parse_article(&html);
        assert!(page.content.starts_with("State-owned flag carrier"));
        assert_eq!(page.author.as_deref(), Some("Divya Karyza"));
        assert_eq!(page.published_date, Some(date("2024-02-17")));
    }
}
