use super::{
    absolute_url, extract_body, page_date, selectors, text_of, ArticlePage, ListingPage, Source,
};
use crate::{utils::DateRange, ArticleRecord, PipelineError};
use chrono::NaiveDate;
use lazy_regex::regex;
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use url::Url;

const BASE_URL: &str = "https://www.bisnis.com";
const INDEX_URL: &str = "https://www.bisnis.com/index?categoryId=43";

const E: &str = "Invalid selector";
lazy_static! {
    static ref BASE: Url = Url::parse(BASE_URL).expect("Invalid base url");
    static ref ITEM: Selector = Selector::parse("div.artItem").expect(E);
    static ref ITEM_LINK: Selector = Selector::parse("a.artLink").expect(E);
    static ref ANY_LINK: Selector = Selector::parse("a[href]").expect(E);
    static ref ITEM_TITLE: Selector = Selector::parse("h4.artTitle").expect(E);
    static ref AUTHOR: Selector = Selector::parse(r#"meta[name="author"]"#).expect(E);
    static ref BODY: Vec<Selector> =
        selectors(&["div.description", "div.detail__content", "article"]);
}

/// Bisnis.com, through its paginated index of the latest articles.
#[derive(Debug, Clone, Copy, Default)]
pub struct BisnisSource;

/// Publication date encoded as `/read/YYYYMMDD/<category>/<id>` in article URLs.
pub(crate) fn date_from_url(url: &str) -> Option<NaiveDate> {
    let c = regex!(r"/read/(\d{8})/\d+/\d+").captures(url)?;
    NaiveDate::parse_from_str(&c[1], "%Y%m%d").ok()
}

impl Source for BisnisSource {
    fn name(&self) -> &str {
        "bisnis"
    }

    fn listing_pages(&self, _range: &DateRange, max_pages: u32) -> Vec<ListingPage> {
        (1..=max_pages.max(1))
            .map(|n| ListingPage {
                url: format!("{}&page={}", INDEX_URL, n),
                group: "index".to_string(),
                date: None,
                paginated: true,
            })
            .collect()
    }

    /// Only links to `/read/YYYYMMDD/...` articles are entries.
    fn parse_listing(
        &self,
        body: &str,
        _page: &ListingPage,
    ) -> Result<Vec<ArticleRecord>, PipelineError> {
        let doc = Html::parse_document(body);
        let mut entries = vec![];
        for item in doc.select(&ITEM) {
            let link = match item
                .select(&ITEM_LINK)
                .next()
                .or_else(|| item.select(&ANY_LINK).next())
            {
                Some(link) => link,
                None => continue,
            };
            let url = match link
                .value()
                .attr("href")
                .and_then(|href| absolute_url(&BASE, href))
            {
                Some(url) => url,
                None => continue,
            };
            let published_date = match date_from_url(&url) {
                Some(date) => date,
                None => continue,
            };
            let title = item
                .select(&ITEM_TITLE)
                .next()
                .map(text_of)
                .unwrap_or_else(|| text_of(link));

            entries.push(ArticleRecord::new(title, url).with_date(Some(published_date)));
        }
        Ok(entries)
    }

    fn parse_article(&self, doc: &Html) -> ArticlePage {
        let author = doc
            .select(&AUTHOR)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(ToString::to_string);

        ArticlePage {
            content: extract_body(doc, &BODY, 0),
            author,
            published_date: page_date(doc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn date_in_url() {
        assert_eq!(
            date_from_url("https://market.bisnis.com/read/20240217/7/1742301/ihsg-ditutup-melemah"),
            NaiveDate::from_ymd_opt(2024, 2, 17)
        );
        assert_eq!(date_from_url("https://www.bisnis.com/topic/123/saham"), None);
        assert_eq!(date_from_url("https://bisnis.com/read/20241340/1/2"), None);
    }

    #[test]
    fn paginated_index() {
        let range = DateRange::last_days(3, NaiveDate::from_ymd_opt(2024, 2, 17).unwrap());
        let pages = BisnisSource.listing_pages(&range, 2);
        assert_eq!(pages.len(), 2);
        assert_eq!(
            pages[1].url,
            "https://www.bisnis.com/index?categoryId=43&page=2"
        );
        assert!(pages.iter().all(|p| p.paginated && p.group == "index"));
    }

    #[test]
    fn listing_keeps_dated_articles_only() {
        let html = r#"<html><body>
            <div class="artItem">
                <a class="artLink" href="https://market.bisnis.com/read/20240217/7/1742301/ihsg-ditutup-melemah">
                    <h4 class="artTitle">IHSG Ditutup Melemah</h4>
                </a>
            </div>
            <div class="artItem">
                <a href="/read/20240216/9/1742000/rupiah-tertekan">Rupiah Tertekan</a>
            </div>
            <div class="artItem">
                <a class="artLink" href="https://www.bisnis.com/topic/123/saham"><h4 class="artTitle">Topik</h4></a>
            </div>
            <div class="artItem"><span>Iklan</span></div>
        </body></html>"#;
        let today = NaiveDate::from_ymd_opt(2024, 2, 17).unwrap();
        let page = BisnisSource
            .listing_pages(&DateRange::last_days(1, today), 1)
            .remove(0);

        let entries = BisnisSource.parse_listing(html, &page).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "IHSG Ditutup Melemah");
        assert_eq!(entries[0].published_date, NaiveDate::from_ymd_opt(2024, 2, 17));
        assert_eq!(
            entries[1].url,
            "https://www.bisnis.com/read/20240216/9/1742000/rupiah-tertekan"
        );
        assert_eq!(entries[1].title, "Rupiah Tertekan");
    }

    #[test]
    fn article_page_reads_meta_author() {
        let html = Html::parse_document(
            r#"<html><head>
                <meta name="author" content="Dwi Nicken Tari">
                <meta property="article:published_time" content="2024-02-17T15:30:00+07:00">
            </head><body>
                <div class="detail__content">
                    <p>Bisnis.com, JAKARTA - Indeks Harga Saham Gabungan ditutup melemah.</p>
                    <p>Sebanyak 300 saham turun.</p>
                </div>
            </body></html>"#,
        );
        let page = BisnisSource.parse_article(&html);
        assert_eq!(page.author.as_deref(), Some("Dwi Nicken Tari"));
        assert_eq!(page.published_date, NaiveDate::from_ymd_opt(2024, 2, 17));
        assert!(page.content.ends_with("Sebanyak 300 saham turun."));
    }
}
