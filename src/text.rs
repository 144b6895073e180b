use crate::ArticleRecord;
use lazy_regex::regex;
use std::borrow::Borrow;
use unicode_normalization::UnicodeNormalization;

/// NFKD-normalizes, strips leftover HTML tags and collapses whitespace.
pub fn clean_text(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let text: String = raw.nfkd().collect();
    let text = regex!(r"<[^>]+>").replace_all(text.borrow(), "");
    let text = regex!(r"\s+").replace_all(text.borrow(), " ");
    text.trim().to_string()
}

/// Cleans the text fields a listing or article page fills in.
pub fn clean_article(mut article: ArticleRecord) -> ArticleRecord {
    article.title = clean_text(&article.title);
    article.summary = clean_text(&article.summary);
    article.content = clean_text(&article.content);
    article.author = article
        .author
        .as_deref()
        .map(clean_text)
        .filter(|a| !a.is_empty());
    article
}
