use url::Url;

const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "dclid", "msclkid", "yclid", "igshid", "mc_cid", "mc_eid", "_ga",
    "_gl", "ref", "ref_src", "cmpid", "spm",
];

fn is_tracking_param(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.starts_with("utm_") || TRACKING_PARAMS.contains(&name.as_str())
}

/// Canonical form of an article URL, used as the deduplication key.
///
/// Scheme becomes `https`, scheme and host are lowercased, default ports,
/// fragments, tracking parameters and trailing slashes are dropped. Strings
/// that do not parse as absolute URLs are only trimmed.
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    let mut url = match Url::parse(raw) {
        Ok(url) if url.has_host() => url,
        _ => return raw.trim_end_matches('/').to_string(),
    };

    if url.scheme() == "http" {
        // Both are special schemes, so this cannot fail.
        let _ = url.set_scheme("https");
    }
    if url.port() == Some(443) && url.scheme() == "https" {
        let _ = url.set_port(None);
    }
    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);

    let mut normalized = url.to_string();
    // The root path always serializes as "/".
    if url.path() == "/" && url.query().is_none() {
        normalized.pop();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_variants_share_a_key() {
        let key = normalize_url("https://www.thejakartapost.com/business/2024/02/17/rupiah-falls.html");
        for variant in [
            "http://www.thejakartapost.com/business/2024/02/17/rupiah-falls.html",
            "HTTPS://WWW.TheJakartaPost.com/business/2024/02/17/rupiah-falls.html",
            "https://www.thejakartapost.com/business/2024/02/17/rupiah-falls.html/",
            "https://www.thejakartapost.com:443/business/2024/02/17/rupiah-falls.html",
            "http://www.thejakartapost.com:80/business/2024/02/17/rupiah-falls.html",
            "https://www.thejakartapost.com/business/2024/02/17/rupiah-falls.html?utm_source=(direct)&utm_medium=channel_companies",
            "https://www.thejakartapost.com/business/2024/02/17/rupiah-falls.html?fbclid=abc#comments",
            "  https://www.thejakartapost.com/business/2024/02/17/rupiah-falls.html  ",
        ] {
            assert_eq!(normalize_url(variant), key, "{}", variant);
        }
        assert_eq!(
            key,
            "https://www.thejakartapost.com/business/2024/02/17/rupiah-falls.html"
        );
    }

    #[test]
    fn meaningful_query_is_kept() {
        assert_eq!(
            normalize_url("https://www.idxchannel.com/indeks?date=17/02/2024&utm_campaign=x&idkanal="),
            "https://www.idxchannel.com/indeks?date=17%2F02%2F2024&idkanal="
        );
    }

    #[test]
    fn path_case_is_preserved() {
        assert_eq!(
            normalize_url("https://Example.com/News/Article-One/"),
            "https://example.com/News/Article-One"
        );
    }

    #[test]
    fn root_and_non_default_port() {
        assert_eq!(normalize_url("http://example.com/"), "https://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
        assert_eq!(
            normalize_url("https://example.com:8443/a/"),
            "https://example.com:8443/a"
        );
    }

    #[test]
    fn idempotent() {
        let once = normalize_url("http://Example.com/a/b/?utm_term=x&id=3#top");
        assert_eq!(normalize_url(&once), once);
        assert_eq!(once, "https://example.com/a/b?id=3");
    }

    #[test]
    fn unparseable_is_trimmed() {
        assert_eq!(normalize_url(" /relative/path/ "), "/relative/path");
        assert_eq!(normalize_url(""), "");
    }
}
