use scraper::{Html, Selector};
use url::Url;

use super::generic;
use crate::crawl::types::{NO_TITLE, UNKNOWN_DATE, UNKNOWN_VERSION};

pub fn page_title(doc: &Html) -> String {
    Selector::parse("title")
        .ok()
        .and_then(|sel| doc.select(&sel).next())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string())
}

/// Opportunistic version parse from URL path segments: `/vX.Y.Z/`,
/// `/version/X.Y.Z/`, or a numeric segment of a releases URL.
pub fn version_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return UNKNOWN_VERSION.to_string();
    };
    let segments: Vec<String> = parsed
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).map(String::from).collect())
        .unwrap_or_default();

    // /vX.Y.Z/ style segment
    if let Some(seg) = segments
        .iter()
        .find(|s| s.starts_with('v') && s.chars().any(|c| c.is_ascii_digit()))
    {
        return seg.clone();
    }

    // /version/X.Y.Z/ style
    if let Some(pos) = segments.iter().position(|s| s == "version") {
        if let Some(next) = segments.get(pos + 1) {
            if next.chars().any(|c| c.is_ascii_digit()) {
                return next.clone();
            }
        }
    }

    // numeric segment after a releases marker
    if let Some(pos) = segments.iter().position(|s| s == "releases") {
        if let Some(seg) = segments[pos + 1..]
            .iter()
            .find(|s| s.chars().any(|c| c.is_ascii_digit()))
        {
            return seg.clone();
        }
    }

    UNKNOWN_VERSION.to_string()
}

/// Release date from a date-bearing element: the host's relative-time
/// element first, then any time element's datetime attribute or text.
pub fn release_date(doc: &Html) -> String {
    if let Ok(sel) = Selector::parse("relative-time") {
        if let Some(el) = doc.select(&sel).next() {
            if let Some(dt) = el.value().attr("datetime") {
                return dt.to_string();
            }
        }
    }
    if let Ok(sel) = Selector::parse("time") {
        for el in doc.select(&sel) {
            if let Some(dt) = el.value().attr("datetime") {
                return dt.to_string();
            }
            let text = generic::joined_text(el);
            if !text.is_empty() {
                return text;
            }
        }
    }
    UNKNOWN_DATE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_text_is_trimmed() {
        let doc = Html::parse_document("<html><head><title>  Flask 2.3.0 released </title></head></html>");
        assert_eq!(page_title(&doc), "Flask 2.3.0 released");
    }

    #[test]
    fn missing_title_yields_sentinel() {
        let doc = Html::parse_document("<html><body><p>x</p></body></html>");
        assert_eq!(page_title(&doc), NO_TITLE);
    }

    #[test]
    fn version_from_v_segment() {
        assert_eq!(
            version_from_url("https://github.com/pallets/flask/releases/tag/v2.3.0"),
            "v2.3.0"
        );
        assert_eq!(
            version_from_url("https://pandas.pydata.org/docs/whatsnew/v2.2.0.html"),
            "v2.2.0.html"
        );
    }

    #[test]
    fn version_from_version_segment() {
        assert_eq!(version_from_url("https://example.com/docs/version/2.2.0/notes"), "2.2.0");
    }

    #[test]
    fn version_from_releases_segment() {
        assert_eq!(
            version_from_url("https://github.com/psf/requests/releases/tag/2.31.0"),
            "2.31.0"
        );
    }

    #[test]
    fn version_defaults_to_sentinel() {
        assert_eq!(version_from_url("https://example.com/changelog"), UNKNOWN_VERSION);
        assert_eq!(version_from_url("not a url"), UNKNOWN_VERSION);
    }

    #[test]
    fn relative_time_datetime_wins() {
        let html = r#"
        <html><body>
          <relative-time datetime="2024-03-01T10:00:00Z">Mar 1</relative-time>
          <time datetime="2020-01-01">old</time>
        </body></html>
        "#;
        let doc = Html::parse_document(html);
        assert_eq!(release_date(&doc), "2024-03-01T10:00:00Z");
    }

    #[test]
    fn time_element_fallbacks() {
        let doc = Html::parse_document(r#"<html><body><time datetime="2023-09-18">Sep 18</time></body></html>"#);
        assert_eq!(release_date(&doc), "2023-09-18");

        let doc = Html::parse_document("<html><body><time>September 18, 2023</time></body></html>");
        assert_eq!(release_date(&doc), "September 18, 2023");
    }

    #[test]
    fn missing_date_yields_sentinel() {
        let doc = Html::parse_document("<html><body><p>no dates</p></body></html>");
        assert_eq!(release_date(&doc), UNKNOWN_DATE);
    }
}
