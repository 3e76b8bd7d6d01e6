use scraper::{ElementRef, Html, Selector};

use super::rules;

/// Generic fallback for sites with no configured rule.
pub fn extract(doc: &Html) -> Option<String> {
    cascade(doc, rules::GENERIC_SELECTORS).or_else(|| fallback_elements(doc))
}

/// Try each selector in order; the first non-empty extracted text wins.
pub(super) fn cascade(doc: &Html, selectors: &[&str]) -> Option<String> {
    for sel in selectors {
        if let Some(text) = select_text(doc, sel) {
            return Some(text);
        }
    }
    None
}

pub(super) fn select_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let node = doc.select(&sel).next()?;
    let text = joined_text(node);
    if text.trim().is_empty() { None } else { Some(text) }
}

/// Last resort: text of every paragraph/heading/list/code element.
pub(super) fn fallback_elements(doc: &Html) -> Option<String> {
    let sel = Selector::parse("p, h1, h2, h3, h4, h5, h6, li, code, pre").ok()?;
    let mut out: Vec<String> = Vec::new();
    for el in doc.select(&sel) {
        let t = joined_text(el);
        if !t.is_empty() { out.push(t); }
    }
    let joined = out.join("\n");
    if joined.trim().is_empty() { None } else { Some(joined) }
}

/// Trimmed descendant text joined with newlines.
pub(super) fn joined_text(el: ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_configured_containers() {
        let html = r#"
        <html><body>
          <div class="content">Release 1.0 highlights</div>
          <p>footer text</p>
        </body></html>
        "#;
        let doc = Html::parse_document(html);
        assert_eq!(extract(&doc).unwrap(), "Release 1.0 highlights");
    }

    #[test]
    fn skips_empty_containers() {
        let html = r#"
        <html><body>
          <div class="content">   </div>
          <div class="main-content">Actual notes</div>
        </body></html>
        "#;
        let doc = Html::parse_document(html);
        assert_eq!(extract(&doc).unwrap(), "Actual notes");
    }

    #[test]
    fn falls_back_to_text_elements() {
        let html = r#"
        <html><body>
          <h2>2.0.0</h2>
          <p>Added a thing.</p>
          <table><tr><td>ignored container</td></tr></table>
        </body></html>
        "#;
        let doc = Html::parse_document(html);
        let text = extract(&doc).unwrap();
        assert!(text.contains("2.0.0"));
        assert!(text.contains("Added a thing."));
    }

    #[test]
    fn none_when_page_has_no_text() {
        let doc = Html::parse_document("<html><body><img src='x.png'></body></html>");
        assert!(extract(&doc).is_none());
    }
}
