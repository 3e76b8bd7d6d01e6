use scraper::Html;

use super::generic;
use super::rules::{self, DocsRules};

/// Documentation hosts: the site's own selector table first, then the
/// general containers, then the element fallback.
pub fn extract(doc: &Html, rule: Option<&DocsRules>) -> Option<String> {
    if let Some(rule) = rule {
        if let Some(text) = generic::cascade(doc, rule.selectors) {
            return Some(text);
        }
    }
    generic::cascade(doc, rules::GENERIC_SELECTORS).or_else(|| generic::fallback_elements(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::extractor::rules::{SiteClass, classify};

    fn pydata_rule() -> &'static DocsRules {
        match classify("https://pandas.pydata.org/docs/whatsnew/v2.2.0.html") {
            SiteClass::Docs(Some(rule)) => rule,
            _ => panic!("pydata rule missing"),
        }
    }

    #[test]
    fn site_selectors_win_over_general_ones() {
        let html = r#"
        <html><body>
          <div class="bd-content">What's new in 2.2.0</div>
          <div class="content">sidebar junk</div>
        </body></html>
        "#;
        let doc = Html::parse_document(html);
        assert_eq!(extract(&doc, Some(pydata_rule())).unwrap(), "What's new in 2.2.0");
    }

    #[test]
    fn unknown_docs_host_uses_general_selectors() {
        let html = r#"<html><body><div class="content">Release notes</div></body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract(&doc, None).unwrap(), "Release notes");
    }

    #[test]
    fn falls_through_to_elements_when_no_container_matches() {
        let html = r#"<html><body><li>Fixed a bug</li></body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract(&doc, Some(pydata_rule())).unwrap(), "Fixed a bug");
    }
}
