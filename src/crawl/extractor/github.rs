use scraper::Html;

use super::generic;
use super::rules::{self, ApiReleaseRule};
use crate::crawl::fetch::{FetchError, PageClient};

/// Release pages on the source-control host.
pub fn extract(doc: &Html) -> Option<String> {
    generic::cascade(doc, rules::GITHUB_RELEASE_SELECTORS)
        .or_else(|| generic::fallback_elements(doc))
}

/// Bespoke path: fetch the release object from the hosting REST API and
/// render it as release-note text. Returns the content and the published
/// timestamp.
pub async fn release_via_api(
    client: &PageClient,
    rule: &ApiReleaseRule,
    tag: &str,
) -> Result<String, FetchError> {
    let release = client.fetch_release_api(rule.repo, tag).await?;
    let mut content = format!(
        "Release Notes for {}:\nPublished: {}\nTag Name: {}\n",
        tag, release.published_at, release.tag_name
    );
    if let Some(body) = release.body.as_deref().filter(|b| !b.trim().is_empty()) {
        content.push('\n');
        content.push_str(body);
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_body_wins() {
        let html = r#"
        <html><body>
          <div class="Box-body">outer box</div>
          <div class="markdown-body">## Changes
            <ul><li>Faster parser</li></ul>
          </div>
        </body></html>
        "#;
        let doc = Html::parse_document(html);
        let text = extract(&doc).unwrap();
        assert!(text.contains("## Changes"));
        assert!(text.contains("Faster parser"));
    }

    #[test]
    fn box_body_used_when_markdown_body_is_empty() {
        let html = r#"
        <html><body>
          <div class="markdown-body">  </div>
          <div class="Box-body">fallback release text</div>
        </body></html>
        "#;
        let doc = Html::parse_document(html);
        assert_eq!(extract(&doc).unwrap(), "fallback release text");
    }

    #[test]
    fn element_fallback_when_no_release_container() {
        let html = r#"<html><body><p>Tagged v1.2.3</p></body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract(&doc).unwrap(), "Tagged v1.2.3");
    }
}
