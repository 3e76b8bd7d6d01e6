use scraper::Html;
use url::Url;

use super::fetch::PageClient;
use super::types::{CrawlResult, CrawlStatus, NO_CONTENT};
use crate::telemetry::{self};
use crate::telemetry::ops::crawl::Phase as CrawlPhase;

mod docs;
mod fragment;
mod generic;
mod github;
mod meta;
pub mod rules;

/// Crawl one release-note URL. Never errors: network failure after the
/// retry budget, unmatched selectors, and missing fragments all resolve to
/// a well-formed CrawlResult.
pub async fn crawl_url(client: &PageClient, library: &str, url: &str) -> CrawlResult {
    let log = telemetry::crawl();
    let html = {
        // not entered: an Entered guard held across the await would make
        // spawned crawls non-Send
        let _span = log.span_kv(&CrawlPhase::FetchPage, [("url", url.to_string())]);
        match client.fetch_page(url).await {
            Ok(html) => html,
            Err(err) => return CrawlResult::failed(library, url, format!("Crawl failed: {err}")),
        }
    };

    // bespoke carve-out: release pages resolved through the hosting API
    if let Some((rule, tag)) = rules::api_release(url) {
        match github::release_via_api(client, rule, &tag).await {
            Ok(content) => {
                // parse scopes keep the non-Send document out of the future state
                let (title, release_date) = {
                    let doc = Html::parse_document(&html);
                    (meta::page_title(&doc), meta::release_date(&doc))
                };
                return CrawlResult {
                    library_name: library.to_string(),
                    url: url.to_string(),
                    version: tag,
                    title,
                    release_date,
                    content,
                    crawl_status: CrawlStatus::Success,
                };
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "release API failed; falling back to page extraction");
            }
        }
    }

    let page = {
        let _s = log.span(&CrawlPhase::Extract).entered();
        extract_from_html(&html, url)
    };
    CrawlResult {
        library_name: library.to_string(),
        url: url.to_string(),
        version: page.version,
        title: page.title,
        release_date: page.release_date,
        content: page.content,
        crawl_status: CrawlStatus::Success,
    }
}

struct PageExtract {
    title: String,
    content: String,
    version: String,
    release_date: String,
}

fn extract_from_html(html: &str, url: &str) -> PageExtract {
    let doc = Html::parse_document(html);
    let title = meta::page_title(&doc);

    let mut content = match rules::classify(url) {
        rules::SiteClass::GithubRelease => github::extract(&doc),
        rules::SiteClass::Docs(rule) => docs::extract(&doc, rule),
        rules::SiteClass::Generic => generic::extract(&doc),
    }
    .unwrap_or_else(|| NO_CONTENT.to_string());

    // narrow to the fragment's section; keep whole-page content when the
    // fragment cannot be resolved or its section is empty
    if content != NO_CONTENT {
        if let Some(frag) = fragment_of(url) {
            let log = telemetry::crawl();
            let _s = log.span_kv(&CrawlPhase::Narrow, [("fragment", frag.clone())]).entered();
            if let Some(narrowed) = fragment::narrow(&doc, &frag, rules::fragment_strategies(url)) {
                content = narrowed;
            }
        }
    }

    PageExtract {
        title,
        content,
        version: meta::version_from_url(url),
        release_date: meta::release_date(&doc),
    }
}

fn fragment_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .fragment()
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::types::{UNKNOWN_DATE, UNKNOWN_VERSION};
    use crate::util::retry::RetryPolicy;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RELEASE_PAGE: &str = r#"
    <html>
      <head><title>scrapy 2.11.0 release notes</title></head>
      <body>
        <div class="content">
          <h2 id="section-2-11-0">2.11.0</h2>
          <p>Spiders can now modify settings.</p>
          <h2 id="section-2-10-0">2.10.0</h2>
          <p>older notes</p>
        </div>
        <time datetime="2023-09-18">Sep 18</time>
      </body>
    </html>
    "#;

    fn fast_client() -> PageClient {
        PageClient::new(RetryPolicy {
            max_retries: 2,
            courtesy_delay_secs: (0.0, 0.0),
            backoff_delay_secs: (0.0, 0.0),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn whole_page_extraction() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RELEASE_PAGE))
            .mount(&server)
            .await;

        let url = format!("{}/news.html", server.uri());
        let result = crawl_url(&fast_client(), "scrapy", &url).await;

        assert_eq!(result.crawl_status, CrawlStatus::Success);
        assert_eq!(result.library_name, "scrapy");
        assert_eq!(result.title, "scrapy 2.11.0 release notes");
        assert_eq!(result.release_date, "2023-09-18");
        assert_eq!(result.version, UNKNOWN_VERSION);
        assert!(result.content.contains("Spiders can now modify settings."));
        assert!(result.content.contains("older notes"));
    }

    #[tokio::test]
    async fn fragment_narrows_to_one_section() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RELEASE_PAGE))
            .mount(&server)
            .await;

        let whole_url = format!("{}/news.html", server.uri());
        let whole = crawl_url(&fast_client(), "scrapy", &whole_url).await;

        let narrowed_url = format!("{}/news.html#section-2-11-0", server.uri());
        let narrowed = crawl_url(&fast_client(), "scrapy", &narrowed_url).await;

        assert_eq!(narrowed.crawl_status, CrawlStatus::Success);
        assert!(narrowed.content.contains("Spiders can now modify settings."));
        assert!(!narrowed.content.contains("older notes"));
        // narrowed content is a subset of the whole-page content
        for line in narrowed.content.lines() {
            assert!(whole.content.contains(line));
        }
    }

    #[tokio::test]
    async fn missing_fragment_keeps_whole_page_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RELEASE_PAGE))
            .mount(&server)
            .await;

        let url = format!("{}/news.html#no-such-section", server.uri());
        let result = crawl_url(&fast_client(), "scrapy", &url).await;
        assert!(result.content.contains("older notes"));
    }

    #[tokio::test]
    async fn unreachable_page_fails_soft() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let url = format!("{}/gone", server.uri());
        let result = crawl_url(&fast_client(), "lib", &url).await;

        assert_eq!(result.crawl_status, CrawlStatus::Failed);
        assert!(result.content.starts_with("Crawl failed:"));
        assert_eq!(result.version, UNKNOWN_VERSION);
        assert_eq!(result.release_date, UNKNOWN_DATE);
    }

    #[tokio::test]
    async fn content_free_page_yields_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
            .mount(&server)
            .await;

        let url = format!("{}/empty", server.uri());
        let result = crawl_url(&fast_client(), "lib", &url).await;
        assert_eq!(result.crawl_status, CrawlStatus::Success);
        assert_eq!(result.content, NO_CONTENT);
    }

    #[test]
    fn extraction_is_idempotent() {
        let url = "https://example.com/releases/2.31.0/notes";
        let a = extract_from_html(RELEASE_PAGE, url);
        let b = extract_from_html(RELEASE_PAGE, url);
        assert_eq!(a.title, b.title);
        assert_eq!(a.version, b.version);
        assert_eq!(a.release_date, b.release_date);
        assert_eq!(a.content, b.content);
    }

    #[test]
    fn github_release_page_uses_release_selectors() {
        let html = r#"
        <html><head><title>Release v2.3.0</title></head><body>
          <div class="markdown-body">flask release body</div>
          <relative-time datetime="2023-04-25T12:00:00Z">Apr 25</relative-time>
        </body></html>
        "#;
        let page = extract_from_html(html, "https://github.com/pallets/flask/releases/tag/v2.3.0");
        assert_eq!(page.content, "flask release body");
        assert_eq!(page.version, "v2.3.0");
        assert_eq!(page.release_date, "2023-04-25T12:00:00Z");
    }
}
