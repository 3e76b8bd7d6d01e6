use regex::Regex;
use std::sync::OnceLock;

/// How to locate the element addressed by a URL fragment, tried in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FragmentMatch {
    /// exact element id match
    Id,
    /// section whose id, with '-' folded to '.', contains the folded fragment
    SectionDotted,
    /// h2 whose text contains the fragment (case-insensitive)
    HeadingText,
    /// h2 whose text contains the '-'-to-'.' folded fragment
    HeadingDotted,
}

const DEFAULT_FRAGMENT: &[FragmentMatch] = &[FragmentMatch::Id];

/// Per-documentation-site rule: ordered candidate selectors plus the
/// fragment-matching strategies the site needs.
pub struct DocsRules {
    pub domain: &'static str,
    pub selectors: &'static [&'static str],
    pub fragment: &'static [FragmentMatch],
}

/// Which extraction path a URL takes.
pub enum SiteClass {
    GithubRelease,
    Docs(Option<&'static DocsRules>),
    Generic,
}

/// Bespoke carve-out: releases resolved through the hosting REST API
/// instead of HTML scraping.
pub struct ApiReleaseRule {
    pub marker: &'static str,
    pub repo: &'static str,
}

pub const GITHUB_RELEASE_SELECTORS: &[&str] =
    &[".markdown-body", ".release-body", ".Box-body", ".release-desc", "#release-body"];

pub const GENERIC_SELECTORS: &[&str] = &[
    ".content",
    ".main-content",
    ".article",
    ".document",
    "#content",
    ".bd-article-content",
    ".bd-content",
    "#main",
    ".main",
    ".section",
    ".page-content",
];

/// URL substrings identifying known documentation hosts.
const DOCS_HOST_MARKERS: &[&str] = &[
    "docs.",
    ".readthedocs.io",
    "tiangolo.com",
    "palletsprojects.com",
    "python-poetry.org",
    "networkx.org",
    "matplotlib.org",
    "pydata.org",
    "scikit-learn.org",
    "alembic.sqlalchemy.org",
    "scrapy.org",
];

static DOCS_RULES: &[DocsRules] = &[
    DocsRules {
        domain: "pydata.org",
        selectors: &[
            ".bd-content", ".bd-article-content", ".bd-main",
            "#content", "#main-container", ".container",
            ".whatsnew", ".whatsnew-content",
            ".section", ".main-content", ".article", ".document",
            "#pandas-main-content", ".pandas-content",
        ],
        fragment: DEFAULT_FRAGMENT,
    },
    DocsRules {
        domain: "palletsprojects.com",
        selectors: &[".text", ".body", ".content", ".bd-article-content"],
        fragment: DEFAULT_FRAGMENT,
    },
    DocsRules {
        domain: "scikit-learn.org",
        selectors: &[
            ".section", ".content", "#main-content", ".bd-article-content", ".article",
            ".bd-main", ".bd-content", ".main-content", ".document",
            "#scikit-learn-main-content", ".scikit-content", ".whatsnew-content",
        ],
        fragment: DEFAULT_FRAGMENT,
    },
    DocsRules {
        domain: "matplotlib.org",
        selectors: &[".body", ".content", ".section", "#main-content", ".document", ".article"],
        fragment: DEFAULT_FRAGMENT,
    },
    DocsRules {
        domain: "python-poetry.org",
        selectors: &[".history", ".timeline", ".content", ".section", ".bd-article-content"],
        // anchors name versions; page ids do not, so match heading titles first
        fragment: &[FragmentMatch::HeadingText, FragmentMatch::Id],
    },
    DocsRules {
        domain: "networkx.org",
        selectors: &[".release", ".changelog", ".content", ".section", "#main-content", ".document"],
        fragment: DEFAULT_FRAGMENT,
    },
    DocsRules {
        domain: "readthedocs.io",
        selectors: &[
            ".section", ".content", "#main-content", ".wy-nav-content", ".rst-content",
            ".bd-article-content", "#readthedocs-main-content", ".readthedocs-content",
            ".content-main", ".wy-body-for-nav", ".document", ".wy-menu-content",
            "#content", ".content-wrapper", ".markdown-content", "article", "div.main",
        ],
        fragment: DEFAULT_FRAGMENT,
    },
    DocsRules {
        domain: "alembic.sqlalchemy.org",
        selectors: &[
            ".section", ".content", "#main-content", ".wy-nav-content", ".rst-content",
            ".bd-article-content", "#alembic-content", ".alembic-main-content",
            ".changelog", ".release-notes", "article", "div.main", ".document", ".content-wrapper",
        ],
        fragment: DEFAULT_FRAGMENT,
    },
    DocsRules {
        domain: "scrapy.org",
        selectors: &[
            ".section", ".content", "#main-content", ".wy-nav-content", ".rst-content",
            ".bd-article-content", ".document", ".article", "#content", ".content-wrapper",
            ".main-content", "#scrapy-main-content", ".scrapy-content",
            ".news-content", ".whatsnew-content",
        ],
        // version anchors use '-' where section ids use '.'
        fragment: &[FragmentMatch::SectionDotted, FragmentMatch::HeadingDotted, FragmentMatch::Id],
    },
];

static API_RELEASE_RULES: &[ApiReleaseRule] = &[
    ApiReleaseRule { marker: "github.com/faker-js/faker", repo: "faker-js/faker" },
    ApiReleaseRule { marker: "github.com/joke2k/faker", repo: "joke2k/faker" },
];

pub fn classify(url: &str) -> SiteClass {
    if url.contains("github.com") && url.contains("/releases/tag/") {
        return SiteClass::GithubRelease;
    }
    if DOCS_HOST_MARKERS.iter().any(|m| url.contains(m)) {
        return SiteClass::Docs(docs_rules(url));
    }
    SiteClass::Generic
}

fn docs_rules(url: &str) -> Option<&'static DocsRules> {
    DOCS_RULES.iter().find(|r| url.contains(r.domain))
}

pub fn fragment_strategies(url: &str) -> &'static [FragmentMatch] {
    docs_rules(url).map(|r| r.fragment).unwrap_or(DEFAULT_FRAGMENT)
}

/// Bespoke API-backed release pages: returns the matching rule and the tag
/// parsed from the URL.
pub fn api_release(url: &str) -> Option<(&'static ApiReleaseRule, String)> {
    if !url.contains("/releases/tag/") {
        return None;
    }
    let rule = API_RELEASE_RULES.iter().find(|r| url.contains(r.marker))?;
    let tag = tag_pattern()
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())?;
    Some((rule, tag))
}

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/tag/(v?\d+(?:\.\d+)*)").expect("valid tag pattern"))
}
