use anyhow::{Result, bail};
use chrono::Utc;
use clap::Args;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::registry::store;
use crate::telemetry::{self};
use crate::telemetry::ops::crawl::Phase as CrawlPhase;
use crate::util::retry::RetryPolicy;

mod extractor;
mod fetch;
pub mod types;
mod write;

use fetch::PageClient;
use types::{
    CrawlApply, CrawlPlan, CrawlResult, CrawlStatus, CrawlTotals, LibrarySample, LibrarySummary,
};

#[derive(Args)]
pub struct CrawlCmd {
    /// Crawl a single library; omit to crawl every registered library
    #[arg(long)] pub library: Option<String>,
    /// Output file for this run's results
    #[arg(long, default_value = "data/crawled.json")] pub out: PathBuf,
    /// Unified file to merge into, de-duplicated by library name
    #[arg(long)] pub append: Option<PathBuf>,
    #[arg(long, default_value_t = 3)] pub concurrency: usize,
    #[arg(long, default_value_t = 3)] pub max_retries: u32,
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
}

pub async fn run(registry_path: &Path, args: CrawlCmd) -> Result<()> {
    let log = telemetry::crawl();
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("library", format!("{:?}", args.library)),
        ("concurrency", args.concurrency.to_string()),
        ("max_retries", args.max_retries.to_string()),
    ]).entered();

    // resolve crawl targets from the registry
    let registry = store::load(registry_path)?;
    let targets: Vec<(String, Vec<String>)> = match &args.library {
        Some(name) => match registry.get(name) {
            Some(urls) => vec![(name.clone(), urls.clone())],
            None => bail!(
                "library '{}' not found in registry; available: {}",
                name,
                registry.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
        },
        None => registry.into_iter().collect(),
    };

    if !args.apply {
        let url_total: usize = targets.iter().map(|(_, urls)| urls.len()).sum();
        if telemetry::config::json_mode() {
            let sample: Vec<LibrarySample> = targets.iter().take(args.plan_limit)
                .map(|(library, urls)| LibrarySample { library: library.clone(), urls: urls.clone() })
                .collect();
            let plan = CrawlPlan { libraries: targets.len(), urls: url_total, concurrency: args.concurrency, sample };
            log.plan(&plan)?;
        } else {
            log.info(format!("📝 Crawl plan — libraries={} urls={} concurrency={}", targets.len(), url_total, args.concurrency));
            for (library, urls) in targets.iter().take(args.plan_limit) {
                log.info(format!("  {} ({} urls)", library, urls.len()));
                for u in urls { log.info(format!("    {}", u)); }
            }
            if targets.len() > args.plan_limit { log.info(format!("  ... ({} more)", targets.len() - args.plan_limit)); }
            log.info("   Use --apply to execute.");
        }
        return Ok(());
    }

    let client = Arc::new(PageClient::new(RetryPolicy::with_max_retries(args.max_retries))?);
    let semaphore = Arc::new(Semaphore::new(args.concurrency.max(1)));

    let mut all_results: Vec<CrawlResult> = Vec::new();
    let mut per_library: Vec<LibrarySummary> = Vec::new();
    let mut total_succeeded = 0usize;
    let mut total_failed = 0usize;

    for (library, urls) in &targets {
        let _lib_span = log.span_kv(&CrawlPhase::Library, [
            ("library", library.clone()),
            ("urls", urls.len().to_string()),
        ]).entered();
        if urls.len() != 3 {
            log.warn(format!("⚠️ {} has {} urls registered, expected 3", library, urls.len()));
        }

        // at most one result per (library, url) pair per run
        let mut seen: HashSet<&str> = HashSet::new();
        let mut join = JoinSet::new();
        for url in urls {
            if !seen.insert(url.as_str()) {
                log.warn_kv("↩️ skipping duplicate url", [("url", url.clone())]);
                continue;
            }
            let permits = Arc::clone(&semaphore);
            let client = Arc::clone(&client);
            let library = library.clone();
            let url = url.clone();
            join.spawn(async move {
                let _permit = permits.acquire_owned().await.expect("semaphore closed");
                extractor::crawl_url(&client, &library, &url).await
            });
        }

        // collect in completion order
        let mut results: Vec<CrawlResult> = Vec::new();
        while let Some(joined) = join.join_next().await {
            let result = joined?;
            match result.crawl_status {
                CrawlStatus::Success => log.info_kv("✓ crawled", [("url", result.url.clone())]),
                CrawlStatus::Failed => log.error(format!("✗ failed {} — {}", result.url, result.content)),
            }
            results.push(result);
        }

        let succeeded = results.iter().filter(|r| r.crawl_status == CrawlStatus::Success).count();
        let failed = results.len() - succeeded;
        let duplicate_contents = duplicate_content_count(&results);
        log.library_summary(library, succeeded, failed, duplicate_contents);
        per_library.push(LibrarySummary {
            library: library.clone(),
            succeeded,
            failed,
            duplicate_contents,
        });
        total_succeeded += succeeded;
        total_failed += failed;
        all_results.extend(results);
    }

    {
        let _s = log.span_kv(&CrawlPhase::WriteOut, [("path", args.out.display().to_string())]).entered();
        write::write_results(&args.out, &all_results)?;
        log.info(format!("💾 wrote {} records to {}", all_results.len(), args.out.display()));
    }

    let mut appended = None;
    if let Some(append_path) = &args.append {
        let _s = log.span_kv(&CrawlPhase::Append, [("path", append_path.display().to_string())]).entered();
        let total = write::append_results(append_path, &all_results)?;
        log.info(format!("💾 unified file now holds {} records", total));
        appended = Some(total);
    }

    log.totals(targets.len(), total_succeeded, total_failed);

    if telemetry::config::json_mode() {
        let result = CrawlApply {
            totals: CrawlTotals { libraries: targets.len(), succeeded: total_succeeded, failed: total_failed },
            per_library,
            out: args.out.display().to_string(),
            appended,
            finished_at: Utc::now().to_rfc3339(),
        };
        log.result(&result)?;
    }
    Ok(())
}

/// How many of a library's successful records share their content with
/// another record. Three URLs yielding the same text usually means the
/// extractor grabbed a page-level container instead of the version section.
fn duplicate_content_count(results: &[CrawlResult]) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in results.iter().filter(|r| r.crawl_status == CrawlStatus::Success) {
        *counts.entry(r.content.as_str()).or_default() += 1;
    }
    counts.values().filter(|&&c| c > 1).sum()
}
