use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::types::CrawlResult;

pub fn write_results(path: &Path, results: &[CrawlResult]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = fs::File::create(path)
        .with_context(|| format!("cannot write output: {}", path.display()))?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}

/// Merge this run's results into the unified file, replacing every record
/// belonging to a library crawled in this run. A missing or corrupt file is
/// rebuilt from scratch.
pub fn append_results(path: &Path, results: &[CrawlResult]) -> Result<usize> {
    let mut existing: Vec<CrawlResult> = match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "unified file is not valid JSON; rebuilding");
            Vec::new()
        }),
        Err(_) => Vec::new(),
    };

    let crawled: HashSet<&str> = results.iter().map(|r| r.library_name.as_str()).collect();
    existing.retain(|r| !crawled.contains(r.library_name.as_str()));
    existing.extend_from_slice(results);

    write_results(path, &existing)?;
    Ok(existing.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::types::{CrawlStatus, UNKNOWN_DATE, UNKNOWN_VERSION};

    fn record(library: &str, url: &str) -> CrawlResult {
        CrawlResult {
            library_name: library.to_string(),
            url: url.to_string(),
            version: UNKNOWN_VERSION.to_string(),
            title: "t".to_string(),
            release_date: UNKNOWN_DATE.to_string(),
            content: "c".to_string(),
            crawl_status: CrawlStatus::Success,
        }
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/out.json");
        write_results(&path, &[record("flask", "https://example.com/a")]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let parsed: Vec<CrawlResult> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].library_name, "flask");
    }

    #[test]
    fn append_replaces_same_library_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unified.json");

        write_results(
            &path,
            &[record("flask", "https://example.com/old"), record("pandas", "https://example.com/p")],
        )
        .unwrap();

        let total = append_results(&path, &[record("flask", "https://example.com/new")]).unwrap();
        assert_eq!(total, 2);

        let parsed: Vec<CrawlResult> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let flask: Vec<_> = parsed.iter().filter(|r| r.library_name == "flask").collect();
        assert_eq!(flask.len(), 1);
        assert_eq!(flask[0].url, "https://example.com/new");
        assert!(parsed.iter().any(|r| r.library_name == "pandas"));
    }

    #[test]
    fn append_is_idempotent_per_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unified.json");

        let batch = vec![record("scrapy", "https://example.com/1"), record("scrapy", "https://example.com/2")];
        assert_eq!(append_results(&path, &batch).unwrap(), 2);
        assert_eq!(append_results(&path, &batch).unwrap(), 2);
    }

    #[test]
    fn append_rebuilds_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unified.json");
        fs::write(&path, "{ not json").unwrap();

        let total = append_results(&path, &[record("numpy", "https://example.com/n")]).unwrap();
        assert_eq!(total, 1);
    }
}
