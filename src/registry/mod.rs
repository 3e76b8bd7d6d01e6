use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use std::path::Path;
use url::Url;

use crate::telemetry::{self};
use crate::telemetry::ops::registry::Phase as RegistryPhase;

pub mod store;
pub mod types;

/// relcrawl registry add/ls
#[derive(Args)]
pub struct RegistryCmd {
    #[command(subcommand)]
    pub cmd: RegistrySub,
}

#[derive(Subcommand)]
pub enum RegistrySub {
    // add or replace a library's release-note URLs (plan-only by default; use --apply to write)
    Add {
        library: String,
        #[arg(required = true)]
        urls: Vec<String>,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
    // list registered libraries and their URLs
    Ls,
}

pub async fn run(path: &Path, args: RegistryCmd) -> Result<()> {
    let log = telemetry::registry();
    let _g = log.root_span().entered();
    match args.cmd {
        RegistrySub::Add { library, urls, apply } => add_library(path, library, urls, apply)?,
        RegistrySub::Ls => ls_libraries(path)?,
    }
    Ok(())
}

fn add_library(path: &Path, library: String, urls: Vec<String>, apply: bool) -> Result<()> {
    let log = telemetry::registry();
    let _g = log.root_span_kv([
        ("mode", if apply { "apply".to_string() } else { "plan".to_string() }),
        ("library", library.clone()),
        ("urls", urls.len().to_string()),
    ]).entered();

    // URL validation (friendly error before touching the file)
    for u in &urls {
        if Url::parse(u).is_err() { bail!("Invalid URL: {}", u); }
    }

    if !apply {
        let _s = log.span(&RegistryPhase::Plan).entered();
        log.info(format!("📝 Registry plan — add library={} urls={}", library, urls.len()));
        for u in &urls { log.info(format!("  {}", u)); }
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            let plan = types::RegistryAddPlan { action: "add", library, urls };
            log.plan(&plan)?;
        }
        return Ok(());
    }

    let _s = log.span(&RegistryPhase::Add).entered();
    let mut reg = store::load_or_default(path)?;
    let inserted = reg.insert(library.clone(), urls.clone()).is_none();
    store::save(path, &reg)?;
    if inserted { log.info("➕ Library added"); } else { log.info("♻️ Library replaced"); }
    if telemetry::config::json_mode() {
        let result = types::RegistryAddResult { inserted, library, urls: urls.len() };
        log.result(&result)?;
    }
    Ok(())
}

fn ls_libraries(path: &Path) -> Result<()> {
    let log = telemetry::registry();
    let _g = log.root_span().entered();
    let _s = log.span(&RegistryPhase::List).entered();
    let reg = store::load_or_default(path)?;
    log.info("📚 Libraries:");
    for (name, urls) in &reg {
        log.info(format!("{} ({} urls)", name, urls.len()));
        for u in urls { log.info(format!("    {}", u)); }
    }
    if telemetry::config::json_mode() {
        let list = types::LibraryList {
            libraries: reg
                .into_iter()
                .map(|(library, urls)| types::LibraryEntry { library, urls })
                .collect(),
        };
        log.result(&list)?;
    }
    Ok(())
}
