use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

mod crawl;
mod registry;
mod telemetry;
mod util;

#[derive(Parser)]
#[command(name = "relcrawl", about = "Release-note crawler CLI")]
struct Cli {
    /// Library URL registry (JSON file); falls back to RELCRAWL_REGISTRY
    #[arg(global = true, short, long)]
    registry: Option<PathBuf>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Registry(registry::RegistryCmd),
    Crawl(crawl::CrawlCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and RELCRAWL_LOG_FORMAT
    telemetry::config::init_tracing();

    let registry_path = cli
        .registry
        .or_else(|| env::var("RELCRAWL_REGISTRY").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data/library_urls.json"));

    match cli.command {
        Commands::Registry(args) => registry::run(&registry_path, args).await?,
        Commands::Crawl(args) => crawl::run(&registry_path, args).await?,
    }

    Ok(())
}
