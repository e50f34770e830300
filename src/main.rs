//! Sitecrawl main entry point
//!
//! This is the command-line interface for the Sitecrawl site mirror.

use anyhow::Context;
use clap::Parser;
use sitecrawl::config::{load_config_with_hash, validate, Config, RenderBackend};
use sitecrawl::crawler::{Admission, PolicyGuard};
use sitecrawl::output::print_report;
use sitecrawl::render::build_http_client;
use sitecrawl::{crawl, extract_authority, normalize_url, CancelToken};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Sitecrawl: a scoped, polite site mirror
///
/// Sitecrawl visits every page reachable from the seed URL on the same site,
/// respecting robots.txt and a delay between requests. Page text is mirrored
/// to disk and linked documents are downloaded once.
#[derive(Parser, Debug)]
#[command(name = "sitecrawl")]
#[command(version)]
#[command(about = "A scoped, polite site mirror", long_about = None)]
struct Cli {
    /// Absolute http(s) URL to start from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seconds to wait between page requests
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Page load timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Directory for the mirrored page tree
    #[arg(long, value_name = "DIR")]
    site_root: Option<PathBuf>,

    /// Directory for downloaded documents
    #[arg(long, value_name = "DIR")]
    artifact_root: Option<PathBuf>,

    /// Stop after rendering this many pages
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Stop dequeuing new pages after this many seconds
    #[arg(long, value_name = "SECONDS")]
    deadline_secs: Option<u64>,

    /// Render pages in headless Chromium
    #[arg(long)]
    browser: bool,

    /// Validate config and seed, print the effective settings, and exit
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(delay) = self.delay {
            config.crawler.delay_seconds = delay;
        }
        if let Some(timeout) = self.timeout_ms {
            config.crawler.timeout_ms = timeout;
        }
        if let Some(root) = &self.site_root {
            config.output.site_root = root.clone();
        }
        if let Some(root) = &self.artifact_root {
            config.output.artifact_root = root.clone();
        }
        if self.max_pages.is_some() {
            config.crawler.max_pages = self.max_pages;
        }
        if self.browser {
            config.render.backend = RenderBackend::Browser;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    cli.apply_overrides(&mut config);
    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        return handle_dry_run(&cli.seed, &config).await;
    }

    handle_crawl(&cli, &config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitecrawl=info,warn"),
            1 => EnvFilter::new("sitecrawl=debug,info"),
            2 => EnvFilter::new("sitecrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the settings and whether the seed would
/// be admitted, without crawling
async fn handle_dry_run(seed: &str, config: &Config) -> anyhow::Result<()> {
    let seed = normalize_url(seed).context("invalid seed URL")?;
    let authority = extract_authority(&seed).context("seed URL has no host")?;

    let client = build_http_client(&config.user_agent)?;
    let policy = PolicyGuard::load(
        &client,
        &seed,
        authority.as_str(),
        config.user_agent.crawler_name.as_str(),
        config.crawler.timeout(),
    )
    .await;

    println!("=== Sitecrawl Dry Run ===\n");

    println!("Seed: {}", seed);
    println!("Scope: {}", authority);

    println!("\nCrawler Configuration:");
    println!("  Delay: {}s", config.crawler.delay_seconds);
    println!("  Page timeout: {}ms", config.crawler.timeout_ms);
    println!("  Document timeout: {}ms", config.crawler.document_timeout_ms);
    println!("  Concurrent downloads: {}", config.crawler.concurrent_downloads);
    match config.crawler.max_pages {
        Some(limit) => println!("  Max pages: {}", limit),
        None => println!("  Max pages: unlimited"),
    }
    println!(
        "  Document types: {}",
        config.crawler.document_extensions.join(", ")
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());
    println!("Render backend: {:?}", config.render.backend);

    println!("\nOutput:");
    println!("  Site mirror: {}", config.output.site_root.display());
    println!("  Documents: {}", config.output.artifact_root.display());

    println!("\nRobots.txt:");
    match policy.crawl_delay() {
        Some(delay) => println!("  Crawl-delay: {:?}", delay),
        None => println!("  Crawl-delay: none"),
    }
    match policy.admit(&seed) {
        Admission::Admitted => println!("  Seed: admitted"),
        Admission::Disallowed => println!("  Seed: disallowed, the crawl would visit nothing"),
        Admission::OutOfScope => println!("  Seed: out of scope"),
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let mut cancel = CancelToken::new();
    if let Some(secs) = cli.deadline_secs {
        cancel = cancel.with_deadline(Duration::from_secs(secs));
    }

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current page");
            interrupt.cancel();
        }
    });

    match crawl(&cli.seed, config, cancel).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
