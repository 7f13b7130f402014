mod config;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use listing_core::{ExtractionProfile, ListingExtractor, TitlePolicy};
use listing_engine::{
    parse_url_list, BatchCoordinator, ErrorPayload, HttpDocumentProvider, ListingPipeline,
    LogProgressSink,
};
use listing_logging::{listing_info, LevelFilter, LogDestination};
use serde::Serialize;

use crate::config::{load_config, DEFAULT_CONFIG_FILENAME};

#[derive(Parser)]
#[command(
    name = "listing-extract",
    about = "Extract vehicle records from car-marketplace listing pages"
)]
struct Cli {
    /// Listing URLs to import
    urls: Vec<String>,
    /// File with one listing URL per line
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// RON configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,
    /// Also write the log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Log at debug level and add debug detail to error output
    #[arg(short, long)]
    verbose: bool,
    /// Read images from gallery markup instead of rendered image hosts
    #[arg(long)]
    static_profile: bool,
    /// Fail listings without a title instead of using a placeholder model
    #[arg(long)]
    require_title: bool,
    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match cli.log_file.clone() {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    listing_logging::initialize(level, destination);

    let urls = collect_urls(&cli)?;
    if urls.is_empty() {
        bail!("no listing URLs given");
    }

    let mut config = load_config(&cli.config)?;
    if cli.static_profile {
        config.extractor.profile = ExtractionProfile::Static;
    }
    if cli.require_title {
        config.extractor.title_policy = TitlePolicy::Required;
    }

    let extractor = ListingExtractor::new(&config.extractor).context("invalid extractor settings")?;
    let provider = Arc::new(HttpDocumentProvider::new(config.fetch.to_settings()));
    let pipeline = ListingPipeline::new(provider, extractor);
    let sink = LogProgressSink;

    if let [url] = urls.as_slice() {
        return match pipeline.import(1, url, &sink).await {
            Ok(record) => {
                print_json(&record, cli.pretty)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                print_json(&ErrorPayload::from_error(&err, cli.verbose), cli.pretty)?;
                Ok(ExitCode::FAILURE)
            }
        };
    }

    listing_info!("Importing {} listings", urls.len());
    let coordinator =
        BatchCoordinator::new(pipeline).with_pacing(Duration::from_millis(config.pacing_ms));
    let summary = coordinator.run(&urls, &sink).await;
    print_json(&summary, cli.pretty)?;

    Ok(if summary.imported == 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn collect_urls(cli: &Cli) -> anyhow::Result<Vec<String>> {
    let mut raw = cli.urls.join("\n");
    if let Some(path) = &cli.file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read URL list {}", path.display()))?;
        raw.push('\n');
        raw.push_str(&content);
    }
    Ok(parse_url_list(&raw))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}
