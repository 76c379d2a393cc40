//! trendfeed: fetch trending searches from the command line.
//!
//! Prints results as JSON on stdout. Logging goes to stderr (default: warn;
//! override with RUST_LOG).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;

use trendfeed::config::Config;
use trendfeed::{
    BatchOptions, BatchRequest, BatchResult, Category, FetchKey, FetchOptions, ScheduleMode,
    TimeWindow, TrendRecord, Trendfeed, TrendsError, TrendsGateway, WriterProgress,
};

/// Fetch Google Trends "trending now" feeds.
#[derive(Parser)]
#[command(name = "trendfeed")]
#[command(version = trendfeed::PKG_VERSION)]
#[command(about = "Fetch trending searches for one or many regions")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "TRENDFEED_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (overrides the config file).
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(flatten)]
    feed: FeedArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs)]
struct FeedArgs {
    /// Trend category (e.g. sports, technology).
    #[arg(long, global = true, default_value = "all")]
    category: Category,

    /// Time window: 4h, 24h, 48h or 7d.
    #[arg(long, global = true, default_value = "24h")]
    window: TimeWindow,

    /// Interface language (hl), e.g. en-US.
    #[arg(long, global = true)]
    language: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a single region
    Fetch {
        /// Region code (e.g. US, GB, US-CA)
        geo: String,
    },

    /// Fetch several regions in one batch
    Batch {
        /// Region codes
        #[arg(required = true)]
        geos: Vec<String>,

        /// Fetch one region at a time
        #[arg(long)]
        sequential: bool,

        /// Maximum fetches in flight
        #[arg(long)]
        concurrency: Option<usize>,

        /// Minimum seconds between outbound calls
        #[arg(long)]
        delay: Option<f64>,

        /// Skip cache lookups
        #[arg(long)]
        no_cache: bool,

        /// Print progress to stderr as regions resolve
        #[arg(long)]
        progress: bool,
    },
}

/// JSON shape of one region's outcome.
#[derive(Serialize)]
#[serde(untagged)]
enum Outcome<'a> {
    Trends {
        trends: &'a [TrendRecord],
    },
    Failed {
        error: String,
        kind: &'static str,
        transient: bool,
    },
}

impl<'a> From<&'a Result<Vec<TrendRecord>, TrendsError>> for Outcome<'a> {
    fn from(result: &'a Result<Vec<TrendRecord>, TrendsError>) -> Self {
        match result {
            Ok(trends) => Outcome::Trends { trends },
            Err(e) => Outcome::Failed {
                error: e.to_string(),
                kind: e.kind().as_str(),
                transient: e.is_transient(),
            },
        }
    }
}

#[derive(Serialize)]
struct BatchOutput<'a> {
    results: BTreeMap<&'a str, Outcome<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pending: Vec<&'a str>,
}

impl<'a> From<&'a BatchResult> for BatchOutput<'a> {
    fn from(result: &'a BatchResult) -> Self {
        Self {
            results: result
                .iter()
                .map(|(key, outcome)| (key.as_str(), Outcome::from(outcome)))
                .collect(),
            pending: result.pending().iter().map(FetchKey::as_str).collect(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let gateway = build_gateway(&config, args.timeout)?;

    let mut options = FetchOptions::new()
        .category(args.feed.category)
        .window(args.feed.window);
    if let Some(language) = args.feed.language {
        options = options.language(language);
    }

    match args.command {
        Command::Fetch { geo } => {
            let key = FetchKey::new(&geo)?;
            let trends = gateway.fetch(&key, &options).await?;
            println!("{}", serde_json::to_string_pretty(&trends)?);
        }

        Command::Batch {
            geos,
            sequential,
            concurrency,
            delay,
            no_cache,
            progress,
        } => {
            let keys = FetchKey::parse_all(&geos)?;
            let mut batch = config.batch_options()?;
            if sequential {
                batch = batch.mode(ScheduleMode::Sequential);
            }
            if let Some(n) = concurrency {
                batch = batch.concurrency(n);
            }
            if let Some(secs) = delay {
                let delay = Duration::try_from_secs_f64(secs).map_err(|e| {
                    TrendsError::InvalidParameter(format!("invalid --delay {secs}: {e}"))
                })?;
                batch = batch.delay(delay);
            }
            if no_cache {
                batch = batch.use_cache(false);
            }
            if progress {
                batch = batch.show_progress(true);
            }

            let result = gateway.run_batch(request(keys, options, batch)).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&BatchOutput::from(&result))?
            );
            if result.success_count() == 0 && result.failure_count() > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn request(keys: Vec<FetchKey>, options: FetchOptions, batch: BatchOptions) -> BatchRequest {
    BatchRequest::new(keys).options(options).batch_options(batch)
}

/// Build a gateway from configuration and command-line overrides.
fn build_gateway(config: &Config, timeout: Option<u64>) -> Result<TrendsGateway, TrendsError> {
    let timeout = timeout.map(Duration::from_secs).unwrap_or(config.timeout());
    Trendfeed::builder()
        .base_url(config.fetch.base_url.clone())
        .timeout(timeout)
        .cache(config.cache_config())
        .batch_defaults(config.batch_options()?)
        // Progress goes straight to stderr so it shows under the default log filter.
        .progress(Arc::new(WriterProgress::stderr()))
        .build()
}
