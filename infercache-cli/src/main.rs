//! infercache CLI
//!
//! Serve the cached inference API, or exercise the cache from the terminal.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use infercache_api::{ApiConfig, ApiServer};
use infercache_cache::TtlCache;
use infercache_coordinator::{HttpModel, RequestCoordinator, TemplateModel};
use infercache_core::constants::DEFAULT_TTL_SECONDS;
use infercache_core::traits::InferenceModel;

/// Log files are named `app.YYYY-MM-DD.log`.
const LOG_FILE_PREFIX: &str = "app";
const LOG_FILE_SUFFIX: &str = "log";

/// Daily files kept before the oldest is deleted.
const LOG_RETENTION_FILES: usize = 30;

/// infercache - TTL response cache in front of an inference function
#[derive(Parser)]
#[command(name = "infercache")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Also write logs to daily rotating files in this directory
    #[arg(long, global = true, env = "LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "8000")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
        /// Cache TTL in seconds (overrides CACHE_TTL_SECONDS)
        #[arg(long)]
        ttl: Option<u64>,
        /// Runtime worker threads (defaults to one per CPU)
        #[arg(short, long)]
        workers: Option<usize>,
        /// API key clients must send in X-API-KEY (overrides AUTH_KEY)
        #[arg(long)]
        auth_key: Option<String>,
        /// Remote inference server URL (overrides MODEL_ENDPOINT)
        #[arg(long)]
        model_endpoint: Option<String>,
    },

    /// Run payloads through an in-process cache and show hits and misses
    Predict {
        /// Input text
        text: String,
        /// How many times to submit the same text
        #[arg(short, long, default_value = "2")]
        repeat: usize,
        /// Cache TTL in seconds
        #[arg(long, default_value_t = DEFAULT_TTL_SECONDS)]
        ttl: u64,
        /// Remote inference server URL (template model if omitted)
        #[arg(long, env = "MODEL_ENDPOINT")]
        model_endpoint: Option<String>,
    },

    /// Drive the cache with a synthetic workload
    Bench {
        /// Total requests to send
        #[arg(short, long, default_value = "10000")]
        requests: usize,
        /// Distinct payloads in the workload
        #[arg(short, long, default_value = "100")]
        distinct: usize,
        /// Requests in flight at once
        #[arg(short, long, default_value = "32")]
        concurrency: usize,
        /// Simulated model latency in milliseconds
        #[arg(short, long, default_value = "5")]
        latency_ms: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_json, cli.log_dir.as_deref())?;

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    if let Commands::Serve { workers: Some(workers), .. } = &cli.command {
        anyhow::ensure!(*workers > 0, "--workers must be at least 1");
        runtime.worker_threads(*workers);
    }
    let runtime = runtime.build().context("Failed to start async runtime")?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Serve {
                port,
                bind,
                ttl,
                workers: _,
                auth_key,
                model_endpoint,
            } => cmd_serve(port, &bind, ttl, auth_key, model_endpoint).await,
            Commands::Predict {
                text,
                repeat,
                ttl,
                model_endpoint,
            } => cmd_predict(&text, repeat, ttl, model_endpoint.as_deref()).await,
            Commands::Bench {
                requests,
                distinct,
                concurrency,
                latency_ms,
            } => cmd_bench(requests, distinct, concurrency, latency_ms).await,
        }
    })
}

fn init_logging(verbose: bool, json: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = if verbose {
        "infercache=debug,info"
    } else {
        "infercache=info,warn"
    };

    let stdout = if json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    let (file, guard) = match log_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(log_file_appender(dir)?);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(stdout)
        .with(file)
        .init();

    Ok(guard)
}

/// Daily rotating appender keeping the last `LOG_RETENTION_FILES` files.
fn log_file_appender(dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(LOG_RETENTION_FILES)
        .build(dir)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))
}

/// Run API server
async fn cmd_serve(
    port: u16,
    bind: &str,
    ttl: Option<u64>,
    auth_key: Option<String>,
    model_endpoint: Option<String>,
) -> Result<()> {
    let mut config = ApiConfig::from_env().context("Invalid configuration")?;
    if let Some(ttl) = ttl {
        config.cache_ttl_seconds = ttl;
    }
    if auth_key.is_some() {
        config.auth_key = auth_key;
    }
    if model_endpoint.is_some() {
        config.model_endpoint = model_endpoint;
    }

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let server = ApiServer::new(config).context("Failed to initialize server")?;

    println!("{}", "🚀 Starting infercache API server...".cyan().bold());
    println!("   {} http://{}", "Listening on:".green(), addr);
    println!("   {} http://{}/health", "Health check:".dimmed(), addr);
    println!(
        "   {} {}s",
        "Cache TTL:".dimmed(),
        server.state().config.cache_ttl_seconds
    );
    println!("\n   Press Ctrl+C to stop.\n");

    server.run(addr).await.context("Server error")?;
    Ok(())
}

fn build_model(endpoint: Option<&str>, latency: Duration) -> Result<Arc<dyn InferenceModel>> {
    Ok(match endpoint {
        Some(endpoint) => Arc::new(HttpModel::new(endpoint).context("Invalid model endpoint")?),
        None => Arc::new(TemplateModel::with_latency(latency)),
    })
}

/// Submit one payload repeatedly
async fn cmd_predict(text: &str, repeat: usize, ttl: u64, model_endpoint: Option<&str>) -> Result<()> {
    anyhow::ensure!(ttl > 0, "--ttl must be at least 1 second");

    let model = build_model(model_endpoint, Duration::ZERO)?;
    let cache = Arc::new(TtlCache::new(Duration::from_secs(ttl)));
    let coordinator = RequestCoordinator::new(cache, model);

    println!("{} {}", "🧠 Model:".cyan().bold(), coordinator.model().name());

    for round in 1..=repeat {
        let start = Instant::now();
        let prediction = coordinator
            .handle(text)
            .await
            .with_context(|| format!("Request {} failed", round))?;

        let marker = if prediction.cache_hit {
            "HIT ".green().bold()
        } else {
            "MISS".yellow().bold()
        };
        println!(
            "   {} #{} ({:?}) {}",
            marker,
            round,
            start.elapsed(),
            prediction.result
        );
    }

    Ok(())
}

/// Run a synthetic workload
async fn cmd_bench(requests: usize, distinct: usize, concurrency: usize, latency_ms: u64) -> Result<()> {
    anyhow::ensure!(distinct > 0, "--distinct must be at least 1");
    anyhow::ensure!(concurrency > 0, "--concurrency must be at least 1");

    println!(
        "{} {} requests over {} distinct payloads ({} in flight, {}ms model latency)",
        "📊 Benchmarking".cyan().bold(),
        requests,
        distinct,
        concurrency,
        latency_ms
    );

    let model = TemplateModel::with_latency(Duration::from_millis(latency_ms));
    let cache = Arc::new(TtlCache::new(Duration::from_secs(DEFAULT_TTL_SECONDS)));
    let coordinator = RequestCoordinator::new(cache, model);

    let pb = ProgressBar::new(requests as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("   [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let mut failures = 0usize;
    let mut results = stream::iter(0..requests)
        .map(|i| {
            let payload = format!("prompt {}", i % distinct);
            let coordinator = &coordinator;
            async move { coordinator.handle(&payload).await }
        })
        .buffer_unordered(concurrency);

    while let Some(result) = results.next().await {
        if result.is_err() {
            failures += 1;
        }
        pb.inc(1);
    }
    pb.finish();
    let elapsed = start.elapsed();

    let metrics = coordinator.metrics();
    let stats = coordinator.cache().stats();
    let duplicate_computes = (metrics.misses as usize).saturating_sub(stats.total_entries);

    println!("\n{}", "📈 Results:".green().bold());
    println!("   Elapsed: {:?}", elapsed);
    println!(
        "   Throughput: {:.0} requests/sec",
        requests as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("   Hits: {}  Misses: {}  Failures: {}", metrics.hits, metrics.misses, failures);
    println!("   Hit rate: {:.1}%", stats.hit_rate() * 100.0);
    println!("   Cached entries: {}", stats.total_entries);
    if duplicate_computes > 0 {
        println!(
            "   {} {} concurrent misses recomputed an in-flight payload",
            "ℹ️ ".cyan(),
            duplicate_computes
        );
    }

    Ok(())
}
