//! CLI entry point for the weather-regime pipeline.
//!
//! Provides subcommands for running the full 16-day regime report,
//! classifying a single forecast image, inspecting model-run selection,
//! and detecting the pricing regime from a summary string.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use ng_weather_regime::{
    classify::classify_bytes,
    config::PipelineConfig,
    fetch::ImageFetcher,
    output::{append_days, print_json, print_pretty},
    pipeline::run_pipeline,
    report::{WeatherForecastSection, WeatherRegime},
    run::latest_gfs_run,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ng_weather_regime")]
#[command(about = "Infer the short-range weather regime from GFS anomaly images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and classify the full 16-day horizon and print the regime report
    Report {
        /// Evaluate as of this instant (RFC 3339) instead of now
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Print the weather_forecast payload section as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// CSV file to append the 16 day records to
        #[arg(short, long)]
        output: Option<String>,

        /// Maximum number of concurrent image downloads
        #[arg(short, long)]
        workers: Option<usize>,

        /// Total attempts per image, first try included
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Exponential backoff multiplier in seconds
        #[arg(long)]
        backoff_factor: Option<f64>,
    },
    /// Classify a single image from a file or URL
    Classify {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Red/blue dominance threshold (0-255)
        #[arg(short, long)]
        threshold: Option<u8>,
    },
    /// Show which model run would be used
    Run {
        /// Evaluate as of this instant (RFC 3339) instead of now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Detect the pricing regime from a weather summary string
    Regime {
        #[arg(value_name = "SUMMARY")]
        summary: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/ng_weather_regime.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ng_weather_regime.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env()?;
    debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Report {
            now,
            json,
            output,
            workers,
            max_attempts,
            backoff_factor,
        } => {
            if let Some(n) = workers {
                config.workers = n;
            }
            if let Some(n) = max_attempts {
                config.max_attempts = n;
            }
            if let Some(f) = backoff_factor {
                config.backoff_factor = f;
            }
            let config = config.normalized();

            let result = run_pipeline(&config, now.unwrap_or_else(Utc::now)).await;
            let report = &result.report;
            print_pretty(report);

            if !report.is_available() {
                warn!("Weather report degraded to unavailable");
            }

            if json {
                print_json(&WeatherForecastSection::from_report(report, result.run))?;
            } else {
                println!("{}", report.outlook);
                println!("{}", report.latest);
                if let Some(summary) = &report.summary {
                    let (week, range, week_n, range_n, last, day1) = summary.as_tuple();
                    println!(
                        "model_run={} week={} ({}) range={} ({}) last_day={} day1={} regime={}",
                        result.run,
                        week,
                        week_n,
                        range,
                        range_n,
                        last,
                        day1,
                        WeatherRegime::detect(&report.outlook),
                    );
                }
            }

            if let Some(path) = output {
                append_days(&path, &report.days)?;
                info!(path = %path, rows = report.days.len(), "Day records written");
            }
        }
        Commands::Classify { source, threshold } => {
            let threshold = threshold.unwrap_or(config.dominance_threshold);
            let bytes = load_image(&source, &config).await?;
            let result = classify_bytes(&bytes, threshold)?;
            info!(
                source = %source,
                classification = %result.classification,
                signal = result.signal,
                avg_rgb = ?result.avg_rgb,
                "Image classified"
            );
            print_json(&result)?;
        }
        Commands::Run { now } => {
            let run = latest_gfs_run(now.unwrap_or_else(Utc::now));
            println!("{run}");
        }
        Commands::Regime { summary } => {
            println!("{}", WeatherRegime::detect(&summary));
        }
    }

    Ok(())
}

/// Loads image data from a local file path or fetches it over HTTP.
#[tracing::instrument(skip_all, fields(source = %source))]
async fn load_image(source: &str, config: &PipelineConfig) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        let fetcher = ImageFetcher::from_config(config)?;
        fetcher.fetch_url(source).await?
    } else {
        std::fs::read(source)?
    };
    Ok(bytes)
}
