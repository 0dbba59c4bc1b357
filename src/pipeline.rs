//! End-to-end weather-regime inference: select a run, collect the 32 image
//! classifications, reduce them to a 16-day regime report.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::collect::collect_classifications;
use crate::config::PipelineConfig;
use crate::fetch::{HttpClient, ImageFetcher};
use crate::forecast::horizon_indices;
use crate::regime::{WeatherReport, build_day_records, weather_report};
use crate::run::{ModelRun, latest_gfs_run};

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub run: ModelRun,
    pub report: WeatherReport,
}

/// Runs the pipeline through the given fetcher.
///
/// The fetcher is owned for the duration of this call and dropped on return.
#[tracing::instrument(skip_all, fields(now = %now))]
pub async fn run_with_fetcher<C: HttpClient + 'static>(
    fetcher: ImageFetcher<C>,
    config: &PipelineConfig,
    now: DateTime<Utc>,
) -> PipelineOutput {
    let run = latest_gfs_run(now);
    info!(model_run = %run, workers = config.workers, "Selected model run");

    let indices = horizon_indices();
    let results = collect_classifications(
        Arc::new(fetcher),
        &indices,
        config.workers,
        config.dominance_threshold,
    )
    .await;

    let days = build_day_records(&results, run);
    PipelineOutput {
        run,
        report: weather_report(days),
    }
}

/// Runs the pipeline over HTTP with a client built from `config`.
///
/// A client that cannot be constructed yields the unavailable report.
pub async fn run_pipeline(config: &PipelineConfig, now: DateTime<Utc>) -> PipelineOutput {
    match ImageFetcher::from_config(config) {
        Ok(fetcher) => run_with_fetcher(fetcher, config, now).await,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            PipelineOutput {
                run: latest_gfs_run(now),
                report: WeatherReport::unavailable(),
            }
        }
    }
}
