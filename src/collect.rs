//! Concurrent fetch + classify over a set of forecast indices.
//!
//! Each index is one task on a [`JoinSet`], gated by a semaphore sized to the
//! configured worker count. A task always yields a result for its index: any
//! fetch or decode failure is logged and replaced by the neutral sentinel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, warn};

use crate::classify::{ClassificationResult, classify_bytes};
use crate::fetch::{HttpClient, ImageFetcher};
use crate::forecast::ForecastIndex;

/// Fetches and classifies one image. Never fails.
pub async fn classify_region<C: HttpClient>(
    fetcher: &ImageFetcher<C>,
    index: ForecastIndex,
    threshold: u8,
) -> ClassificationResult {
    let bytes = match fetcher.fetch(index).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Image fetch failed, substituting neutral");
            return ClassificationResult::unavailable();
        }
    };

    match classify_bytes(&bytes, threshold) {
        Ok(result) => {
            debug!(
                classification = %result.classification,
                signal = result.signal,
                avg_rgb = ?result.avg_rgb,
                "Image classified"
            );
            result
        }
        Err(e) => {
            warn!(error = %e, bytes = bytes.len(), "Image decode failed, substituting neutral");
            ClassificationResult::unavailable()
        }
    }
}

/// Runs [`classify_region`] for every index with at most `workers` in flight.
///
/// Returns once every task has finished. Results are keyed by index; the
/// completion order is not preserved.
#[tracing::instrument(skip(fetcher, indices), fields(indices = indices.len()))]
pub async fn collect_classifications<C: HttpClient + 'static>(
    fetcher: Arc<ImageFetcher<C>>,
    indices: &[ForecastIndex],
    workers: usize,
    threshold: u8,
) -> HashMap<ForecastIndex, ClassificationResult> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    for &index in indices {
        let sem = semaphore.clone();
        let fetcher = fetcher.clone();
        let span = tracing::info_span!("classify_region", index = %index);

        tasks.spawn(
            async move {
                let Ok(_permit) = sem.acquire_owned().await else {
                    return (index, ClassificationResult::unavailable());
                };
                (index, classify_region(&fetcher, index, threshold).await)
            }
            .instrument(span),
        );
    }

    let mut results = HashMap::with_capacity(indices.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => {
                results.insert(index, result);
            }
            Err(e) => error!(error = %e, "Classification task did not complete"),
        }
    }

    let unavailable = results.values().filter(|r| !r.is_available()).count();
    info!(
        collected = results.len(),
        unavailable, "Classification batch complete"
    );

    results
}
