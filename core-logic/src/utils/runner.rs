use crate::traits::{FarmStats, Farmer};
use anyhow::Result;
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

pub struct WorkerRunner;

impl WorkerRunner {
    /// Spawns one concurrent task per farmer and waits for all of them to
    /// settle.
    ///
    /// Containment: a farmer that errors (or panics) only affects its own
    /// JoinSet entry; siblings keep running. Ctrl+C cancels the shared token
    /// so every worker can wind down at its next suspension point.
    pub async fn run_farmers(farmers: Vec<Box<dyn Farmer>>) -> Result<FarmStats> {
        let mut set = JoinSet::new();

        let token = CancellationToken::new();
        let cloned_token = token.clone();

        // Spawn a task to listen for Ctrl+C
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("🛑 Received Ctrl+C. Initiating graceful shutdown...");
                    cloned_token.cancel();
                }
                Err(err) => {
                    error!("Unable to listen for shutdown signal: {}", err);
                }
            }
        });

        let start_time = std::time::Instant::now();
        info!("Starting {} wallet workers...", farmers.len());

        for farmer in farmers.into_iter() {
            let span = tracing::info_span!("worker", wallet = farmer.name().to_string());
            let child_token = token.clone();

            set.spawn(
                async move {
                    let name = farmer.name().to_string();
                    match farmer.run(child_token).await {
                        Ok(stats) => Ok(stats),
                        Err(e) => {
                            error!("Worker {} failed: {:?}", name, e);
                            Err(e)
                        }
                    }
                }
                .instrument(span),
            );
        }

        let mut total = FarmStats::default();

        while let Some(res) = set.join_next().await {
            match res {
                Ok(Ok(stats)) => total.merge(&stats),
                Ok(Err(_)) => {
                    // Already logged in the worker
                    total.failed += 1;
                }
                Err(e) => {
                    error!("A worker task panicked or failed to join: {:?}", e);
                    total.failed += 1;
                }
            }
        }

        let total_duration = start_time.elapsed();
        let attempted = total.success + total.failed;
        let rate = if attempted > 0 {
            (total.success as f64 / attempted as f64) * 100.0
        } else {
            0.0
        };

        info!(
            "Done in {:.1}s | Success: {} | Fail: {} | Skipped: {} | Success Rate: {:.2}%",
            total_duration.as_secs_f64(),
            total.success,
            total.failed,
            total.skipped,
            rate
        );

        Ok(total)
    }
}
