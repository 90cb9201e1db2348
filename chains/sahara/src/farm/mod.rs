//! Farm orchestration: proxy gating, randomized fan-out and the per-wallet
//! worker that walks a task chain with human pacing.

use crate::captcha::CaptchaGate;
use crate::config::FarmConfig;
use crate::proxy_check::ProxyProbe;
use crate::session::WalletSession;
use crate::task::{
    AccountStatsTask, ClaimFaucetTask, DailyClaimsTask, FarmTask, GalxeDailyTask,
    OnchainActivityTask, SocialClaimsTask, TaskContext,
};
use anyhow::Result;
use async_trait::async_trait;
use colored::Colorize;
use core_logic::{FarmStats, Farmer, WalletRecord, WorkerRunner};
use ethers::utils::format_ether;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// One wallet's worker: runs its task chain once, top to bottom. A failing
/// step is logged and counted; it never stops the remaining steps, and
/// never touches sibling wallets.
pub struct WalletFarmer {
    session: Arc<WalletSession>,
    tasks: Vec<Box<FarmTask>>,
    config: FarmConfig,
}

impl WalletFarmer {
    pub fn new(session: Arc<WalletSession>, tasks: Vec<Box<FarmTask>>, config: FarmConfig) -> Self {
        Self {
            session,
            tasks,
            config,
        }
    }

    async fn pace(&self, range: std::ops::RangeInclusive<u64>, token: &CancellationToken) {
        let secs = rand::thread_rng().gen_range(range);
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
        }
    }
}

#[async_trait]
impl Farmer for WalletFarmer {
    fn name(&self) -> &str {
        &self.session.name
    }

    async fn run(&self, cancellation_token: CancellationToken) -> Result<FarmStats> {
        let mut stats = FarmStats::default();

        // Stagger start so wallets never fire in lockstep
        self.pace(1..=15, &cancellation_token).await;

        for task in &self.tasks {
            if cancellation_token.is_cancelled() {
                info!("Worker stopping (cancelled).");
                break;
            }

            let ctx = TaskContext {
                session: Arc::clone(&self.session),
                config: self.config.clone(),
                cancel: cancellation_token.clone(),
            };

            let start_time = std::time::Instant::now();
            match task.run(ctx).await {
                Ok(res) if res.success => {
                    stats.success += 1;
                    let dur_secs = start_time.elapsed().as_secs_f64();
                    let dur_str = format!("{:.1}s", dur_secs);
                    let colored_dur = if dur_secs < 5.0 {
                        dur_str.green()
                    } else if dur_secs < 10.0 {
                        dur_str.truecolor(255, 165, 0)
                    } else {
                        dur_str.red()
                    };

                    info!(
                        target: "farm_result",
                        "[{}] {} [{}] {} in {}",
                        self.name(),
                        "Success".green().bold(),
                        task.name(),
                        res.message,
                        colored_dur
                    );
                }
                Ok(res) => {
                    stats.failed += 1;
                    warn!(
                        target: "farm_result",
                        "[{}] {} [{}] {} in {:.1}s",
                        self.name(),
                        "Failed ".red().bold(),
                        task.name(),
                        res.message,
                        start_time.elapsed().as_secs_f64()
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    let msg = format!("{:#}", e).replace('\n', " | ");
                    warn!(
                        target: "farm_result",
                        "[{}] {} [{}] {} in {:.1}s",
                        self.name(),
                        "Failed ".red().bold(),
                        task.name(),
                        msg,
                        start_time.elapsed().as_secs_f64()
                    );
                }
            }

            self.pace(
                self.config.min_delay_secs..=self.config.max_delay_secs,
                &cancellation_token,
            )
            .await;
        }

        Ok(stats)
    }
}

/// Splits wallets into those eligible for scheduling and a skipped count.
/// A wallet is skipped, with a logged reason, when it has no proxy or its
/// proxy fails the liveness probe. Skips are not failures of the batch.
pub async fn eligible_wallets(
    wallets: Vec<WalletRecord>,
    probe: &dyn ProxyProbe,
) -> (Vec<WalletRecord>, u64) {
    let mut ready = Vec::new();
    let mut skipped = 0u64;

    for wallet in wallets {
        let Some(proxy) = wallet.proxy.clone() else {
            error!("Wallet {} has no proxy configured, skipping...", wallet.name);
            skipped += 1;
            continue;
        };

        let check = probe.check(&proxy).await;
        if !check.working {
            error!(
                "Proxy check failed for wallet {}: {}",
                wallet.name,
                check.error.unwrap_or_else(|| "unknown error".to_string())
            );
            skipped += 1;
            continue;
        }

        ready.push(wallet);
    }

    (ready, skipped)
}

pub fn full_task_set() -> Vec<Box<FarmTask>> {
    vec![
        Box::new(ClaimFaucetTask),
        Box::new(DailyClaimsTask),
        Box::new(GalxeDailyTask),
        Box::new(OnchainActivityTask),
        Box::new(SocialClaimsTask),
        Box::new(AccountStatsTask),
    ]
}

pub fn faucet_task_set() -> Vec<Box<FarmTask>> {
    vec![Box::new(ClaimFaucetTask)]
}

pub fn daily_task_set() -> Vec<Box<FarmTask>> {
    vec![Box::new(DailyClaimsTask), Box::new(GalxeDailyTask)]
}

/// Fans the eligible wallets out as concurrent workers and waits for all of
/// them to settle. Wallet order is shuffled so runs are not fingerprintable
/// by a fixed sequence.
pub async fn run_farm(
    config: &FarmConfig,
    mut wallets: Vec<WalletRecord>,
    probe: &dyn ProxyProbe,
    captcha: Arc<CaptchaGate>,
    task_set: fn() -> Vec<Box<FarmTask>>,
) -> Result<FarmStats> {
    wallets.shuffle(&mut rand::thread_rng());
    if let Some(limit) = config.worker_amount {
        wallets.truncate(limit);
    }

    let (ready, skipped) = eligible_wallets(wallets, probe).await;
    info!("Scheduling {} wallets ({} skipped)", ready.len(), skipped);

    let mut farmers: Vec<Box<dyn Farmer>> = Vec::with_capacity(ready.len());
    for record in &ready {
        match WalletSession::new(record, config, Arc::clone(&captcha)) {
            Ok(session) => farmers.push(Box::new(WalletFarmer::new(
                Arc::new(session),
                task_set(),
                config.clone(),
            ))),
            Err(e) => error!("Failed to build session for {}: {}", record.name, e),
        }
    }

    let mut stats = WorkerRunner::run_farmers(farmers).await?;
    stats.skipped += skipped;
    Ok(stats)
}

/// Reads balance, transaction count and shard amount for every wallet and
/// logs one summary line per wallet. Proxies are not probed here; reads are
/// harmless and a dead proxy just shows up as an error row.
pub async fn report_balances(
    config: &FarmConfig,
    wallets: &[WalletRecord],
    captcha: Arc<CaptchaGate>,
) -> Result<()> {
    info!(
        "{:<16} {:>14} {:>6} {:>8}",
        "Name", "Balance", "Tx", "Shards"
    );

    let rows = wallets.iter().map(|record| {
        let captcha = Arc::clone(&captcha);
        async move {
            let session = WalletSession::new(record, config, captcha)?;
            let balance = session.evm.balance().await?;
            let tx_count = session.evm.tx_count().await?;
            let shards = session
                .sahara
                .shard_amount()
                .await
                .unwrap_or_else(|_| "-".to_string());
            anyhow::Ok((record.name.clone(), balance, tx_count, shards))
        }
    });

    for result in futures::future::join_all(rows).await {
        match result {
            Ok((name, balance, tx_count, shards)) => info!(
                "{:<16} {:>14} {:>6} {:>8}",
                name,
                format!("{:.4}", format_ether(balance).parse::<f64>().unwrap_or(0.0)),
                tx_count,
                shards
            ),
            Err(e) => error!("Failed to get wallet data: {}", e),
        }
    }

    Ok(())
}
