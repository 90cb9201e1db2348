use crate::config::FarmConfig;
use crate::session::WalletSession;
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub mod t01_claim_faucet;
pub mod t02_daily_claims;
pub mod t03_onchain_activity;
pub mod t04_galxe_daily;
pub mod t05_account_stats;
pub mod t06_social_claims;

pub use self::t01_claim_faucet::ClaimFaucetTask;
pub use self::t02_daily_claims::DailyClaimsTask;
pub use self::t03_onchain_activity::OnchainActivityTask;
pub use self::t04_galxe_daily::GalxeDailyTask;
pub use self::t05_account_stats::AccountStatsTask;
pub use self::t06_social_claims::SocialClaimsTask;

pub use core_logic::traits::{Task, TaskResult};

#[derive(Clone)]
pub struct TaskContext {
    pub session: Arc<WalletSession>,
    pub config: FarmConfig,
    pub cancel: CancellationToken,
}

// Trait alias
pub type FarmTask = dyn Task<TaskContext> + Send + Sync;

/// Random pause between sub-steps to mimic human pacing. Returns early if
/// the run is cancelled.
pub(crate) async fn human_pause(range: RangeInclusive<u64>, cancel: &CancellationToken) {
    let secs = rand::thread_rng().gen_range(range);
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
    }
}
