use crate::task::{Task, TaskContext, TaskResult};
use anyhow::Result;
use async_trait::async_trait;
use ethers::utils::format_ether;
use tracing::warn;

/// Pure reads: native balance, transaction count and shard amount.
pub struct AccountStatsTask;

#[async_trait]
impl Task<TaskContext> for AccountStatsTask {
    async fn run(&self, ctx: TaskContext) -> Result<TaskResult> {
        let evm = &ctx.session.evm;

        let (balance, tx_count) = futures::try_join!(evm.balance(), evm.tx_count())?;
        let shards = match ctx.session.sahara.shard_amount().await {
            Ok(amount) => amount,
            Err(e) => {
                warn!("Shard amount unavailable: {}", e);
                "-".to_string()
            }
        };

        Ok(TaskResult::ok(format!(
            "Balance: {} SAH | Tx: {} | Shards: {}",
            format_ether(balance),
            tx_count,
            shards
        )))
    }

    fn name(&self) -> &str {
        "05_accountStats"
    }
}
