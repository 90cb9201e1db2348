use crate::sahara::tasks::GENERATE_TRANSACTION;
use crate::task::{human_pause, Task, TaskContext, TaskResult};
use anyhow::Result;
use async_trait::async_trait;
use ethers::types::{U256, U64};
use ethers::utils::format_ether;
use rand::Rng;
use tracing::{error, info};

// 0.0001 native units; below this a transfer would burn more than it proves
pub const MIN_ACTIVITY_BALANCE_WEI: u128 = 100_000_000_000_000;
const MAX_TRANSFER_WEI: u128 = 2_000_000_000_000_000; // 0.002 native units

pub fn meets_activity_threshold(balance: U256) -> bool {
    balance > U256::from(MIN_ACTIVITY_BALANCE_WEI)
}

pub fn random_transfer_amount() -> U256 {
    let wei = rand::thread_rng().gen_range(MIN_ACTIVITY_BALANCE_WEI..=MAX_TRANSFER_WEI);
    U256::from(wei)
}

/// Satisfies the "generate a transaction" quest with a small self-transfer,
/// then claims the quest. Guarded no-op when the balance is below the
/// activity threshold.
pub struct OnchainActivityTask;

#[async_trait]
impl Task<TaskContext> for OnchainActivityTask {
    async fn run(&self, ctx: TaskContext) -> Result<TaskResult> {
        let evm = &ctx.session.evm;

        let balance = evm.balance().await?;
        if !meets_activity_threshold(balance) {
            return Ok(TaskResult::ok(format!(
                "Balance {} below activity threshold, transfer skipped",
                format_ether(balance)
            )));
        }

        let amount = random_transfer_amount();
        if balance <= amount {
            return Ok(TaskResult::ok(
                "Balance too low for the drawn transfer amount, skipped",
            ));
        }

        info!("Sending self-transfer of {} SAH", format_ether(amount));
        let receipt = evm.send_self_transfer(amount).await?;
        let tx_hash = format!("{:?}", receipt.transaction_hash);

        if receipt.status != Some(U64::from(1)) {
            return Ok(TaskResult {
                success: false,
                message: "Self-transfer reverted".to_string(),
                tx_hash: Some(tx_hash),
            });
        }

        info!("Transaction successful! {}", evm.explorer_tx_url(&tx_hash));

        // Let the indexer pick the transfer up before claiming the quest
        human_pause(5..=10, &ctx.cancel).await;
        if let Err(e) = ctx.session.sahara.claim_task(&GENERATE_TRANSACTION).await {
            error!(
                "Failed to claim task {}: {}",
                GENERATE_TRANSACTION.name, e
            );
        }

        Ok(TaskResult {
            success: true,
            message: format!("Self-transfer of {} SAH", format_ether(amount)),
            tx_hash: Some(tx_hash),
        })
    }

    fn name(&self) -> &str {
        "03_onchainActivity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_excludes_dust_balances() {
        assert!(!meets_activity_threshold(U256::zero()));
        assert!(!meets_activity_threshold(U256::from(
            MIN_ACTIVITY_BALANCE_WEI
        )));
        assert!(meets_activity_threshold(U256::from(
            MIN_ACTIVITY_BALANCE_WEI + 1
        )));
    }

    #[test]
    fn drawn_amounts_stay_in_range() {
        for _ in 0..100 {
            let amount = random_transfer_amount();
            assert!(amount >= U256::from(MIN_ACTIVITY_BALANCE_WEI));
            assert!(amount <= U256::from(MAX_TRANSFER_WEI));
        }
    }
}
