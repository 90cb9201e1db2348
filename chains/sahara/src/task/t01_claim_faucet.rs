use crate::task::{Task, TaskContext, TaskResult};
use anyhow::Result;
use async_trait::async_trait;

/// Claims testnet tokens from the faucet. Unconditional: the faucet needs
/// no balance and no session, only a solved captcha.
pub struct ClaimFaucetTask;

#[async_trait]
impl Task<TaskContext> for ClaimFaucetTask {
    async fn run(&self, ctx: TaskContext) -> Result<TaskResult> {
        let msg = ctx.session.sahara.claim_faucet(&ctx.cancel).await?;

        let tx_hash = msg.strip_prefix("Txhash:").map(str::to_string);
        Ok(TaskResult {
            success: true,
            message: msg,
            tx_hash,
        })
    }

    fn name(&self) -> &str {
        "01_claimFaucet"
    }
}
