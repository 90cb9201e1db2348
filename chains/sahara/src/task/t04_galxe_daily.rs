use crate::sahara::tasks::{VISIT_BLOG, VISIT_X};
use crate::task::{human_pause, Task, TaskContext, TaskResult};
use anyhow::Result;
use async_trait::async_trait;
use tracing::error;

// Gobi bear daily campaign
const DAILY_CAMPAIGN_ID: &str = "GCNLYtpFM5";

/// Records the visit-page evidence for the daily Galxe credentials, then
/// claims their loyalty points. Skips the whole round when the campaign has
/// nothing left to claim.
pub struct GalxeDailyTask;

#[async_trait]
impl Task<TaskContext> for GalxeDailyTask {
    async fn run(&self, ctx: TaskContext) -> Result<TaskResult> {
        let galxe = &ctx.session.galxe;

        let campaign = galxe.campaign_detail(DAILY_CAMPAIGN_ID).await?;
        if campaign.is_already_claimed() {
            return Ok(TaskResult::ok("Campaign points already claimed today"));
        }

        let mut processed = 0;
        for task in [VISIT_X, VISIT_BLOG] {
            let Some(cred_id) = task.galxe_cred_id else {
                continue;
            };
            if ctx.cancel.is_cancelled() {
                break;
            }

            human_pause(3..=10, &ctx.cancel).await;
            if let Err(e) = galxe
                .complete_visit_page(cred_id, DAILY_CAMPAIGN_ID, &ctx.cancel)
                .await
            {
                error!("Visit-page for credential {} failed: {}", cred_id, e);
                continue;
            }

            human_pause(3..=10, &ctx.cancel).await;
            match galxe.claim_credential(cred_id).await {
                Ok(()) => processed += 1,
                Err(e) => error!("Claim of credential {} failed: {}", cred_id, e),
            }
        }

        Ok(TaskResult::ok(format!(
            "Processed {} Galxe credentials",
            processed
        )))
    }

    fn name(&self) -> &str {
        "04_galxeDaily"
    }
}
