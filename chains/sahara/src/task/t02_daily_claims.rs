use crate::sahara::tasks::{VISIT_BLOG, VISIT_X};
use crate::task::{human_pause, Task, TaskContext, TaskResult};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error};

/// Claims the daily visit tasks that are ready. Task state is reconciled
/// against freshly flushed server-side status before any claim goes out;
/// the transaction task is handled by the onchain activity step.
pub struct DailyClaimsTask;

#[async_trait]
impl Task<TaskContext> for DailyClaimsTask {
    async fn run(&self, ctx: TaskContext) -> Result<TaskResult> {
        let sahara = &ctx.session.sahara;
        let ready = sahara.unclaimed_daily_tasks().await?;

        let mut claimed = 0;
        for task in [VISIT_X, VISIT_BLOG] {
            if ctx.cancel.is_cancelled() {
                break;
            }
            if !ready.iter().any(|id| id == task.task_id) {
                debug!("Task {} not ready to claim, skipping", task.name);
                continue;
            }

            human_pause(1..=5, &ctx.cancel).await;
            match sahara.claim_task(&task).await {
                Ok(()) => claimed += 1,
                Err(e) => error!("Failed to claim task {}: {}", task.name, e),
            }
        }

        Ok(TaskResult::ok(format!(
            "Claimed {}/{} ready daily tasks",
            claimed,
            ready.len()
        )))
    }

    fn name(&self) -> &str {
        "02_dailyClaims"
    }
}
