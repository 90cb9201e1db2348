use crate::sahara::tasks::{task_name, SOCIAL_TASKS};
use crate::task::{human_pause, Task, TaskContext, TaskResult};
use anyhow::Result;
use async_trait::async_trait;
use tracing::error;

/// Claims social tasks (follow, like, repost) that the account owner has
/// already performed elsewhere. Only ids the server reports as
/// ready-to-claim are touched.
pub struct SocialClaimsTask;

#[async_trait]
impl Task<TaskContext> for SocialClaimsTask {
    async fn run(&self, ctx: TaskContext) -> Result<TaskResult> {
        let sahara = &ctx.session.sahara;
        let ready = sahara.unclaimed_social_tasks().await?;

        if ready.is_empty() {
            return Ok(TaskResult::ok("No social tasks ready to claim"));
        }

        let mut claimed = 0;
        for id in &ready {
            if ctx.cancel.is_cancelled() {
                break;
            }
            let Some(task) = SOCIAL_TASKS.iter().find(|t| t.task_id == id) else {
                continue;
            };

            human_pause(1..=5, &ctx.cancel).await;
            match sahara.claim_task(task).await {
                Ok(()) => claimed += 1,
                Err(e) => error!(
                    "Failed to claim task {}: {}",
                    task_name(id).unwrap_or(id),
                    e
                ),
            }
        }

        Ok(TaskResult::ok(format!(
            "Claimed {}/{} ready social tasks",
            claimed,
            ready.len()
        )))
    }

    fn name(&self) -> &str {
        "06_socialClaims"
    }
}
