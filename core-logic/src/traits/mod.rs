use anyhow::Result;
use async_trait::async_trait;

/// Aggregate outcome of a farming run.
#[derive(Debug, Default, Clone)]
pub struct FarmStats {
    pub success: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl FarmStats {
    pub fn merge(&mut self, other: &FarmStats) {
        self.success += other.success;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// One concurrent worker, usually bound to a single wallet. Errors inside a
/// worker are contained by the runner and never abort sibling workers.
#[async_trait]
pub trait Farmer: Send + Sync {
    /// Display name used in spans and result lines
    fn name(&self) -> &str;

    /// Run the worker until done or cancelled
    async fn run(&self, cancellation_token: tokio_util::sync::CancellationToken)
        -> Result<FarmStats>;
}

#[derive(Debug, Clone)]
pub struct TaskResult {
    pub success: bool,
    pub message: String,
    pub tx_hash: Option<String>,
}

impl TaskResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            tx_hash: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            tx_hash: None,
        }
    }
}

#[async_trait]
pub trait Task<Ctx>: Send + Sync {
    /// Returns the name of the task
    fn name(&self) -> &str;

    /// Executes the task
    async fn run(&self, ctx: Ctx) -> Result<TaskResult>;
}

#[async_trait]
pub trait WalletLoader: Send + Sync {
    type Wallet;

    /// Load wallet records from a source (CSV file, etc.)
    async fn load_wallets(&self) -> Result<Vec<Self::Wallet>>;
}
