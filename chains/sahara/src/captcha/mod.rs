//! Captcha solving behind an infinite-but-cancellable retry gate.
//!
//! Both platforms put a captcha in front of the calls that matter and there
//! is no fallback path around them, so the gate keeps resubmitting until the
//! solver produces a token or the run is cancelled.

mod two_captcha;

pub use two_captcha::TwoCaptcha;

use anyhow::Result;
use async_trait::async_trait;
use core_logic::{retry_until_solved, ProxyConfig};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const FAUCET_HCAPTCHA_SITE_KEY: &str = "94998d34-914f-4b97-8510-b3dc0d8e4aef";
pub const FAUCET_PAGE_URL: &str = "https://faucet.saharalabs.ai/";
pub const GALXE_GEETEST_ID: &str = "244bcb8b9846215df5af4c624a750db4";
pub const GALXE_PAGE_URL: &str = "https://app.galxe.com/quest";

/// GeeTest v4 widget solution, submitted verbatim to Galxe
#[derive(Debug, Clone, Deserialize)]
pub struct GeeTestSolution {
    #[serde(default)]
    pub captcha_id: String,
    pub lot_number: String,
    pub pass_token: String,
    pub gen_time: String,
    pub captcha_output: String,
}

/// One solving backend. Implementations perform a single solve attempt;
/// retry policy lives in [`CaptchaGate`].
#[async_trait]
pub trait CaptchaSolver: Send + Sync {
    async fn solve_hcaptcha(
        &self,
        site_key: &str,
        page_url: &str,
        user_agent: &str,
        proxy: Option<&ProxyConfig>,
    ) -> Result<String>;

    async fn solve_geetest_v4(
        &self,
        captcha_id: &str,
        page_url: &str,
        user_agent: &str,
        proxy: Option<&ProxyConfig>,
    ) -> Result<GeeTestSolution>;
}

/// Wraps a solver with unbounded retry. Attempts continue until a solution
/// arrives or the cancellation token fires; vendor flakiness never surfaces
/// to the orchestration layer as an error.
pub struct CaptchaGate {
    solver: Arc<dyn CaptchaSolver>,
    retry_delay: Duration,
}

impl CaptchaGate {
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

    pub fn new(solver: Arc<dyn CaptchaSolver>) -> Self {
        Self {
            solver,
            retry_delay: Self::DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub async fn hcaptcha(
        &self,
        account: &str,
        site_key: &str,
        page_url: &str,
        user_agent: &str,
        proxy: Option<&ProxyConfig>,
        cancellation_token: &CancellationToken,
    ) -> Result<String> {
        info!("Account {} | Start solving hCaptcha", account);
        let token = retry_until_solved(
            self.retry_delay,
            "hCaptcha solve",
            cancellation_token,
            || self.solver.solve_hcaptcha(site_key, page_url, user_agent, proxy),
        )
        .await?;
        info!("Account {} | hCaptcha solved", account);
        Ok(token)
    }

    pub async fn geetest(
        &self,
        account: &str,
        captcha_id: &str,
        page_url: &str,
        user_agent: &str,
        proxy: Option<&ProxyConfig>,
        cancellation_token: &CancellationToken,
    ) -> Result<GeeTestSolution> {
        info!("Account {} | Start solving GeeTest captcha", account);
        let solution = retry_until_solved(
            self.retry_delay,
            "GeeTest solve",
            cancellation_token,
            || self.solver.solve_geetest_v4(captcha_id, page_url, user_agent, proxy),
        )
        .await?;
        info!("Account {} | GeeTest solved", account);
        Ok(solution)
    }
}
