use anyhow::{bail, Result};
use async_trait::async_trait;
use core_logic::ProxyConfig;
use sahara_project::captcha::{CaptchaGate, CaptchaSolver, GeeTestSolution};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Solver that fails a configured number of times before succeeding
struct FlakySolver {
    failures_before_success: usize,
    attempts: AtomicUsize,
}

impl FlakySolver {
    fn new(failures_before_success: usize) -> Self {
        Self {
            failures_before_success,
            attempts: AtomicUsize::new(0),
        }
    }

    fn attempt(&self) -> Result<usize> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures_before_success {
            bail!("vendor timeout");
        }
        Ok(attempt)
    }
}

#[async_trait]
impl CaptchaSolver for FlakySolver {
    async fn solve_hcaptcha(
        &self,
        _site_key: &str,
        _page_url: &str,
        _user_agent: &str,
        _proxy: Option<&ProxyConfig>,
    ) -> Result<String> {
        self.attempt().map(|n| format!("token-{}", n))
    }

    async fn solve_geetest_v4(
        &self,
        _captcha_id: &str,
        _page_url: &str,
        _user_agent: &str,
        _proxy: Option<&ProxyConfig>,
    ) -> Result<GeeTestSolution> {
        self.attempt().map(|n| GeeTestSolution {
            captcha_id: String::new(),
            lot_number: format!("lot-{}", n),
            pass_token: "pass".to_string(),
            gen_time: "0".to_string(),
            captcha_output: "out".to_string(),
        })
    }
}

fn gate_over(solver: Arc<FlakySolver>) -> CaptchaGate {
    CaptchaGate::new(solver).with_retry_delay(Duration::from_millis(5))
}

#[tokio::test]
async fn hcaptcha_retries_until_solved() {
    let solver = Arc::new(FlakySolver::new(4));
    let gate = gate_over(Arc::clone(&solver));
    let token = CancellationToken::new();

    let result = gate
        .hcaptcha("w1", "site", "https://example.com/", "ua", None, &token)
        .await
        .expect("gate must surface the eventual success");

    assert_eq!(result, "token-5");
    assert_eq!(solver.attempts.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn geetest_first_try_needs_one_attempt() {
    let solver = Arc::new(FlakySolver::new(0));
    let gate = gate_over(Arc::clone(&solver));
    let token = CancellationToken::new();

    let solution = gate
        .geetest("w1", "captcha-id", "https://example.com/", "ua", None, &token)
        .await
        .expect("solve");

    assert_eq!(solution.lot_number, "lot-1");
    assert_eq!(solver.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancellation_stops_the_loop() {
    // Never succeeds; the loop must exit through the token
    let solver = Arc::new(FlakySolver::new(usize::MAX));
    let gate = gate_over(Arc::clone(&solver));
    let token = CancellationToken::new();

    let cancel_handle = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(25)).await;
        cancel_handle.cancel();
    });

    let result = gate
        .hcaptcha("w1", "site", "https://example.com/", "ua", None, &token)
        .await;

    assert!(result.is_err());
    assert!(solver.attempts.load(Ordering::SeqCst) >= 1);
}
