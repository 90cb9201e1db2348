use crate::http::build_client;
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::ProxyManager;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{error, info};

const PROBE_URL: &str = "http://ip-api.com/json";
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const BATCH_SIZE: usize = 5;

#[derive(Debug, Clone)]
pub struct ProxyCheck {
    pub proxy: String,
    pub working: bool,
    pub response_time_ms: Option<u64>,
    pub ip: Option<String>,
    pub error: Option<String>,
}

/// Liveness gate applied to a wallet's proxy before its session is built
#[async_trait]
pub trait ProxyProbe: Send + Sync {
    async fn check(&self, proxy: &str) -> ProxyCheck;
}

/// Probes by fetching the caller's public IP through the proxy
pub struct IpApiProbe;

#[async_trait]
impl ProxyProbe for IpApiProbe {
    async fn check(&self, proxy: &str) -> ProxyCheck {
        let started = Instant::now();
        match probe(proxy).await {
            Ok(ip) => ProxyCheck {
                proxy: proxy.to_string(),
                working: true,
                response_time_ms: Some(started.elapsed().as_millis() as u64),
                ip: Some(ip),
                error: None,
            },
            Err(e) => ProxyCheck {
                proxy: proxy.to_string(),
                working: false,
                response_time_ms: None,
                ip: None,
                error: Some(e.to_string()),
            },
        }
    }
}

async fn probe(proxy: &str) -> Result<String> {
    let conf = ProxyManager::parse(proxy)?;
    let client = build_client(Some(&conf))?;

    let response = client
        .get(PROBE_URL)
        .timeout(PROBE_TIMEOUT)
        .send()
        .await?
        .error_for_status()?;

    let body: Value = response.json().await?;
    body.get("query")
        .and_then(Value::as_str)
        .map(str::to_string)
        .context("Probe response missing query field")
}

/// Probes every proxy in small batches and reports the working ones sorted
/// by speed.
pub async fn check_all(probe: &dyn ProxyProbe, proxies: &[String]) -> Vec<ProxyCheck> {
    let mut results = Vec::with_capacity(proxies.len());

    for batch in proxies.chunks(BATCH_SIZE) {
        let checks = batch.iter().map(|proxy| {
            info!("Checking proxy: {}", proxy);
            probe.check(proxy)
        });
        let batch_results = futures::future::join_all(checks).await;

        for result in &batch_results {
            if result.working {
                info!(
                    "Proxy working: {} ({}ms) - IP: {}",
                    result.proxy,
                    result.response_time_ms.unwrap_or_default(),
                    result.ip.as_deref().unwrap_or("?")
                );
            } else {
                error!(
                    "Proxy failed: {} - {}",
                    result.proxy,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        results.extend(batch_results);

        // Pause between batches to avoid rate limiting the probe endpoint
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    let mut working: Vec<&ProxyCheck> = results.iter().filter(|r| r.working).collect();
    working.sort_by_key(|r| r.response_time_ms.unwrap_or(u64::MAX));

    info!("Working proxies: {}/{}", working.len(), proxies.len());
    for proxy in working {
        info!(
            "{} - {}ms - IP: {}",
            proxy.proxy,
            proxy.response_time_ms.unwrap_or_default(),
            proxy.ip.as_deref().unwrap_or("?")
        );
    }

    results
}
