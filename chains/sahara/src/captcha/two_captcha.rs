use super::{CaptchaSolver, GeeTestSolution};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use core_logic::{with_retry, CaptchaError, ProxyConfig, RetryConfig};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const API_BASE: &str = "https://api.2captcha.com";
const POLL_INTERVAL: Duration = Duration::from_secs(5);
// Give up on a submission after ~2 minutes; the gate resubmits
const MAX_POLLS: u32 = 24;

/// 2captcha backend speaking the `createTask`/`getTaskResult` JSON API.
pub struct TwoCaptcha {
    http: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct CreateTaskResponse {
    #[serde(rename = "errorId")]
    error_id: i64,
    #[serde(rename = "taskId")]
    task_id: Option<u64>,
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskResultResponse {
    #[serde(rename = "errorId")]
    error_id: i64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    solution: Option<Value>,
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

impl TwoCaptcha {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(crate::http::HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
        })
    }

    fn task_with_proxy(mut task: serde_json::Map<String, Value>, proxy: Option<&ProxyConfig>) -> Value {
        if let Some(conf) = proxy {
            if let Ok(url) = url::Url::parse(&conf.url) {
                let proxy_type = if url.scheme().starts_with("socks") {
                    "socks5"
                } else {
                    "http"
                };
                task.insert("proxyType".to_string(), json!(proxy_type));
                task.insert(
                    "proxyAddress".to_string(),
                    json!(url.host_str().unwrap_or_default()),
                );
                task.insert("proxyPort".to_string(), json!(url.port().unwrap_or(80)));
                if let (Some(user), Some(pass)) = (&conf.username, &conf.password) {
                    task.insert("proxyLogin".to_string(), json!(user));
                    task.insert("proxyPassword".to_string(), json!(pass));
                }
            }
        }
        Value::Object(task)
    }

    async fn create_task(&self, task: Value) -> Result<u64> {
        let body = json!({"clientKey": self.api_key, "task": task});

        let resp: CreateTaskResponse =
            with_retry(RetryConfig::new(2, 1000), "2captcha createTask", || async {
                Ok(self
                    .http
                    .post(format!("{}/createTask", API_BASE))
                    .json(&body)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?)
            })
            .await?;

        if resp.error_id != 0 {
            let code = resp.error_code.unwrap_or_else(|| "unknown".to_string());
            if code == "ERROR_KEY_DOES_NOT_EXIST" {
                bail!(CaptchaError::InvalidKey);
            }
            bail!(CaptchaError::Rejected { reason: code });
        }

        resp.task_id.context("createTask returned no task id")
    }

    async fn wait_result(&self, task_id: u64) -> Result<Value> {
        for _ in 0..MAX_POLLS {
            tokio::time::sleep(POLL_INTERVAL).await;

            let resp: TaskResultResponse = self
                .http
                .post(format!("{}/getTaskResult", API_BASE))
                .json(&json!({"clientKey": self.api_key, "taskId": task_id}))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            if resp.error_id != 0 {
                bail!(CaptchaError::Rejected {
                    reason: resp.error_code.unwrap_or_else(|| "unknown".to_string()),
                });
            }

            match resp.status.as_deref() {
                Some("ready") => {
                    return resp
                        .solution
                        .context("ready result carried no solution");
                }
                _ => debug!("Captcha task {} still processing", task_id),
            }
        }

        bail!(CaptchaError::Unsolved {
            task_id: task_id.to_string(),
        })
    }
}

#[async_trait]
impl CaptchaSolver for TwoCaptcha {
    async fn solve_hcaptcha(
        &self,
        site_key: &str,
        page_url: &str,
        user_agent: &str,
        proxy: Option<&ProxyConfig>,
    ) -> Result<String> {
        let mut task = serde_json::Map::new();
        let task_type = if proxy.is_some() {
            "HCaptchaTask"
        } else {
            "HCaptchaTaskProxyless"
        };
        task.insert("type".to_string(), json!(task_type));
        task.insert("websiteURL".to_string(), json!(page_url));
        task.insert("websiteKey".to_string(), json!(site_key));
        task.insert("userAgent".to_string(), json!(user_agent));
        let task = Self::task_with_proxy(task, proxy);

        let task_id = self.create_task(task).await?;
        let solution = self.wait_result(task_id).await?;

        solution
            .get("token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("hCaptcha solution missing token")
    }

    async fn solve_geetest_v4(
        &self,
        captcha_id: &str,
        page_url: &str,
        user_agent: &str,
        proxy: Option<&ProxyConfig>,
    ) -> Result<GeeTestSolution> {
        let mut task = serde_json::Map::new();
        let task_type = if proxy.is_some() {
            "GeeTestTask"
        } else {
            "GeeTestTaskProxyless"
        };
        task.insert("type".to_string(), json!(task_type));
        task.insert("websiteURL".to_string(), json!(page_url));
        task.insert("gt".to_string(), json!(captcha_id));
        task.insert("version".to_string(), json!(4));
        task.insert(
            "initParameters".to_string(),
            json!({"captcha_id": captcha_id}),
        );
        task.insert("userAgent".to_string(), json!(user_agent));
        let task = Self::task_with_proxy(task, proxy);

        let task_id = self.create_task(task).await?;
        let solution = self.wait_result(task_id).await?;

        Ok(serde_json::from_value(solution)
            .context("GeeTest solution in unexpected shape")?)
    }
}
