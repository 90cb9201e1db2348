//! Sahara Legends client: wallet sign-in, task reconciliation, claims and
//! the faucet.

pub mod tasks;
pub mod types;

use crate::captcha::{CaptchaGate, FAUCET_HCAPTCHA_SITE_KEY, FAUCET_PAGE_URL};
use crate::evm::EvmClient;
use crate::fingerprint::generate_user_agent;
use crate::http::build_client;
use anyhow::{bail, Context, Result};
use core_logic::{NetworkError, ProxyConfig};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tasks::SaharaTask;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use types::{
    select_ready, ChallengeResponse, ConfigTable, FaucetResponse, SignInResponse, TaskStateMap,
    UserInfo,
};
use uuid::Uuid;

const API_URL: &str = "https://legends.saharalabs.ai/api/v1";
const ORIGIN: &str = "https://legends.saharalabs.ai";
const FAUCET_CLAIM_URL: &str = "https://faucet-api.saharaa.info/api/claim";
const FAUCET_ORIGIN: &str = "https://faucet.saharalabs.ai";
const WALLET_NAME: &str = "Rabby Wallet";

// Settle time between flushing one task and re-reading its status
const FLUSH_SETTLE: Duration = Duration::from_secs(1);

pub struct SaharaClient {
    http: Client,
    evm: Arc<EvmClient>,
    captcha: Arc<CaptchaGate>,
    account: String,
    ref_code: String,
    user_agent: String,
    proxy: Option<ProxyConfig>,
    token: RwLock<Option<String>>,
    sign_in_gate: Mutex<()>,
}

impl SaharaClient {
    pub fn new(
        account: &str,
        evm: Arc<EvmClient>,
        captcha: Arc<CaptchaGate>,
        ref_code: String,
        proxy: Option<ProxyConfig>,
    ) -> Result<Self> {
        let http = build_client(proxy.as_ref())?;
        Ok(Self {
            http,
            evm,
            captcha,
            account: account.to_string(),
            ref_code,
            user_agent: generate_user_agent(),
            proxy,
            token: RwLock::new(None),
            sign_in_gate: Mutex::new(()),
        })
    }

    async fn bearer(&self) -> String {
        match self.token.read().await.as_deref() {
            Some(token) => format!("Bearer {}", token),
            None => "Bearer null".to_string(),
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder, bearer: &str) -> reqwest::RequestBuilder {
        builder
            .header("accept-language", "en-US,en;q=0.5")
            .header("authorization", bearer)
            .header("origin", ORIGIN)
            .header("priority", "u=1, i")
            .header("referer", format!("{}/", ORIGIN))
            .header("user-agent", &self.user_agent)
    }

    /// Drops the stored token on a 401 so the next operation re-runs the
    /// handshake instead of replaying a dead session.
    async fn check_session(&self, response: Response, path: &str) -> Result<Response> {
        if response.status() == StatusCode::UNAUTHORIZED {
            *self.token.write().await = None;
            bail!(NetworkError::SessionExpired {
                endpoint: path.to_string(),
            });
        }
        Ok(response.error_for_status()?)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        let bearer = self.bearer().await;
        let builder = self.http.post(format!("{}{}", API_URL, path));
        let response = self.request(builder, &bearer).json(&body).send().await?;
        let response = self.check_session(response, path).await?;
        Ok(response.json().await?)
    }

    /// POST for endpoints whose response body is empty or irrelevant
    async fn post_empty(&self, path: &str, body: Option<Value>) -> Result<()> {
        let bearer = self.bearer().await;
        let mut builder = self.request(self.http.post(format!("{}{}", API_URL, path)), &bearer);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        let response = builder.send().await?;
        self.check_session(response, path).await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let bearer = self.bearer().await;
        let builder = self.http.get(format!("{}{}", API_URL, path));
        let response = self.request(builder, &bearer).send().await?;
        let response = self.check_session(response, path).await?;
        Ok(response.json().await?)
    }

    async fn get_challenge(&self) -> Result<String> {
        let response: ChallengeResponse = self
            .post(
                "/user/challenge",
                json!({"address": self.evm.address_lower()}),
            )
            .await?;
        Ok(response.challenge)
    }

    async fn handshake(&self) -> Result<String> {
        let challenge = self.get_challenge().await?;
        let message = format!("Sign in to Sahara!\nChallenge:{}", challenge);
        let signature = self.evm.sign_message(&message).await?;

        let response: SignInResponse = self
            .post(
                "/login/wallet",
                json!({
                    "address": self.evm.address_lower(),
                    "sig": signature,
                    "referralCode": self.ref_code,
                    "walletUUID": Uuid::new_v4().to_string(),
                    "walletName": WALLET_NAME,
                }),
            )
            .await?;

        Ok(response.access_token)
    }

    /// Signs in when no token is held. The gate serializes concurrent
    /// callers so one needs-token event triggers exactly one handshake.
    pub async fn ensure_signed_in(&self) -> Result<()> {
        if self.token.read().await.is_some() {
            return Ok(());
        }

        let _gate = self.sign_in_gate.lock().await;
        if self.token.read().await.is_some() {
            return Ok(());
        }

        let token = self.handshake().await?;
        *self.token.write().await = Some(token);
        info!("Account {} | Signed in to Sahara", self.account);
        Ok(())
    }

    /// Forces the server to recompute one task's status and re-reads it, so
    /// the claim that follows never races a stale prerequisite check. Flush
    /// failures are logged and do not block the claim attempt.
    async fn flush_task(&self, task_id: &str) {
        if let Err(e) = self
            .post_empty("/task/flush", Some(json!({"taskID": task_id})))
            .await
        {
            warn!("Account {} | Flush of task {} failed: {}", self.account, task_id, e);
        }

        tokio::time::sleep(FLUSH_SETTLE).await;

        if let Err(e) = self
            .post::<TaskStateMap>("/task/dataBatch", json!({"taskIDs": [task_id]}))
            .await
        {
            warn!(
                "Account {} | Status read for task {} failed: {}",
                self.account, task_id, e
            );
        }
    }

    pub async fn claim_task(&self, task: &SaharaTask) -> Result<()> {
        self.ensure_signed_in().await?;

        info!("Account {} | Start claiming task {}", self.account, task.name);
        self.flush_task(task.task_id).await;

        let _rewards: Value = self
            .post("/task/claim", json!({"taskID": task.task_id}))
            .await?;

        info!("Account {} | Task claimed: {}", self.account, task.name);
        Ok(())
    }

    /// Ready-to-claim ids among `wanted`, read against freshly flushed
    /// server-side state. Each call re-flushes and re-fetches; nothing is
    /// cached between calls.
    pub async fn unclaimed_tasks(&self, wanted: &[&str]) -> Result<Vec<String>> {
        self.ensure_signed_in().await?;

        self.post_empty("/task/flushAll", None).await?;

        let table: ConfigTable = self.get("/system/configTable").await?;
        let all_ids: Vec<&str> = table.task_map.values().map(|t| t.id.as_str()).collect();

        let states: TaskStateMap = self
            .post("/task/dataBatch", json!({"taskIDs": all_ids}))
            .await?;

        Ok(select_ready(&states, wanted))
    }

    pub async fn unclaimed_daily_tasks(&self) -> Result<Vec<String>> {
        let unclaimed = self.unclaimed_tasks(&tasks::daily_task_ids()).await?;
        info!(
            "Account {} | Found {} unclaimed daily tasks",
            self.account,
            unclaimed.len()
        );
        Ok(unclaimed)
    }

    pub async fn unclaimed_social_tasks(&self) -> Result<Vec<String>> {
        let unclaimed = self.unclaimed_tasks(&tasks::social_task_ids()).await?;
        info!(
            "Account {} | Found {} unclaimed social tasks",
            self.account,
            unclaimed.len()
        );
        Ok(unclaimed)
    }

    /// Solves the faucet hCaptcha and claims testnet tokens. Needs no
    /// session token; the faucet lives on its own host.
    pub async fn claim_faucet(&self, cancellation_token: &CancellationToken) -> Result<String> {
        info!("Account {} | Start getting tokens from faucet", self.account);

        let captcha_token = self
            .captcha
            .hcaptcha(
                &self.account,
                FAUCET_HCAPTCHA_SITE_KEY,
                FAUCET_PAGE_URL,
                &self.user_agent,
                self.proxy.as_ref(),
                cancellation_token,
            )
            .await?;

        let response = self
            .http
            .post(FAUCET_CLAIM_URL)
            .header("accept", "*/*")
            .header("accept-language", "en-US,en;q=0.8")
            .header("cache-control", "no-cache")
            .header("content-type", "application/json")
            .header("h-captcha-response", captcha_token)
            .header("origin", FAUCET_ORIGIN)
            .header("pragma", "no-cache")
            .header("priority", "u=1, i")
            .header("referer", format!("{}/", FAUCET_ORIGIN))
            .header("user-agent", &self.user_agent)
            .json(&json!({"address": self.evm.address_checksum()}))
            .send()
            .await?;

        let status = response.status();
        let body: FaucetResponse = response
            .json()
            .await
            .context("Faucet response was not JSON")?;

        if !status.is_success() {
            bail!("Faucet rejected the claim: {}", body.msg);
        }

        info!(
            "Account {} | Claimed tokens from faucet: {}",
            self.account, body.msg
        );
        Ok(body.msg)
    }

    /// Shard balance from the account profile
    pub async fn shard_amount(&self) -> Result<String> {
        self.ensure_signed_in().await?;
        let user: UserInfo = self.post("/user/info", json!({})).await?;
        Ok(user.shard_amount)
    }
}
