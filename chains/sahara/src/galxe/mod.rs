//! Galxe quest client: SIWE sign-in, account bootstrap, visit-page
//! credentials and loyalty-point claims over the GraphQL endpoint.

pub mod queries;
pub mod types;

use crate::captcha::{CaptchaGate, GALXE_GEETEST_ID, GALXE_PAGE_URL};
use crate::evm::EvmClient;
use crate::fingerprint::generate_user_agent;
use crate::http::build_client;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use core_logic::{NetworkError, ProxyConfig};
use rand::distributions::{Alphanumeric, DistString};
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::info;
use types::{
    AddressInfo, BasicUserInfoData, Campaign, CampaignData, CreateAccountData, GalxeIdExistData,
    GraphQlResponse, SignInData, UserNameExistsData,
};
use uuid::Uuid;

const GRAPHQL_URL: &str = "https://graphigo.prd.galaxy.eco/query";
const APP_DOMAIN: &str = "app.galxe.com";
const APP_URL: &str = "https://app.galxe.com";
const SIWE_CHAIN_ID: u64 = 1625;
// 96 bits of entropy over the base-62 alphabet
const SIWE_NONCE_LEN: usize = 17;

pub struct GalxeClient {
    http: Client,
    evm: Arc<EvmClient>,
    captcha: Arc<CaptchaGate>,
    account: String,
    user_agent: String,
    request_id: String,
    proxy: Option<ProxyConfig>,
    token: RwLock<Option<String>>,
    sign_in_gate: Mutex<()>,
}

impl GalxeClient {
    pub fn new(
        account: &str,
        evm: Arc<EvmClient>,
        captcha: Arc<CaptchaGate>,
        proxy: Option<ProxyConfig>,
    ) -> Result<Self> {
        let http = build_client(proxy.as_ref())?;
        Ok(Self {
            http,
            evm,
            captcha,
            account: account.to_string(),
            user_agent: generate_user_agent(),
            request_id: Uuid::new_v4().to_string(),
            proxy,
            token: RwLock::new(None),
            sign_in_gate: Mutex::new(()),
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        let body = json!({
            "operationName": operation,
            "query": query,
            "variables": variables,
        });

        let mut builder = self
            .http
            .post(GRAPHQL_URL)
            .header("Content-Type", "application/json")
            .header("Request-Id", &self.request_id)
            .header("User-Agent", &self.user_agent);

        // Galxe expects the raw token, no "Bearer " prefix
        if let Some(token) = self.token.read().await.as_deref() {
            builder = builder.header("authorization", token);
        }

        let response = builder.json(&body).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            *self.token.write().await = None;
            bail!(NetworkError::SessionExpired {
                endpoint: operation.to_string(),
            });
        }
        let response = response.error_for_status()?;

        let parsed: GraphQlResponse<T> = response.json().await?;
        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            bail!("{} failed: {}", operation, messages.join("; "));
        }

        parsed
            .data
            .with_context(|| format!("{} returned no data", operation))
    }

    fn evm_schema(&self) -> String {
        format!("EVM:{}", self.evm.address_checksum())
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        let data: UserNameExistsData = self
            .request(
                "UserNameExists",
                queries::USERNAME_EXISTS,
                json!({"username": username}),
            )
            .await?;
        Ok(data.user_name_exists.exists)
    }

    async fn galxe_id_exists(&self) -> Result<bool> {
        let data: GalxeIdExistData = self
            .request(
                "GalxeIDExist",
                queries::GALXE_ID_EXIST,
                json!({"schema": self.evm_schema()}),
            )
            .await?;
        Ok(data.galxe_id_exist)
    }

    /// Picks a unique human-looking username and registers the account.
    /// On collision a random digit is appended and uniqueness re-probed.
    async fn create_account(&self) -> Result<()> {
        let mut username = fake_username();
        let mut exists = self.username_exists(&username).await?;
        info!(
            "Account {} | Checking if username {} exists: {}",
            self.account, username, exists
        );

        while exists {
            username.push(char::from(b'0' + rand::thread_rng().gen_range(0..10u8)));
            exists = self.username_exists(&username).await?;
            info!(
                "Account {} | Checking if username {} exists: {}",
                self.account, username, exists
            );
        }

        info!(
            "Account {} | Start creating account with name: {}",
            self.account, username
        );
        let _: CreateAccountData = self
            .request(
                "CreateNewAccount",
                queries::CREATE_NEW_ACCOUNT,
                json!({"input": {
                    "schema": self.evm_schema(),
                    "socialUsername": username,
                    "username": username,
                }}),
            )
            .await?;

        Ok(())
    }

    async fn handshake(&self) -> Result<String> {
        info!("Account {} | Signing in to Galxe", self.account);

        let issued_at = Utc::now();
        let message = build_siwe_message(
            &self.evm.address_checksum(),
            &siwe_nonce(),
            issued_at,
            issued_at + chrono::Duration::days(7),
        );
        let signature = self.evm.sign_message(&message).await?;

        let data: SignInData = self
            .request(
                "SignIn",
                queries::SIGN_IN,
                json!({"input": {
                    "address": self.evm.address_checksum(),
                    "addressType": "EVM",
                    "message": message,
                    "signature": signature,
                }}),
            )
            .await?;

        Ok(data.signin)
    }

    async fn fetch_user_info(&self) -> Result<AddressInfo> {
        let data: BasicUserInfoData = self
            .request(
                "BasicUserInfo",
                queries::BASIC_USER_INFO,
                json!({"address": self.evm_schema()}),
            )
            .await?;
        Ok(data.address_info)
    }

    /// Signs in when no token is held; creates the Galxe account on first
    /// login. The gate serializes concurrent callers so one needs-token
    /// event triggers exactly one handshake.
    pub async fn ensure_logged_in(&self) -> Result<()> {
        if self.token.read().await.is_some() {
            return Ok(());
        }

        let _gate = self.sign_in_gate.lock().await;
        if self.token.read().await.is_some() {
            return Ok(());
        }

        let id_exists = self.galxe_id_exists().await?;
        let token = self.handshake().await?;
        *self.token.write().await = Some(token);

        if !id_exists {
            self.create_account().await?;
        }

        let user = self.fetch_user_info().await?;
        info!(
            "Account {} | Signed in to Galxe as {}",
            self.account, user.username
        );
        Ok(())
    }

    pub async fn campaign_detail(&self, campaign_id: &str) -> Result<Campaign> {
        self.ensure_logged_in().await?;
        let data: CampaignData = self
            .request(
                "CampaignDetailAll",
                queries::CAMPAIGN_DETAIL,
                json!({
                    "address": self.evm.address_checksum(),
                    "id": campaign_id,
                    "withAddress": true,
                }),
            )
            .await?;
        Ok(data.campaign)
    }

    /// Records the "visited link" evidence for a credential. The mutation is
    /// awaited and checked; success is only reported once the server
    /// accepted the captcha-carrying payload.
    pub async fn complete_visit_page(
        &self,
        cred_id: &str,
        campaign_id: &str,
        cancellation_token: &CancellationToken,
    ) -> Result<()> {
        self.ensure_logged_in().await?;

        info!("Account {} | Start task {}", self.account, cred_id);
        let solution = self
            .captcha
            .geetest(
                &self.account,
                GALXE_GEETEST_ID,
                GALXE_PAGE_URL,
                &self.user_agent,
                self.proxy.as_ref(),
                cancellation_token,
            )
            .await?;

        let _: Value = self
            .request(
                "AddTypedCredentialItems",
                queries::ADD_TYPED_CREDENTIAL_ITEMS,
                json!({"input": {
                    "credId": cred_id,
                    "campaignId": campaign_id,
                    "operation": "APPEND",
                    "items": [self.evm_schema()],
                    "captcha": {
                        "lotNumber": solution.lot_number,
                        "captchaOutput": solution.captcha_output,
                        "passToken": solution.pass_token,
                        "genTime": solution.gen_time,
                    },
                }}),
            )
            .await?;

        info!(
            "Account {} | Successfully completed task {}",
            self.account, cred_id
        );
        Ok(())
    }

    pub async fn claim_credential(&self, cred_id: &str) -> Result<()> {
        self.ensure_logged_in().await?;

        info!("Account {} | Start claim task {}", self.account, cred_id);
        let _: Value = self
            .request(
                "SyncCredentialValue",
                queries::SYNC_CREDENTIAL_VALUE,
                json!({"input": {
                    "syncOptions": {
                        "credId": cred_id,
                        "address": self.evm_schema(),
                    },
                }}),
            )
            .await?;

        info!(
            "Account {} | Successfully claimed task {}",
            self.account, cred_id
        );
        Ok(())
    }
}

pub(crate) fn siwe_nonce() -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), SIWE_NONCE_LEN)
}

pub(crate) fn build_siwe_message(
    address: &str,
    nonce: &str,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> String {
    format!(
        "{domain} wants you to sign in with your Ethereum account:\n{address}\n\n\
         Sign in with Ethereum to the app.\n\n\
         URI: {url}\n\
         Version: 1\n\
         Chain ID: {chain_id}\n\
         Nonce: {nonce}\n\
         Issued At: {issued}\n\
         Expiration Time: {expires}",
        domain = APP_DOMAIN,
        address = address,
        url = APP_URL,
        chain_id = SIWE_CHAIN_ID,
        nonce = nonce,
        issued = issued_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
        expires = expires_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
    )
}

/// A human-looking username candidate, always at least 4 characters
pub(crate) fn fake_username() -> String {
    const ADJECTIVES: [&str; 12] = [
        "swift", "lucky", "cosmic", "silent", "brave", "fuzzy", "golden", "wild", "cyber",
        "mellow", "rapid", "shadow",
    ];
    const NOUNS: [&str; 12] = [
        "falcon", "panda", "wolf", "otter", "comet", "sprout", "raven", "tiger", "pixel",
        "nomad", "drift", "ember",
    ];

    let mut rng = rand::thread_rng();
    let mut name = format!(
        "{}{}",
        ADJECTIVES.choose(&mut rng).unwrap(),
        NOUNS.choose(&mut rng).unwrap()
    );
    if rng.gen_bool(0.5) {
        name.push_str(&rng.gen_range(1..=99).to_string());
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn siwe_message_carries_the_window() {
        let issued = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let expires = issued + chrono::Duration::days(7);
        let message = build_siwe_message("0xAbC1", "N0nceN0nceN0nce17", issued, expires);

        assert!(message.starts_with("app.galxe.com wants you to sign in"));
        assert!(message.contains("0xAbC1"));
        assert!(message.contains("Chain ID: 1625"));
        assert!(message.contains("Issued At: 2025-03-01T12:00:00.000Z"));
        assert!(message.contains("Expiration Time: 2025-03-08T12:00:00.000Z"));
    }

    #[test]
    fn nonce_has_expected_length_and_alphabet() {
        for _ in 0..20 {
            let nonce = siwe_nonce();
            assert_eq!(nonce.len(), SIWE_NONCE_LEN);
            assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn usernames_are_long_enough() {
        for _ in 0..50 {
            assert!(fake_username().len() >= 4);
        }
    }
}
