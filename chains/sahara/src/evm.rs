use crate::config::FarmConfig;
use crate::http::build_client;
use anyhow::{bail, Context, Result};
use core_logic::ProxyConfig;
use ethers::middleware::SignerMiddleware;
use ethers::prelude::*;
use ethers::utils::to_checksum;

/// Chain access for one wallet: signing, reads and the plain native
/// transfer the activity quest needs. All RPC traffic goes through the
/// wallet's own proxy.
pub struct EvmClient {
    provider: Provider<Http>,
    wallet: LocalWallet,
    explorer: String,
}

impl EvmClient {
    pub fn new(
        config: &FarmConfig,
        private_key: &str,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Self> {
        let client = build_client(proxy)?;
        let provider = Provider::new(Http::new_with_client(
            reqwest::Url::parse(&config.rpc_url)?,
            client,
        ));

        let wallet = private_key
            .parse::<LocalWallet>()
            .context("Invalid private key")?
            .with_chain_id(config.chain_id);

        Ok(Self {
            provider,
            wallet,
            explorer: config.explorer.clone(),
        })
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// EIP-55 checksummed address string
    pub fn address_checksum(&self) -> String {
        to_checksum(&self.wallet.address(), None)
    }

    /// Full lowercase hex address string
    pub fn address_lower(&self) -> String {
        format!("{:?}", self.wallet.address())
    }

    pub fn explorer_tx_url(&self, hash: &str) -> String {
        format!("{}tx/{}", self.explorer, hash)
    }

    /// Signs a UTF-8 message, returning the 65-byte signature as 0x-hex
    pub async fn sign_message(&self, message: &str) -> Result<String> {
        let signature = self.wallet.sign_message(message).await?;
        Ok(format!("0x{}", hex::encode(signature.to_vec())))
    }

    pub async fn balance(&self) -> Result<U256> {
        Ok(self.provider.get_balance(self.address(), None).await?)
    }

    pub async fn tx_count(&self) -> Result<U256> {
        Ok(self
            .provider
            .get_transaction_count(self.address(), None)
            .await?)
    }

    /// Sends `value` to the wallet's own address and waits for inclusion.
    /// Self-transfers exist purely to generate on-chain activity.
    pub async fn send_self_transfer(&self, value: U256) -> Result<TransactionReceipt> {
        let client = SignerMiddleware::new(self.provider.clone(), self.wallet.clone());
        let tx = TransactionRequest::pay(self.address(), value).from(self.address());

        let pending_tx = client.send_transaction(tx, None).await?;
        let receipt = pending_tx.await?;

        match receipt {
            Some(r) => Ok(r),
            None => bail!("Transaction dropped from mempool"),
        }
    }
}
