use crate::captcha::CaptchaGate;
use crate::config::FarmConfig;
use crate::evm::EvmClient;
use crate::galxe::GalxeClient;
use crate::sahara::SaharaClient;
use anyhow::Result;
use core_logic::{ProxyManager, WalletRecord};
use std::sync::Arc;

/// Composition root for one wallet: the chain client plus one authenticated
/// session per platform, all bound to the wallet's proxy. Nothing here is
/// shared across wallets.
pub struct WalletSession {
    pub name: String,
    pub evm: Arc<EvmClient>,
    pub sahara: SaharaClient,
    pub galxe: GalxeClient,
}

impl WalletSession {
    pub fn new(
        record: &WalletRecord,
        config: &FarmConfig,
        captcha: Arc<CaptchaGate>,
    ) -> Result<Self> {
        let proxy = record
            .proxy
            .as_deref()
            .map(ProxyManager::parse)
            .transpose()?;

        let evm = Arc::new(EvmClient::new(config, &record.private_key, proxy.as_ref())?);

        let ref_code = record
            .ref_code
            .clone()
            .or_else(|| config.random_ref_code())
            .unwrap_or_default();

        let sahara = SaharaClient::new(
            &record.name,
            Arc::clone(&evm),
            Arc::clone(&captcha),
            ref_code,
            proxy.clone(),
        )?;
        let galxe = GalxeClient::new(&record.name, Arc::clone(&evm), captcha, proxy)?;

        Ok(Self {
            name: record.name.clone(),
            evm,
            sahara,
            galxe,
        })
    }
}
