use anyhow::Result;
use config::{Config, File};
use core_logic::ConfigError;
use rand::seq::SliceRandom;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CaptchaSettings {
    pub rucaptcha_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FarmConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    #[serde(default = "default_explorer")]
    pub explorer: String,
    pub captcha: CaptchaSettings,
    /// Referral codes assigned to wallets that carry none of their own
    #[serde(default)]
    pub ref_codes: Vec<String>,
    /// Cap on concurrently farmed wallets; all wallets when unset
    pub worker_amount: Option<usize>,
    #[serde(default = "default_min_delay")]
    pub min_delay_secs: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,
}

fn default_explorer() -> String {
    "https://testnet-explorer.saharalabs.ai/".to_string()
}

fn default_min_delay() -> u64 {
    3
}

fn default_max_delay() -> u64 {
    10
}

impl FarmConfig {
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))
    }

    pub fn validate(&self) -> Result<()> {
        if self.captcha.rucaptcha_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "captcha.rucaptcha_key".to_string(),
            }
            .into());
        }
        if self.min_delay_secs > self.max_delay_secs {
            return Err(ConfigError::InvalidValue {
                field: "min_delay_secs".to_string(),
                reason: "must not exceed max_delay_secs".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// A referral code for a wallet that has none of its own
    pub fn random_ref_code(&self) -> Option<String> {
        self.ref_codes
            .choose(&mut rand::thread_rng())
            .filter(|c| !c.is_empty())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> FarmConfig {
        FarmConfig {
            rpc_url: "https://testnet.saharalabs.ai".to_string(),
            chain_id: 313313,
            explorer: default_explorer(),
            captcha: CaptchaSettings {
                rucaptcha_key: "key".to_string(),
            },
            ref_codes: vec![],
            worker_amount: None,
            min_delay_secs: 3,
            max_delay_secs: 10,
        }
    }

    #[test]
    fn validate_accepts_sane_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_captcha_key() {
        let mut config = base_config();
        config.captcha.rucaptcha_key = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_delays() {
        let mut config = base_config();
        config.min_delay_secs = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn ref_code_ignores_empty_entries() {
        let mut config = base_config();
        config.ref_codes = vec!["".to_string()];
        assert!(config.random_ref_code().is_none());

        config.ref_codes = vec!["REF1".to_string()];
        assert_eq!(config.random_ref_code().as_deref(), Some("REF1"));
    }
}
