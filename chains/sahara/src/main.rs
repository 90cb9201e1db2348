use sahara_project::captcha::{CaptchaGate, TwoCaptcha};
use sahara_project::config::FarmConfig;
use sahara_project::farm;
use sahara_project::proxy_check::{self, IpApiProbe};

use anyhow::Result;
use clap::Parser;
use core_logic::{setup_logger, WalletManager};
use dialoguer::{theme::ColorfulTheme, Select};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chains/sahara/config.toml")]
    config: String,
    /// Path to the wallet CSV
    #[arg(short, long, default_value = WalletManager::DEFAULT_CSV)]
    wallets: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = setup_logger();
    // Keep guard alive for file logging
    std::mem::forget(_log_guard);
    dotenv().ok();

    let args = Args::parse();
    info!("Loading config from: {}", args.config);

    let mut config = match FarmConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            return Ok(());
        }
    };

    // Env var wins over the config file so keys can stay out of it
    if let Ok(key) = std::env::var("RUCAPTCHA_KEY") {
        config.captcha.rucaptcha_key = key;
    }

    let manager = WalletManager::with_path(&args.wallets);

    let items = [
        "Farm (faucet + quests + onchain activity)",
        "Claim faucet only",
        "Claim daily quests only",
        "Show balances",
        "Check proxies",
        "Create CSV template",
    ];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Choose option")
        .items(&items)
        .default(0)
        .interact()?;

    if selection == 5 {
        if manager.create_template()? {
            info!("CSV template created at {:?}", manager.path());
        } else {
            info!("CSV already exists at {:?}, not overwriting", manager.path());
        }
        return Ok(());
    }

    let wallets = match manager.load() {
        Ok(w) if !w.is_empty() => w,
        Ok(_) => {
            error!("No wallets found in {:?}", manager.path());
            return Ok(());
        }
        Err(e) => {
            error!("Failed to load wallets: {}", e);
            return Ok(());
        }
    };
    info!("Loaded {} wallets", wallets.len());

    match selection {
        0 | 1 | 2 => {
            if let Err(e) = config.validate() {
                error!("{}", e);
                error!("Please set your captcha key in {} and try again", args.config);
                return Ok(());
            }

            let solver = Arc::new(TwoCaptcha::new(config.captcha.rucaptcha_key.clone())?);
            let captcha = Arc::new(CaptchaGate::new(solver));

            let task_set = match selection {
                1 => farm::faucet_task_set,
                2 => farm::daily_task_set,
                _ => farm::full_task_set,
            };

            farm::run_farm(&config, wallets, &IpApiProbe, captcha, task_set).await?;
        }
        3 => {
            let solver = Arc::new(TwoCaptcha::new(config.captcha.rucaptcha_key.clone())?);
            let captcha = Arc::new(CaptchaGate::new(solver));
            farm::report_balances(&config, &wallets, captcha).await?;
        }
        4 => {
            let proxies: Vec<String> = wallets.iter().filter_map(|w| w.proxy.clone()).collect();
            if proxies.is_empty() {
                error!("No proxies configured in the wallet CSV");
                return Ok(());
            }
            proxy_check::check_all(&IpApiProbe, &proxies).await;
        }
        _ => unreachable!(),
    }

    Ok(())
}
