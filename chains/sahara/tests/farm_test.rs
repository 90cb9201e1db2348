use async_trait::async_trait;
use core_logic::WalletRecord;
use sahara_project::farm::eligible_wallets;
use sahara_project::proxy_check::{ProxyCheck, ProxyProbe};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe512961708279f1d8a5c8f6a1a8d7e2";

fn wallet(name: &str, proxy: Option<&str>) -> WalletRecord {
    WalletRecord {
        name: name.to_string(),
        private_key: KEY.to_string(),
        proxy: proxy.map(str::to_string),
        ref_code: None,
    }
}

/// Probe that approves only an allow-listed set of proxies
struct FakeProbe {
    alive: HashSet<String>,
    calls: AtomicUsize,
    probed: Mutex<Vec<String>>,
}

impl FakeProbe {
    fn new(alive: &[&str]) -> Self {
        Self {
            alive: alive.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
            probed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ProxyProbe for FakeProbe {
    async fn check(&self, proxy: &str) -> ProxyCheck {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.probed.lock().unwrap().push(proxy.to_string());

        let working = self.alive.contains(proxy);
        ProxyCheck {
            proxy: proxy.to_string(),
            working,
            response_time_ms: working.then_some(42),
            ip: working.then(|| "1.2.3.4".to_string()),
            error: (!working).then(|| "connection refused".to_string()),
        }
    }
}

#[tokio::test]
async fn wallets_without_proxy_are_skipped_without_probing() {
    let probe = FakeProbe::new(&[]);
    let wallets = vec![wallet("w1", None), wallet("w2", None)];

    let (ready, skipped) = eligible_wallets(wallets, &probe).await;

    assert!(ready.is_empty());
    assert_eq!(skipped, 2);
    // No proxy means nothing to probe
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_probe_excludes_the_wallet() {
    let probe = FakeProbe::new(&["1.1.1.1:8080"]);
    let wallets = vec![
        wallet("alive", Some("1.1.1.1:8080")),
        wallet("dead", Some("2.2.2.2:8080")),
        wallet("bare", None),
    ];

    let (ready, skipped) = eligible_wallets(wallets, &probe).await;

    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].name, "alive");
    assert_eq!(skipped, 2);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn every_configured_proxy_is_probed_once() {
    let probe = FakeProbe::new(&["1.1.1.1:8080", "2.2.2.2:8080"]);
    let wallets = vec![
        wallet("w1", Some("1.1.1.1:8080")),
        wallet("w2", Some("2.2.2.2:8080")),
    ];

    let (ready, skipped) = eligible_wallets(wallets, &probe).await;

    assert_eq!(ready.len(), 2);
    assert_eq!(skipped, 0);

    let probed = probe.probed.lock().unwrap();
    assert_eq!(probed.len(), 2);
    assert!(probed.contains(&"1.1.1.1:8080".to_string()));
    assert!(probed.contains(&"2.2.2.2:8080".to_string()));
}
