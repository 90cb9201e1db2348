use core_logic::{WalletLoader, WalletManager};

const KEY_A: &str = "4c0883a69102937d6231471b5dbb6204fe512961708279f1d8a5c8f6a1a8d7e2";
const KEY_B: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

fn write_csv(content: &str) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().expect("tempfile");
    std::fs::write(file.path(), content).expect("write csv");
    file
}

#[tokio::test]
async fn loads_records_and_skips_header() {
    let csv = format!(
        "name,private key,proxy,ref code\n\
         w1,0x{KEY_A},http://u:p@1.2.3.4:8080,REF1\n\
         w2,{KEY_B},,\n"
    );
    let file = write_csv(&csv);

    let manager = WalletManager::with_path(file.path());
    let wallets = manager.load_wallets().await.expect("load");

    assert_eq!(wallets.len(), 2);
    assert_eq!(wallets[0].name, "w1");
    assert!(wallets[0].proxy.is_some());
    assert_eq!(wallets[0].ref_code.as_deref(), Some("REF1"));
    assert_eq!(wallets[1].name, "w2");
    assert!(wallets[1].proxy.is_none());
    assert!(wallets[1].ref_code.is_none());
}

#[tokio::test]
async fn skips_blank_lines_and_duplicates() {
    let csv = format!(
        "name,private key,proxy,ref code\n\
         \n\
         w1,{KEY_A},,\n\
         w1,{KEY_B},,\n"
    );
    let file = write_csv(&csv);

    let wallets = WalletManager::with_path(file.path()).load().expect("load");
    assert_eq!(wallets.len(), 1);
}

#[tokio::test]
async fn rejects_malformed_private_key() {
    let file = write_csv("w1,not-a-key,,\n");
    assert!(WalletManager::with_path(file.path()).load().is_err());
}

#[test]
fn template_is_created_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wallets.csv");

    let manager = WalletManager::with_path(&path);
    assert!(manager.create_template().expect("create"));
    // Second call must not overwrite
    assert!(!manager.create_template().expect("create again"));

    let content = std::fs::read_to_string(&path).expect("read");
    assert!(content.starts_with("name,private key"));
}
