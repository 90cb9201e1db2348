use crate::error::WalletError;
use crate::traits::WalletLoader;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

const CSV_HEADER: &str = "name,private key,proxy,ref code";

/// One wallet row from `wallets.csv`. Immutable for the duration of a run.
///
/// The private key is zeroized on drop and redacted from Debug output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WalletRecord {
    #[zeroize(skip)]
    pub name: String,
    pub private_key: String,
    #[zeroize(skip)]
    pub proxy: Option<String>,
    #[zeroize(skip)]
    pub ref_code: Option<String>,
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("name", &self.name)
            .field("private_key", &"***REDACTED***")
            .field("proxy", &self.proxy)
            .field("ref_code", &self.ref_code)
            .finish()
    }
}

/// Loads wallet records from a CSV file with columns
/// `name,private key,proxy,ref code` (proxy and ref code optional).
pub struct WalletManager {
    path: PathBuf,
}

impl WalletManager {
    pub const DEFAULT_CSV: &'static str = "wallets.csv";

    pub fn new() -> Self {
        Self::with_path(Self::DEFAULT_CSV)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a header-only CSV template. Returns false if the file already
    /// exists (it is never overwritten).
    pub fn create_template(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        fs::write(&self.path, format!("{}\n", CSV_HEADER))
            .with_context(|| format!("Failed to write {:?}", self.path))?;
        Ok(true)
    }

    /// Parses the CSV into wallet records. The header line, blank lines and
    /// duplicate names are skipped; a record with an unusable private key is
    /// an error.
    pub fn load(&self) -> Result<Vec<WalletRecord>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {:?}", self.path))?;

        let mut records = Vec::new();
        let mut seen_names = HashSet::new();

        for (idx, line) in content.lines().enumerate() {
            let record = match parse_line(line, idx + 1)? {
                Some(r) => r,
                None => continue,
            };

            if !seen_names.insert(record.name.clone()) {
                warn!("Skipping duplicate wallet name '{}'", record.name);
                continue;
            }
            records.push(record);
        }

        Ok(records)
    }
}

impl Default for WalletManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletLoader for WalletManager {
    type Wallet = WalletRecord;

    async fn load_wallets(&self) -> Result<Vec<WalletRecord>> {
        self.load()
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<Option<WalletRecord>, WalletError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let cols: Vec<&str> = line.split(',').map(str::trim).collect();

    // Header row
    if cols[0].eq_ignore_ascii_case("name") {
        return Ok(None);
    }

    if cols.len() < 2 || cols[0].is_empty() || cols[1].is_empty() {
        return Err(WalletError::MalformedRecord {
            line: line_no,
            reason: "expected at least name and private key columns".to_string(),
        });
    }

    let key = cols[1].strip_prefix("0x").unwrap_or(cols[1]);
    if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WalletError::MalformedRecord {
            line: line_no,
            reason: "private key is not a 32-byte hex string".to_string(),
        });
    }

    Ok(Some(WalletRecord {
        name: cols[0].to_string(),
        private_key: cols[1].to_string(),
        proxy: cols
            .get(2)
            .copied()
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        ref_code: cols
            .get(3)
            .copied()
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe512961708279f1d8a5c8f6a1a8d7e2";

    #[test]
    fn parses_full_record() {
        let rec = parse_line(&format!("w1,0x{},http://u:p@1.2.3.4:8080,REF1", KEY), 2)
            .unwrap()
            .unwrap();
        assert_eq!(rec.name, "w1");
        assert_eq!(rec.proxy.as_deref(), Some("http://u:p@1.2.3.4:8080"));
        assert_eq!(rec.ref_code.as_deref(), Some("REF1"));
    }

    #[test]
    fn skips_header_and_blank_lines() {
        assert!(parse_line("name,private key,proxy,ref code", 1)
            .unwrap()
            .is_none());
        assert!(parse_line("", 2).unwrap().is_none());
        assert!(parse_line("   ", 3).unwrap().is_none());
    }

    #[test]
    fn missing_optional_columns_map_to_none() {
        let rec = parse_line(&format!("w2,{}", KEY), 2).unwrap().unwrap();
        assert!(rec.proxy.is_none());
        assert!(rec.ref_code.is_none());

        let rec = parse_line(&format!("w3,{},,", KEY), 3).unwrap().unwrap();
        assert!(rec.proxy.is_none());
        assert!(rec.ref_code.is_none());
    }

    #[test]
    fn rejects_bad_private_key() {
        assert!(parse_line("w1,deadbeef", 2).is_err());
        assert!(parse_line("w1,", 2).is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let rec = parse_line(&format!("w1,{}", KEY), 2).unwrap().unwrap();
        let dbg = format!("{:?}", rec);
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains(KEY));
    }
}
