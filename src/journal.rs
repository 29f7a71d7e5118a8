use anyhow::Result;
use serde::Serialize;
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::TradeRecord;

#[derive(Serialize)]
struct JournalLine<'a> {
    #[serde(flatten)]
    record: &'a TradeRecord,
    entry_price: f64,
}

/// Append-only JSON-lines log of closed trades. Write-only: never read back.
#[derive(Debug, Clone)]
pub struct TradeJournal {
    path: PathBuf,
}

impl TradeJournal {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn append_trade_close(&self, record: &TradeRecord, entry_price: f64) -> Result<()> {
        let line = serde_json::to_string(&JournalLine { record, entry_price })?;
        let mut f = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeAction;
    use chrono::{TimeZone, Utc};

    #[test]
    fn appends_one_json_object_per_close() {
        let path = std::env::temp_dir().join(format!("swap-journal-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let journal = TradeJournal::new(&path);

        let rec = TradeRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            side: TradeAction::EthToUsdc,
            eth_price: 2900.0,
            size_eth: 1.5,
            pnl_pct: 100.0 / 3000.0,
        };
        journal.append_trade_close(&rec, 3000.0).unwrap();
        journal.append_trade_close(&rec, 3000.0).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);

        let v: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(v["side"], "ETH_TO_USDC");
        assert_eq!(v["entry_price"], 3000.0);
        assert_eq!(v["eth_price"], 2900.0);
        assert_eq!(v["size_eth"], 1.5);

        let _ = std::fs::remove_file(&path);
    }
}
