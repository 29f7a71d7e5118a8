use anyhow::{anyhow, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::strategy::stateful::PolicyParams;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Runner
    pub iterations: u64,
    pub sleep_ms: u64,
    pub initial_eth: f64,
    pub initial_usdc: f64,

    // Policy
    pub observe_cycles: u64,
    pub rebalance_threshold: f64,
    pub max_trades_kept: usize,
    pub compaction_cooldown_secs: i64,

    // Stub price feed
    pub seed: Option<u64>,
    pub base_price: f64,
    pub price_jitter: f64,

    // Output
    pub journal_path: Option<String>,
}

const MAX_COOLDOWN_SECS: i64 = 365 * 24 * 60 * 60;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|x| x.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            iterations: 50,
            sleep_ms: 2_000,
            initial_eth: 1.0,
            initial_usdc: 3_000.0,
            observe_cycles: 0,
            rebalance_threshold: 0.0,
            max_trades_kept: 200,
            compaction_cooldown_secs: 120,
            seed: None,
            base_price: 3_000.0,
            price_jitter: 30.0,
            journal_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();

        let cfg = Self {
            iterations: env_parse("SWAP_ITERATIONS").unwrap_or(d.iterations),
            sleep_ms: env_parse("SWAP_SLEEP_MS").unwrap_or(d.sleep_ms),
            initial_eth: env_parse("SWAP_INITIAL_ETH").unwrap_or(d.initial_eth),
            initial_usdc: env_parse("SWAP_INITIAL_USDC").unwrap_or(d.initial_usdc),
            observe_cycles: env_parse("SWAP_OBSERVE_CYCLES").unwrap_or(d.observe_cycles),
            rebalance_threshold: env_parse("SWAP_REBALANCE_THRESHOLD").unwrap_or(d.rebalance_threshold),
            max_trades_kept: env_parse("SWAP_MAX_TRADES_KEPT").unwrap_or(d.max_trades_kept),
            compaction_cooldown_secs: env_parse("SWAP_COMPACTION_COOLDOWN_SECS").unwrap_or(d.compaction_cooldown_secs),
            seed: env_parse("SWAP_SEED"),
            base_price: env_parse("SWAP_BASE_PRICE").unwrap_or(d.base_price),
            price_jitter: env_parse("SWAP_PRICE_JITTER").unwrap_or(d.price_jitter),
            journal_path: std::env::var("SWAP_JOURNAL_PATH").ok().filter(|p| !p.trim().is_empty()),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_trades_kept == 0 {
            return Err(anyhow!("SWAP_MAX_TRADES_KEPT must be > 0"));
        }
        if !self.rebalance_threshold.is_finite() || self.rebalance_threshold < 0.0 {
            return Err(anyhow!("SWAP_REBALANCE_THRESHOLD must be a finite value >= 0"));
        }
        if !(0..=MAX_COOLDOWN_SECS).contains(&self.compaction_cooldown_secs) {
            return Err(anyhow!("SWAP_COMPACTION_COOLDOWN_SECS must be within 0..={MAX_COOLDOWN_SECS}"));
        }
        if self.initial_eth < 0.0 || self.initial_usdc < 0.0 {
            return Err(anyhow!("initial balances cannot be negative"));
        }
        if self.initial_eth <= 0.0 && self.initial_usdc <= 0.0 {
            return Err(anyhow!("invalid initial portfolio: both balances are zero"));
        }
        if self.base_price.is_nan() || self.base_price <= 0.0 {
            return Err(anyhow!("SWAP_BASE_PRICE must be positive"));
        }
        if self.price_jitter.is_nan() || self.price_jitter < 0.0 || self.price_jitter >= self.base_price {
            return Err(anyhow!(
                "SWAP_PRICE_JITTER ({}) must be >= 0 and below SWAP_BASE_PRICE ({})",
                self.price_jitter,
                self.base_price
            ));
        }
        Ok(())
    }

    pub fn policy_params(&self) -> PolicyParams {
        PolicyParams {
            rebalance_threshold: self.rebalance_threshold,
            warmup_cycles: self.observe_cycles,
            max_trades_kept: self.max_trades_kept,
            compaction_cooldown: Duration::seconds(self.compaction_cooldown_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        let p = cfg.policy_params();
        assert_eq!(p.max_trades_kept, 200);
        assert_eq!(p.warmup_cycles, 0);
        assert_eq!(p.compaction_cooldown, Duration::seconds(120));
    }

    #[test]
    fn rejects_zero_retention_bound() {
        let cfg = Config { max_trades_kept: 0, ..Config::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_negative_threshold() {
        let cfg = Config { rebalance_threshold: -0.1, ..Config::default() };
        assert!(cfg.validate().is_err());
        let cfg = Config { rebalance_threshold: f64::NAN, ..Config::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_cooldown() {
        let cfg = Config { compaction_cooldown_secs: -1, ..Config::default() };
        assert!(cfg.validate().is_err());
        let cfg = Config { compaction_cooldown_secs: i64::MAX, ..Config::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_empty_portfolio() {
        let cfg = Config { initial_eth: 0.0, initial_usdc: 0.0, ..Config::default() };
        assert!(cfg.validate().is_err());
        let cfg = Config { initial_eth: 0.0, ..Config::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_feed_that_could_go_non_positive() {
        let cfg = Config { base_price: 10.0, price_jitter: 10.0, ..Config::default() };
        assert!(cfg.validate().is_err());
        let cfg = Config { base_price: 0.0, ..Config::default() };
        assert!(cfg.validate().is_err());
    }
}
