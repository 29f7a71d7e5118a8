use serde::{Deserialize, Serialize};

use crate::domain::TradeAction;

/// Paper balances of the run. Lives only as long as the process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Portfolio {
    pub eth: f64,
    pub usdc: f64,
}

impl Portfolio {
    pub fn new(eth: f64, usdc: f64) -> Self {
        Self { eth, usdc }
    }

    /// Mark-to-market value in USDC.
    pub fn value_usdc(&self, eth_price: f64) -> f64 {
        self.usdc + self.eth * eth_price
    }
}

/// A swap executed on one cycle whose outcome is realized on the next.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OpenLeg {
    pub side: TradeAction,
    pub entry_price: f64,
    pub size_eth: f64,
}
