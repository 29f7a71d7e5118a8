use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the three discrete decisions the policy can emit per cycle.
///
/// ETH is the risk asset (asset1), USDC the quote asset (asset2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    /// Sell the risk asset.
    EthToUsdc,
    /// Buy the risk asset.
    UsdcToEth,
    Hold,
}

impl TradeAction {
    pub const ALL: [TradeAction; 3] = [TradeAction::EthToUsdc, TradeAction::UsdcToEth, TradeAction::Hold];

    pub fn as_str(self) -> &'static str {
        match self {
            TradeAction::EthToUsdc => "ETH_TO_USDC",
            TradeAction::UsdcToEth => "USDC_TO_ETH",
            TradeAction::Hold => "HOLD",
        }
    }

    /// Dense index for per-action tables.
    pub(crate) fn index(self) -> usize {
        match self {
            TradeAction::EthToUsdc => 0,
            TradeAction::UsdcToEth => 1,
            TradeAction::Hold => 2,
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Realized outcome of one closed position. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub side: TradeAction,
    /// Exit price of the leg, ETH priced in USDC.
    pub eth_price: f64,
    pub size_eth: f64,
    /// Signed relative return, 0.05 => +5%.
    pub pnl_pct: f64,
}
