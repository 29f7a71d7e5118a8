use anyhow::{anyhow, Result};
use tracing::info;

use crate::domain::TradeAction;
use crate::state::{OpenLeg, Portfolio};

/// Result of a paper swap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapResult {
    pub side: TradeAction,
    pub price: f64,
    /// ETH moved by the swap (bought or sold).
    pub eth_amount: f64,
    pub usdc_amount: f64,
}

impl SwapResult {
    /// The leg to realize on the next price.
    pub fn open_leg(&self) -> OpenLeg {
        OpenLeg {
            side: self.side,
            entry_price: self.price,
            size_eth: self.eth_amount,
        }
    }
}

/// Fills swaps against the local portfolio at the quoted price. All-in, no fees.
#[derive(Debug, Clone, Default)]
pub struct PaperEngine;

impl PaperEngine {
    pub fn new() -> Self {
        Self
    }

    /// `USDC_TO_ETH` spends all USDC, `ETH_TO_USDC` sells all ETH.
    ///
    /// Returns `None` when there is nothing to do: HOLD, or an empty source balance.
    pub fn execute_swap(&self, portfolio: &mut Portfolio, side: TradeAction, price: f64) -> Result<Option<SwapResult>> {
        ensure_valid_price(price)?;

        let result = match side {
            TradeAction::UsdcToEth if portfolio.usdc > 0.0 => {
                let usdc_amount = portfolio.usdc;
                let eth_amount = usdc_amount / price;
                portfolio.eth += eth_amount;
                portfolio.usdc = 0.0;
                SwapResult { side, price, eth_amount, usdc_amount }
            }
            TradeAction::EthToUsdc if portfolio.eth > 0.0 => {
                let eth_amount = portfolio.eth;
                let usdc_amount = eth_amount * price;
                portfolio.usdc += usdc_amount;
                portfolio.eth = 0.0;
                SwapResult { side, price, eth_amount, usdc_amount }
            }
            _ => return Ok(None),
        };

        info!(side = %result.side, price, eth = result.eth_amount, usdc = result.usdc_amount, "engine.execute_swap");
        Ok(Some(result))
    }
}

pub fn ensure_valid_price(price: f64) -> Result<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(anyhow!("price must be finite and positive, got {price}"));
    }
    Ok(())
}
