pub mod memory;
pub mod stateful;

use crate::domain::{TradeAction, TradeRecord};

/// In-process call interface consumed by the driving loop.
pub trait SwapPolicy {
    /// Feeds one price observation; advances warmup.
    fn observe(&mut self, eth_price: f64, volatility: Option<f64>);

    fn decide(
        &mut self,
        eth_price: f64,
        portfolio_eth: f64,
        portfolio_usdc: f64,
        signal_override: Option<f64>,
    ) -> TradeAction;

    /// Records a closed leg and returns the stored record.
    fn record_trade_outcome(&mut self, side: TradeAction, entry_price: f64, exit_price: f64, size_eth: f64) -> TradeRecord;

    fn performance_insights(&self) -> String;
}
