use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::TradeAction;
use crate::engine::{ensure_valid_price, PaperEngine};
use crate::feed::PriceFeed;
use crate::journal::TradeJournal;
use crate::state::{OpenLeg, Portfolio};
use crate::strategy::SwapPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub cycles: u64,
    pub swaps_executed: u64,
    pub outcomes_recorded: u64,
    pub portfolio: Portfolio,
    pub last_price: Option<f64>,
    pub insights: String,
}

/// Drives one paper-trading run.
///
/// Each cycle: warmup observation, realize the previous leg at the new price,
/// ask the policy, fill the chosen swap, sleep.
pub struct Runner<'a, P, F> {
    cfg: &'a Config,
    policy: &'a mut P,
    feed: &'a mut F,
    engine: PaperEngine,
    journal: Option<TradeJournal>,
    portfolio: Portfolio,
    open_leg: Option<OpenLeg>,
}

impl<'a, P: SwapPolicy, F: PriceFeed> Runner<'a, P, F> {
    pub fn new(cfg: &'a Config, policy: &'a mut P, feed: &'a mut F) -> Self {
        Self {
            cfg,
            policy,
            feed,
            engine: PaperEngine::new(),
            journal: cfg.journal_path.as_deref().map(TradeJournal::new),
            portfolio: Portfolio::new(cfg.initial_eth, cfg.initial_usdc),
            open_leg: None,
        }
    }

    pub async fn run(mut self) -> Result<RunSummary> {
        let cfg = self.cfg;
        info!(
            iterations = cfg.iterations,
            observe_cycles = cfg.observe_cycles,
            rebalance_threshold = cfg.rebalance_threshold,
            eth = self.portfolio.eth,
            usdc = self.portfolio.usdc,
            journal = cfg.journal_path.as_deref().unwrap_or(""),
            "runner.start"
        );

        let mut swaps_executed = 0;
        let mut outcomes_recorded = 0;
        let mut last_price = None;

        for i in 0..cfg.iterations {
            let price = self.feed.next_price();
            if let Err(e) = ensure_valid_price(price) {
                warn!(cycle = i, error = %e, "runner.skip_bad_price");
                continue;
            }
            last_price = Some(price);

            if i < cfg.observe_cycles {
                self.policy.observe(price, None);
            }

            if let Some(leg) = self.open_leg.take() {
                let record = self
                    .policy
                    .record_trade_outcome(leg.side, leg.entry_price, price, leg.size_eth);
                outcomes_recorded += 1;
                if let Some(journal) = &self.journal {
                    journal.append_trade_close(&record, leg.entry_price)?;
                }
            }

            let action = self
                .policy
                .decide(price, self.portfolio.eth, self.portfolio.usdc, None);
            info!(
                cycle = i,
                price = format_args!("{price:.2}"),
                action = %action,
                insights = %self.policy.performance_insights(),
                "runner.cycle"
            );

            if action != TradeAction::Hold {
                if let Some(fill) = self.engine.execute_swap(&mut self.portfolio, action, price)? {
                    self.open_leg = Some(fill.open_leg());
                    swaps_executed += 1;
                }
            }

            if cfg.sleep_ms > 0 {
                tokio::time::sleep(Duration::from_millis(cfg.sleep_ms)).await;
            }
        }

        let summary = RunSummary {
            cycles: cfg.iterations,
            swaps_executed,
            outcomes_recorded,
            portfolio: self.portfolio,
            last_price,
            insights: self.policy.performance_insights(),
        };
        info!(
            eth = format_args!("{:.6}", summary.portfolio.eth),
            usdc = format_args!("{:.2}", summary.portfolio.usdc),
            swaps = summary.swaps_executed,
            "runner.final_portfolio"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::ScriptedPriceFeed;
    use crate::strategy::stateful::{PolicyParams, StatefulSwapStrategy};

    fn cfg(iterations: u64, observe_cycles: u64) -> Config {
        Config {
            iterations,
            observe_cycles,
            sleep_ms: 0,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn rising_market_buys_then_realizes_on_next_tick() {
        let cfg = cfg(3, 0);
        let mut policy = StatefulSwapStrategy::new(cfg.policy_params());
        let mut feed = ScriptedPriceFeed::new(vec![3000.0, 3030.0, 3060.0]);

        let summary = Runner::new(&cfg, &mut policy, &mut feed).run().await.unwrap();

        // cycle 0 has no prior price and holds; cycle 1 buys on momentum;
        // cycle 2 realizes the buy, then has no USDC left to buy with
        assert_eq!(summary.swaps_executed, 1);
        assert_eq!(summary.outcomes_recorded, 1);
        assert_eq!(summary.portfolio.usdc, 0.0);
        assert!((summary.portfolio.eth - (1.0 + 3000.0 / 3030.0)).abs() < 1e-9);

        let trades = policy.memory().trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].side, TradeAction::UsdcToEth);
        assert!((trades[0].pnl_pct - 30.0 / 3030.0).abs() < 1e-12);
        assert_eq!(summary.last_price, Some(3060.0));
    }

    #[tokio::test]
    async fn warmup_cycles_never_trade() {
        let cfg = cfg(4, 4);
        let mut policy = StatefulSwapStrategy::new(cfg.policy_params());
        let mut feed = ScriptedPriceFeed::new(vec![3000.0, 3100.0, 2900.0, 3200.0]);

        let summary = Runner::new(&cfg, &mut policy, &mut feed).run().await.unwrap();

        assert_eq!(summary.swaps_executed, 0);
        assert_eq!(summary.portfolio, Portfolio::new(1.0, 3000.0));
        assert_eq!(policy.observed_cycles(), 4);
    }

    #[tokio::test]
    async fn bad_prices_are_skipped() {
        let cfg = cfg(2, 0);
        let mut policy = StatefulSwapStrategy::new(PolicyParams::default());
        let mut feed = ScriptedPriceFeed::new(vec![-1.0, 3000.0]);

        let summary = Runner::new(&cfg, &mut policy, &mut feed).run().await.unwrap();
        assert_eq!(summary.swaps_executed, 0);
        assert_eq!(summary.last_price, Some(3000.0));
        assert_eq!(policy.last_price(), Some(3000.0));
    }

    #[tokio::test]
    async fn closed_legs_are_journaled() {
        let path = std::env::temp_dir().join(format!("swap-runner-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let cfg = Config {
            journal_path: Some(path.to_string_lossy().into_owned()),
            ..cfg(4, 0)
        };
        let mut policy = StatefulSwapStrategy::new(cfg.policy_params());
        let mut feed = ScriptedPriceFeed::new(vec![3000.0, 2970.0, 2940.0, 2940.0]);

        let summary = Runner::new(&cfg, &mut policy, &mut feed).run().await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count() as u64, summary.outcomes_recorded);
        assert!(summary.outcomes_recorded >= 1);
        let _ = std::fs::remove_file(&path);
    }
}
