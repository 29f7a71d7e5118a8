use anyhow::Result;
use tracing::info;

use stateful_swap_engine::config::Config;
use stateful_swap_engine::feed::StubPriceFeed;
use stateful_swap_engine::monitoring;
use stateful_swap_engine::runner::Runner;
use stateful_swap_engine::StatefulSwapStrategy;

#[tokio::main]
async fn main() -> Result<()> {
    // Load local .env if present (no-op in prod/systemd envs)
    let _ = dotenvy::dotenv();

    monitoring::init_tracing();

    let cfg = Config::from_env()?;
    info!(?cfg, "boot");

    // Offline only: stubbed price feed and paper execution.
    let mut policy = StatefulSwapStrategy::new(cfg.policy_params());
    let mut feed = StubPriceFeed::new(cfg.base_price, cfg.price_jitter, cfg.seed);

    let summary = Runner::new(&cfg, &mut policy, &mut feed).run().await?;
    info!(
        cycles = summary.cycles,
        swaps = summary.swaps_executed,
        outcomes = summary.outcomes_recorded,
        eth = summary.portfolio.eth,
        usdc = summary.portfolio.usdc,
        value_usdc = summary.last_price.map(|p| summary.portfolio.value_usdc(p)),
        insights = %summary.insights,
        "done"
    );

    Ok(())
}
