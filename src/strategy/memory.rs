use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::domain::{TradeAction, TradeRecord};

/// How many of the most recent records survive a compaction.
pub const RECENT_TRADES_KEPT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ActionStats {
    success_rate: f64,
    avg_pnl: f64,
}

/// Bounded log of realized trade outcomes plus per-action aggregates.
///
/// The aggregates are a cache over `trades` and are rebuilt from scratch
/// whenever `trades` changes, so they can never drift from the log.
#[derive(Debug, Clone)]
pub struct Memory {
    trades: Vec<TradeRecord>,
    stats: [ActionStats; 3],
    max_trades_kept: usize,
    compaction_cooldown: Duration,
    last_compaction_at: Option<DateTime<Utc>>,
}

impl Memory {
    pub fn new(max_trades_kept: usize, compaction_cooldown: Duration) -> Self {
        Self {
            trades: Vec::new(),
            stats: [ActionStats::default(); 3],
            max_trades_kept,
            compaction_cooldown,
            last_compaction_at: None,
        }
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Fraction of records for `action` with a strictly positive PnL; 0.0 when there are none.
    pub fn success_rate(&self, action: TradeAction) -> f64 {
        self.stats[action.index()].success_rate
    }

    /// Mean `pnl_pct` of records for `action`; 0.0 when there are none.
    pub fn avg_pnl(&self, action: TradeAction) -> f64 {
        self.stats[action.index()].avg_pnl
    }

    pub fn max_trades_kept(&self) -> usize {
        self.max_trades_kept
    }

    pub fn last_compaction_at(&self) -> Option<DateTime<Utc>> {
        self.last_compaction_at
    }

    pub fn append_outcome(&mut self, record: TradeRecord) {
        self.trades.push(record);
        self.recompute();
    }

    /// Prunes the log to the recent window plus the best historical record.
    ///
    /// Runs only when the log exceeds `max_trades_kept` and the cooldown since
    /// the previous compaction has elapsed. Returns whether it ran.
    pub fn compact_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.trades.len() <= self.max_trades_kept {
            return false;
        }
        if let Some(last) = self.last_compaction_at {
            if now - last < self.compaction_cooldown {
                return false;
            }
        }

        let before = self.trades.len();
        let recent_start = before.saturating_sub(RECENT_TRADES_KEPT);
        let best = best_pnl_index(&self.trades);

        let kept: Vec<TradeRecord> = self
            .trades
            .drain(..)
            .enumerate()
            .filter(|(i, _)| *i >= recent_start || Some(*i) == best)
            .map(|(_, t)| t)
            .collect();
        self.trades = kept;
        self.recompute();
        self.last_compaction_at = Some(now);

        info!(before, after = self.trades.len(), best_index = ?best, "memory.compact");
        true
    }

    fn recompute(&mut self) {
        for action in TradeAction::ALL {
            let mut count = 0usize;
            let mut wins = 0usize;
            let mut sum = 0.0;
            for t in self.trades.iter().filter(|t| t.side == action) {
                count += 1;
                if t.pnl_pct > 0.0 {
                    wins += 1;
                }
                sum += t.pnl_pct;
            }

            self.stats[action.index()] = if count == 0 {
                ActionStats::default()
            } else {
                ActionStats {
                    success_rate: wins as f64 / count as f64,
                    avg_pnl: sum / count as f64,
                }
            };
        }
    }
}

/// Index of the record with the highest `pnl_pct`.
///
/// Ties go to the earliest record. NaN never wins.
fn best_pnl_index(trades: &[TradeRecord]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, t) in trades.iter().enumerate() {
        if t.pnl_pct.is_nan() {
            continue;
        }
        match best {
            Some((_, pnl)) if t.pnl_pct <= pnl => {}
            _ => best = Some((i, t.pnl_pct)),
        }
    }
    best.map(|(i, _)| i)
}
