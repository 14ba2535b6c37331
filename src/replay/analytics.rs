//! Replay analytics and reporting

use crate::risk::RiskState;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary statistics from a replay run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplaySummary {
    /// Decision cycles attempted
    pub cycles: usize,
    /// Cycles that produced a trade intent
    pub approvals: usize,
    /// Skipped cycles by skip reason
    pub skips: BTreeMap<String, usize>,
    /// Gate rejections by reject reason
    pub rejections: BTreeMap<String, usize>,
    /// Closed trades
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Sum of realized profit
    pub net_pnl: Decimal,
    /// Worst peak-to-trough equity decline over the run, in percent
    pub max_drawdown_pct: Decimal,
    pub final_balance: Decimal,
    pub final_state: RiskState,
}

impl ReplaySummary {
    /// Winning share of closed trades, in percent
    pub fn win_rate(&self) -> Decimal {
        if self.trades == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.wins) / Decimal::from(self.trades) * dec!(100)
    }

    pub fn total_rejections(&self) -> usize {
        self.rejections.values().sum()
    }

    pub fn total_skips(&self) -> usize {
        self.skips.values().sum()
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let breakdown = |counts: &BTreeMap<String, usize>| -> String {
            if counts.is_empty() {
                return "  (none)\n".to_string();
            }
            counts
                .iter()
                .map(|(label, n)| format!("  {label:<24}{n}\n"))
                .collect()
        };

        format!(
            r#"
══════════════════════════════════════════════════════
               REPLAY RESULTS
══════════════════════════════════════════════════════

PERFORMANCE
───────────────────────────────────────────────────────
Net P&L:          {:+.2}
Final Balance:    {:.2}
Max Drawdown:     {:.2}%
Win Rate:         {:.1}% ({} / {})
Final State:      {}

ACTIVITY
───────────────────────────────────────────────────────
Cycles:           {}
Approvals:        {}
Skips:            {}
{}Rejections:       {}
{}══════════════════════════════════════════════════════
"#,
            self.net_pnl,
            self.final_balance,
            self.max_drawdown_pct,
            self.win_rate(),
            self.wins,
            self.trades,
            self.final_state,
            self.cycles,
            self.approvals,
            self.total_skips(),
            breakdown(&self.skips),
            self.total_rejections(),
            breakdown(&self.rejections),
        )
    }
}
