//! Plain-text rendering of a scoring run for the terminal.

use std::fmt::Write;

use crate::model::{PortfolioKpis, WalletRiskSummary};

pub fn render_report(kpis: &PortfolioKpis, top: &[&WalletRiskSummary]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Transactions:        {}", kpis.total_transactions);
    let _ = writeln!(out, "Active wallets:      {}", kpis.active_wallets);
    let _ = writeln!(out, "High-risk wallets:   {}", kpis.high_risk_wallets);
    let _ = writeln!(out, "Fraud pattern rate:  {:.1}%", kpis.fraud_pattern_rate * 100.0);
    let _ = writeln!(out, "Average risk score:  {:.2}", kpis.avg_risk_score);
    for (bucket, count) in &kpis.bucket_counts {
        let _ = writeln!(out, "  {:<6} {}", bucket.to_string(), count);
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<16} {:<7} {:>9} {:>9} {:>6} {:>6} {:>7}",
        "wallet", "bucket", "max", "avg", "txs", "fraud", "rate"
    );
    for summary in top {
        let _ = writeln!(
            out,
            "{:<16} {:<7} {:>9.1} {:>9.2} {:>6} {:>6} {:>6.1}%",
            summary.wallet_id,
            summary.wallet_risk_bucket.to_string(),
            summary.max_risk_score,
            summary.avg_risk_score,
            summary.tx_count,
            summary.fraud_tx_count,
            summary.fraud_rate * 100.0
        );
    }

    out
}
