//! Wallet-level and portfolio-level aggregation of scored transactions.

use std::collections::{BTreeMap, HashMap};

use strum::IntoEnumIterator;

use crate::{
    model::{PortfolioKpis, RiskBucket, ScoredTransaction, Wallet, WalletId, WalletRiskSummary},
    scorers::ScorePolicy,
};

#[derive(Default)]
struct WalletAccumulator {
    scores: Vec<f64>,
    fraud_tx_count: u64,
}

/// Groups scored transactions by sending wallet.
///
/// Every wallet of the wallet set gets an entry, including wallets that never
/// sent anything. Senders missing from the wallet set (baseline policy) get
/// one as well.
pub fn summarize_wallets(
    wallets: &HashMap<WalletId, Wallet>,
    scored: &[ScoredTransaction],
    policy: &ScorePolicy,
) -> BTreeMap<WalletId, WalletRiskSummary> {
    let mut groups: BTreeMap<&str, WalletAccumulator> = wallets
        .keys()
        .map(|id| (id.as_str(), WalletAccumulator::default()))
        .collect();

    for tx in scored {
        let group = groups
            .entry(tx.transaction.from_wallet.as_str())
            .or_default();
        group.scores.push(tx.risk_score);
        if tx.transaction.is_fraud_pattern {
            group.fraud_tx_count += 1;
        }
    }

    groups
        .into_iter()
        .map(|(wallet_id, mut group)| {
            let tx_count = group.scores.len() as u64;
            let max_risk_score = group.scores.iter().copied().fold(0.0, f64::max);
            let fraud_rate = if tx_count == 0 {
                0.0
            } else {
                group.fraud_tx_count as f64 / tx_count as f64
            };
            let summary = WalletRiskSummary {
                wallet_id: wallet_id.to_string(),
                tx_count,
                max_risk_score,
                avg_risk_score: stable_mean(&mut group.scores),
                fraud_tx_count: group.fraud_tx_count,
                fraud_rate,
                wallet_risk_bucket: policy.bucket(max_risk_score),
            };
            (wallet_id.to_string(), summary)
        })
        .collect()
}

pub fn portfolio_kpis(
    scored: &[ScoredTransaction],
    summaries: &BTreeMap<WalletId, WalletRiskSummary>,
) -> PortfolioKpis {
    let total_transactions = scored.len();

    let active = summaries.values().filter(|s| s.tx_count > 0);
    let active_wallets = active.clone().count();
    let high_risk_wallets = active
        .filter(|s| s.wallet_risk_bucket == RiskBucket::High)
        .count();

    let fraud_count = scored.iter().filter(|tx| tx.transaction.is_fraud_pattern).count();
    let fraud_pattern_rate = if total_transactions == 0 {
        0.0
    } else {
        fraud_count as f64 / total_transactions as f64
    };

    let mut bucket_counts: BTreeMap<RiskBucket, usize> =
        RiskBucket::iter().map(|bucket| (bucket, 0)).collect();
    for tx in scored {
        *bucket_counts.entry(tx.risk_bucket).or_default() += 1;
    }

    let mut scores: Vec<f64> = scored.iter().map(|tx| tx.risk_score).collect();

    PortfolioKpis {
        total_transactions,
        active_wallets,
        high_risk_wallets,
        fraud_pattern_rate,
        avg_risk_score: stable_mean(&mut scores),
        bucket_counts,
    }
}

/// Active wallets ordered by max risk score, highest first, ties by wallet id.
pub fn top_wallets(
    summaries: &BTreeMap<WalletId, WalletRiskSummary>,
    limit: usize,
) -> Vec<&WalletRiskSummary> {
    let mut active: Vec<&WalletRiskSummary> =
        summaries.values().filter(|s| s.tx_count > 0).collect();
    active.sort_by(|a, b| {
        b.max_risk_score
            .total_cmp(&a.max_risk_score)
            .then_with(|| a.wallet_id.cmp(&b.wallet_id))
    });
    active.truncate(limit);
    active
}

// Sorting first makes the floating-point sum independent of input order.
fn stable_mean(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}
