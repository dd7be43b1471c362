/// Shared test helpers for cross-crate use
///
/// Fixtures used by both the `processing` and `wallet_risk` test suites.
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{BucketCutoffs, RuleWeights, RulesConfig};

/// Writes `contents` to `dir/name` and returns the full path.
///
/// Panics on I/O failure; only meant for test setup.
pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture directory");
    }
    fs::write(&path, contents).expect("failed to write fixture");
    path
}

/// Rules configuration used by the scenario tests.
///
/// Weights are pairwise distinct so a total score identifies which rules fired:
/// new-wallet 40, counterparty 35, hub 25, chain/country 15.
/// Expression rules are disabled so only the four fixed rules contribute.
pub fn reference_rules_config() -> RulesConfig {
    RulesConfig {
        young_wallet_age_days: 7,
        large_transfer_amount: 10_000.0,
        fraud_history_threshold: 2,
        hub_distinct_senders: 10,
        high_risk_chains: vec!["BTC".to_string()],
        high_risk_countries: vec!["KP".to_string()],
        weights: RuleWeights {
            new_wallet_abuse: 40.0,
            high_risk_counterparty: 35.0,
            concentrated_flow: 25.0,
            high_risk_chain_or_country: 15.0,
        },
        buckets: BucketCutoffs {
            low: 30.0,
            high: 60.0,
        },
        score_cap: None,
        expression_rules: Some(Vec::new()),
    }
}

pub const WALLETS_CSV_HEADER: &str = "wallet_id,wallet_age_days,country,is_exchange_linked";
pub const TRANSACTIONS_CSV_HEADER: &str =
    "tx_id,timestamp,from_wallet,to_wallet,amount,chain,tx_type,is_fraud_pattern,pattern_tags";
