#![allow(dead_code)]

use std::collections::HashMap;

use chrono::{Duration, TimeZone, Utc};
use common::{
    config::{MissingWalletPolicy, ProcessorConfig, RulesConfig},
    reference_rules_config,
};
use processing::{
    model::{Transaction, Wallet, WalletId},
    processor::Processor,
    scorers::{CombinedScorer, ExpressionBasedScorer, ExpressionRule, RuleBasedScorer, ScorePolicy},
};

pub fn wallet(id: &str, age_days: u32, country: &str) -> Wallet {
    Wallet {
        wallet_id: id.to_string(),
        country: country.to_string(),
        wallet_age_days: age_days,
        is_exchange_linked: false,
    }
}

/// Old, low-risk wallet.
pub fn seasoned(id: &str) -> Wallet {
    wallet(id, 400, "US")
}

pub fn wallet_set(wallets: impl IntoIterator<Item = Wallet>) -> HashMap<WalletId, Wallet> {
    wallets
        .into_iter()
        .map(|w| (w.wallet_id.clone(), w))
        .collect()
}

pub struct TxBuilder {
    tx: Transaction,
}

impl TxBuilder {
    pub fn amount(mut self, amount: f64) -> Self {
        self.tx.amount = amount;
        self
    }

    pub fn chain(mut self, chain: &str) -> Self {
        self.tx.chain = chain.to_string();
        self
    }

    pub fn fraud(mut self) -> Self {
        self.tx.is_fraud_pattern = true;
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tx.pattern_tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn id(mut self, id: &str) -> Self {
        self.tx.tx_id = Some(id.to_string());
        self
    }

    pub fn build(self) -> Transaction {
        self.tx
    }
}

/// ETH transfer of 100.0 between two wallets.
pub fn tx(from: &str, to: &str) -> TxBuilder {
    TxBuilder {
        tx: Transaction {
            tx_id: None,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            from_wallet: from.to_string(),
            to_wallet: to.to_string(),
            chain: "ETH".to_string(),
            amount: 100.0,
            is_fraud_pattern: false,
            tx_type: Some("transfer".to_string()),
            pattern_tags: Vec::new(),
        },
    }
}

/// Gives every transaction a distinct id and a timestamp one minute apart.
pub fn numbered(transactions: Vec<Transaction>) -> Vec<Transaction> {
    transactions
        .into_iter()
        .enumerate()
        .map(|(i, mut tx)| {
            tx.tx_id = Some(format!("TX_{i:06}"));
            tx.timestamp += Duration::minutes(i as i64);
            tx
        })
        .collect()
}

pub fn processor_config(threads: u32, on_missing_wallet: MissingWalletPolicy) -> ProcessorConfig {
    ProcessorConfig {
        threads,
        on_missing_wallet,
        ..ProcessorConfig::default()
    }
}

pub fn build_processor(
    rules: &RulesConfig,
    config: ProcessorConfig,
    expressions: Vec<ExpressionRule>,
) -> Processor<CombinedScorer> {
    let scorer = CombinedScorer::new()
        .with(RuleBasedScorer::from_config(rules).unwrap())
        .with(ExpressionBasedScorer::new_with_expressions(expressions).unwrap());
    let policy = ScorePolicy::from_config(rules).unwrap();
    Processor::new(config, scorer, policy).unwrap()
}

/// Four fixed rules with the reference weights, single-threaded, strict references.
pub fn reference_processor() -> Processor<CombinedScorer> {
    build_processor(
        &reference_rules_config(),
        processor_config(1, MissingWalletPolicy::Reject),
        Vec::new(),
    )
}
