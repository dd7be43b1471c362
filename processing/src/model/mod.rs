use chrono::{DateTime, Utc};
use common::config::BucketCutoffs;
use evalexpr::{DefaultNumericTypes, Value as EvalValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display as EnumDisplay, EnumIter, EnumString};

pub mod features;
pub mod importable;

pub use importable::{Importable, TransactionRecord, WalletRecord};

pub type WalletId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub wallet_id: WalletId,
    pub country: String,
    pub wallet_age_days: u32,
    pub is_exchange_linked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub from_wallet: WalletId,
    pub to_wallet: WalletId,
    pub chain: String,
    pub amount: f64,
    pub is_fraud_pattern: bool,
    pub tx_type: Option<String>,
    pub pattern_tags: Vec<String>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumDisplay,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

impl RiskBucket {
    /// Monotonic in `score`: a higher score never maps to a lower bucket.
    pub fn from_score(score: f64, cutoffs: &BucketCutoffs) -> Self {
        if score < cutoffs.low {
            RiskBucket::Low
        } else if score < cutoffs.high {
            RiskBucket::Medium
        } else {
            RiskBucket::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub risk_score: f64,
    pub risk_bucket: RiskBucket,
    pub triggered_rules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletRiskSummary {
    pub wallet_id: WalletId,
    pub tx_count: u64,
    pub max_risk_score: f64,
    pub avg_risk_score: f64,
    pub fraud_tx_count: u64,
    pub fraud_rate: f64,
    pub wallet_risk_bucket: RiskBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioKpis {
    pub total_transactions: usize,
    pub active_wallets: usize,
    pub high_risk_wallets: usize,
    pub fraud_pattern_rate: f64,
    pub avg_risk_score: f64,
    pub bucket_counts: BTreeMap<RiskBucket, usize>,
}

/// Full result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOutput {
    /// Same order as the input transactions.
    pub scored: Vec<ScoredTransaction>,
    pub summaries: BTreeMap<WalletId, WalletRiskSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerResult {
    pub name: String,
    pub score: f64,
}

/// Whole-dataset aggregates for a single transaction, with that transaction
/// itself left out of every count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionContext {
    pub sender_fraud_involvement: u32,
    pub receiver_fraud_involvement: u32,
    pub receiver_distinct_senders: u32,
}

/// Everything a scorer may look at for one transaction.
///
/// `sender`/`receiver` are `None` only for identifiers missing from the wallet
/// set under the baseline policy.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub transaction: &'a Transaction,
    pub sender: Option<&'a Wallet>,
    pub receiver: Option<&'a Wallet>,
    pub context: TransactionContext,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    Double(f64),
    String(String),
    Bool(bool),
    StringList(Vec<String>),
}

impl From<FeatureValue> for EvalValue<DefaultNumericTypes> {
    fn from(value: FeatureValue) -> Self {
        match value {
            FeatureValue::Int(v) => EvalValue::Int(v),
            FeatureValue::Double(v) => EvalValue::Float(v),
            FeatureValue::String(v) => EvalValue::String(v),
            FeatureValue::Bool(v) => EvalValue::Boolean(v),
            FeatureValue::StringList(v) => {
                EvalValue::Tuple(v.into_iter().map(EvalValue::String).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub value: FeatureValue,
}

impl Feature {
    pub fn new(name: &str, value: FeatureValue) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}
