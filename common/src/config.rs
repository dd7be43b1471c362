use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::yaml_include::load_yaml_with_includes;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse yaml in {path}: {reason}")]
    Scan { path: PathBuf, reason: String },
    #[error("failed to render merged config: {0}")]
    Emit(String),
    #[error("config does not match the expected schema: {0}")]
    Schema(#[from] serde_yml::Error),
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    pub project_name: String,
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            project_name: "wallet_risk".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ImporterConfig {
    pub wallets_path: PathBuf,
    pub transactions_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExporterConfig {
    pub scored_transactions_path: PathBuf,
    pub wallet_summaries_path: PathBuf,
    #[serde(default)]
    pub kpis_path: Option<PathBuf>,
    #[serde(default)]
    pub format: OutputFormat,
}

/// What to do with a transaction whose sender or receiver is not in the wallet set.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingWalletPolicy {
    /// Abort the run with a dangling-reference error.
    #[default]
    Reject,
    /// Score as if the wallet had no risky attributes.
    Baseline,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProcessorConfig {
    pub threads: u32,
    pub on_missing_wallet: MissingWalletPolicy,
    pub top_wallets: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            on_missing_wallet: MissingWalletPolicy::Reject,
            top_wallets: 50,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RuleWeights {
    pub new_wallet_abuse: f64,
    pub high_risk_counterparty: f64,
    pub concentrated_flow: f64,
    pub high_risk_chain_or_country: f64,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            new_wallet_abuse: 40.0,
            high_risk_counterparty: 40.0,
            concentrated_flow: 30.0,
            high_risk_chain_or_country: 10.0,
        }
    }
}

/// Score cutoffs: `score < low` is LOW, `low <= score < high` is MEDIUM, the rest HIGH.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct BucketCutoffs {
    pub low: f64,
    pub high: f64,
}

impl Default for BucketCutoffs {
    fn default() -> Self {
        Self {
            low: 30.0,
            high: 60.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ExpressionRuleConfig {
    pub name: String,
    pub expression: String,
    pub score: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    pub young_wallet_age_days: u32,
    pub large_transfer_amount: f64,
    pub fraud_history_threshold: u32,
    pub hub_distinct_senders: u32,
    pub high_risk_chains: Vec<String>,
    pub high_risk_countries: Vec<String>,
    pub weights: RuleWeights,
    pub buckets: BucketCutoffs,
    pub score_cap: Option<f64>,
    /// `None` means "use the built-in defaults", an empty list disables expression rules.
    pub expression_rules: Option<Vec<ExpressionRuleConfig>>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            young_wallet_age_days: 7,
            large_transfer_amount: 500.0,
            fraud_history_threshold: 2,
            hub_distinct_senders: 10,
            high_risk_chains: vec!["BTC".to_string()],
            high_risk_countries: Vec::new(),
            weights: RuleWeights::default(),
            buckets: BucketCutoffs::default(),
            score_cap: None,
            expression_rules: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub common: CommonConfig,
    pub importer: ImporterConfig,
    pub exporter: ExporterConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

impl Config {
    /// Loads a config file, resolving `!include` lines first.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let merged = load_yaml_with_includes(config_path.as_ref())?;

        let mut out_str = String::new();
        {
            let mut emitter = yaml_rust2::YamlEmitter::new(&mut out_str);
            emitter
                .dump(&merged)
                .map_err(|e| ConfigError::Emit(e.to_string()))?;
        }

        Self::from_yaml_str(&out_str)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(contents)?)
    }
}
