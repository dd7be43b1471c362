use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a scoring run.
///
/// There is no partial-success mode: any of these stops the pipeline before
/// output is produced.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("malformed {source_name} record at line {line}: {reason}")]
    MalformedRecord {
        source_name: &'static str,
        line: u64,
        reason: String,
    },

    #[error("duplicate wallet id {0}")]
    DuplicateWallet(String),

    #[error("transaction #{index} references unknown wallet {wallet_id} in {field}")]
    DanglingWalletReference {
        index: usize,
        field: &'static str,
        wallet_id: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("expression rule '{rule}' is invalid: {reason}")]
    InvalidExpression { rule: String, reason: String },

    #[error("expression rule '{rule}' failed to evaluate: {reason}")]
    ExpressionEvaluation { rule: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] common::config::ConfigError),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;
