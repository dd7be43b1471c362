use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, de::DeserializeOwned};

use super::{Transaction, Wallet};

/// A raw input row that can be checked and turned into a model value.
///
/// Rows are deserialized with every column optional so that a missing value
/// is reported by name instead of as a generic decoding failure.
pub trait Importable: DeserializeOwned {
    type Model;

    /// Name used in error messages, e.g. "wallet".
    const SOURCE: &'static str;

    fn validate(self) -> Result<Self::Model, String>;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WalletRecord {
    pub wallet_id: Option<String>,
    pub wallet_age_days: Option<String>,
    pub country: Option<String>,
    pub is_exchange_linked: Option<String>,
}

impl Importable for WalletRecord {
    type Model = Wallet;
    const SOURCE: &'static str = "wallet";

    fn validate(self) -> Result<Wallet, String> {
        let wallet_id = required(self.wallet_id, "wallet_id")?;
        let age = required(self.wallet_age_days, "wallet_age_days")?;
        let wallet_age_days = age
            .parse::<u32>()
            .map_err(|_| format!("wallet_age_days '{age}' is not a non-negative integer"))?;
        let country = required(self.country, "country")?;
        let is_exchange_linked = parse_flag(
            &required(self.is_exchange_linked, "is_exchange_linked")?,
            "is_exchange_linked",
        )?;

        Ok(Wallet {
            wallet_id,
            country,
            wallet_age_days,
            is_exchange_linked,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionRecord {
    pub tx_id: Option<String>,
    pub timestamp: Option<String>,
    pub from_wallet: Option<String>,
    pub to_wallet: Option<String>,
    pub chain: Option<String>,
    pub amount: Option<String>,
    pub is_fraud_pattern: Option<String>,
    pub tx_type: Option<String>,
    pub pattern_tags: Option<String>,
}

impl Importable for TransactionRecord {
    type Model = Transaction;
    const SOURCE: &'static str = "transaction";

    fn validate(self) -> Result<Transaction, String> {
        let timestamp = parse_timestamp(&required(self.timestamp, "timestamp")?)?;
        let from_wallet = required(self.from_wallet, "from_wallet")?;
        let to_wallet = required(self.to_wallet, "to_wallet")?;
        let chain = required(self.chain, "chain")?;

        let raw_amount = required(self.amount, "amount")?;
        let amount = raw_amount
            .parse::<f64>()
            .map_err(|_| format!("amount '{raw_amount}' is not a number"))?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("amount {raw_amount} must be a finite non-negative number"));
        }

        let is_fraud_pattern = parse_flag(
            &required(self.is_fraud_pattern, "is_fraud_pattern")?,
            "is_fraud_pattern",
        )?;

        let pattern_tags = self
            .pattern_tags
            .as_deref()
            .map(|tags| {
                tags.split(';')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Transaction {
            tx_id: optional(self.tx_id),
            timestamp,
            from_wallet,
            to_wallet,
            chain,
            amount,
            is_fraud_pattern,
            tx_type: optional(self.tx_type),
            pattern_tags,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, String> {
    optional(value).ok_or_else(|| format!("missing required field {field}"))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts `0`/`1` as written by dataframe exports as well as `true`/`false`.
pub fn parse_flag(value: &str, field: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(format!("{field} '{other}' is not a boolean")),
    }
}

/// RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS[.fraction]` taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("timestamp '{value}' is not a recognised date-time"))
}
