use async_trait::async_trait;
use common::config::{ExporterConfig, ImporterConfig, OutputFormat};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::{
    error::{ProcessingError, ProcessingResult},
    importer::{parse_transactions, parse_wallets},
    model::{
        PortfolioKpis, RiskBucket, ScoredTransaction, Transaction, Wallet, WalletId,
        WalletRiskSummary,
    },
    storage::{DatasetSource, ResultSink},
};

/// Reads the two CSV inputs from disk.
pub struct FileDatasetSource {
    wallets_path: PathBuf,
    transactions_path: PathBuf,
}

impl FileDatasetSource {
    pub fn new(config: &ImporterConfig) -> Self {
        Self {
            wallets_path: config.wallets_path.clone(),
            transactions_path: config.transactions_path.clone(),
        }
    }
}

#[async_trait]
impl DatasetSource for FileDatasetSource {
    async fn load_wallets(&self) -> ProcessingResult<HashMap<WalletId, Wallet>> {
        let bytes = read_file(&self.wallets_path).await?;
        let wallets = parse_wallets(bytes.as_slice())?;
        tracing::info!(path = %self.wallets_path.display(), wallets = wallets.len(), "Loaded wallets");
        Ok(wallets)
    }

    async fn load_transactions(&self) -> ProcessingResult<Vec<Transaction>> {
        let bytes = read_file(&self.transactions_path).await?;
        let transactions = parse_transactions(bytes.as_slice())?;
        tracing::info!(
            path = %self.transactions_path.display(),
            transactions = transactions.len(),
            "Loaded transactions"
        );
        Ok(transactions)
    }
}

/// Writes scored rows and wallet summaries as CSV or JSON; KPIs are always JSON.
///
/// Each save writes a temporary file next to its target. `commit` renames
/// them into place; uncommitted files are removed when the sink is dropped.
pub struct FileResultSink {
    config: ExporterConfig,
    staged: Mutex<Vec<(NamedTempFile, PathBuf)>>,
}

impl FileResultSink {
    pub fn new(config: ExporterConfig) -> Self {
        Self {
            config,
            staged: Mutex::new(Vec::new()),
        }
    }

    async fn stage(&self, path: &Path, bytes: Vec<u8>) -> ProcessingResult<()> {
        let target = path.to_path_buf();
        let file = tokio::task::spawn_blocking(move || write_temp(&target, &bytes))
            .await
            .unwrap_or_else(|e| Err(io::Error::other(e)))
            .map_err(|source| ProcessingError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        self.staged.lock().await.push((file, path.to_path_buf()));
        Ok(())
    }
}

#[derive(Serialize)]
struct ScoredRow<'a> {
    tx_id: Option<&'a str>,
    timestamp: String,
    from_wallet: &'a str,
    to_wallet: &'a str,
    chain: &'a str,
    amount: f64,
    tx_type: Option<&'a str>,
    is_fraud_pattern: u8,
    pattern_tags: String,
    risk_score: f64,
    risk_bucket: RiskBucket,
    triggered_rules: String,
}

impl<'a> From<&'a ScoredTransaction> for ScoredRow<'a> {
    fn from(scored: &'a ScoredTransaction) -> Self {
        let tx = &scored.transaction;
        Self {
            tx_id: tx.tx_id.as_deref(),
            timestamp: tx.timestamp.to_rfc3339(),
            from_wallet: &tx.from_wallet,
            to_wallet: &tx.to_wallet,
            chain: &tx.chain,
            amount: tx.amount,
            tx_type: tx.tx_type.as_deref(),
            is_fraud_pattern: u8::from(tx.is_fraud_pattern),
            pattern_tags: tx.pattern_tags.join(";"),
            risk_score: scored.risk_score,
            risk_bucket: scored.risk_bucket,
            triggered_rules: scored.triggered_rules.join(";"),
        }
    }
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    wallet_id: &'a str,
    wallet_risk_bucket: RiskBucket,
    max_risk_score: f64,
    avg_risk_score: f64,
    tx_count: u64,
    fraud_tx_count: u64,
    fraud_rate: f64,
    wallet_age_days: Option<u32>,
    country: Option<&'a str>,
    is_exchange_linked: Option<u8>,
}

impl<'a> SummaryRow<'a> {
    fn new(summary: &'a WalletRiskSummary, wallet: Option<&'a Wallet>) -> Self {
        Self {
            wallet_id: &summary.wallet_id,
            wallet_risk_bucket: summary.wallet_risk_bucket,
            max_risk_score: summary.max_risk_score,
            avg_risk_score: summary.avg_risk_score,
            tx_count: summary.tx_count,
            fraud_tx_count: summary.fraud_tx_count,
            fraud_rate: summary.fraud_rate,
            wallet_age_days: wallet.map(|w| w.wallet_age_days),
            country: wallet.map(|w| w.country.as_str()),
            is_exchange_linked: wallet.map(|w| u8::from(w.is_exchange_linked)),
        }
    }
}

#[async_trait]
impl ResultSink for FileResultSink {
    async fn save_scored(&self, scored: &[ScoredTransaction]) -> ProcessingResult<()> {
        // A new run starts here; leftovers of an uncommitted one are discarded.
        self.staged.lock().await.clear();

        let rows: Vec<ScoredRow<'_>> = scored.iter().map(ScoredRow::from).collect();
        let bytes = match self.config.format {
            OutputFormat::Csv => to_csv(&rows)?,
            OutputFormat::Json => serde_json::to_vec_pretty(scored)?,
        };
        self.stage(&self.config.scored_transactions_path, bytes).await?;
        tracing::debug!(
            path = %self.config.scored_transactions_path.display(),
            rows = scored.len(),
            "Staged scored transactions"
        );
        Ok(())
    }

    async fn save_summaries(
        &self,
        summaries: &BTreeMap<WalletId, WalletRiskSummary>,
        wallets: &HashMap<WalletId, Wallet>,
    ) -> ProcessingResult<()> {
        let rows: BTreeMap<&str, SummaryRow<'_>> = summaries
            .iter()
            .map(|(id, summary)| (id.as_str(), SummaryRow::new(summary, wallets.get(id))))
            .collect();
        let bytes = match self.config.format {
            OutputFormat::Csv => to_csv(&rows.into_values().collect::<Vec<_>>())?,
            OutputFormat::Json => serde_json::to_vec_pretty(&rows)?,
        };
        self.stage(&self.config.wallet_summaries_path, bytes).await?;
        tracing::debug!(
            path = %self.config.wallet_summaries_path.display(),
            wallets = summaries.len(),
            "Staged wallet summaries"
        );
        Ok(())
    }

    async fn save_kpis(&self, kpis: &PortfolioKpis) -> ProcessingResult<()> {
        let Some(path) = &self.config.kpis_path else {
            return Ok(());
        };
        self.stage(path, serde_json::to_vec_pretty(kpis)?).await?;
        tracing::debug!(path = %path.display(), "Staged portfolio KPIs");
        Ok(())
    }

    async fn commit(&self) -> ProcessingResult<()> {
        let staged = std::mem::take(&mut *self.staged.lock().await);
        for (file, path) in staged {
            file.persist(&path).map_err(|e| ProcessingError::Io {
                path: path.clone(),
                source: e.error,
            })?;
            tracing::info!(path = %path.display(), "Saved output");
        }
        Ok(())
    }
}

fn to_csv<T: Serialize>(rows: &[T]) -> ProcessingResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ProcessingError::Csv(csv::Error::from(e.into_error())))
}

async fn read_file(path: &Path) -> ProcessingResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|source| ProcessingError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `bytes` to a new temporary file in the target's directory.
fn write_temp(target: &Path, bytes: &[u8]) -> io::Result<NamedTempFile> {
    if target.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::IsADirectory,
            "output path is a directory",
        ));
    }
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    Ok(file)
}
