use crate::{
    error::ProcessingResult,
    model::{PortfolioKpis, ScoredTransaction, Wallet, WalletId, WalletRiskSummary},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

/// Destination of a finished scoring run.
///
/// Only called after the whole pipeline succeeded. Saves may be buffered;
/// nothing is guaranteed visible until `commit` returns.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Starts a new batch of outputs.
    async fn save_scored(&self, scored: &[ScoredTransaction]) -> ProcessingResult<()>;

    /// `wallets` is passed so attributes can be joined onto each summary.
    async fn save_summaries(
        &self,
        summaries: &BTreeMap<WalletId, WalletRiskSummary>,
        wallets: &HashMap<WalletId, Wallet>,
    ) -> ProcessingResult<()>;

    async fn save_kpis(&self, kpis: &PortfolioKpis) -> ProcessingResult<()>;

    /// Publishes everything saved since the batch started.
    async fn commit(&self) -> ProcessingResult<()>;
}
