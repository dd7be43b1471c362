use crate::{
    error::ProcessingResult,
    model::{Transaction, Wallet, WalletId},
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Where the raw wallets and transactions come from.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn load_wallets(&self) -> ProcessingResult<HashMap<WalletId, Wallet>>;

    async fn load_transactions(&self) -> ProcessingResult<Vec<Transaction>>;
}
