use std::collections::HashMap;

use crate::model::{Transaction, TransactionContext};

/// Per-wallet aggregates computed once over the complete transaction set.
///
/// Built before any transaction is scored and only read afterwards, so the
/// result does not depend on row order and scoring can run in parallel.
#[derive(Debug, Default)]
pub struct NetworkSnapshot<'a> {
    /// wallet -> number of fraud-pattern transactions it is party to
    fraud_involvement: HashMap<&'a str, u32>,
    /// receiver -> sender -> number of transactions from that sender
    inbound: HashMap<&'a str, HashMap<&'a str, u32>>,
}

impl<'a> NetworkSnapshot<'a> {
    pub fn build(transactions: &'a [Transaction]) -> Self {
        let mut snapshot = Self::default();

        for tx in transactions {
            if tx.is_fraud_pattern {
                *snapshot.fraud_involvement.entry(tx.from_wallet.as_str()).or_default() += 1;
                if tx.to_wallet != tx.from_wallet {
                    *snapshot.fraud_involvement.entry(tx.to_wallet.as_str()).or_default() += 1;
                }
            }
            *snapshot
                .inbound
                .entry(tx.to_wallet.as_str())
                .or_default()
                .entry(tx.from_wallet.as_str())
                .or_default() += 1;
        }

        snapshot
    }

    /// Fraud-pattern transactions the wallet takes part in, over the whole set.
    pub fn fraud_involvement(&self, wallet_id: &str) -> u32 {
        self.fraud_involvement.get(wallet_id).copied().unwrap_or(0)
    }

    /// Distinct wallets that sent at least once into `wallet_id`.
    pub fn distinct_senders(&self, wallet_id: &str) -> u32 {
        self.inbound
            .get(wallet_id)
            .map(|senders| senders.len() as u32)
            .unwrap_or(0)
    }

    /// Context for `tx` with `tx` itself excluded from every count.
    ///
    /// `tx` must be one of the transactions the snapshot was built from.
    pub fn context_for(&self, tx: &Transaction) -> TransactionContext {
        let own_fraud = u32::from(tx.is_fraud_pattern);

        let senders = self.inbound.get(tx.to_wallet.as_str());
        let distinct = senders.map(|s| s.len() as u32).unwrap_or(0);
        let only_link = senders
            .and_then(|s| s.get(tx.from_wallet.as_str()))
            .is_some_and(|&count| count == 1);

        TransactionContext {
            sender_fraud_involvement: self
                .fraud_involvement(&tx.from_wallet)
                .saturating_sub(own_fraud),
            receiver_fraud_involvement: self
                .fraud_involvement(&tx.to_wallet)
                .saturating_sub(own_fraud),
            receiver_distinct_senders: distinct.saturating_sub(u32::from(only_link)),
        }
    }
}
