use std::collections::HashMap;
use std::time::Instant;

use common::config::{MissingWalletPolicy, ProcessorConfig};
use metrics::{counter, histogram};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    aggregator::summarize_wallets,
    error::{ProcessingError, ProcessingResult},
    model::{ScoredTransaction, ScoringInput, ScoringOutput, Transaction, Wallet, WalletId},
    scorers::{ScorePolicy, Scorer},
    snapshot::NetworkSnapshot,
};

/// Batch scoring pipeline: reference check, snapshot, per-transaction
/// scoring, wallet aggregation.
pub struct Processor<S: Scorer> {
    config: ProcessorConfig,
    scorer: S,
    policy: ScorePolicy,
    pool: Option<rayon::ThreadPool>,
}

impl<S: Scorer> Processor<S> {
    pub fn new(config: ProcessorConfig, scorer: S, policy: ScorePolicy) -> ProcessingResult<Self> {
        if config.threads == 0 {
            return Err(ProcessingError::InvalidConfig(
                "processor.threads must be at least 1".to_string(),
            ));
        }

        let pool = if config.threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads as usize)
                .build()
                .map_err(|e| ProcessingError::InvalidConfig(format!("cannot start scoring threads: {e}")))?;
            Some(pool)
        } else {
            None
        };

        info!(
            threads = config.threads,
            on_missing_wallet = ?config.on_missing_wallet,
            "Initializing new Processor"
        );
        Ok(Self {
            config,
            scorer,
            policy,
            pool,
        })
    }

    pub fn policy(&self) -> &ScorePolicy {
        &self.policy
    }

    /// Scores every transaction and aggregates per sending wallet.
    ///
    /// Output order of `scored` matches `transactions`. Any error aborts the
    /// whole run.
    pub fn process(
        &self,
        wallets: &HashMap<WalletId, Wallet>,
        transactions: &[Transaction],
    ) -> ProcessingResult<ScoringOutput> {
        info!(
            wallets = wallets.len(),
            transactions = transactions.len(),
            "Starting scoring run"
        );

        self.check_references(wallets, transactions)?;

        let started = Instant::now();
        let snapshot = NetworkSnapshot::build(transactions);
        histogram!("wallet_risk_pipeline_seconds", "stage" => "snapshot")
            .record(started.elapsed().as_secs_f64());
        debug!("Built network snapshot");

        let started = Instant::now();
        let scored = self.score_all(wallets, transactions, &snapshot)?;
        histogram!("wallet_risk_pipeline_seconds", "stage" => "scoring")
            .record(started.elapsed().as_secs_f64());
        self.record_rule_hits(&scored);

        let started = Instant::now();
        let summaries = summarize_wallets(wallets, &scored, &self.policy);
        histogram!("wallet_risk_pipeline_seconds", "stage" => "aggregation")
            .record(started.elapsed().as_secs_f64());

        info!(
            scored = scored.len(),
            summaries = summaries.len(),
            "Finished scoring run"
        );
        Ok(ScoringOutput { scored, summaries })
    }

    fn check_references(
        &self,
        wallets: &HashMap<WalletId, Wallet>,
        transactions: &[Transaction],
    ) -> ProcessingResult<()> {
        let mut dangling = 0usize;

        for (index, tx) in transactions.iter().enumerate() {
            for (field, wallet_id) in [("from_wallet", &tx.from_wallet), ("to_wallet", &tx.to_wallet)] {
                if wallets.contains_key(wallet_id) {
                    continue;
                }
                match self.config.on_missing_wallet {
                    MissingWalletPolicy::Reject => {
                        return Err(ProcessingError::DanglingWalletReference {
                            index,
                            field,
                            wallet_id: wallet_id.clone(),
                        });
                    }
                    MissingWalletPolicy::Baseline => dangling += 1,
                }
            }
        }

        if dangling > 0 {
            warn!(
                references = dangling,
                "Unknown wallets scored with baseline attributes"
            );
        }
        Ok(())
    }

    fn score_all(
        &self,
        wallets: &HashMap<WalletId, Wallet>,
        transactions: &[Transaction],
        snapshot: &NetworkSnapshot<'_>,
    ) -> ProcessingResult<Vec<ScoredTransaction>> {
        match &self.pool {
            // Results are gathered per transaction first so the reported error
            // is the lowest-index failure, as in sequential mode.
            Some(pool) => pool
                .install(|| {
                    transactions
                        .par_iter()
                        .map(|tx| self.score_one(wallets, snapshot, tx))
                        .collect::<Vec<_>>()
                })
                .into_iter()
                .collect(),
            None => transactions
                .iter()
                .map(|tx| self.score_one(wallets, snapshot, tx))
                .collect(),
        }
    }

    fn score_one(
        &self,
        wallets: &HashMap<WalletId, Wallet>,
        snapshot: &NetworkSnapshot<'_>,
        tx: &Transaction,
    ) -> ProcessingResult<ScoredTransaction> {
        let input = ScoringInput {
            transaction: tx,
            sender: wallets.get(&tx.from_wallet),
            receiver: wallets.get(&tx.to_wallet),
            context: snapshot.context_for(tx),
        };

        let results = self.scorer.score(&input)?;
        let risk_score = self.policy.total_score(&results);

        Ok(ScoredTransaction {
            transaction: tx.clone(),
            risk_score,
            risk_bucket: self.policy.bucket(risk_score),
            triggered_rules: results.into_iter().map(|r| r.name).collect(),
        })
    }

    fn record_rule_hits(&self, scored: &[ScoredTransaction]) {
        counter!("wallet_risk_transactions_scored_total").increment(scored.len() as u64);

        let mut hits: HashMap<&str, u64> = HashMap::new();
        for tx in scored {
            for rule in &tx.triggered_rules {
                *hits.entry(rule.as_str()).or_default() += 1;
            }
        }
        for (rule, count) in hits {
            counter!("wallet_risk_rule_hits_total", "rule" => rule.to_string()).increment(count);
        }
    }
}
