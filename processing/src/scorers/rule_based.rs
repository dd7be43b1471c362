use std::collections::HashSet;

use common::config::RulesConfig;

use crate::{
    error::ProcessingResult,
    model::{ScorerResult, ScoringInput},
    scorers::{Scorer, ensure_non_negative},
};

pub const NEW_WALLET_ABUSE: &str = "New wallet abuse";
pub const HIGH_RISK_COUNTERPARTY: &str = "High-risk counterparty";
pub const CONCENTRATED_FLOW: &str = "Concentrated flow";
pub const HIGH_RISK_CHAIN_OR_COUNTRY: &str = "High-risk chain or country";

type Rule = Box<dyn Fn(&ScoringInput<'_>) -> Option<ScorerResult> + Send + Sync>;

/// Ordered list of rules, each contributing a fixed weight when it fires.
#[derive(Default)]
pub struct RuleBasedScorer {
    rules: Vec<Rule>,
}

impl RuleBasedScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(
        &mut self,
        rule: impl Fn(&ScoringInput<'_>) -> Option<ScorerResult> + Send + Sync + 'static,
    ) {
        self.rules.push(Box::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Builds the four wallet rules from configuration.
    pub fn from_config(config: &RulesConfig) -> ProcessingResult<Self> {
        let weights = &config.weights;
        ensure_non_negative("weights.new_wallet_abuse", weights.new_wallet_abuse)?;
        ensure_non_negative("weights.high_risk_counterparty", weights.high_risk_counterparty)?;
        ensure_non_negative("weights.concentrated_flow", weights.concentrated_flow)?;
        ensure_non_negative(
            "weights.high_risk_chain_or_country",
            weights.high_risk_chain_or_country,
        )?;
        ensure_non_negative("large_transfer_amount", config.large_transfer_amount)?;

        let mut scorer = Self::new();

        // Young sender moving a large amount
        let young_days = config.young_wallet_age_days;
        let large_amount = config.large_transfer_amount;
        let weight = weights.new_wallet_abuse;
        scorer.add_rule(move |input| {
            let sender = input.sender?;
            (sender.wallet_age_days < young_days && input.transaction.amount > large_amount)
                .then(|| hit(NEW_WALLET_ABUSE, weight))
        });

        // Either party already appears in enough flagged transactions
        let threshold = config.fraud_history_threshold;
        let weight = weights.high_risk_counterparty;
        scorer.add_rule(move |input| {
            let ctx = &input.context;
            (ctx.sender_fraud_involvement >= threshold || ctx.receiver_fraud_involvement >= threshold)
                .then(|| hit(HIGH_RISK_COUNTERPARTY, weight))
        });

        // Receiver collects from many distinct senders
        let hub_threshold = config.hub_distinct_senders;
        let weight = weights.concentrated_flow;
        scorer.add_rule(move |input| {
            (input.context.receiver_distinct_senders > hub_threshold)
                .then(|| hit(CONCENTRATED_FLOW, weight))
        });

        let chains: HashSet<String> = config.high_risk_chains.iter().cloned().collect();
        let countries: HashSet<String> = config.high_risk_countries.iter().cloned().collect();
        let weight = weights.high_risk_chain_or_country;
        scorer.add_rule(move |input| {
            let risky_country = input
                .sender
                .is_some_and(|sender| countries.contains(&sender.country));
            (chains.contains(&input.transaction.chain) || risky_country)
                .then(|| hit(HIGH_RISK_CHAIN_OR_COUNTRY, weight))
        });

        Ok(scorer)
    }
}

impl Scorer for RuleBasedScorer {
    fn score(&self, input: &ScoringInput<'_>) -> ProcessingResult<Vec<ScorerResult>> {
        Ok(self.rules.iter().filter_map(|rule| rule(input)).collect())
    }
}

fn hit(name: &str, score: f64) -> ScorerResult {
    ScorerResult {
        name: name.to_string(),
        score,
    }
}
