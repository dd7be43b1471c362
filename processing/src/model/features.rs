use super::{Feature, FeatureValue, ScoringInput};

impl ScoringInput<'_> {
    /// Flattens the transaction, both wallets and the snapshot context into
    /// named values for expression rules.
    ///
    /// The ground-truth `is_fraud_pattern` label is deliberately absent.
    pub fn extract_features(&self) -> Vec<Feature> {
        let tx = self.transaction;
        let mut features = vec![
            Feature::new("amount", FeatureValue::Double(tx.amount)),
            Feature::new("chain", FeatureValue::String(tx.chain.clone())),
            Feature::new(
                "tx_type",
                FeatureValue::String(tx.tx_type.clone().unwrap_or_default()),
            ),
            Feature::new("pattern_tags", FeatureValue::StringList(tx.pattern_tags.clone())),
            Feature::new("sender_known", FeatureValue::Bool(self.sender.is_some())),
            Feature::new("receiver_known", FeatureValue::Bool(self.receiver.is_some())),
            Feature::new(
                "sender_fraud_involvement",
                FeatureValue::Int(self.context.sender_fraud_involvement as i64),
            ),
            Feature::new(
                "receiver_fraud_involvement",
                FeatureValue::Int(self.context.receiver_fraud_involvement as i64),
            ),
            Feature::new(
                "receiver_distinct_senders",
                FeatureValue::Int(self.context.receiver_distinct_senders as i64),
            ),
        ];

        // Unknown senders get neutral values so expressions still resolve. The age
        // is the oldest a wallet can be and stays safe for arithmetic.
        let (age, country, exchange_linked) = match self.sender {
            Some(wallet) => (
                wallet.wallet_age_days as i64,
                wallet.country.clone(),
                wallet.is_exchange_linked,
            ),
            None => (i64::from(u32::MAX), String::new(), false),
        };
        features.push(Feature::new("sender_wallet_age_days", FeatureValue::Int(age)));
        features.push(Feature::new("sender_country", FeatureValue::String(country)));
        features.push(Feature::new(
            "sender_is_exchange_linked",
            FeatureValue::Bool(exchange_linked),
        ));

        features
    }
}
