mod test_utils;

use common::reference_rules_config;
use processing::{
    ProcessingError,
    model::{RiskBucket, ScoringInput, TransactionContext},
    scorers::{
        CONCENTRATED_FLOW, HIGH_RISK_CHAIN_OR_COUNTRY, HIGH_RISK_COUNTERPARTY, NEW_WALLET_ABUSE,
        RuleBasedScorer, Scorer,
    },
};
use test_utils::*;

fn fired(scorer: &RuleBasedScorer, input: &ScoringInput<'_>) -> Vec<String> {
    scorer
        .score(input)
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect()
}

#[test]
fn builds_four_rules_in_fixed_order() {
    let scorer = RuleBasedScorer::from_config(&reference_rules_config()).unwrap();
    assert_eq!(scorer.len(), 4);

    let sender = wallet("W", 1, "KP");
    let transaction = tx("W", "H").amount(20_000.0).chain("BTC").build();
    let input = ScoringInput {
        transaction: &transaction,
        sender: Some(&sender),
        receiver: None,
        context: TransactionContext {
            sender_fraud_involvement: 5,
            receiver_fraud_involvement: 0,
            receiver_distinct_senders: 50,
        },
    };

    assert_eq!(
        fired(&scorer, &input),
        vec![
            NEW_WALLET_ABUSE,
            HIGH_RISK_COUNTERPARTY,
            CONCENTRATED_FLOW,
            HIGH_RISK_CHAIN_OR_COUNTRY
        ]
    );
}

#[test]
fn new_wallet_rule_uses_strict_comparisons() {
    let scorer = RuleBasedScorer::from_config(&reference_rules_config()).unwrap();
    let cases = [
        (6, 10_000.01, true),
        (7, 50_000.0, false),
        (0, 10_000.0, false),
        (2, 50_000.0, true),
    ];

    for (age, amount, expected) in cases {
        let sender = wallet("W", age, "US");
        let transaction = tx("W", "R").amount(amount).build();
        let input = ScoringInput {
            transaction: &transaction,
            sender: Some(&sender),
            receiver: None,
            context: TransactionContext::default(),
        };
        assert_eq!(
            fired(&scorer, &input).contains(&NEW_WALLET_ABUSE.to_string()),
            expected,
            "age {age}, amount {amount}"
        );
    }
}

#[test]
fn counterparty_rule_fires_at_threshold_on_either_side() {
    let scorer = RuleBasedScorer::from_config(&reference_rules_config()).unwrap();
    let transaction = tx("A", "B").build();
    let contexts = [
        (1, 1, false),
        (2, 0, true),
        (0, 2, true),
        (0, 0, false),
    ];

    for (sender_involvement, receiver_involvement, expected) in contexts {
        let input = ScoringInput {
            transaction: &transaction,
            sender: None,
            receiver: None,
            context: TransactionContext {
                sender_fraud_involvement: sender_involvement,
                receiver_fraud_involvement: receiver_involvement,
                receiver_distinct_senders: 0,
            },
        };
        assert_eq!(
            fired(&scorer, &input) == vec![HIGH_RISK_COUNTERPARTY],
            expected,
            "sender {sender_involvement}, receiver {receiver_involvement}"
        );
    }
}

#[test]
fn hub_rule_needs_strictly_more_than_threshold() {
    let scorer = RuleBasedScorer::from_config(&reference_rules_config()).unwrap();
    let transaction = tx("A", "H").build();

    for (distinct, expected) in [(10, false), (11, true)] {
        let input = ScoringInput {
            transaction: &transaction,
            sender: None,
            receiver: None,
            context: TransactionContext {
                receiver_distinct_senders: distinct,
                ..TransactionContext::default()
            },
        };
        assert_eq!(fired(&scorer, &input) == vec![CONCENTRATED_FLOW], expected);
    }
}

#[test]
fn chain_or_country_contributes_once() {
    let scorer = RuleBasedScorer::from_config(&reference_rules_config()).unwrap();
    let sender = wallet("W", 400, "KP");
    let transaction = tx("W", "R").chain("BTC").build();
    let input = ScoringInput {
        transaction: &transaction,
        sender: Some(&sender),
        receiver: None,
        context: TransactionContext::default(),
    };

    let results = scorer.score(&input).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, HIGH_RISK_CHAIN_OR_COUNTRY);
    assert_eq!(results[0].score, 15.0);
}

#[test]
fn unknown_sender_only_triggers_transaction_level_rules() {
    let scorer = RuleBasedScorer::from_config(&reference_rules_config()).unwrap();
    let transaction = tx("GHOST", "R").amount(99_999.0).build();
    let input = ScoringInput {
        transaction: &transaction,
        sender: None,
        receiver: None,
        context: TransactionContext::default(),
    };
    assert!(fired(&scorer, &input).is_empty());

    let transaction = tx("GHOST", "R").chain("BTC").build();
    let input = ScoringInput {
        transaction: &transaction,
        ..input
    };
    assert_eq!(fired(&scorer, &input), vec![HIGH_RISK_CHAIN_OR_COUNTRY]);
}

#[test]
fn negative_weight_is_rejected() {
    let mut rules = reference_rules_config();
    rules.weights.concentrated_flow = -1.0;

    let err = RuleBasedScorer::from_config(&rules).err().unwrap();
    assert!(matches!(err, ProcessingError::InvalidConfig(msg) if msg.contains("concentrated_flow")));
}

#[test]
fn young_wallet_large_transfer_is_medium() {
    let processor = reference_processor();
    let wallets = wallet_set([wallet("W1", 2, "US"), seasoned("R")]);
    let transactions = vec![tx("W1", "R").amount(50_000.0).build()];

    let output = processor.process(&wallets, &transactions).unwrap();

    let scored = &output.scored[0];
    assert_eq!(scored.risk_score, 40.0);
    assert_eq!(scored.risk_bucket, RiskBucket::Medium);
    assert_eq!(scored.triggered_rules, vec![NEW_WALLET_ABUSE]);
}

#[test]
fn repeat_fraud_wallet_taints_its_clean_transactions() {
    let processor = reference_processor();
    let wallets = wallet_set(["W2", "A", "B", "C", "D"].map(seasoned));
    let transactions = vec![
        tx("W2", "A").fraud().build(),
        tx("W2", "B").fraud().build(),
        tx("C", "W2").fraud().build(),
        tx("W2", "D").build(),
    ];

    let output = processor.process(&wallets, &transactions).unwrap();

    // Three other flagged transactions involve W2.
    assert_eq!(output.scored[3].triggered_rules, vec![HIGH_RISK_COUNTERPARTY]);
    assert_eq!(output.scored[3].risk_score, 35.0);
    assert_eq!(output.scored[3].risk_bucket, RiskBucket::Medium);

    // Its own flag is excluded, two others remain.
    assert_eq!(output.scored[0].triggered_rules, vec![HIGH_RISK_COUNTERPARTY]);
}

#[test]
fn single_prior_fraud_is_below_threshold() {
    let processor = reference_processor();
    let wallets = wallet_set(["A", "B", "C"].map(seasoned));
    let transactions = vec![tx("A", "B").fraud().build(), tx("A", "C").build()];

    let output = processor.process(&wallets, &transactions).unwrap();

    assert!(output.scored.iter().all(|s| s.triggered_rules.is_empty()));
    assert!(output.scored.iter().all(|s| s.risk_bucket == RiskBucket::Low));
}

#[test]
fn hub_receiving_from_fifteen_senders() {
    let processor = reference_processor();
    let senders: Vec<String> = (0..15).map(|i| format!("S{i:02}")).collect();
    let wallets = wallet_set(
        senders
            .iter()
            .map(|id| seasoned(id))
            .chain([seasoned("HUB")]),
    );
    let transactions: Vec<_> = senders.iter().map(|s| tx(s, "HUB").build()).collect();

    let output = processor.process(&wallets, &transactions).unwrap();

    for scored in &output.scored {
        assert_eq!(scored.triggered_rules, vec![CONCENTRATED_FLOW]);
        assert_eq!(scored.risk_score, 25.0);
        assert_eq!(scored.risk_bucket, RiskBucket::Low);
    }
}

#[test]
fn eleven_senders_do_not_make_a_hub() {
    let processor = reference_processor();
    let senders: Vec<String> = (0..11).map(|i| format!("S{i:02}")).collect();
    let wallets = wallet_set(
        senders
            .iter()
            .map(|id| seasoned(id))
            .chain([seasoned("HUB")]),
    );
    let transactions: Vec<_> = senders.iter().map(|s| tx(s, "HUB").build()).collect();

    let output = processor.process(&wallets, &transactions).unwrap();

    // Each transaction sees only the other ten senders.
    assert!(output.scored.iter().all(|s| s.triggered_rules.is_empty()));
}

#[test]
fn btc_transfer_between_clean_wallets_is_low() {
    let processor = reference_processor();
    let wallets = wallet_set([seasoned("A"), seasoned("B")]);
    let transactions = vec![tx("A", "B").chain("BTC").build()];

    let output = processor.process(&wallets, &transactions).unwrap();

    assert_eq!(output.scored[0].risk_score, 15.0);
    assert_eq!(output.scored[0].risk_bucket, RiskBucket::Low);
    assert_eq!(output.scored[0].triggered_rules, vec![HIGH_RISK_CHAIN_OR_COUNTRY]);
}
