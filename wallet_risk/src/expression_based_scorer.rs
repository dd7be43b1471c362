use common::config::RulesConfig;
use processing::{
    ProcessingResult,
    scorers::{ExpressionBasedScorer, ExpressionRule},
};

/// Rules applied when the config does not list any `expression_rules`.
pub fn default_expression_rules() -> Vec<ExpressionRule> {
    vec![
        // Very large transfer regardless of wallet history
        ExpressionRule {
            name: "Very large amount".to_string(),
            expression: "amount >= 1000.0".to_string(),
            score: 20.0,
        },
        // Many small credits followed by one large outbound transfer
        ExpressionRule {
            name: "Mixing-like outbound".to_string(),
            expression: "contains(pattern_tags, \"mixing_like_outbound\")".to_string(),
            score: 30.0,
        },
    ]
}

pub fn get_expression_based_scorer(config: &RulesConfig) -> ProcessingResult<ExpressionBasedScorer> {
    let expressions = match &config.expression_rules {
        Some(rules) => rules.iter().cloned().map(ExpressionRule::from).collect(),
        None => default_expression_rules(),
    };
    ExpressionBasedScorer::new_with_expressions(expressions)
}
