use common::config::Config;
use processing::{
    ProcessingResult,
    processor::Processor,
    scorers::{CombinedScorer, RuleBasedScorer, ScorePolicy},
};

use crate::expression_based_scorer::get_expression_based_scorer;

/// Validates the rule configuration and wires the fixed wallet rules and the
/// expression rules into one processor.
pub fn build_processor(config: &Config) -> ProcessingResult<Processor<CombinedScorer>> {
    let scorer = CombinedScorer::new()
        .with(RuleBasedScorer::from_config(&config.rules)?)
        .with(get_expression_based_scorer(&config.rules)?);
    let policy = ScorePolicy::from_config(&config.rules)?;

    Processor::new(config.processor.clone(), scorer, policy)
}
