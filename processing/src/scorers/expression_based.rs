use std::collections::HashSet;

use common::config::ExpressionRuleConfig;
use evalexpr::{
    ContextWithMutableVariables, DefaultNumericTypes, HashMapContext, Node, build_operator_tree,
};

use crate::{
    error::{ProcessingError, ProcessingResult},
    model::{Feature, ScorerResult, ScoringInput},
    scorers::{Scorer, ensure_non_negative},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionRule {
    pub name: String,
    pub expression: String,
    pub score: f64,
}

impl From<ExpressionRuleConfig> for ExpressionRule {
    fn from(config: ExpressionRuleConfig) -> Self {
        Self {
            name: config.name,
            expression: config.expression,
            score: config.score,
        }
    }
}

/// Scores boolean expressions over the extracted transaction features.
///
/// Expressions are parsed once at construction; `compiled[i]` is the operator
/// tree of `expressions[i]`.
#[derive(Debug, Default)]
pub struct ExpressionBasedScorer {
    expressions: Vec<ExpressionRule>,
    compiled: Vec<Node<DefaultNumericTypes>>,
}

impl ExpressionBasedScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks every rule up front: unique names, non-negative scores and
    /// expressions that parse.
    pub fn new_with_expressions(expressions: Vec<ExpressionRule>) -> ProcessingResult<Self> {
        let mut names = HashSet::new();
        let mut compiled = Vec::with_capacity(expressions.len());
        for rule in &expressions {
            if !names.insert(rule.name.as_str()) {
                return Err(ProcessingError::InvalidConfig(format!(
                    "duplicate expression rule name '{}'",
                    rule.name
                )));
            }
            ensure_non_negative(&format!("expression rule '{}' score", rule.name), rule.score)?;
            let tree = build_operator_tree::<DefaultNumericTypes>(&rule.expression).map_err(|e| {
                ProcessingError::InvalidExpression {
                    rule: rule.name.clone(),
                    reason: e.to_string(),
                }
            })?;
            compiled.push(tree);
        }
        Ok(Self {
            expressions,
            compiled,
        })
    }

    pub fn expressions(&self) -> &[ExpressionRule] {
        &self.expressions
    }

    fn setup_context(&self, features: Vec<Feature>) -> ProcessingResult<HashMapContext<DefaultNumericTypes>> {
        let mut context = HashMapContext::<DefaultNumericTypes>::new();
        for feature in features {
            let name = feature.name;
            context
                .set_value(name.clone(), feature.value.into())
                .map_err(|e| ProcessingError::ExpressionEvaluation {
                    rule: format!("<feature {name}>"),
                    reason: e.to_string(),
                })?;
        }
        Ok(context)
    }
}

impl Scorer for ExpressionBasedScorer {
    fn score(&self, input: &ScoringInput<'_>) -> ProcessingResult<Vec<ScorerResult>> {
        if self.expressions.is_empty() {
            return Ok(Vec::new());
        }

        let context = self.setup_context(input.extract_features())?;
        let mut results = Vec::new();

        for (rule, tree) in self.expressions.iter().zip(&self.compiled) {
            let fired = tree.eval_boolean_with_context(&context).map_err(|e| {
                ProcessingError::ExpressionEvaluation {
                    rule: rule.name.clone(),
                    reason: e.to_string(),
                }
            })?;
            if fired {
                results.push(ScorerResult {
                    name: rule.name.clone(),
                    score: rule.score,
                });
            }
        }

        Ok(results)
    }
}
