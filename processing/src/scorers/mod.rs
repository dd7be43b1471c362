pub mod expression_based;
pub mod rule_based;

pub use expression_based::*;
pub use rule_based::*;

use common::config::{BucketCutoffs, RulesConfig};

use crate::{
    error::{ProcessingError, ProcessingResult},
    model::{RiskBucket, ScorerResult, ScoringInput},
};

/// Produces the rule contributions for one transaction.
///
/// Implementations must be pure: the same input always yields the same
/// results, and no contribution is negative.
pub trait Scorer: Send + Sync {
    fn score(&self, input: &ScoringInput<'_>) -> ProcessingResult<Vec<ScorerResult>>;
}

/// Runs several scorers in order and concatenates their results.
#[derive(Default)]
pub struct CombinedScorer {
    scorers: Vec<Box<dyn Scorer>>,
}

impl CombinedScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, scorer: impl Scorer + 'static) -> Self {
        self.scorers.push(Box::new(scorer));
        self
    }
}

impl Scorer for CombinedScorer {
    fn score(&self, input: &ScoringInput<'_>) -> ProcessingResult<Vec<ScorerResult>> {
        let mut results = Vec::new();
        for scorer in &self.scorers {
            results.extend(scorer.score(input)?);
        }
        Ok(results)
    }
}

/// Turns summed rule contributions into the final score and bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePolicy {
    cutoffs: BucketCutoffs,
    score_cap: Option<f64>,
}

impl ScorePolicy {
    pub fn new(cutoffs: BucketCutoffs, score_cap: Option<f64>) -> ProcessingResult<Self> {
        ensure_non_negative("buckets.low", cutoffs.low)?;
        ensure_non_negative("buckets.high", cutoffs.high)?;
        // A zero score has to land in LOW.
        if cutoffs.low <= 0.0 {
            return Err(ProcessingError::InvalidConfig(format!(
                "buckets.low must be positive, got {}",
                cutoffs.low
            )));
        }
        if cutoffs.low >= cutoffs.high {
            return Err(ProcessingError::InvalidConfig(format!(
                "buckets.low ({}) must be below buckets.high ({})",
                cutoffs.low, cutoffs.high
            )));
        }
        if let Some(cap) = score_cap {
            ensure_non_negative("score_cap", cap)?;
        }
        Ok(Self { cutoffs, score_cap })
    }

    pub fn from_config(rules: &RulesConfig) -> ProcessingResult<Self> {
        Self::new(rules.buckets, rules.score_cap)
    }

    /// Sums the contributions, then applies the cap if one is configured.
    pub fn total_score(&self, results: &[ScorerResult]) -> f64 {
        let total: f64 = results.iter().map(|r| r.score).sum();
        match self.score_cap {
            Some(cap) => total.min(cap),
            None => total,
        }
    }

    pub fn bucket(&self, score: f64) -> RiskBucket {
        RiskBucket::from_score(score, &self.cutoffs)
    }
}

pub(crate) fn ensure_non_negative(name: &str, value: f64) -> ProcessingResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ProcessingError::InvalidConfig(format!(
            "{name} must be a finite non-negative number, got {value}"
        )))
    }
}
