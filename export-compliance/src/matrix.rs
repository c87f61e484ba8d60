use crate::tables::{ControlTables, MatrixRule};
use crate::types::ClassificationHit;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Highest confidence a hit can report
pub const MAX_CONFIDENCE: f64 = 0.99;

/// Matched substrings kept per hit
pub const MAX_MATCHED_TERMS: usize = 5;

/// Symmetric perturbation applied to a rule's base confidence.
///
/// Only the reported number and the ordering among hits move; whether a rule
/// matches never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Jitter {
    spread: f64,
}

impl Jitter {
    pub fn new(spread: f64) -> Self {
        let spread = if spread.is_finite() { spread.abs() } else { 0.0 };
        Self { spread }
    }

    pub fn none() -> Self {
        Self { spread: 0.0 }
    }

    pub fn spread(&self) -> f64 {
        self.spread
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.spread == 0.0 {
            return 0.0;
        }
        rng.gen_range(-self.spread..=self.spread)
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::new(0.05)
    }
}

/// Evaluate every matrix rule against the corpus.
///
/// Hits come back sorted by descending confidence; equal confidences keep
/// rule declaration order.
pub fn classify_with<R: Rng + ?Sized>(
    tables: &ControlTables,
    corpus: &str,
    jitter: Jitter,
    rng: &mut R,
) -> Vec<ClassificationHit> {
    let mut hits = Vec::new();

    for matrix_rule in tables.rules() {
        if !matrix_rule.regex.is_match(corpus) {
            continue;
        }

        let rule = &matrix_rule.rule;
        let confidence = (rule.base_confidence + jitter.sample(rng)).clamp(0.0, MAX_CONFIDENCE);
        let matched_terms = matched_terms(matrix_rule, corpus);

        debug!(
            "Matrix rule {} matched (confidence {:.3}, terms {:?})",
            rule.clause_id, confidence, matched_terms
        );

        hits.push(ClassificationHit {
            clause_id: rule.clause_id.clone(),
            category: rule.category.clone(),
            title: rule.title.clone(),
            threshold: rule.threshold.clone(),
            risk_tier: rule.risk_tier,
            confidence,
            matched_terms,
        });
    }

    // Vec::sort_by is stable
    hits.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    hits
}

// Distinct non-empty matches in order of first occurrence
fn matched_terms(matrix_rule: &MatrixRule, corpus: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();

    for found in matrix_rule.regex.find_iter(corpus) {
        let term = found.as_str();
        if term.is_empty() || terms.iter().any(|t| t == term) {
            continue;
        }
        terms.push(term.to_string());
        if terms.len() == MAX_MATCHED_TERMS {
            break;
        }
    }

    terms
}
