//! Risk scoring engine

use crate::{Result, RiskAssessment, RiskFactor, RiskLevel, RiskScore, RiskThresholds};
use serde::{Deserialize, Serialize};

/// Weight added to the score by each risk factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Sanctioned destination
    pub destination: u32,

    /// Watchlisted buyer
    pub buyer: u32,

    /// Watchlisted end user
    pub end_user: u32,

    /// Red-flag terms in end-use text (flat, not per term)
    pub end_use: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            destination: 40,
            buyer: 25,
            end_user: 30,
            end_use: 15,
        }
    }
}

impl ScoreWeights {
    /// Weight for a single factor
    pub fn weight_of(&self, factor: RiskFactor) -> u32 {
        match factor {
            RiskFactor::SanctionedDestination => self.destination,
            RiskFactor::WatchlistedBuyer => self.buyer,
            RiskFactor::WatchlistedEndUser => self.end_user,
            RiskFactor::EndUseRedFlag => self.end_use,
        }
    }
}

/// Risk scorer
///
/// Accumulates factors independently; the level is derived once, after all
/// factors have been recorded. A recorded floor can raise the derived level
/// but never lower it.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    weights: ScoreWeights,
    thresholds: RiskThresholds,
    score: RiskScore,
    floor: RiskLevel,
    factors: Vec<RiskFactor>,
}

impl RiskScorer {
    /// Create new risk scorer
    pub fn new(weights: ScoreWeights, thresholds: RiskThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self {
            weights,
            thresholds,
            score: RiskScore::ZERO,
            floor: RiskLevel::Low,
            factors: Vec::new(),
        })
    }

    /// Record a factor and add its weight
    pub fn record(&mut self, factor: RiskFactor) {
        self.score = self.score.add(self.weights.weight_of(factor));
        self.factors.push(factor);
    }

    /// Require the final level to be at least `level`
    pub fn escalate(&mut self, level: RiskLevel) {
        self.floor = self.floor.max(level);
    }

    /// Current score
    pub fn score(&self) -> RiskScore {
        self.score
    }

    /// Finish scoring and derive the level
    pub fn finish(self) -> RiskAssessment {
        RiskAssessment {
            risk_score: self.score,
            risk_level: self.thresholds.level_for(self.score).max(self.floor),
            risk_factors: self.factors,
        }
    }
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            thresholds: RiskThresholds::default(),
            score: RiskScore::ZERO,
            floor: RiskLevel::Low,
            factors: Vec::new(),
        }
    }
}
