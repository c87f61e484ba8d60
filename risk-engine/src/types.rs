//! Core types for risk engine

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::thresholds::RiskThresholds;

/// Additive risk score.
///
/// Screening checks add fixed weights to the score; there is no upper cap.
/// The score is only ever interpreted through [`RiskThresholds`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskScore(u32);

impl RiskScore {
    /// Zero score
    pub const ZERO: RiskScore = RiskScore(0);

    /// Create new risk score
    pub fn new(score: u32) -> Self {
        Self(score)
    }

    /// Get raw score
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Add a weight to the score, saturating at `u32::MAX`
    pub fn add(self, weight: u32) -> Self {
        Self(self.0.saturating_add(weight))
    }

    /// Whether any check contributed to the score
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Overall risk level derived from a [`RiskScore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Low risk
    #[default]
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
    /// Critical risk, blocks the case outright
    Critical,
}

impl RiskLevel {
    /// Upper-case label used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RiskScore> for RiskLevel {
    fn from(score: RiskScore) -> Self {
        RiskThresholds::default().level_for(score)
    }
}

/// Risk tier attached to static table entries (control-list rules, watchlist
/// entities)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    /// Low tier
    Low,
    /// Medium tier
    Medium,
    /// High tier
    High,
}

impl RiskTier {
    /// Upper-case label used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk factors that contribute a weight to the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    /// Destination found in the sanctions table
    SanctionedDestination,
    /// Buyer matched a watchlist entity
    WatchlistedBuyer,
    /// End user matched a watchlist entity
    WatchlistedEndUser,
    /// End-use text contained red-flag terms
    EndUseRedFlag,
}

impl RiskFactor {
    /// Human-readable description
    pub fn describe(&self) -> &'static str {
        match self {
            RiskFactor::SanctionedDestination => "Sanctioned destination",
            RiskFactor::WatchlistedBuyer => "Buyer on watchlist",
            RiskFactor::WatchlistedEndUser => "End user on watchlist",
            RiskFactor::EndUseRedFlag => "End-use red flag",
        }
    }
}

/// Risk assessment result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Accumulated score
    pub risk_score: RiskScore,

    /// Level derived from the score
    pub risk_level: RiskLevel,

    /// Factors that fired, in evaluation order
    pub risk_factors: Vec<RiskFactor>,
}
