//! Score-to-level thresholds

use crate::{Error, Result, RiskLevel, RiskScore};
use serde::{Deserialize, Serialize};

/// Inclusive lower bounds for each risk level above LOW.
///
/// Checked highest first: `critical`, then `high`, then `medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Score at or above which the level is CRITICAL
    pub critical: u32,

    /// Score at or above which the level is HIGH
    pub high: u32,

    /// Score at or above which the level is MEDIUM
    pub medium: u32,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical: 50,
            high: 25,
            medium: 10,
        }
    }
}

impl RiskThresholds {
    /// Reject thresholds that are not strictly descending or start at zero
    pub fn validate(&self) -> Result<()> {
        if self.medium == 0 {
            return Err(Error::InvalidConfig(
                "medium threshold must be greater than zero".to_string(),
            ));
        }
        if !(self.critical > self.high && self.high > self.medium) {
            return Err(Error::InvalidConfig(format!(
                "thresholds must be strictly descending (critical {} > high {} > medium {})",
                self.critical, self.high, self.medium
            )));
        }
        Ok(())
    }

    /// Map a score to its level
    pub fn level_for(&self, score: RiskScore) -> RiskLevel {
        let value = score.value();
        if value >= self.critical {
            RiskLevel::Critical
        } else if value >= self.high {
            RiskLevel::High
        } else if value >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}
