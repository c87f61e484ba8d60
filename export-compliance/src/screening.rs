use crate::error::Result;
use crate::tables::ControlTables;
use crate::types::{FieldFlag, FlagDetails, FlagKind, ScreeningResult};
use risk_engine::{RiskFactor, RiskLevel, RiskScorer, RiskThresholds, ScoreWeights};
use std::sync::Arc;
use tracing::{info, warn};

pub const RED_FLAG_REASON: &str = "用途に懸念キーワード検出";

/// ComplianceScreener checks a transaction's parties and end use against the
/// control tables
#[derive(Debug, Clone)]
pub struct ComplianceScreener {
    tables: Arc<ControlTables>,
    weights: ScoreWeights,
    thresholds: RiskThresholds,
}

impl ComplianceScreener {
    pub fn new(
        tables: Arc<ControlTables>,
        weights: ScoreWeights,
        thresholds: RiskThresholds,
    ) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self {
            tables,
            weights,
            thresholds,
        })
    }

    /// Screener with the default weights and thresholds
    pub fn with_defaults(tables: Arc<ControlTables>) -> Self {
        Self {
            tables,
            weights: ScoreWeights::default(),
            thresholds: RiskThresholds::default(),
        }
    }

    /// Run all four checks. Every check runs regardless of earlier hits and
    /// the score is the sum of whichever fired.
    pub fn screen(
        &self,
        destination: &str,
        buyer: &str,
        end_user: &str,
        end_use: &str,
    ) -> ScreeningResult {
        let mut scorer = self.scorer();
        let mut result = ScreeningResult::default();

        // 1. Destination against sanctions table
        if let Some(entry) = self.tables.sanctioned_destination(destination) {
            warn!("Sanctioned destination: {} ({})", entry.destination, entry.severity.as_str());
            scorer.record(RiskFactor::SanctionedDestination);
            scorer.escalate(entry.severity.risk_floor());
            result.destination = Some(FieldFlag {
                flag: FlagKind::Hit,
                details: FlagDetails::Sanction(entry.clone()),
            });
        }

        // 2. Buyer against watchlist
        if let Some(entry) = self.tables.watchlisted_entity(buyer) {
            warn!("Buyer matched watchlist entity: {}", entry.entity);
            scorer.record(RiskFactor::WatchlistedBuyer);
            result.buyer = Some(FieldFlag {
                flag: FlagKind::Hit,
                details: FlagDetails::Watchlist(entry.clone()),
            });
        }

        // 3. End user against watchlist, independent of the buyer check
        if let Some(entry) = self.tables.watchlisted_entity(end_user) {
            warn!("End user matched watchlist entity: {}", entry.entity);
            scorer.record(RiskFactor::WatchlistedEndUser);
            result.end_user = Some(FieldFlag {
                flag: FlagKind::Hit,
                details: FlagDetails::Watchlist(entry.clone()),
            });
        }

        // 4. End-use text against red-flag terms (flat weight)
        let terms = self.tables.red_flags_in(end_use);
        if !terms.is_empty() {
            warn!("End-use red flags: {:?}", terms);
            scorer.record(RiskFactor::EndUseRedFlag);
            result.end_use = Some(FieldFlag {
                flag: FlagKind::Warning,
                details: FlagDetails::RedFlags {
                    terms,
                    reason: RED_FLAG_REASON.to_string(),
                },
            });
        }

        let assessment = scorer.finish();
        result.risk_score = assessment.risk_score;
        result.overall_risk = assessment.risk_level;

        if result.overall_risk == RiskLevel::Critical {
            info!("Screening CRITICAL (score: {})", result.risk_score);
        }

        result
    }

    fn scorer(&self) -> RiskScorer {
        // Thresholds were validated on construction
        RiskScorer::new(self.weights, self.thresholds).unwrap_or_default()
    }
}
