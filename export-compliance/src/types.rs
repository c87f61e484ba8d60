use chrono::NaiveDate;
use risk_engine::{RiskLevel, RiskScore, RiskTier};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the control-list matrix
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationRule {
    pub pattern: String,
    pub clause_id: String,
    pub category: String,
    pub title: String,
    /// Descriptive only, never evaluated
    pub threshold: String,
    pub risk_tier: RiskTier,
    pub base_confidence: f64, // 0.0-1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationHit {
    pub clause_id: String,
    pub category: String,
    pub title: String,
    pub threshold: String,
    pub risk_tier: RiskTier,
    pub confidence: f64, // 0.0-0.99
    pub matched_terms: Vec<String>,
}

impl ClassificationHit {
    /// Confidence formatted for display, e.g. `85.0%`
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SanctionSeverity {
    Critical,
    High,
}

impl SanctionSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            SanctionSeverity::Critical => "CRITICAL",
            SanctionSeverity::High => "HIGH",
        }
    }

    /// Lowest overall risk a case shipping to this destination can have
    pub fn risk_floor(&self) -> RiskLevel {
        match self {
            SanctionSeverity::Critical => RiskLevel::Critical,
            SanctionSeverity::High => RiskLevel::High,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SanctionEntry {
    pub destination: String,
    pub severity: SanctionSeverity,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchlistEntry {
    pub entity: String,
    pub country: String,
    pub risk_tier: RiskTier,
    pub reason: String,
    pub last_updated: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagKind {
    Hit,
    Warning,
}

impl FlagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKind::Hit => "HIT",
            FlagKind::Warning => "WARNING",
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlagDetails {
    Sanction(SanctionEntry),
    Watchlist(WatchlistEntry),
    RedFlags { terms: Vec<String>, reason: String },
}

impl FlagDetails {
    pub fn reason(&self) -> &str {
        match self {
            FlagDetails::Sanction(entry) => &entry.reason,
            FlagDetails::Watchlist(entry) => &entry.reason,
            FlagDetails::RedFlags { reason, .. } => reason,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldFlag {
    pub flag: FlagKind,
    pub details: FlagDetails,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningField {
    Destination,
    Buyer,
    EndUser,
    EndUse,
}

impl ScreeningField {
    pub const ALL: [ScreeningField; 4] = [
        ScreeningField::Destination,
        ScreeningField::Buyer,
        ScreeningField::EndUser,
        ScreeningField::EndUse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScreeningField::Destination => "destination",
            ScreeningField::Buyer => "buyer",
            ScreeningField::EndUser => "end_user",
            ScreeningField::EndUse => "end_use",
        }
    }

    /// Label used in rendered reports
    pub fn label(&self) -> &'static str {
        match self {
            ScreeningField::Destination => "仕向地",
            ScreeningField::Buyer => "買主",
            ScreeningField::EndUser => "エンドユーザー",
            ScreeningField::EndUse => "用途",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreeningResult {
    pub destination: Option<FieldFlag>,
    pub buyer: Option<FieldFlag>,
    pub end_user: Option<FieldFlag>,
    pub end_use: Option<FieldFlag>,
    pub risk_score: RiskScore,
    pub overall_risk: RiskLevel,
}

impl ScreeningResult {
    pub fn flag(&self, field: ScreeningField) -> Option<&FieldFlag> {
        match field {
            ScreeningField::Destination => self.destination.as_ref(),
            ScreeningField::Buyer => self.buyer.as_ref(),
            ScreeningField::EndUser => self.end_user.as_ref(),
            ScreeningField::EndUse => self.end_use.as_ref(),
        }
    }

    /// Fields that carry a flag, in fixed field order
    pub fn flagged_fields(&self) -> Vec<ScreeningField> {
        ScreeningField::ALL
            .into_iter()
            .filter(|field| self.flag(*field).is_some())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Clear,
    LicenseRequired,
    Blocked,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 3] = [
        CaseStatus::Clear,
        CaseStatus::LicenseRequired,
        CaseStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Clear => "CLEAR",
            CaseStatus::LicenseRequired => "LICENSE_REQUIRED",
            CaseStatus::Blocked => "BLOCKED",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseDecision {
    pub requires_license: bool,
    pub status: CaseStatus,
    pub recommendation: String,
    pub next_steps: Vec<String>,
    pub estimated_time: String,
}
