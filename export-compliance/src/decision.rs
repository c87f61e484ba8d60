use crate::types::{CaseDecision, CaseStatus, ClassificationHit, ScreeningResult};
use risk_engine::RiskLevel;
use tracing::info;

struct DecisionTemplate {
    recommendation: &'static str,
    next_steps: &'static [&'static str],
    estimated_time: &'static str,
}

const BLOCKED: DecisionTemplate = DecisionTemplate {
    recommendation: "輸出不可：制裁対象国・団体への輸出は禁止されています。",
    next_steps: &["本案件は承認できません", "法務部門・経産省へ相談"],
    estimated_time: "N/A",
};

const LICENSE_REQUIRED: DecisionTemplate = DecisionTemplate {
    recommendation: "許可申請必要：リスト規制品または取引審査でリスクが検出されました。",
    next_steps: &[
        "詳細な技術資料の準備",
        "エンドユース誓約書の取得",
        "経産省へ個別許可申請（NACCS経由）",
        "審査期間: 約2-3ヶ月を想定",
    ],
    estimated_time: "2-3ヶ月",
};

const CLEAR: DecisionTemplate = DecisionTemplate {
    recommendation: "輸出可能：現時点でリスト規制・取引審査上の問題は検出されていません。",
    next_steps: &[
        "社内承認手続きの実施",
        "出荷書類の準備",
        "該非判定書の保管（3年間）",
    ],
    estimated_time: "即時",
};

fn template(status: CaseStatus) -> &'static DecisionTemplate {
    match status {
        CaseStatus::Blocked => &BLOCKED,
        CaseStatus::LicenseRequired => &LICENSE_REQUIRED,
        CaseStatus::Clear => &CLEAR,
    }
}

/// Combine classification hits and screening into the terminal case decision.
///
/// CRITICAL screening risk blocks the case no matter what else was found.
pub fn decide(hits: &[ClassificationHit], screening: &ScreeningResult) -> CaseDecision {
    let requires_license = !hits.is_empty() || screening.risk_score.is_positive();

    let status = if screening.overall_risk == RiskLevel::Critical {
        CaseStatus::Blocked
    } else if requires_license {
        CaseStatus::LicenseRequired
    } else {
        CaseStatus::Clear
    };

    info!(
        "Case decision {} (hits: {}, risk score: {})",
        status,
        hits.len(),
        screening.risk_score
    );

    let template = template(status);
    CaseDecision {
        requires_license,
        status,
        recommendation: template.recommendation.to_string(),
        next_steps: template.next_steps.iter().map(|s| s.to_string()).collect(),
        estimated_time: template.estimated_time.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_engine::{RiskScore, RiskTier};

    fn hit() -> ClassificationHit {
        ClassificationHit {
            clause_id: "5A002".to_string(),
            category: "情報セキュリティ".to_string(),
            title: "暗号機能付き情報セキュリティ機器".to_string(),
            threshold: "56ビット以上の鍵長".to_string(),
            risk_tier: RiskTier::High,
            confidence: 0.85,
            matched_terms: vec!["aes".to_string()],
        }
    }

    fn screening(score: u32, level: RiskLevel) -> ScreeningResult {
        ScreeningResult {
            risk_score: RiskScore::new(score),
            overall_risk: level,
            ..ScreeningResult::default()
        }
    }

    #[test]
    fn test_clear() {
        let decision = decide(&[], &ScreeningResult::default());
        assert_eq!(decision.status, CaseStatus::Clear);
        assert!(!decision.requires_license);
        assert_eq!(decision.estimated_time, "即時");
        assert_eq!(decision.next_steps.len(), 3);
    }

    #[test]
    fn test_hits_alone_require_license() {
        let decision = decide(&[hit()], &ScreeningResult::default());
        assert_eq!(decision.status, CaseStatus::LicenseRequired);
        assert!(decision.requires_license);
        assert_eq!(decision.estimated_time, "2-3ヶ月");
        assert_eq!(
            decision.next_steps.last().map(String::as_str),
            Some("審査期間: 約2-3ヶ月を想定")
        );
    }

    #[test]
    fn test_low_score_requires_license() {
        // A positive score below the MEDIUM cut point still requires a license
        let decision = decide(&[], &screening(5, RiskLevel::Low));
        assert_eq!(decision.status, CaseStatus::LicenseRequired);
    }

    #[test]
    fn test_critical_blocks() {
        let decision = decide(&[hit()], &screening(70, RiskLevel::Critical));
        assert_eq!(decision.status, CaseStatus::Blocked);
        assert!(decision.requires_license);
        assert_eq!(decision.estimated_time, "N/A");
    }

    #[test]
    fn test_high_is_not_blocked() {
        let decision = decide(&[], &screening(45, RiskLevel::High));
        assert_eq!(decision.status, CaseStatus::LicenseRequired);
    }
}
