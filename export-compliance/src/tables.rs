use crate::error::{ComplianceError, Result};
use crate::types::{ClassificationRule, SanctionEntry, SanctionSeverity, WatchlistEntry};
use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use risk_engine::RiskTier;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// A matrix rule with its pattern compiled once at load time
#[derive(Debug, Clone)]
pub struct MatrixRule {
    pub rule: ClassificationRule,
    pub regex: Regex,
}

/// Raw table data as read from a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TableSource {
    pub red_flags: Vec<String>,
    pub rules: Vec<ClassificationRule>,
    pub sanctions: Vec<SanctionEntry>,
    pub watchlist: Vec<WatchlistEntry>,
}

/// ControlTables holds the read-only reference data every check runs against.
///
/// All lists keep declaration order; lookups that stop at the first match
/// depend on it.
#[derive(Debug, Clone)]
pub struct ControlTables {
    rules: Vec<MatrixRule>,
    sanctions: Vec<SanctionEntry>,
    watchlist: Vec<WatchlistEntry>,
    red_flags: Vec<String>,
}

impl ControlTables {
    /// Compile raw table data, rejecting bad patterns and confidences
    pub fn compile(source: TableSource) -> Result<Self> {
        let mut rules = Vec::with_capacity(source.rules.len());

        for rule in source.rules {
            if !(0.0..=1.0).contains(&rule.base_confidence) {
                return Err(ComplianceError::InvalidTable(format!(
                    "rule {} has base confidence {} outside [0, 1]",
                    rule.clause_id, rule.base_confidence
                )));
            }

            let regex = RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| ComplianceError::InvalidPattern {
                    clause_id: rule.clause_id.clone(),
                    source,
                })?;

            debug!("Compiled matrix rule {} ({})", rule.clause_id, rule.category);
            rules.push(MatrixRule { rule, regex });
        }

        let tables = Self {
            rules,
            sanctions: source.sanctions,
            watchlist: source.watchlist,
            red_flags: source.red_flags,
        };

        info!(
            "Loaded control tables: {} rules, {} sanctioned destinations, {} watchlist entities, {} red-flag terms",
            tables.rules.len(),
            tables.sanctions.len(),
            tables.watchlist.len(),
            tables.red_flags.len()
        );

        Ok(tables)
    }

    /// Tables shipped with the engine
    pub fn builtin() -> Result<Self> {
        Self::compile(TableSource {
            red_flags: builtin_red_flags(),
            rules: builtin_rules(),
            sanctions: builtin_sanctions(),
            watchlist: builtin_watchlist(),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let source: TableSource = toml::from_str(content)
            .map_err(|e| ComplianceError::InvalidTable(format!("Failed to parse tables: {}", e)))?;
        Self::compile(source)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn rules(&self) -> &[MatrixRule] {
        &self.rules
    }

    pub fn sanctions(&self) -> &[SanctionEntry] {
        &self.sanctions
    }

    pub fn watchlist(&self) -> &[WatchlistEntry] {
        &self.watchlist
    }

    pub fn red_flags(&self) -> &[String] {
        &self.red_flags
    }

    /// Exact match on the trimmed destination name
    pub fn sanctioned_destination(&self, destination: &str) -> Option<&SanctionEntry> {
        let destination = destination.trim();
        if destination.is_empty() {
            return None;
        }
        self.sanctions.iter().find(|entry| entry.destination == destination)
    }

    /// First watchlist entity (declaration order) whose name appears inside
    /// `party`, ignoring case
    pub fn watchlisted_entity(&self, party: &str) -> Option<&WatchlistEntry> {
        let party = party.to_lowercase();
        if party.is_empty() {
            return None;
        }
        self.watchlist
            .iter()
            .find(|entry| !entry.entity.is_empty() && party.contains(&entry.entity.to_lowercase()))
    }

    /// Every red-flag term contained in `text`, ignoring case, in list order
    pub fn red_flags_in(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();
        self.red_flags
            .iter()
            .filter(|term| !term.is_empty() && text.contains(&term.to_lowercase()))
            .cloned()
            .collect()
    }
}

fn rule(
    pattern: &str,
    clause_id: &str,
    category: &str,
    title: &str,
    threshold: &str,
    risk_tier: RiskTier,
    base_confidence: f64,
) -> ClassificationRule {
    ClassificationRule {
        pattern: pattern.to_string(),
        clause_id: clause_id.to_string(),
        category: category.to_string(),
        title: title.to_string(),
        threshold: threshold.to_string(),
        risk_tier,
        base_confidence,
    }
}

fn builtin_rules() -> Vec<ClassificationRule> {
    vec![
        rule(
            r"\b(encrypt(ion|ed|ing)?|AES|RSA|DES|3DES|cipher|暗号)\b",
            "5A002",
            "情報セキュリティ",
            "暗号機能付き情報セキュリティ機器",
            "56ビット以上の鍵長",
            RiskTier::High,
            0.85,
        ),
        rule(
            r"\b(5-axis|5軸|multi-axis|多軸|CNC|NC|servo|サーボ)\b",
            "2B001",
            "工作機械",
            "高精度数値制御工作機械",
            "位置決め精度0.006mm以下",
            RiskTier::Medium,
            0.78,
        ),
        rule(
            r"\b(drone|UAV|unmanned|flight controller|ドローン|無人機)\b",
            "9A012",
            "航空宇宙",
            "無人航空機関連装置",
            "射程300km以上または搭載能力500kg以上",
            RiskTier::High,
            0.92,
        ),
        rule(
            r"\b(GaN|InP|GaAs|SiC|GHz|高周波|MMIC)\b",
            "3A001",
            "電子機器",
            "高周波・化合物半導体デバイス",
            "動作周波数3GHz以上",
            RiskTier::Medium,
            0.81,
        ),
        rule(
            r"\b(laser|レーザー|LIDAR|光学|optical)\b",
            "6A005",
            "センサー",
            "レーザー関連装置",
            "波長出力特性による",
            RiskTier::Medium,
            0.72,
        ),
        rule(
            r"\b(carbon fiber|カーボンファイバー|composite|複合材)\b",
            "1C010",
            "材料",
            "繊維または糸状材料",
            "特定の引張強度・弾性率",
            RiskTier::Low,
            0.68,
        ),
    ]
}

fn builtin_sanctions() -> Vec<SanctionEntry> {
    let comprehensive = "包括的禁輸措置（国連安保理決議）";
    vec![
        SanctionEntry {
            destination: "北朝鮮".to_string(),
            severity: SanctionSeverity::Critical,
            reason: comprehensive.to_string(),
        },
        SanctionEntry {
            destination: "DPRK".to_string(),
            severity: SanctionSeverity::Critical,
            reason: comprehensive.to_string(),
        },
        SanctionEntry {
            destination: "ロシア".to_string(),
            severity: SanctionSeverity::High,
            reason: "追加的措置対象（特定品目）".to_string(),
        },
        SanctionEntry {
            destination: "イラン".to_string(),
            severity: SanctionSeverity::High,
            reason: "追加的措置対象（WMD関連）".to_string(),
        },
        SanctionEntry {
            destination: "シリア".to_string(),
            severity: SanctionSeverity::High,
            reason: "武器禁輸措置".to_string(),
        },
    ]
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn builtin_watchlist() -> Vec<WatchlistEntry> {
    vec![
        WatchlistEntry {
            entity: "Acme Research Institute".to_string(),
            country: "Xland".to_string(),
            risk_tier: RiskTier::High,
            reason: "需要者リスト該当（WMD懸念）".to_string(),
            last_updated: date(2025, 3, 15),
        },
        WatchlistEntry {
            entity: "Orbital Dynamics Lab".to_string(),
            country: "Country Y".to_string(),
            risk_tier: RiskTier::Medium,
            reason: "需要者リスト該当（要デューデリジェンス）".to_string(),
            last_updated: date(2025, 2, 20),
        },
        WatchlistEntry {
            entity: "Global Defense Systems".to_string(),
            country: "Various".to_string(),
            risk_tier: RiskTier::High,
            reason: "軍事転用懸念".to_string(),
            last_updated: date(2025, 4, 1),
        },
    ]
}

fn builtin_red_flags() -> Vec<String> {
    [
        "military", "軍事", "defense", "防衛", "weapon", "兵器",
        "missile", "ミサイル", "nuclear", "核", "WMD", "大量破壊兵器",
    ]
    .iter()
    .map(|term| term.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_compile() {
        let tables = ControlTables::builtin().unwrap();
        assert_eq!(tables.rules().len(), 6);
        assert_eq!(tables.sanctions().len(), 5);
        assert_eq!(tables.watchlist().len(), 3);
        assert_eq!(tables.red_flags().len(), 12);
        assert_eq!(tables.rules()[0].rule.clause_id, "5A002");
    }

    #[test]
    fn test_destination_is_exact_after_trim() {
        let tables = ControlTables::builtin().unwrap();
        assert!(tables.sanctioned_destination("  北朝鮮 ").is_some());
        assert!(tables.sanctioned_destination("DPRK").is_some());
        assert!(tables.sanctioned_destination("dprk").is_none());
        assert!(tables.sanctioned_destination("北朝鮮国").is_none());
        assert!(tables.sanctioned_destination("").is_none());
    }

    #[test]
    fn test_watchlist_substring_direction() {
        let tables = ControlTables::builtin().unwrap();

        let entry = tables
            .watchlisted_entity("Procurement office, ACME RESEARCH INSTITUTE (Xland)")
            .unwrap();
        assert_eq!(entry.entity, "Acme Research Institute");

        // Party name shorter than the entity does not match
        assert!(tables.watchlisted_entity("Acme").is_none());
        assert!(tables.watchlisted_entity("").is_none());
    }

    #[test]
    fn test_watchlist_first_match_wins() {
        let tables = ControlTables::builtin().unwrap();
        let entry = tables
            .watchlisted_entity("Global Defense Systems c/o Orbital Dynamics Lab")
            .unwrap();
        assert_eq!(entry.entity, "Orbital Dynamics Lab");
    }

    #[test]
    fn test_red_flags_ignore_case() {
        let tables = ControlTables::builtin().unwrap();
        assert_eq!(tables.red_flags_in("Suspected WMD program"), vec!["WMD".to_string()]);
        assert_eq!(
            tables.red_flags_in("MILITARY and defense use"),
            vec!["military".to_string(), "defense".to_string()]
        );
        assert!(tables.red_flags_in("学術研究用途").is_empty());
    }

    #[test]
    fn test_from_toml() {
        let content = r#"
            red_flags = ["rocket"]

            [[rules]]
            pattern = "\\bthermal camera\\b"
            clause_id = "6A003"
            category = "センサー"
            title = "カメラ"
            threshold = "-"
            risk_tier = "MEDIUM"
            base_confidence = 0.7

            [[sanctions]]
            destination = "Atlantis"
            severity = "HIGH"
            reason = "demo"

            [[watchlist]]
            entity = "Example Corp"
            country = "Nowhere"
            risk_tier = "LOW"
            reason = "demo"
            last_updated = "2025-01-01"
        "#;

        let tables = ControlTables::from_toml_str(content).unwrap();
        assert_eq!(tables.rules().len(), 1);
        assert!(tables.sanctioned_destination("Atlantis").is_some());
        assert!(tables.watchlisted_entity("example corp ltd").is_some());
        assert_eq!(tables.red_flags_in("Rocket parts").len(), 1);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let source = TableSource {
            rules: vec![rule("(unclosed", "X1", "c", "t", "-", RiskTier::Low, 0.5)],
            ..TableSource::default()
        };
        assert!(matches!(
            ControlTables::compile(source),
            Err(ComplianceError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let source = TableSource {
            rules: vec![rule("x", "X1", "c", "t", "-", RiskTier::Low, 1.5)],
            ..TableSource::default()
        };
        assert!(matches!(
            ControlTables::compile(source),
            Err(ComplianceError::InvalidTable(_))
        ));
    }
}
