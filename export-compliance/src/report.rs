//! Case report rendering
//!
//! Renders a [`ReportPayload`] as a plain-text classification and screening
//! report or as JSON, and writes it to the report directory as
//! `{case_id}_report.{ext}`.

use crate::error::{ComplianceError, Result};
use crate::payload::ReportPayload;
use crate::types::{FlagDetails, FlagKind, ScreeningField};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DISCLAIMER: &str = "【重要事項】\n\
本判定書はデモシステムにより自動生成されたものです。\n\
実際の輸出管理業務では、最新の法令・告示・通達に基づき、\n\
社内責任者による最終確認と承認が必要です。\n\
経済産業省が公開する最新のマトリクス表・需要者リスト・\n\
制裁リストを必ず確認してください。";

/// Report format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            ReportFormat::Text => "text/plain; charset=utf-8",
            ReportFormat::Json => "application/json",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(ComplianceError::ConfigError(format!("unknown report format: {}", other))),
        }
    }
}

/// Written report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub case_id: String,
    pub format: ReportFormat,
    pub file_path: PathBuf,
    pub file_size: u64,
}

/// Report writer bound to an output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn write(&self, payload: &ReportPayload, format: ReportFormat) -> Result<ReportMetadata> {
        let content = render(payload, format)?;
        let file_path = self.output_dir.join(report_filename(&payload.case_id, format));
        std::fs::write(&file_path, content.as_bytes())?;

        info!("Report for {} written to {}", payload.case_id, file_path.display());

        Ok(ReportMetadata {
            case_id: payload.case_id.clone(),
            format,
            file_path,
            file_size: content.len() as u64,
        })
    }
}

pub fn report_filename(case_id: &str, format: ReportFormat) -> String {
    let safe: String = case_id
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}_report.{}", safe, format.extension())
}

pub fn render(payload: &ReportPayload, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(payload)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(payload)?),
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

/// Screening table row: field label, flag, detail
pub fn screening_rows(payload: &ReportPayload) -> Vec<(&'static str, &'static str, String)> {
    ScreeningField::ALL
        .into_iter()
        .map(|field| {
            let clean = if field == ScreeningField::EndUse { "問題なし" } else { "ヒットなし" };
            match payload.screening.flag(field) {
                Some(flag) => (field.label(), flag.flag.as_str(), flag.details.reason().to_string()),
                None => (field.label(), "CLEAR", clean.to_string()),
            }
        })
        .collect()
}

pub fn render_text(payload: &ReportPayload) -> String {
    let mut out = String::new();

    out.push_str("該非判定書・取引審査報告書\n");
    out.push('\n');
    out.push_str(&format!("作成日時: {}\n", payload.created_at.format("%Y年%m月%d日 %H:%M:%S")));
    out.push_str(&format!("案件ID: {}\n", or_dash(&payload.case_id)));
    out.push_str(&format!("Matrix版: {}\n", payload.matrix_version));
    out.push_str(&format!("システム版: {}\n", payload.system_version));
    out.push_str(&format!("審査担当者: {}\n", or_dash(&payload.reviewer)));
    out.push('\n');

    out.push_str("1. 物品情報\n");
    out.push_str(&format!("  品番・製品名: {}\n", or_dash(&payload.item_name)));
    out.push_str(&format!("  HSコード: {}\n", or_dash(&payload.hs_code)));
    out.push_str(&format!("  主要仕様: {}\n", or_dash(&payload.key_params)));
    out.push_str(&format!("  仕様概要: {}\n", or_dash(&payload.spec_excerpt)));
    out.push('\n');

    out.push_str("2. 取引情報\n");
    out.push_str(&format!("  仕向地: {}\n", or_dash(&payload.destination)));
    out.push_str(&format!("  買主: {}\n", or_dash(&payload.buyer)));
    out.push_str(&format!("  エンドユーザー: {}\n", or_dash(&payload.end_user)));
    out.push_str(&format!("  用途: {}\n", or_dash(&payload.end_use)));
    out.push('\n');

    out.push_str("3. 該非判定結果\n");
    if payload.hits.is_empty() {
        out.push_str("  該当候補は検出されませんでした。\n");
    } else {
        out.push_str("  条項 | 区分 | 品名 | しきい値 | 信頼度\n");
        for hit in &payload.hits {
            out.push_str(&format!(
                "  {} | {} | {} | {} | {}\n",
                hit.clause_id,
                hit.category,
                hit.title,
                hit.threshold,
                hit.confidence_percent()
            ));
        }
    }
    out.push('\n');

    out.push_str("4. 取引審査結果\n");
    out.push_str("  項目 | 結果 | 詳細\n");
    for (label, flag, detail) in screening_rows(payload) {
        out.push_str(&format!("  {} | {} | {}\n", label, flag, detail));
    }
    out.push_str(&format!("  総合リスク評価: {}\n", payload.screening.overall_risk));
    out.push_str(&format!("  リスクスコア: {}/100\n", payload.screening.risk_score));
    out.push('\n');

    out.push_str("5. 総合判断\n");
    out.push_str(&format!("  {}\n", payload.decision.recommendation));
    if !payload.decision.next_steps.is_empty() {
        out.push_str("  【次のステップ】\n");
        for step in &payload.decision.next_steps {
            out.push_str(&format!("  • {}\n", step));
        }
    }
    out.push('\n');

    out.push_str(DISCLAIMER);
    out.push('\n');
    out
}

/// Summary line for red-flag terms, first three only
pub fn red_flag_summary(payload: &ReportPayload) -> Option<String> {
    let flag = payload.screening.end_use.as_ref()?;
    if flag.flag != FlagKind::Warning {
        return None;
    }
    match &flag.details {
        FlagDetails::RedFlags { terms, .. } => {
            Some(terms.iter().take(3).cloned().collect::<Vec<_>>().join(", "))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseInput;
    use crate::decision::decide;
    use crate::payload::PayloadBuilder;
    use crate::screening::ComplianceScreener;
    use crate::tables::ControlTables;
    use std::sync::Arc;

    fn payload(destination: &str, end_use: &str) -> ReportPayload {
        let screener = ComplianceScreener::with_defaults(Arc::new(ControlTables::builtin().unwrap()));
        let screening = screener.screen(destination, "", "", end_use);
        let decision = decide(&[], &screening);
        let fields = CaseInput {
            case_id: "KSA-20250528-142501".to_string(),
            destination: destination.to_string(),
            end_use: end_use.to_string(),
            ..CaseInput::new("ART-40")
        };
        PayloadBuilder::default().build(&fields, &[], &screening, &decision)
    }

    #[test]
    fn test_text_report_sections() {
        let text = render_text(&payload("北朝鮮", "missile guidance research"));
        assert!(text.contains("1. 物品情報"));
        assert!(text.contains("該当候補は検出されませんでした。"));
        assert!(text.contains("仕向地 | HIT | 包括的禁輸措置（国連安保理決議）"));
        assert!(text.contains("買主 | CLEAR | ヒットなし"));
        assert!(text.contains("用途 | WARNING | 用途に懸念キーワード検出"));
        assert!(text.contains("リスクスコア: 55/100"));
        assert!(text.contains("輸出不可"));
        assert!(text.contains("HSコード: -"));
        assert!(text.ends_with("確認してください。\n"));
    }

    #[test]
    fn test_clean_end_use_row() {
        let rows = screening_rows(&payload("ドイツ", "学術研究"));
        assert_eq!(rows[3], ("用途", "CLEAR", "問題なし".to_string()));
    }

    #[test]
    fn test_json_report_round_trips() {
        let original = payload("ドイツ", "学術研究");
        let json = render(&original, ReportFormat::Json).unwrap();
        let parsed: ReportPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("reports")).unwrap();
        let metadata = writer.write(&payload("ドイツ", "学術研究"), ReportFormat::Text).unwrap();

        assert_eq!(
            metadata.file_path.file_name().unwrap().to_str().unwrap(),
            "KSA-20250528-142501_report.txt"
        );
        assert_eq!(std::fs::metadata(&metadata.file_path).unwrap().len(), metadata.file_size);
    }

    #[test]
    fn test_filename_sanitized() {
        assert_eq!(report_filename("a/b", ReportFormat::Json), "a_b_report.json");
    }

    #[test]
    fn test_red_flag_summary() {
        let p = payload("", "military weapon missile nuclear");
        assert_eq!(red_flag_summary(&p).unwrap(), "military, weapon, missile");
        assert!(red_flag_summary(&payload("", "")).is_none());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("pdf".parse::<ReportFormat>().is_err());
    }
}
