//! End-to-end checks over the public API: normalize → classify → screen →
//! decide → assemble

use export_compliance::{
    build_payload, classify, classify_with, decide, normalize, screen, CaseFilter, CaseHistory,
    CaseInput, CaseStatus, ComplianceEngine, ControlTables, EngineConfig, FlagKind, Jitter,
    ReportFormat, ReportWriter, ScreeningField, BUILTIN_TABLES,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use risk_engine::RiskLevel;

fn one_hit() -> Vec<export_compliance::ClassificationHit> {
    let hits = classify(&normalize("", "Carbon fiber frame", ""));
    assert_eq!(hits.len(), 1);
    hits
}

#[test]
fn no_keywords_no_hits() {
    for corpus in ["", "office chair", "stainless steel kitchen sink", "木製の机"] {
        assert!(classify(&normalize(corpus, "", "")).is_empty(), "corpus: {}", corpus);
    }
}

#[test]
fn hits_sorted_and_bounded() {
    let corpus = normalize(
        "AES encrypted drone with GaN amplifier, LIDAR and CNC machined carbon fiber",
        "",
        "",
    );
    for _ in 0..50 {
        let hits = classify(&corpus);
        assert_eq!(hits.len(), 6);
        for pair in hits.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        for hit in &hits {
            assert!((0.0..=0.99).contains(&hit.confidence));
            assert!(hit.matched_terms.len() <= 5);
        }
    }
}

#[test]
fn sanctioned_destination_alone_is_critical() {
    let result = screen("北朝鮮", "", "", "");
    assert_eq!(result.risk_score.value(), 40);
    assert_eq!(result.overall_risk, RiskLevel::Critical);
    assert_eq!(result.flagged_fields(), vec![ScreeningField::Destination]);
}

#[test]
fn buyer_substring_match_is_high() {
    let result = screen("", "Acme Research Institute", "", "");
    assert_eq!(result.risk_score.value(), 25);
    assert_eq!(result.overall_risk, RiskLevel::High);
}

#[test]
fn end_use_red_flag_is_medium_warning() {
    let result = screen("", "", "", "this is for military use");
    assert_eq!(result.risk_score.value(), 15);
    assert_eq!(result.overall_risk, RiskLevel::Medium);
    assert_eq!(result.end_use.map(|f| f.flag), Some(FlagKind::Warning));
}

#[test]
fn destination_and_end_user_block_regardless_of_hits() {
    let result = screen("北朝鮮", "", "Acme Research Institute", "");
    assert_eq!(result.risk_score.value(), 70);
    assert_eq!(result.overall_risk, RiskLevel::Critical);

    assert_eq!(decide(&[], &result).status, CaseStatus::Blocked);
    assert_eq!(decide(&one_hit(), &result).status, CaseStatus::Blocked);
}

#[test]
fn empty_case_is_clear() {
    let decision = decide(&[], &screen("", "", "", ""));
    assert_eq!(decision.status, CaseStatus::Clear);
    assert!(!decision.requires_license);
}

#[test]
fn hits_alone_require_license() {
    let decision = decide(&one_hit(), &screen("", "", "", ""));
    assert_eq!(decision.status, CaseStatus::LicenseRequired);
    assert!(decision.requires_license);
}

#[test]
fn repeated_runs_agree_apart_from_confidence() {
    let corpus = normalize("AES-256 drone controller with 5-axis gimbal", "ART-40", "");
    let clause_set = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut clauses: Vec<String> = classify_with(&BUILTIN_TABLES, &corpus, Jitter::default(), &mut rng)
            .into_iter()
            .map(|hit| hit.clause_id)
            .collect();
        clauses.sort();
        clauses
    };
    assert_eq!(clause_set(1), clause_set(2));

    let first = screen("ロシア", "Orbital Dynamics Lab", "", "defense research");
    let second = screen("ロシア", "Orbital Dynamics Lab", "", "defense research");
    assert_eq!(first, second);

    let hits = classify(&corpus);
    assert_eq!(decide(&hits, &first).status, decide(&hits, &second).status);
}

#[test]
fn payload_carries_every_stage() {
    let fields = CaseInput {
        case_id: "KSA-20250528-142501".to_string(),
        spec_text: "暗号 ".repeat(400),
        destination: "ドイツ".to_string(),
        end_use: "研究開発".to_string(),
        ..CaseInput::new("ART-40")
    };
    let hits = classify(&normalize(&fields.spec_text, &fields.item_name, &fields.key_params));
    let screening = screen(&fields.destination, &fields.buyer, &fields.end_user, &fields.end_use);
    let decision = decide(&hits, &screening);
    let payload = build_payload(&fields, &hits, &screening, &decision);

    assert_eq!(payload.hits, hits);
    assert_eq!(payload.status(), CaseStatus::LicenseRequired);
    assert!(payload.spec_excerpt.ends_with("..."));
    assert_eq!(payload.spec_excerpt.chars().count(), 503);
}

#[test]
fn engine_runs_and_records_cases() {
    let mut config = EngineConfig::default();
    config.classification.seed = Some(2025);
    let engine = ComplianceEngine::new(config).unwrap();
    let history = CaseHistory::new();

    let cases = [
        ("ART-40 Flight Controller", "ドイツ", "Orbital Dynamics Lab", "農業用"),
        ("Office Chair", "ベトナム", "", "オフィス用"),
        ("GaN Amplifier", "イラン", "Global Defense Systems", "通信設備"),
    ];
    for (item, destination, end_user, end_use) in cases {
        let input = CaseInput {
            destination: destination.to_string(),
            end_user: end_user.to_string(),
            end_use: end_use.to_string(),
            ..CaseInput::new(item)
        };
        history.append(engine.run_case(&input).unwrap());
    }

    let stats = history.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.clear, 1);
    assert_eq!(stats.license_required, 1);
    assert_eq!(stats.blocked, 1);

    let blocked = history.search(&CaseFilter {
        status: Some(CaseStatus::Blocked),
        search: None,
    });
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].item_name, "GaN Amplifier");

    let metrics = engine.metrics().gather_text().unwrap();
    assert!(metrics.contains("export_cases_total{status=\"BLOCKED\"} 1"));
}

#[test]
fn engine_writes_reports() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ComplianceEngine::with_tables(EngineConfig::default(), BUILTIN_TABLES.clone()).unwrap();
    let writer = ReportWriter::new(dir.path()).unwrap();

    let input = CaseInput {
        case_id: "CASE-7".to_string(),
        spec_text: "5軸 CNC マシニングセンタ".to_string(),
        destination: "シリア".to_string(),
        end_use: "部品加工".to_string(),
        ..CaseInput::new("MC-500")
    };
    let payload = engine.run_case(&input).unwrap();

    let text = writer.write(&payload, ReportFormat::Text).unwrap();
    let json = writer.write(&payload, ReportFormat::Json).unwrap();
    assert!(text.file_path.ends_with("CASE-7_report.txt"));
    assert!(json.file_path.ends_with("CASE-7_report.json"));

    let content = std::fs::read_to_string(&text.file_path).unwrap();
    assert!(content.contains("2B001"));
    assert!(content.contains("武器禁輸措置"));
}

#[test]
fn custom_tables_replace_builtin() {
    let tables = ControlTables::from_toml_str(
        r#"
        red_flags = ["stealth"]

        [[sanctions]]
        destination = "Atlantis"
        severity = "HIGH"
        reason = "test embargo"
        "#,
    )
    .unwrap();
    assert!(tables.rules().is_empty());
    assert!(tables.sanctioned_destination("北朝鮮").is_none());
    assert!(tables.sanctioned_destination("Atlantis").is_some());
}
