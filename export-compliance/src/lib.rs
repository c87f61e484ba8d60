//! Export control compliance engine
//!
//! Classifies a product against the control-list matrix, screens the
//! transaction's destination and parties, and combines both into a case
//! decision and a report payload.
//!
//! The free functions below run against the built-in tables with default
//! weights; [`ComplianceEngine`] adds configuration, seeded jitter, case
//! validation and metrics.

#![forbid(unsafe_code)]

pub mod case;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod history;
pub mod matrix;
pub mod metrics;
pub mod normalize;
pub mod payload;
pub mod report;
pub mod screening;
pub mod tables;
pub mod types;

pub use case::{generate_case_id, CaseInput};
pub use config::EngineConfig;
pub use engine::ComplianceEngine;
pub use error::{ComplianceError, Result};
pub use history::{CaseFilter, CaseHistory, CaseStats};
pub use matrix::{classify_with, Jitter};
pub use metrics::EngineMetrics;
pub use normalize::normalize;
pub use payload::{PayloadBuilder, ReportPayload};
pub use report::{ReportFormat, ReportMetadata, ReportWriter};
pub use screening::ComplianceScreener;
pub use tables::ControlTables;
pub use types::{
    CaseDecision, CaseStatus, ClassificationHit, ClassificationRule, FieldFlag, FlagDetails,
    FlagKind, ScreeningField, ScreeningResult,
};

use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    /// Built-in control tables, compiled on first use
    pub static ref BUILTIN_TABLES: Arc<ControlTables> =
        Arc::new(ControlTables::builtin().expect("built-in control tables compile"));

    static ref BUILTIN_SCREENER: ComplianceScreener =
        ComplianceScreener::with_defaults(Arc::clone(&BUILTIN_TABLES));
}

/// Match the corpus against the built-in matrix with default jitter
pub fn classify(corpus: &str) -> Vec<ClassificationHit> {
    classify_with(&BUILTIN_TABLES, corpus, Jitter::default(), &mut rand::thread_rng())
}

/// Screen a transaction against the built-in tables with default weights
pub fn screen(destination: &str, buyer: &str, end_user: &str, end_use: &str) -> ScreeningResult {
    BUILTIN_SCREENER.screen(destination, buyer, end_user, end_use)
}

pub fn decide(hits: &[ClassificationHit], screening: &ScreeningResult) -> CaseDecision {
    decision::decide(hits, screening)
}

pub fn build_payload(
    fields: &CaseInput,
    hits: &[ClassificationHit],
    screening: &ScreeningResult,
    decision: &CaseDecision,
) -> ReportPayload {
    PayloadBuilder::default().build(fields, hits, screening, decision)
}
