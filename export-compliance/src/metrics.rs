//! Metrics collection for observability
//!
//! Each engine owns a private Prometheus registry so several engines can live
//! in one process.
//!
//! # Metrics
//!
//! - `export_cases_total{status}` - Cases decided, by terminal status
//! - `export_classification_hits_total` - Matrix hits across all cases
//! - `export_screening_flags_total{field}` - Screening flags, by field
//! - `export_risk_score` - Histogram of screening risk scores

use crate::payload::ReportPayload;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct EngineMetrics {
    /// Cases decided, labelled by status
    pub cases_total: IntCounterVec,

    /// Total classification hits
    pub classification_hits_total: IntCounter,

    /// Screening flags, labelled by field
    pub screening_flags_total: IntCounterVec,

    /// Risk score histogram
    pub risk_score: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl EngineMetrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let cases_total = IntCounterVec::new(
            Opts::new("export_cases_total", "Cases decided, by terminal status"),
            &["status"],
        )?;
        registry.register(Box::new(cases_total.clone()))?;

        let classification_hits_total = IntCounter::new(
            "export_classification_hits_total",
            "Matrix hits across all cases",
        )?;
        registry.register(Box::new(classification_hits_total.clone()))?;

        let screening_flags_total = IntCounterVec::new(
            Opts::new("export_screening_flags_total", "Screening flags, by field"),
            &["field"],
        )?;
        registry.register(Box::new(screening_flags_total.clone()))?;

        let risk_score = Histogram::with_opts(
            HistogramOpts::new("export_risk_score", "Histogram of screening risk scores")
                .buckets(vec![0.0, 10.0, 25.0, 50.0, 75.0, 100.0]),
        )?;
        registry.register(Box::new(risk_score.clone()))?;

        Ok(Self {
            cases_total,
            classification_hits_total,
            screening_flags_total,
            risk_score,
            registry,
        })
    }

    /// Record a finished case
    pub fn observe_case(&self, payload: &ReportPayload) {
        self.cases_total
            .with_label_values(&[payload.status().as_str()])
            .inc();
        self.classification_hits_total.inc_by(payload.hits.len() as u64);

        for field in payload.screening.flagged_fields() {
            self.screening_flags_total
                .with_label_values(&[field.as_str()])
                .inc();
        }

        self.risk_score
            .observe(payload.screening.risk_score.value() as f64);
    }

    /// Cases recorded with the given status label
    pub fn cases_with_status(&self, status: &str) -> u64 {
        self.cases_total.with_label_values(&[status]).get()
    }

    /// Render the registry in Prometheus text format
    pub fn gather_text(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
