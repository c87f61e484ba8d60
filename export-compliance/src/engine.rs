//! Compliance engine
//!
//! Runs one case through the whole pipeline:
//! normalize → classify → screen → decide → assemble.

use crate::case::CaseInput;
use crate::config::EngineConfig;
use crate::decision;
use crate::error::Result;
use crate::matrix::{classify_with, Jitter};
use crate::metrics::EngineMetrics;
use crate::normalize::normalize;
use crate::payload::{PayloadBuilder, ReportPayload};
use crate::screening::ComplianceScreener;
use crate::tables::ControlTables;
use crate::types::{CaseDecision, ClassificationHit, ScreeningResult};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info};

/// ComplianceEngine owns the loaded tables and everything configured around them
pub struct ComplianceEngine {
    config: EngineConfig,
    tables: Arc<ControlTables>,
    screener: ComplianceScreener,
    jitter: Jitter,
    rng: Mutex<StdRng>,
    payloads: PayloadBuilder,
    metrics: EngineMetrics,
}

impl ComplianceEngine {
    /// Create an engine, loading tables from `tables_path` or the built-in set
    pub fn new(config: EngineConfig) -> Result<Self> {
        let tables = match &config.tables_path {
            Some(path) => {
                info!("Loading control tables from {}", path.display());
                ControlTables::from_file(path)?
            }
            None => ControlTables::builtin()?,
        };
        Self::with_tables(config, Arc::new(tables))
    }

    /// Create an engine around already loaded tables
    pub fn with_tables(config: EngineConfig, tables: Arc<ControlTables>) -> Result<Self> {
        config.validate()?;

        let screener = ComplianceScreener::new(
            Arc::clone(&tables),
            config.screening.weights,
            config.screening.thresholds,
        )?;

        let rng = match config.classification.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            "Compliance engine ready (jitter ±{}, seed {:?})",
            config.classification.jitter_spread, config.classification.seed
        );

        Ok(Self {
            jitter: Jitter::new(config.classification.jitter_spread),
            payloads: PayloadBuilder::new(config.report.excerpt_chars),
            metrics: EngineMetrics::new()?,
            rng: Mutex::new(rng),
            screener,
            tables,
            config,
        })
    }

    pub fn classify(&self, corpus: &str) -> Vec<ClassificationHit> {
        let mut rng = self.rng.lock();
        classify_with(&self.tables, corpus, self.jitter, &mut *rng)
    }

    pub fn screen(
        &self,
        destination: &str,
        buyer: &str,
        end_user: &str,
        end_use: &str,
    ) -> ScreeningResult {
        self.screener.screen(destination, buyer, end_user, end_use)
    }

    pub fn decide(&self, hits: &[ClassificationHit], screening: &ScreeningResult) -> CaseDecision {
        decision::decide(hits, screening)
    }

    pub fn build_payload(
        &self,
        fields: &CaseInput,
        hits: &[ClassificationHit],
        screening: &ScreeningResult,
        decision: &CaseDecision,
    ) -> ReportPayload {
        self.payloads.build(fields, hits, screening, decision)
    }

    /// Validate the case, run every stage and record metrics
    pub fn run_case(&self, input: &CaseInput) -> Result<ReportPayload> {
        let fields = input
            .clone()
            .with_defaults(&self.config.case.id_prefix, &self.config.case.default_reviewer);
        fields.validate()?;

        debug!("Running case {}", fields.case_id);

        let corpus = normalize(&fields.spec_text, &fields.item_name, &fields.key_params);
        let hits = self.classify(&corpus);
        let screening = self.screen(
            &fields.destination,
            &fields.buyer,
            &fields.end_user,
            &fields.end_use,
        );
        let decision = self.decide(&hits, &screening);
        let payload = self.build_payload(&fields, &hits, &screening, &decision);

        self.metrics.observe_case(&payload);
        info!(
            "Case {} finished: {} ({} hits, risk {} / {})",
            payload.case_id,
            payload.status(),
            payload.hits.len(),
            payload.screening.risk_score,
            payload.screening.overall_risk
        );

        Ok(payload)
    }

    pub fn tables(&self) -> &ControlTables {
        &self.tables
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
