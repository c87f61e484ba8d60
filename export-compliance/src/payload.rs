//! Report payload assembly
//!
//! The payload is the only shape handed to renderers and the case history.

use crate::case::CaseInput;
use crate::types::{CaseDecision, CaseStatus, ClassificationHit, ScreeningResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MATRIX_VERSION: &str = "令和7年5月28日施行対応版";
pub const SYSTEM_VERSION: &str = "v2.1.0";

pub const DEFAULT_EXCERPT_CHARS: usize = 500;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub case_id: String,
    pub reviewer: String,
    pub created_at: DateTime<Utc>,
    pub matrix_version: String,
    pub system_version: String,

    pub item_name: String,
    pub hs_code: String,
    pub key_params: String,
    pub product_category: String,
    pub spec_excerpt: String,

    pub destination: String,
    pub buyer: String,
    pub end_user: String,
    pub end_use: String,
    pub transaction_type: String,

    pub hits: Vec<ClassificationHit>,
    pub screening: ScreeningResult,
    pub decision: CaseDecision,
}

impl ReportPayload {
    pub fn status(&self) -> CaseStatus {
        self.decision.status
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PayloadBuilder {
    excerpt_chars: usize,
}

impl PayloadBuilder {
    pub fn new(excerpt_chars: usize) -> Self {
        Self { excerpt_chars }
    }

    pub fn build(
        &self,
        fields: &CaseInput,
        hits: &[ClassificationHit],
        screening: &ScreeningResult,
        decision: &CaseDecision,
    ) -> ReportPayload {
        ReportPayload {
            case_id: fields.case_id.clone(),
            reviewer: fields.reviewer.clone(),
            created_at: fields.created_at,
            matrix_version: MATRIX_VERSION.to_string(),
            system_version: SYSTEM_VERSION.to_string(),
            item_name: fields.item_name.clone(),
            hs_code: fields.hs_code.clone(),
            key_params: fields.key_params.clone(),
            product_category: fields.product_category.clone(),
            spec_excerpt: truncate_excerpt(&fields.spec_text, self.excerpt_chars),
            destination: fields.destination.clone(),
            buyer: fields.buyer.clone(),
            end_user: fields.end_user.clone(),
            end_use: fields.end_use.clone(),
            transaction_type: fields.transaction_type.clone(),
            hits: hits.to_vec(),
            screening: screening.clone(),
            decision: decision.clone(),
        }
    }
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_EXCERPT_CHARS)
    }
}

/// Cut `text` to `max_chars` characters, appending an ellipsis when cut
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}
