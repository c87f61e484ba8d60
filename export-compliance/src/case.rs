//! Case input as collected from the product and transaction forms

use crate::error::{ComplianceError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CASE_PREFIX: &str = "KSA";

/// Everything the caller knows about one case before screening.
///
/// Optional fields are empty strings when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseInput {
    pub case_id: String,
    pub reviewer: String,
    pub created_at: DateTime<Utc>,

    // Product
    pub item_name: String,
    pub hs_code: String,
    pub key_params: String,
    pub product_category: String,
    pub spec_text: String,

    // Transaction
    pub destination: String,
    pub buyer: String,
    pub end_user: String,
    pub end_use: String,
    pub transaction_type: String,
}

impl Default for CaseInput {
    fn default() -> Self {
        Self {
            case_id: String::new(),
            reviewer: String::new(),
            created_at: Utc::now(),
            item_name: String::new(),
            hs_code: String::new(),
            key_params: String::new(),
            product_category: String::new(),
            spec_text: String::new(),
            destination: String::new(),
            buyer: String::new(),
            end_user: String::new(),
            end_use: String::new(),
            transaction_type: String::new(),
        }
    }
}

impl CaseInput {
    pub fn new(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            ..Self::default()
        }
    }

    /// Item name is required before classification
    pub fn validate_product(&self) -> Result<()> {
        missing(&[("item_name", &self.item_name)])
    }

    /// Destination and end use are required before screening
    pub fn validate_transaction(&self) -> Result<()> {
        missing(&[("destination", &self.destination), ("end_use", &self.end_use)])
    }

    /// Validate both forms, reporting every missing field at once
    pub fn validate(&self) -> Result<()> {
        missing(&[
            ("item_name", &self.item_name),
            ("destination", &self.destination),
            ("end_use", &self.end_use),
        ])
    }

    /// Fill in the case id and reviewer when the caller left them empty
    pub fn with_defaults(mut self, prefix: &str, reviewer: &str) -> Self {
        if self.case_id.trim().is_empty() {
            self.case_id = generate_case_id(prefix, &self.created_at);
        }
        if self.reviewer.trim().is_empty() {
            self.reviewer = reviewer.to_string();
        }
        self
    }
}

/// `KSA-20250528-142501` style identifier
pub fn generate_case_id(prefix: &str, created_at: &DateTime<Utc>) -> String {
    format!("{}-{}", prefix, created_at.format("%Y%m%d-%H%M%S"))
}

fn missing(fields: &[(&str, &String)]) -> Result<()> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ComplianceError::MissingFields(missing))
    }
}
