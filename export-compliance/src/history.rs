use crate::payload::ReportPayload;
use crate::types::CaseStatus;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFilter {
    pub status: Option<CaseStatus>,
    /// Matched case-insensitively against item name and destination
    pub search: Option<String>,
}

impl CaseFilter {
    pub fn matches(&self, payload: &ReportPayload) -> bool {
        if let Some(status) = self.status {
            if payload.status() != status {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                payload.item_name.to_lowercase().contains(&term)
                    || payload.destination.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStats {
    pub total: usize,
    pub clear: usize,
    pub license_required: usize,
    pub blocked: usize,
}

/// In-memory case history, append-only, oldest first
#[derive(Debug, Default)]
pub struct CaseHistory {
    cases: RwLock<Vec<ReportPayload>>,
}

impl CaseHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, payload: ReportPayload) {
        info!("Stored case {} ({})", payload.case_id, payload.status());
        self.cases.write().push(payload);
    }

    pub fn len(&self) -> usize {
        self.cases.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.read().is_empty()
    }

    /// Latest stored case with this id
    pub fn get(&self, case_id: &str) -> Option<ReportPayload> {
        self.cases
            .read()
            .iter()
            .rev()
            .find(|payload| payload.case_id == case_id)
            .cloned()
    }

    /// Last `n` cases, oldest first
    pub fn recent(&self, n: usize) -> Vec<ReportPayload> {
        let cases = self.cases.read();
        let start = cases.len().saturating_sub(n);
        cases[start..].to_vec()
    }

    /// Cases matching the filter, newest first
    pub fn search(&self, filter: &CaseFilter) -> Vec<ReportPayload> {
        self.cases
            .read()
            .iter()
            .rev()
            .filter(|payload| filter.matches(payload))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> CaseStats {
        let cases = self.cases.read();
        let mut stats = CaseStats {
            total: cases.len(),
            ..CaseStats::default()
        };
        for payload in cases.iter() {
            match payload.status() {
                CaseStatus::Clear => stats.clear += 1,
                CaseStatus::LicenseRequired => stats.license_required += 1,
                CaseStatus::Blocked => stats.blocked += 1,
            }
        }
        stats
    }
}
