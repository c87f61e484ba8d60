//! Risk Engine for export screening
//!
//! Additive risk scoring for export-control screening checks. Each check
//! contributes a fixed weight; the total is mapped to an overall level by
//! fixed thresholds.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;
pub mod thresholds;
pub mod scoring;

pub use error::{Error, Result};
pub use types::*;
pub use thresholds::RiskThresholds;
pub use scoring::{RiskScorer, ScoreWeights};
