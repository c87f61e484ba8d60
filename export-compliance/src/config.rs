//! Configuration for the compliance engine

use crate::case::DEFAULT_CASE_PREFIX;
use crate::error::{ComplianceError, Result};
use crate::payload::DEFAULT_EXCERPT_CHARS;
use crate::report::ReportFormat;
use risk_engine::{RiskThresholds, ScoreWeights};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Control tables file (TOML). Built-in tables when absent
    pub tables_path: Option<PathBuf>,

    /// Classification configuration
    pub classification: ClassificationConfig,

    /// Screening configuration
    pub screening: ScreeningConfig,

    /// Report configuration
    pub report: ReportConfig,

    /// Case defaults
    pub case: CaseConfig,
}

/// Classification configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Confidence jitter half-width, 0 disables it
    pub jitter_spread: f64,

    /// Seed for the jitter source
    pub seed: Option<u64>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            jitter_spread: 0.05,
            seed: None,
        }
    }
}

/// Screening configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    pub weights: ScoreWeights,
    pub thresholds: RiskThresholds,
}

/// Report configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Excerpt length for the specification text (characters)
    pub excerpt_chars: usize,

    /// Output directory for written reports
    pub output_dir: PathBuf,

    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            output_dir: PathBuf::from("./data/reports"),
            format: ReportFormat::Text,
        }
    }
}

/// Defaults applied to cases that leave them empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseConfig {
    pub default_reviewer: String,
    pub id_prefix: String,
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            default_reviewer: "田中 太郎".to_string(),
            id_prefix: DEFAULT_CASE_PREFIX.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| ComplianceError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `EXPORT_*` environment overrides on top of this config
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(spread) = std::env::var("EXPORT_JITTER_SPREAD") {
            self.classification.jitter_spread = spread.parse().map_err(|_| {
                ComplianceError::ConfigError(format!("EXPORT_JITTER_SPREAD is not a number: {}", spread))
            })?;
        }

        if let Ok(seed) = std::env::var("EXPORT_SEED") {
            let seed = seed.parse().map_err(|_| {
                ComplianceError::ConfigError(format!("EXPORT_SEED is not an integer: {}", seed))
            })?;
            self.classification.seed = Some(seed);
        }

        if let Ok(dir) = std::env::var("EXPORT_REPORT_DIR") {
            self.report.output_dir = PathBuf::from(dir);
        }

        if let Ok(reviewer) = std::env::var("EXPORT_REVIEWER") {
            self.case.default_reviewer = reviewer;
        }

        if let Ok(path) = std::env::var("EXPORT_TABLES_PATH") {
            self.tables_path = Some(PathBuf::from(path));
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let spread = self.classification.jitter_spread;
        if !spread.is_finite() || !(0.0..=1.0).contains(&spread) {
            return Err(ComplianceError::ConfigError(format!(
                "jitter_spread must be within [0, 1], got {}",
                spread
            )));
        }

        if self.case.id_prefix.trim().is_empty() {
            return Err(ComplianceError::ConfigError("case id_prefix must not be empty".to_string()));
        }

        self.screening.thresholds.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.classification.jitter_spread, 0.05);
        assert_eq!(config.report.excerpt_chars, 500);
        assert_eq!(config.case.id_prefix, "KSA");
        assert_eq!(config.screening.thresholds.critical, 50);
        assert!(config.tables_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            [classification]
            jitter_spread = 0.0
            seed = 7

            [screening.weights]
            destination = 40
            buyer = 25
            end_user = 30
            end_use = 20

            [report]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.classification.seed, Some(7));
        assert_eq!(config.screening.weights.end_use, 20);
        assert_eq!(config.screening.thresholds, RiskThresholds::default());
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.report.excerpt_chars, 500);
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        let result = EngineConfig::from_toml_str(
            r#"
            [screening.thresholds]
            critical = 10
            high = 25
            medium = 5
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bad_spread() {
        let mut config = EngineConfig::default();
        config.classification.jitter_spread = 1.5;
        assert!(matches!(config.validate(), Err(ComplianceError::ConfigError(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[case]\ndefault_reviewer = \"佐藤 花子\"\n").unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.case.default_reviewer, "佐藤 花子");
        assert_eq!(config.case.id_prefix, "KSA");
    }

    #[test]
    fn test_missing_file() {
        let result = EngineConfig::from_file("/nonexistent/engine.toml");
        assert!(matches!(result, Err(ComplianceError::Io(_))));
    }
}
