use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid pattern for rule {clause_id}: {source}")]
    InvalidPattern {
        clause_id: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid control table: {0}")]
    InvalidTable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Risk engine error: {0}")]
    Risk(#[from] risk_engine::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ComplianceError {
    fn from(err: serde_json::Error) -> Self {
        ComplianceError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ComplianceError {
    fn from(err: toml::de::Error) -> Self {
        ComplianceError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ComplianceError>;
