//! Error handling for the ATS scanner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtsScannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    #[error("Invalid category weights: {0}")]
    InvalidWeights(String),

    #[error("Conflicting synonym: {0}")]
    SynonymConflict(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Audit API error (status {status}): {message}")]
    AuditApi { status: u16, message: String },

    #[error("Audit response was empty")]
    EmptyAuditResponse,
}

impl AtsScannerError {
    /// True for errors raised while validating matcher configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AtsScannerError::Configuration(_)
                | AtsScannerError::InvalidTaxonomy(_)
                | AtsScannerError::InvalidWeights(_)
                | AtsScannerError::SynonymConflict(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AtsScannerError>;

impl From<toml::de::Error> for AtsScannerError {
    fn from(err: toml::de::Error) -> Self {
        AtsScannerError::Configuration(format!("Failed to parse config: {}", err))
    }
}

impl From<toml::ser::Error> for AtsScannerError {
    fn from(err: toml::ser::Error) -> Self {
        AtsScannerError::Configuration(format!("Failed to serialize config: {}", err))
    }
}
