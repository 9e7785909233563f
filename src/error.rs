use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse scenario JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to build internal domain model: {0}")]
    ModelConstructionError(String),

    #[error("Invalid entity identifier '{0}': {1}")]
    InvalidIdentifier(String, String),

    #[error("Invalid value pattern '{0}': {1}")]
    InvalidValuePattern(String, String),

    #[error("Failed to write statistics: {0}")]
    CsvError(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
