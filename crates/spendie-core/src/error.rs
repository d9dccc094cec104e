//! Error types for Spendie

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The inference service could not be reached or answered without a completion
    #[error("Inference unavailable: {0}")]
    InferenceUnavailable(String),

    /// The inference service answered, but not with the expected JSON shape
    #[error("Unparseable inference output: {0}")]
    UnparseableOutput(String),

    /// A parsed record is missing one of its required fields
    #[error("Incomplete record: {0}")]
    IncompleteRecord(String),

    /// Amount is missing, non-numeric, or not strictly positive
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
