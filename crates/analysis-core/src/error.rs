use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Config advisor error: {0}")]
    Advisor(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
