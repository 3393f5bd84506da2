use analysis_core::AnalysisError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type AdvisorResult<T> = Result<T, AdvisorError>;

impl From<AdvisorError> for AnalysisError {
    fn from(err: AdvisorError) -> Self {
        AnalysisError::Advisor(err.to_string())
    }
}
