use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid generation method: {0}")]
    InvalidMethod(String),
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),
    #[error("Signature verification failed: {0}")]
    SignatureVerificationFailed(String),
    #[error("External API error: {0}")]
    External(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Failures of the LLM call that the generation path recovers from with
    /// stock hooks.
    pub fn is_recoverable_upstream(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamUnavailable(_) | AppError::MalformedUpstreamResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
