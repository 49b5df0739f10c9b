use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimError {
    #[error("optimizer transport failure: {0}")]
    Http(#[from] reqwest::Error),

    #[error("optimizer protocol violation: {0}")]
    Protocol(String),

    /// The response contradicts work a robot has already performed.
    /// Violations abort the decision cycle; they are never silently
    /// corrected.
    #[error("optimizer response inconsistent: {0}")]
    Inconsistent(String),
}

pub type OptimResult<T> = Result<T, OptimError>;
