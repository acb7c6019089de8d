use thiserror::Error;

pub type RupiyaResult<T> = Result<T, RupiyaError>;

#[derive(Error, Debug)]
pub enum RupiyaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cohort not found: {0}")]
    CohortNotFound(String),

    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
