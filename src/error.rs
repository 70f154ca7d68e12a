use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("record {id} rejected: {reason}")]
    InvalidRecord { id: u32, reason: String },

    #[error("no record with id {0}")]
    RecordNotFound(u32),

    #[error("outlier threshold {0} is not one of 1.0, 1.5, 2.0, 2.5, 3.0")]
    InvalidThreshold(f64),

    #[error("{0} must be set to use AI analysis")]
    MissingConfiguration(&'static str),

    #[error("analysis service request failed: {0}")]
    ServiceFailure(String),
}
