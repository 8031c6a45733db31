use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimetableError {
    /// A loan parameter is missing, malformed or out of range.
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    /// A call received arguments it cannot work with (aggregation, explicit dates).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl TimetableError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        TimetableError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// A product or power left the range `Decimal` can represent.
    pub(crate) fn overflow(field: &str) -> Self {
        Self::invalid_input(
            field,
            "Result exceeds the decimal range; reduce the amount, rate or duration",
        )
    }
}

impl From<serde_json::Error> for TimetableError {
    fn from(e: serde_json::Error) -> Self {
        TimetableError::SerializationError(e.to_string())
    }
}
