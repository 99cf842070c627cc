use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropFinError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    /// Aggregated form-level validation failure. Every collected message is
    /// reported at once; callers fix the inputs, retrying is pointless.
    #[error("Invalid loan inputs: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PropFinError {
    fn from(e: serde_json::Error) -> Self {
        PropFinError::SerializationError(e.to_string())
    }
}
