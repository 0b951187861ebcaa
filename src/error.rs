//! Error taxonomy for the review pipeline.

/// Generic message shown for any model-side failure. The caller cannot tell
/// model misbehavior apart from transport failure, so both collapse to this.
const MODEL_FAILURE_MESSAGE: &str =
    "The review service is currently unavailable. Please try again.";

/// Errors produced by the review pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// Malformed submission. Recovered locally, never reaches the model.
    #[error("{0}")]
    Validation(String),

    /// The model service call could not complete. Not retried.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The model responded but the payload does not conform to the declared
    /// output schema. The model is an untrusted producer.
    #[error("schema violation: {0}")]
    SchemaViolation(String),
}

impl ReviewError {
    /// Single human-readable string surfaced to the user. Validation messages
    /// are field-specific; model failures collapse to one generic message,
    /// with the detail left to the logs.
    pub fn user_message(&self) -> String {
        match self {
            ReviewError::Validation(msg) => msg.clone(),
            ReviewError::ModelUnavailable(_) | ReviewError::SchemaViolation(_) => {
                MODEL_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ReviewError {
    fn from(e: reqwest::Error) -> Self {
        ReviewError::ModelUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_passes_through() {
        let err = ReviewError::Validation("File name is required".into());
        assert_eq!(err.user_message(), "File name is required");
    }

    #[test]
    fn test_model_failures_collapse_to_generic_message() {
        let unavailable = ReviewError::ModelUnavailable("connection refused".into());
        let violation = ReviewError::SchemaViolation("missing 'issues' key".into());
        assert_eq!(unavailable.user_message(), violation.user_message());
        assert!(!unavailable.user_message().contains("connection refused"));
    }
}
