//! Planner error types

use std::time::Duration;
use thiserror::Error;

/// Errors from the plan-synthesis service
///
/// Two classes matter to callers: transport failures (service unreachable or
/// rejecting) and `MalformedPlan` (service answered, but the payload fails
/// the schema check). The session presents different messages for each.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("The plan returned by the service was in an unexpected format: {0}")]
    MalformedPlan(String),

    #[error("Empty response from the service")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PlannerError {
    /// True when the service answered but the payload was unintelligible
    ///
    /// Everything else counts as a transport failure for user messaging.
    pub fn is_malformed(&self) -> bool {
        matches!(self, PlannerError::MalformedPlan(_))
    }

    /// True when retrying the same request might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            PlannerError::RateLimited { .. } => true,
            PlannerError::Api { status, .. } => *status >= 500,
            PlannerError::Network(_) => true,
            PlannerError::Timeout(_) => true,
            PlannerError::MalformedPlan(_) => false,
            PlannerError::EmptyResponse => false,
            PlannerError::Configuration(_) => false,
        }
    }

    /// User-facing message, split by error class
    pub fn user_message(&self) -> String {
        if self.is_malformed() {
            "The travel plan returned by the service was in an unexpected format. Please try again.".to_string()
        } else {
            "The planning service could not be reached. Please check your connection and try again.".to_string()
        }
    }
}
