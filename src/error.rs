use thiserror::Error;

use crate::api::ServerErrorBody;

/// Application-level errors using thiserror for structured error handling.
///
/// These errors represent domain-specific failures that can occur while
/// driving the registration wizard. They provide context and can be chained
/// with anyhow in the binary.

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {endpoint} failed")]
    Transport {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{endpoint} rejected the request with status {status}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: ServerErrorBody,
    },

    #[error("{endpoint} returned unexpected status {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    #[error("Failed to decode response from {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Server-provided error body, when the backend sent one
    pub fn body(&self) -> Option<&ServerErrorBody> {
        match self {
            ApiError::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No platform config directory available")]
    NoConfigDir,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Account type selection is not complete")]
    BranchIncomplete,

    #[error("Step {step} has {count} invalid field(s)")]
    ValidationFailed { step: usize, count: usize },

    #[error("Submission is only possible from the final step (currently on step {current} of {total})")]
    NotOnFinalStep { current: usize, total: usize },

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("Registration already completed")]
    Completed,
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = WizardError::NotOnFinalStep {
            current: 2,
            total: 3,
        };
        assert_eq!(
            err.to_string(),
            "Submission is only possible from the final step (currently on step 2 of 3)"
        );

        let err = WizardError::SubmissionInFlight;
        assert_eq!(err.to_string(), "A submission is already in flight");
    }

    #[test]
    fn test_error_source_chain() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_err = ConfigError::LoadFailed {
            path: "/test/config.json".to_string(),
            source: Box::new(io_err),
        };

        assert!(config_err.source().is_some());
        assert_eq!(
            config_err.to_string(),
            "Failed to load configuration from /test/config.json"
        );
    }

    #[test]
    fn test_rejected_exposes_body() {
        let err = ApiError::Rejected {
            endpoint: "/auth/register".to_string(),
            status: 400,
            body: ServerErrorBody {
                code: Some("WEAK_PASSWORD".to_string()),
                ..Default::default()
            },
        };
        assert_eq!(
            err.body().and_then(|b| b.code.as_deref()),
            Some("WEAK_PASSWORD")
        );

        let err = ApiError::UnexpectedStatus {
            endpoint: "/auth/register".to_string(),
            status: 200,
        };
        assert!(err.body().is_none());
    }
}
