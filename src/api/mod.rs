/// Registration backend API
///
/// The wizard only needs two calls from the backend. They sit behind the
/// `RegistrationApi` trait so the session can be driven against the real
/// HTTP client or an in-process fake.
///
/// ## Endpoints
///
/// ```text
/// POST /auth/check-availability   { "<email|username|phone>": value } -> { available }
/// POST /auth/register             RegistrationPayload -> 201
/// ```

pub mod http;
pub mod worker;

use serde::Deserialize;

use crate::error::ApiError;
use crate::wizard::availability::WatchedField;
use crate::wizard::payload::RegistrationPayload;

pub use http::HttpRegistrationApi;
pub use worker::{AvailabilityWorker, CheckOutcome};

pub const CHECK_AVAILABILITY_PATH: &str = "/auth/check-availability";
pub const REGISTER_PATH: &str = "/auth/register";

/// Backend operations used by the wizard
pub trait RegistrationApi: Send + Sync {
    /// Ask whether a value is still free. `Ok(false)` means taken.
    fn check_availability(&self, field: WatchedField, value: &str) -> Result<bool, ApiError>;

    /// Create the account. Only HTTP 201 counts as success.
    fn register(&self, payload: &RegistrationPayload) -> Result<(), ApiError>;
}

/// Error body the backend may attach to a failed request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub message_en: Option<String>,
    pub errors: Vec<String>,
}

impl ServerErrorBody {
    /// Every human-readable text in the body
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.message
            .as_deref()
            .into_iter()
            .chain(self.message_en.as_deref())
            .chain(self.errors.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_parses_partial_json() {
        let body: ServerErrorBody =
            serde_json::from_str(r#"{ "code": "WEAK_PASSWORD", "messageEn": "Weak" }"#).unwrap();
        assert_eq!(body.code.as_deref(), Some("WEAK_PASSWORD"));
        assert_eq!(body.message_en.as_deref(), Some("Weak"));
        assert!(body.errors.is_empty());
    }

    #[test]
    fn test_error_body_texts() {
        let body = ServerErrorBody {
            code: None,
            message: Some("first".to_string()),
            message_en: None,
            errors: vec!["second".to_string(), "third".to_string()],
        };
        let texts: Vec<&str> = body.texts().collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }
}
