use serde::Deserialize;
use serde_json::{Map, Value};

use super::{RegistrationApi, ServerErrorBody, CHECK_AVAILABILITY_PATH, REGISTER_PATH};
use crate::config::Config;
use crate::error::ApiError;
use crate::wizard::availability::WatchedField;
use crate::wizard::payload::RegistrationPayload;

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    available: bool,
}

/// Blocking HTTP client for the registration backend
pub struct HttpRegistrationApi {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpRegistrationApi {
    pub fn new(config: &Config) -> Self {
        let user_agent = format!("SignupWizard/{}", env!("CARGO_PKG_VERSION"));
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout())
            .user_agent(&user_agent)
            .build();

        Self {
            agent,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body, mapping ureq failures onto `ApiError`
    fn post(&self, path: &str, body: impl serde::Serialize) -> Result<ureq::Response, ApiError> {
        match self
            .agent
            .post(&self.url(path))
            .set("Accept", "application/json")
            .send_json(body)
        {
            Ok(resp) => Ok(resp),
            Err(ureq::Error::Status(status, resp)) => Err(rejection(path, status, resp)),
            Err(ureq::Error::Transport(transport)) => Err(ApiError::Transport {
                endpoint: path.to_string(),
                source: Box::new(transport),
            }),
        }
    }
}

/// A missing or non-JSON body still classifies as a rejection
fn rejection(path: &str, status: u16, response: ureq::Response) -> ApiError {
    let body = response.into_json::<ServerErrorBody>().unwrap_or_default();
    ApiError::Rejected {
        endpoint: path.to_string(),
        status,
        body,
    }
}

impl RegistrationApi for HttpRegistrationApi {
    fn check_availability(&self, field: WatchedField, value: &str) -> Result<bool, ApiError> {
        let mut body = Map::new();
        body.insert(field.as_str().to_string(), Value::String(value.to_string()));

        let response = self.post(CHECK_AVAILABILITY_PATH, Value::Object(body))?;
        let parsed: AvailabilityResponse =
            response.into_json().map_err(|e| ApiError::Decode {
                endpoint: CHECK_AVAILABILITY_PATH.to_string(),
                source: e,
            })?;

        Ok(parsed.available)
    }

    fn register(&self, payload: &RegistrationPayload) -> Result<(), ApiError> {
        tracing::info!(role = payload.role.as_str(), "Submitting registration");

        let response = self.post(REGISTER_PATH, payload)?;
        match response.status() {
            201 => Ok(()),
            status => Err(ApiError::UnexpectedStatus {
                endpoint: REGISTER_PATH.to_string(),
                status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let mut config = Config::default();
        config.api_base_url = "https://api.example.com/api/".to_string();
        let api = HttpRegistrationApi::new(&config);

        assert_eq!(
            api.url(REGISTER_PATH),
            "https://api.example.com/api/auth/register"
        );
    }

    #[test]
    fn test_availability_response_parsing() {
        let parsed: AvailabilityResponse =
            serde_json::from_str(r#"{ "error": false, "available": true }"#).unwrap();
        assert!(parsed.available);
    }

    #[test]
    fn test_rejection_keeps_server_body() {
        let response = ureq::Response::new(
            409,
            "Conflict",
            r#"{ "code": "PASSWORD_BREACHED", "message": "Password found in breach" }"#,
        )
        .unwrap();

        let err = rejection(REGISTER_PATH, 409, response);
        match err {
            ApiError::Rejected { status, body, .. } => {
                assert_eq!(status, 409);
                assert_eq!(body.code.as_deref(), Some("PASSWORD_BREACHED"));
                assert_eq!(body.message.as_deref(), Some("Password found in breach"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_rejection_without_json_body() {
        let response = ureq::Response::new(500, "Internal Server Error", "oops").unwrap();
        let err = rejection(REGISTER_PATH, 500, response);
        assert_eq!(err.body(), Some(&ServerErrorBody::default()));
    }

    #[test]
    #[ignore = "opens a local socket"]
    fn test_unreachable_backend_is_transport_error() {
        let mut config = Config::default();
        // Port 9 (discard) on localhost is expected to refuse connections
        config.api_base_url = "http://127.0.0.1:9".to_string();
        config.request_timeout_secs = 1;
        let api = HttpRegistrationApi::new(&config);

        let err = api
            .check_availability(WatchedField::Username, "ali")
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }
}
