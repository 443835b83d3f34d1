use crate::config::Settings;
use crate::submit::payload::SubmissionPayload;
use std::time::Duration;

pub const NO_RESPONSE_TEXT: &str = "No response received from the server";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("No response received from the server")]
    NoResponse { detail: String },
    #[error("Internal error ({detail})")]
    Local { detail: String },
}

impl SubmitError {
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::Server { .. } => "server",
            SubmitError::NoResponse { .. } => "no_response",
            SubmitError::Local { .. } => "local",
        }
    }
}

/// Sends an assembled configuration to the node.
pub trait ConfigSubmitter {
    fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError>;
}

#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    api_base_url: String,
    timeout: Duration,
}

impl HttpSubmitter {
    pub fn new(api_base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.api_base_url.clone(), settings.request_timeout())
    }

    pub fn endpoint(&self, payload: &SubmissionPayload) -> String {
        crate::config::join_endpoint(&self.api_base_url, payload.endpoint_path())
    }

    fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new().timeout(self.timeout).build()
    }
}

impl ConfigSubmitter for HttpSubmitter {
    fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
        let url = self.endpoint(payload);
        let request = self.agent().post(&url);
        let result = match payload {
            SubmissionPayload::Json(config) => {
                let body = serde_json::to_value(config).map_err(|e| SubmitError::Local {
                    detail: format!("failed to encode configuration: {e}"),
                })?;
                request.send_json(body)
            }
            SubmissionPayload::Yaml(config) => {
                let body = serde_yaml::to_string(config).map_err(|e| SubmitError::Local {
                    detail: format!("failed to encode configuration: {e}"),
                })?;
                request
                    .set("Content-Type", "application/yaml")
                    .send_string(&body)
            }
        };

        match result {
            Ok(response) if (200..300).contains(&response.status()) => Ok(()),
            Ok(response) => Err(server_error(response.status(), response)),
            Err(err) => Err(classify_request_error(err)),
        }
    }
}

/// Maps a failed ureq call onto the three submission failure kinds.
pub(crate) fn classify_request_error(err: ureq::Error) -> SubmitError {
    match err {
        ureq::Error::Status(status, response) => server_error(status, response),
        ureq::Error::Transport(transport) => classify_transport(&transport),
    }
}

fn classify_transport(transport: &ureq::Transport) -> SubmitError {
    match transport.kind() {
        ureq::ErrorKind::InvalidUrl
        | ureq::ErrorKind::UnknownScheme
        | ureq::ErrorKind::InvalidProxyUrl => SubmitError::Local {
            detail: transport.to_string(),
        },
        _ => SubmitError::NoResponse {
            detail: transport.to_string(),
        },
    }
}

pub(crate) fn server_error(status: u16, response: ureq::Response) -> SubmitError {
    let body = response.into_string().unwrap_or_default();
    SubmitError::Server {
        status,
        message: server_message(status, &body),
    }
}

/// Prefers the `status` field of a JSON error body.
pub fn server_message(status: u16, body: &str) -> String {
    let from_body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("status").cloned())
        .and_then(|status| match status {
            serde_json::Value::String(text) if !text.trim().is_empty() => Some(text),
            serde_json::Value::Null | serde_json::Value::String(_) => None,
            other => Some(other.to_string()),
        });
    from_body.unwrap_or_else(|| format!("server responded with status {status}"))
}
