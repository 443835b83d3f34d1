use crate::config::{join_endpoint, Settings};
use crate::submit::client::{classify_request_error, server_error};
use crate::submit::SubmitError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const LOGIN_OK: i64 = 0;
pub const LOGIN_UNKNOWN_ACCOUNT: i64 = 1;
pub const LOGIN_WRONG_PASSWORD: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    #[error("We cannot find an account.")]
    UnknownAccount,
    #[error("The password is incorrect.")]
    WrongPassword,
    #[error("Login Failed.")]
    LoginFailed,
    #[error("not logged in; run `talos admin login <user> <password>` first")]
    NotLoggedIn,
    #[error(transparent)]
    Request(#[from] SubmitError),
    #[error("unexpected admin response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterCard {
    pub validator: String,
    pub address: String,
    pub expires: DateTime<Utc>,
    pub signature: String,
}

/// A key handed out by the admin interface together with the card that vouches for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGrant {
    pub private_key: String,
    pub voter_card: VoterCard,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    status: i64,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct VoterCardResponse {
    validator: String,
    address: String,
    expires: String,
    signature: String,
}

#[derive(Debug, Deserialize)]
struct KeyGrantResponse {
    private_key: String,
    voter_card: VoterCardResponse,
}

/// Maps the login body's `status` code onto a token or a login error.
pub fn login_outcome(status: i64, data: Option<Value>) -> Result<String, AdminError> {
    match status {
        LOGIN_OK => match data {
            Some(Value::String(token)) if !token.trim().is_empty() => Ok(token),
            _ => Err(AdminError::InvalidResponse(
                "login succeeded without a token".to_string(),
            )),
        },
        LOGIN_UNKNOWN_ACCOUNT => Err(AdminError::UnknownAccount),
        LOGIN_WRONG_PASSWORD => Err(AdminError::WrongPassword),
        _ => Err(AdminError::LoginFailed),
    }
}

#[derive(Debug, Clone)]
pub struct AdminClient {
    base_url: String,
    timeout: Duration,
}

impl AdminClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.admin_api_base_url.clone(), settings.request_timeout())
    }

    pub fn endpoint(&self, path: &str) -> String {
        join_endpoint(&self.base_url, path)
    }

    fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new().timeout(self.timeout).build()
    }

    fn post_json(&self, path: &str, token: Option<&str>, body: Value) -> Result<Value, AdminError> {
        let mut request = self.agent().post(&self.endpoint(path));
        if let Some(token) = token {
            request = request.set("Authorization", token);
        }
        let response = match request.send_json(body) {
            Ok(response) if (200..300).contains(&response.status()) => response,
            Ok(response) => return Err(server_error(response.status(), response).into()),
            Err(err) => return Err(classify_request_error(err).into()),
        };
        response
            .into_json::<Value>()
            .map_err(|e| AdminError::InvalidResponse(format!("body is not json: {e}")))
    }

    pub fn login(&self, username: &str, password: &str) -> Result<String, AdminError> {
        let body = self.post_json(
            "login",
            None,
            serde_json::json!({ "username": username, "password": password }),
        )?;
        let parsed: LoginResponse = serde_json::from_value(body)
            .map_err(|e| AdminError::InvalidResponse(format!("login: {e}")))?;
        login_outcome(parsed.status, parsed.data)
    }

    pub fn validator(&self, token: &str) -> Result<KeyGrant, AdminError> {
        let body = self.post_json("admin/validator", Some(token), serde_json::json!({}))?;
        parse_key_grant(body)
    }

    pub fn encryption_key(
        &self,
        token: &str,
        app: &str,
        height: u64,
    ) -> Result<KeyGrant, AdminError> {
        let body = self.post_json(
            "admin/encryptionkey",
            Some(token),
            serde_json::json!({ "app": app, "height": height }),
        )?;
        parse_key_grant(body)
    }
}

fn parse_key_grant(body: Value) -> Result<KeyGrant, AdminError> {
    let raw: KeyGrantResponse = serde_json::from_value(body)
        .map_err(|e| AdminError::InvalidResponse(e.to_string()))?;
    let expires = DateTime::parse_from_rfc3339(&raw.voter_card.expires)
        .map_err(|e| {
            AdminError::InvalidResponse(format!(
                "voter_card.expires `{}` is not RFC 3339: {e}",
                raw.voter_card.expires
            ))
        })?
        .with_timezone(&Utc);
    Ok(KeyGrant {
        private_key: raw.private_key,
        voter_card: VoterCard {
            validator: raw.voter_card.validator,
            address: raw.voter_card.address,
            expires,
            signature: raw.voter_card.signature,
        },
    })
}
