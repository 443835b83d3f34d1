use super::ConfigError;
use crate::setup::validate::SeedCaseRule;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:2827";
pub const DEFAULT_ADMIN_API_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_DNS_SEED: &str = "seed.bosagora.io";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const API_BASE_ENV: &str = "TALOS_API_BASE";
pub const ADMIN_API_BASE_ENV: &str = "TALOS_ADMIN_API_BASE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitFormat {
    #[default]
    Json,
    Yaml,
}

impl SubmitFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for SubmitFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_admin_api_base_url")]
    pub admin_api_base_url: String,
    #[serde(default)]
    pub submit_format: SubmitFormat,
    #[serde(default)]
    pub seed_case: SeedCaseRule,
    #[serde(default = "default_dns_seed")]
    pub default_dns_seed: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_admin_api_base_url() -> String {
    DEFAULT_ADMIN_API_BASE_URL.to_string()
}

fn default_dns_seed() -> String {
    DEFAULT_DNS_SEED.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            admin_api_base_url: default_admin_api_base_url(),
            submit_format: SubmitFormat::default(),
            seed_case: SeedCaseRule::default(),
            default_dns_seed: default_dns_seed(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(base) = non_empty_env(API_BASE_ENV) {
            self.api_base_url = base;
        }
        if let Some(base) = non_empty_env(ADMIN_API_BASE_ENV) {
            self.admin_api_base_url = base;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url("api_base_url", &self.api_base_url)?;
        validate_base_url("admin_api_base_url", &self.admin_api_base_url)?;
        if self.default_dns_seed.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`default_dns_seed` must be non-empty".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Settings(
                "`request_timeout_secs` must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn endpoint(&self, path: &str) -> String {
        join_endpoint(&self.api_base_url, path)
    }

    pub fn admin_endpoint(&self, path: &str) -> String {
        join_endpoint(&self.admin_api_base_url, path)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn validate_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Settings(format!("`{field}` must be non-empty")));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Settings(format!(
            "`{field}` must start with http:// or https://"
        )));
    }
    Ok(())
}

pub(crate) fn join_endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
