use crate::setup::fields::{
    ban_duration_seconds, max_failed_requests, FieldKey, StepStores,
    DEFAULT_BAN_DURATION_INDEX, DEFAULT_MAX_FAILED_REQUESTS_INDEX,
};
use crate::setup::steps::Step;
use crate::setup::validate::parse_port;
use serde::{Deserialize, Serialize};

pub const LEGACY_MIN_LISTENERS: u32 = 2;
pub const LEGACY_MAX_LISTENERS: u32 = 10;
pub const LEGACY_QUORUM_THRESHOLD: &str = "66%";
pub const LEGACY_DEFAULT_NODE_ADDRESS: &str = "0.0.0.0";
pub const LEGACY_DEFAULT_NODE_PORT: u16 = 2826;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("administrative interface port `{0}` is not in range 1-65535")]
    InvalidAdminPort(String),
    #[error("administrative interface address is missing")]
    MissingAdminAddress,
    #[error("validator mode is enabled but no secret seed was entered")]
    MissingSeed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSection {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanmanSection {
    pub max_failed_requests: u32,
    /// Seconds in the JSON payload; milliseconds in the legacy document.
    pub ban_duration: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSection {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// Body of `POST /writeConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub validator: ValidatorSection,
    pub dns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub network: Vec<String>,
    pub banman: BanmanSection,
    pub admin: AdminSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyNodeSection {
    pub is_validator: bool,
    pub min_listeners: u32,
    pub max_listeners: u32,
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyQuorumSection {
    pub threshold: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegacyAdminSection {}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegacyLoggingSection {}

/// YAML document for `POST /create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyConfig {
    pub banman: BanmanSection,
    pub node: LegacyNodeSection,
    pub admin: LegacyAdminSection,
    pub network: Vec<String>,
    pub dns_seeds: Vec<String>,
    pub quorum: LegacyQuorumSection,
    pub logging: LegacyLoggingSection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPayload {
    Json(NodeConfig),
    Yaml(LegacyConfig),
}

impl SubmissionPayload {
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            SubmissionPayload::Json(_) => "writeConfig",
            SubmissionPayload::Yaml(_) => "create",
        }
    }
}

fn validator_section(stores: &StepStores) -> Result<ValidatorSection, PayloadError> {
    let enabled = stores
        .flag(Step::SecretSeed, FieldKey::IsValidator)
        .unwrap_or(true);
    if !enabled {
        return Ok(ValidatorSection {
            enabled,
            seed: None,
        });
    }
    let seed = stores
        .text(Step::SecretSeed, FieldKey::Seed)
        .filter(|seed| !seed.is_empty())
        .ok_or(PayloadError::MissingSeed)?;
    Ok(ValidatorSection {
        enabled,
        seed: Some(seed.to_string()),
    })
}

fn banman_section(stores: &StepStores) -> BanmanSection {
    let max_failed = stores
        .choice(Step::BanManagement, FieldKey::MaxFailedRequests)
        .unwrap_or(DEFAULT_MAX_FAILED_REQUESTS_INDEX);
    let duration = stores
        .choice(Step::BanManagement, FieldKey::BanDuration)
        .unwrap_or(DEFAULT_BAN_DURATION_INDEX);
    BanmanSection {
        max_failed_requests: max_failed_requests(max_failed),
        ban_duration: ban_duration_seconds(duration),
    }
}

fn admin_section(stores: &StepStores) -> Result<AdminSection, PayloadError> {
    let disabled = stores
        .flag(Step::AdministrativeInterface, FieldKey::AdminDisabled)
        .unwrap_or(false);
    if disabled {
        return Ok(AdminSection {
            enabled: false,
            address: None,
            port: None,
        });
    }
    let address = stores
        .text(Step::AdministrativeInterface, FieldKey::AdminAddress)
        .filter(|address| !address.is_empty())
        .ok_or(PayloadError::MissingAdminAddress)?;
    let raw_port = stores
        .text(Step::AdministrativeInterface, FieldKey::AdminPort)
        .unwrap_or_default();
    let port =
        parse_port(raw_port).ok_or_else(|| PayloadError::InvalidAdminPort(raw_port.to_string()))?;
    Ok(AdminSection {
        enabled: true,
        address: Some(address.to_string()),
        port: Some(port),
    })
}

pub fn assemble_node_config(
    stores: &StepStores,
    default_dns_seed: &str,
) -> Result<NodeConfig, PayloadError> {
    let dns = stores.list(Step::NetworkOptions, FieldKey::Dns);
    let dns = if dns.is_empty() {
        vec![default_dns_seed.to_string()]
    } else {
        dns.to_vec()
    };
    Ok(NodeConfig {
        validator: validator_section(stores)?,
        dns,
        network: stores.list(Step::NetworkOptions, FieldKey::Network).to_vec(),
        banman: banman_section(stores),
        admin: admin_section(stores)?,
    })
}

/// Splits `scheme://host:port/path` into host and port.
fn node_listen_address(url: &str) -> (String, u16) {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let authority = without_scheme
        .split_once('/')
        .map(|(authority, _)| authority)
        .unwrap_or(without_scheme);
    match authority.rsplit_once(':') {
        Some((host, port)) => (
            host.to_string(),
            parse_port(port).unwrap_or(LEGACY_DEFAULT_NODE_PORT),
        ),
        None => (authority.to_string(), LEGACY_DEFAULT_NODE_PORT),
    }
}

pub fn assemble_legacy_config(stores: &StepStores) -> Result<LegacyConfig, PayloadError> {
    let validator = validator_section(stores)?;
    let network = stores.list(Step::NetworkOptions, FieldKey::Network).to_vec();
    let (address, port) = network
        .first()
        .map(|url| node_listen_address(url))
        .unwrap_or_else(|| {
            (
                LEGACY_DEFAULT_NODE_ADDRESS.to_string(),
                LEGACY_DEFAULT_NODE_PORT,
            )
        });
    let banman = banman_section(stores);
    Ok(LegacyConfig {
        banman: BanmanSection {
            max_failed_requests: banman.max_failed_requests,
            ban_duration: banman.ban_duration * 1000,
        },
        node: LegacyNodeSection {
            is_validator: validator.enabled,
            min_listeners: LEGACY_MIN_LISTENERS,
            max_listeners: LEGACY_MAX_LISTENERS,
            address,
            port,
        },
        admin: LegacyAdminSection::default(),
        network,
        dns_seeds: stores.list(Step::NetworkOptions, FieldKey::Dns).to_vec(),
        quorum: LegacyQuorumSection {
            threshold: LEGACY_QUORUM_THRESHOLD.to_string(),
        },
        logging: LegacyLoggingSection::default(),
    })
}
