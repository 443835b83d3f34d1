use crate::config::ConfigError;
use std::path::PathBuf;

pub const GLOBAL_STATE_DIR: &str = ".talos";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const SESSION_FILE_NAME: &str = "session.json";
pub const LOG_FILE_RELATIVE_PATH: &str = "logs/talos.log";

pub fn default_state_root_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_state_root_path()?.join(GLOBAL_SETTINGS_FILE_NAME))
}

pub fn default_session_path() -> Result<PathBuf, ConfigError> {
    Ok(default_state_root_path()?.join(SESSION_FILE_NAME))
}

pub fn default_log_path() -> Result<PathBuf, ConfigError> {
    Ok(default_state_root_path()?.join(LOG_FILE_RELATIVE_PATH))
}
