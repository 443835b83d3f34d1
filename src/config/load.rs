use super::{default_global_config_path, ConfigError, Settings};

/// Loads `~/.talos/config.yaml`, falling back to defaults when the file is
/// absent, then applies environment overrides and validates the result.
pub fn load_global_settings() -> Result<Settings, ConfigError> {
    let path = default_global_config_path()?;
    let mut settings = if path.exists() {
        Settings::from_path(&path)?
    } else {
        Settings::default()
    };
    settings.apply_env_overrides();
    settings.validate()?;
    Ok(settings)
}
