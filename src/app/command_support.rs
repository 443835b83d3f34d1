use crate::config::{load_global_settings, ConfigError, Settings};
use crate::setup::validate::ValidationRules;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn load_settings() -> Result<Settings, String> {
    load_global_settings().map_err(map_config_err)
}

pub fn validation_rules(settings: &Settings) -> ValidationRules {
    ValidationRules {
        seed_case: settings.seed_case,
    }
}

pub(crate) fn expect_no_extra_args(args: &[String], usage: &str) -> Result<(), String> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(format!("usage: {usage}"))
    }
}
