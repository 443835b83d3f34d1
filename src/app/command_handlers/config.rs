use crate::app::command_support::{expect_no_extra_args, load_settings, map_config_err};
use crate::config::{default_global_config_path, init_settings};

pub fn cmd_config(args: &[String]) -> Result<String, String> {
    match args.first().map(String::as_str) {
        Some("show") => {
            expect_no_extra_args(&args[1..], "config show")?;
            let settings = load_settings()?;
            Ok(format!(
                "api_base_url={}\nadmin_api_base_url={}\nsubmit_format={}\nseed_case={}\ndefault_dns_seed={}\nrequest_timeout_secs={}",
                settings.api_base_url,
                settings.admin_api_base_url,
                settings.submit_format,
                settings.seed_case.as_str(),
                settings.default_dns_seed,
                settings.request_timeout_secs
            ))
        }
        Some("path") => {
            expect_no_extra_args(&args[1..], "config path")?;
            let path = default_global_config_path().map_err(map_config_err)?;
            Ok(format!("path={}", path.display()))
        }
        Some("init") => {
            expect_no_extra_args(&args[1..], "config init")?;
            let path = init_settings().map_err(map_config_err)?;
            Ok(format!("config=created\npath={}", path.display()))
        }
        _ => Err("usage: config show|path|init".to_string()),
    }
}
