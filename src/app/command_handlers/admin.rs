use crate::admin::{
    clear_session, load_session, save_session, AdminClient, AdminError, AdminSession, KeyGrant,
};
use crate::app::command_support::{expect_no_extra_args, load_settings, map_config_err};
use crate::config::default_session_path;
use crate::shared::logging::{token_fingerprint, EventLog};
use std::path::PathBuf;

const USAGE: &str =
    "usage: admin login <user> <password>|logout|validator|encryption-key <app> <height>";

fn session_path() -> Result<PathBuf, String> {
    default_session_path().map_err(map_config_err)
}

fn stored_token() -> Result<String, String> {
    let path = session_path()?;
    load_session(&path)
        .map_err(|e| e.to_string())?
        .map(|session| session.token)
        .ok_or_else(|| AdminError::NotLoggedIn.to_string())
}

pub fn render_key_grant(grant: &KeyGrant) -> String {
    format!(
        "private_key={}\nvalidator={}\naddress={}\nexpires={}\nsignature={}",
        grant.private_key,
        grant.voter_card.validator,
        grant.voter_card.address,
        grant.voter_card.expires.to_rfc3339(),
        grant.voter_card.signature
    )
}

pub fn parse_height(raw: &str) -> Result<u64, String> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| format!("height must be a non-negative integer, got `{raw}`"))
}

pub fn cmd_admin(args: &[String]) -> Result<String, String> {
    let log = EventLog::default_location();
    match args.first().map(String::as_str) {
        Some("login") => {
            let [username, password] = &args[1..] else {
                return Err("usage: admin login <user> <password>".to_string());
            };
            let settings = load_settings()?;
            let client = AdminClient::from_settings(&settings);
            let token = client.login(username, password).map_err(|err| {
                log.record("warn", "admin.login.failed", &format!("user={username} error={err}"));
                err.to_string()
            })?;
            let path = session_path()?;
            save_session(&path, &AdminSession::new(username.as_str(), token.as_str()))
                .map_err(|e| e.to_string())?;
            let fingerprint = token_fingerprint(&token);
            log.record(
                "info",
                "admin.login",
                &format!("user={username} token={fingerprint}"),
            );
            Ok(format!(
                "admin=logged_in\nuser={username}\ntoken_fingerprint={fingerprint}\nsession={}",
                path.display()
            ))
        }
        Some("logout") => {
            expect_no_extra_args(&args[1..], "admin logout")?;
            let removed = clear_session(&session_path()?).map_err(|e| e.to_string())?;
            if removed {
                log.record("info", "admin.logout", "session cleared");
                Ok("admin=logged_out".to_string())
            } else {
                Ok("admin=no_session".to_string())
            }
        }
        Some("validator") => {
            expect_no_extra_args(&args[1..], "admin validator")?;
            let token = stored_token()?;
            let settings = load_settings()?;
            let grant = AdminClient::from_settings(&settings)
                .validator(&token)
                .map_err(|e| e.to_string())?;
            log.record(
                "info",
                "admin.validator",
                &format!("token={}", token_fingerprint(&token)),
            );
            Ok(render_key_grant(&grant))
        }
        Some("encryption-key") => {
            let [app, height] = &args[1..] else {
                return Err("usage: admin encryption-key <app> <height>".to_string());
            };
            let height = parse_height(height)?;
            let token = stored_token()?;
            let settings = load_settings()?;
            let grant = AdminClient::from_settings(&settings)
                .encryption_key(&token, app, height)
                .map_err(|e| e.to_string())?;
            log.record(
                "info",
                "admin.encryption_key",
                &format!("app={app} height={height} token={}", token_fingerprint(&token)),
            );
            Ok(render_key_grant(&grant))
        }
        _ => Err(USAGE.to_string()),
    }
}
