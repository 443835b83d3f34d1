use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod admin;
pub mod config;
pub mod validate;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Setup => crate::setup::actions::cmd_setup(&args[1..]),
        CliVerb::Validate => validate::cmd_validate(&args[1..]),
        CliVerb::Config => config::cmd_config(&args[1..]),
        CliVerb::Admin => admin::cmd_admin(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
