#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Setup,
    Validate,
    Config,
    Admin,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "setup" => CliVerb::Setup,
        "validate" => CliVerb::Validate,
        "config" => CliVerb::Config,
        "admin" => CliVerb::Admin,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  setup [--legacy]                     Run the node configuration wizard".to_string(),
        "  validate <field> <value>             Check one value (dns|network|seed|address|port)"
            .to_string(),
        "  config show|path|init                Show, locate or create ~/.talos/config.yaml"
            .to_string(),
        "  admin login <user> <password>        Sign in to the node admin interface".to_string(),
        "  admin logout                         Forget the stored admin session".to_string(),
        "  admin validator                      Fetch the validator voter card".to_string(),
        "  admin encryption-key <app> <height>  Fetch an app encryption key".to_string(),
        "  help                                 Show this help".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    let mut lines = cli_help_lines();
    lines.push(String::new());
    lines.push(
        "Set TALOS_SETUP_SCRIPT_KEYS to drive `setup` without a terminal.".to_string(),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_parse_and_unknown_falls_through() {
        assert_eq!(parse_cli_verb("setup"), CliVerb::Setup);
        assert_eq!(parse_cli_verb("validate"), CliVerb::Validate);
        assert_eq!(parse_cli_verb("-h"), CliVerb::Help);
        assert_eq!(parse_cli_verb("start"), CliVerb::Unknown);
    }

    #[test]
    fn help_lists_every_top_level_command() {
        let help = help_text();
        for verb in ["setup", "validate", "config", "admin", "help"] {
            assert!(help.contains(&format!("  {verb}")), "missing {verb}");
        }
    }
}
