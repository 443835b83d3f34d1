use crate::app::command_support::{load_settings, validation_rules};
use crate::setup::fields::{check_field, FieldKey, FieldValue};
use crate::setup::state::parse_list_values;
use crate::setup::validate::ValidationRules;

const USAGE: &str = "usage: validate <dns|network|seed|address|port> <value>";

pub fn parse_validate_field(raw: &str) -> Option<FieldKey> {
    match raw {
        "dns" => Some(FieldKey::Dns),
        "network" => Some(FieldKey::Network),
        "seed" => Some(FieldKey::Seed),
        "address" => Some(FieldKey::AdminAddress),
        "port" => Some(FieldKey::AdminPort),
        _ => None,
    }
}

/// Runs one field check; list fields accept several comma separated values.
pub fn validate_value(key: FieldKey, raw: &str, rules: ValidationRules) -> Result<String, String> {
    let value = match key {
        FieldKey::Dns | FieldKey::Network => FieldValue::List(parse_list_values(raw)),
        _ => FieldValue::text(raw.trim()),
    };
    let check = check_field(key, &value, rules);
    if check.is_valid {
        Ok(format!("field={key}\nvalid=true"))
    } else {
        Err(format!(
            "field={key}\nvalid=false\nmessage={}",
            check.valid_string
        ))
    }
}

pub fn cmd_validate(args: &[String]) -> Result<String, String> {
    let [field, value] = args else {
        return Err(USAGE.to_string());
    };
    let key = parse_validate_field(field).ok_or_else(|| USAGE.to_string())?;
    let settings = load_settings()?;
    validate_value(key, value, validation_rules(&settings))
}
