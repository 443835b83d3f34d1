use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const HOST_PATTERN: &str = r"^(http://www\.|https://www\.|http://|https://)?[a-z0-9]+([\-\.]{1}[a-z0-9]+)*\.[a-z0-9]{2,100}(:[0-9]{1,5})?(/.*)?$";
const SEED_PATTERN: &str = r"^S[0-9a-z]{55}$";
const SEED_PATTERN_INSENSITIVE: &str = r"(?i)^S[0-9a-z]{55}$";
// `:-@` is a character range (`:;<=>?@`), not three literals.
const ADDRESS_PATTERN: &str = r"^[A-Za-z0-9.:-@]+$";
const PORT_PATTERN: &str = r"^[0-9]+$";

pub const SEED_LENGTH: usize = 56;
pub const MIN_PORT: u32 = 1;
pub const MAX_PORT: u32 = 65535;

/// Whether the secret seed body must be lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedCaseRule {
    #[default]
    Strict,
    Insensitive,
}

impl SeedCaseRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Insensitive => "insensitive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationRules {
    pub seed_case: SeedCaseRule,
}

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    // Patterns are compile-time constants covered by the tests below.
    cell.get_or_init(|| Regex::new(pattern).unwrap_or_else(|err| panic!("{pattern}: {err}")))
}

fn host_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compiled(&CELL, HOST_PATTERN)
}

pub fn validate_dns(value: &str) -> bool {
    host_regex().is_match(value)
}

pub fn validate_network(value: &str) -> bool {
    host_regex().is_match(value)
}

pub fn validate_secret_seed(value: &str, rule: SeedCaseRule) -> bool {
    static STRICT: OnceLock<Regex> = OnceLock::new();
    static INSENSITIVE: OnceLock<Regex> = OnceLock::new();
    match rule {
        SeedCaseRule::Strict => compiled(&STRICT, SEED_PATTERN).is_match(value),
        SeedCaseRule::Insensitive => {
            compiled(&INSENSITIVE, SEED_PATTERN_INSENSITIVE).is_match(value)
        }
    }
}

pub fn validate_admin_address(value: &str) -> bool {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compiled(&CELL, ADDRESS_PATTERN).is_match(value)
}

/// Digits only. Range checks belong to [`parse_port`].
pub fn validate_port(value: &str) -> bool {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compiled(&CELL, PORT_PATTERN).is_match(value)
}

pub fn parse_port(value: &str) -> Option<u16> {
    if !validate_port(value) {
        return None;
    }
    let port = value.parse::<u32>().ok()?;
    if (MIN_PORT..=MAX_PORT).contains(&port) {
        u16::try_from(port).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_body(ch: char) -> String {
        std::iter::repeat(ch).take(SEED_LENGTH - 1).collect()
    }

    #[test]
    fn host_validator_accepts_hostnames_with_scheme_port_and_path() {
        assert!(validate_dns("seed.bosagora.io"));
        assert!(validate_dns("https://www.seed.bosagora.io"));
        assert!(validate_network("http://node-2.bosagora.io:2826/api"));
        assert!(!validate_network("localhost"));
        assert!(!validate_dns("Seed.Bosagora.io"));
        assert!(!validate_network("ftp://node.bosagora.io"));
        assert!(!validate_network("node.bosagora.io:123456"));
    }

    #[test]
    fn strict_seed_requires_lowercase_body() {
        let good = format!("S{}", seed_body('a'));
        assert!(validate_secret_seed(&good, SeedCaseRule::Strict));
        assert!(!validate_secret_seed(
            &format!("S{}", seed_body('A')),
            SeedCaseRule::Strict
        ));
        assert!(!validate_secret_seed(
            &format!("X{}", seed_body('a')),
            SeedCaseRule::Strict
        ));
        assert!(!validate_secret_seed(&good[..SEED_LENGTH - 1], SeedCaseRule::Strict));
        assert!(!validate_secret_seed(&format!("{good}a"), SeedCaseRule::Strict));
    }

    #[test]
    fn insensitive_seed_accepts_uppercase_body_and_prefix() {
        assert!(validate_secret_seed(
            &format!("S{}", seed_body('Q')),
            SeedCaseRule::Insensitive
        ));
        assert!(validate_secret_seed(
            &format!("s{}", seed_body('7')),
            SeedCaseRule::Insensitive
        ));
        assert!(!validate_secret_seed(
            &format!("S{}", seed_body('-')),
            SeedCaseRule::Insensitive
        ));
    }

    #[test]
    fn admin_address_allows_userinfo_and_port_characters() {
        assert!(validate_admin_address("127.0.0.1"));
        assert!(validate_admin_address("admin@10.0.0.1:2827"));
        assert!(!validate_admin_address(""));
        assert!(!validate_admin_address("10.0.0.1/admin"));
        assert!(!validate_admin_address("has space"));
        assert!(!validate_admin_address("node-1.local"));
    }

    #[test]
    fn port_validator_is_digits_only_and_parse_enforces_range() {
        assert!(validate_port("2826"));
        assert!(validate_port("70000"));
        assert!(!validate_port("abc"));
        assert!(!validate_port(""));
        assert_eq!(parse_port("2826"), Some(2826));
        assert_eq!(parse_port("65535"), Some(65535));
        assert_eq!(parse_port("70000"), None);
        assert_eq!(parse_port("0"), None);
        assert_eq!(parse_port("abc"), None);
    }
}
