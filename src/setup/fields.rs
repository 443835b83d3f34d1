use crate::setup::steps::Step;
use crate::setup::validate::{
    parse_port, validate_admin_address, validate_dns, validate_network, validate_secret_seed,
    ValidationRules, SEED_LENGTH,
};
use std::collections::BTreeMap;

pub const SEED_EMPTY_TEXT: &str = "Please input your Secret Seed";
pub const SEED_SHORT_TEXT: &str = "The Secret Seed provided is too short";
pub const TOOLTIP_INVALID_TEXT: &str =
    "Invalid input value, please see the tooltip for requirements";
pub const ADDRESS_INVALID_TEXT: &str =
    "Please enter a valid value: (userinfo@  IP address \":\" port )";
pub const EMPTY_VALUE_TEXT: &str = "Please fill in a valid value";
pub const PORT_INVALID_TEXT: &str = "Please enter a valid value: 1-65535";

pub const DEFAULT_ADMIN_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_ADMIN_PORT: &str = "2827";

pub const MAX_FAILED_REQUEST_OPTIONS: [u32; 9] = [5, 10, 15, 20, 25, 50, 60, 70, 100];
pub const DEFAULT_MAX_FAILED_REQUESTS_INDEX: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanDuration {
    pub label: &'static str,
    pub seconds: u64,
}

pub const BAN_DURATION_OPTIONS: [BanDuration; 14] = [
    BanDuration { label: "30 minutes", seconds: 1_800 },
    BanDuration { label: "1 hour", seconds: 3_600 },
    BanDuration { label: "3 hours", seconds: 10_800 },
    BanDuration { label: "6 hours", seconds: 21_600 },
    BanDuration { label: "12 hours", seconds: 43_200 },
    BanDuration { label: "1 day", seconds: 86_400 },
    BanDuration { label: "3 days", seconds: 259_200 },
    BanDuration { label: "7 days", seconds: 604_800 },
    BanDuration { label: "14 days", seconds: 1_209_600 },
    BanDuration { label: "1 month", seconds: 2_592_000 },
    BanDuration { label: "3 months", seconds: 7_862_400 },
    BanDuration { label: "6 months", seconds: 15_811_200 },
    BanDuration { label: "9 months", seconds: 23_673_600 },
    BanDuration { label: "1 year", seconds: 31_536_000 },
];
pub const DEFAULT_BAN_DURATION_INDEX: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    IsValidator,
    Seed,
    Network,
    Dns,
    MaxFailedRequests,
    BanDuration,
    /// Stored inverted: `true` means the administrative interface is off.
    AdminDisabled,
    AdminAddress,
    AdminPort,
}

impl FieldKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IsValidator => "is_validator",
            Self::Seed => "seed",
            Self::Network => "network",
            Self::Dns => "dns",
            Self::MaxFailedRequests => "max_failed_requests",
            Self::BanDuration => "ban_duration",
            Self::AdminDisabled => "disabled",
            Self::AdminAddress => "address",
            Self::AdminPort => "port",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::IsValidator => "Node Type",
            Self::Seed => "Secret Seed",
            Self::Network => "Network Addresses",
            Self::Dns => "DNS Seeds",
            Self::MaxFailedRequests => "Max Failed Requests",
            Self::BanDuration => "Ban Duration",
            Self::AdminDisabled => "Interface",
            Self::AdminAddress => "Address",
            Self::AdminPort => "Port",
        }
    }

    /// The step whose store owns this field.
    pub fn step(self) -> Step {
        match self {
            Self::IsValidator | Self::Seed => Step::SecretSeed,
            Self::Network | Self::Dns => Step::NetworkOptions,
            Self::MaxFailedRequests | Self::BanDuration => Step::BanManagement,
            Self::AdminDisabled | Self::AdminAddress | Self::AdminPort => {
                Step::AdministrativeInterface
            }
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::IsValidator | Self::AdminDisabled => FieldKind::Flag,
            Self::Seed | Self::AdminAddress | Self::AdminPort => FieldKind::Text,
            Self::Network | Self::Dns => FieldKind::List,
            Self::MaxFailedRequests => FieldKind::Choice {
                options: MAX_FAILED_REQUEST_OPTIONS.len(),
            },
            Self::BanDuration => FieldKind::Choice {
                options: BAN_DURATION_OPTIONS.len(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Flag,
    Text,
    List,
    Choice { options: usize },
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
    /// Index into a fixed option table.
    Choice(usize),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<usize> {
        match self {
            Self::Choice(index) => Some(*index),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::List(values) if values.is_empty() => "<none>".to_string(),
            Self::List(values) => values.join(","),
            Self::Flag(value) => value.to_string(),
            Self::Choice(index) => index.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub value: FieldValue,
    pub is_touched: bool,
    pub is_valid: bool,
    pub valid_string: String,
}

impl FieldEntry {
    /// Helper text is only surfaced once the user has interacted with the field.
    pub fn visible_error(&self) -> Option<&str> {
        if self.is_touched && !self.is_valid && !self.valid_string.is_empty() {
            Some(&self.valid_string)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub is_valid: bool,
    pub valid_string: String,
}

impl FieldCheck {
    fn valid() -> Self {
        Self {
            is_valid: true,
            valid_string: String::new(),
        }
    }

    fn invalid(text: &str) -> Self {
        Self {
            is_valid: false,
            valid_string: text.to_string(),
        }
    }
}

pub fn check_field(key: FieldKey, value: &FieldValue, rules: ValidationRules) -> FieldCheck {
    match (key, value) {
        (FieldKey::Seed, FieldValue::Text(seed)) => {
            if seed.is_empty() {
                FieldCheck::invalid(SEED_EMPTY_TEXT)
            } else if seed.chars().count() < SEED_LENGTH {
                FieldCheck::invalid(SEED_SHORT_TEXT)
            } else if !validate_secret_seed(seed, rules.seed_case) {
                FieldCheck::invalid(TOOLTIP_INVALID_TEXT)
            } else {
                FieldCheck::valid()
            }
        }
        (FieldKey::Network, FieldValue::List(items)) => {
            if items.iter().all(|item| validate_network(item)) {
                FieldCheck::valid()
            } else {
                FieldCheck::invalid(ADDRESS_INVALID_TEXT)
            }
        }
        (FieldKey::Dns, FieldValue::List(items)) => {
            if items.iter().all(|item| validate_dns(item)) {
                FieldCheck::valid()
            } else {
                FieldCheck::invalid(TOOLTIP_INVALID_TEXT)
            }
        }
        (FieldKey::AdminAddress, FieldValue::Text(address)) => {
            if address.is_empty() {
                FieldCheck::invalid(EMPTY_VALUE_TEXT)
            } else if !validate_admin_address(address) {
                FieldCheck::invalid(ADDRESS_INVALID_TEXT)
            } else {
                FieldCheck::valid()
            }
        }
        (FieldKey::AdminPort, FieldValue::Text(port)) => {
            if port.is_empty() {
                FieldCheck::invalid(EMPTY_VALUE_TEXT)
            } else if parse_port(port).is_none() {
                FieldCheck::invalid(PORT_INVALID_TEXT)
            } else {
                FieldCheck::valid()
            }
        }
        (FieldKey::Seed | FieldKey::AdminAddress | FieldKey::AdminPort, _) => {
            FieldCheck::invalid(TOOLTIP_INVALID_TEXT)
        }
        (FieldKey::Network, _) => FieldCheck::invalid(ADDRESS_INVALID_TEXT),
        (FieldKey::Dns, _) => FieldCheck::invalid(TOOLTIP_INVALID_TEXT),
        _ => FieldCheck::valid(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAction {
    Change {
        key: FieldKey,
        value: FieldValue,
        touched: bool,
    },
    SetValid {
        key: FieldKey,
        valid: bool,
        value: FieldValue,
    },
}

/// One store per wizard step, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepFields {
    entries: BTreeMap<FieldKey, FieldEntry>,
}

impl StepFields {
    pub fn get(&self, key: FieldKey) -> Option<&FieldEntry> {
        self.entries.get(&key)
    }

    pub fn value(&self, key: FieldKey) -> Option<&FieldValue> {
        self.entries.get(&key).map(|entry| &entry.value)
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &FieldEntry)> {
        self.entries.iter().map(|(key, entry)| (*key, entry))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn apply(&mut self, action: FieldAction, rules: ValidationRules) {
        match action {
            FieldAction::Change {
                key,
                value,
                touched,
            } => {
                let check = check_field(key, &value, rules);
                self.entries.insert(
                    key,
                    FieldEntry {
                        value,
                        is_touched: touched,
                        is_valid: check.is_valid,
                        valid_string: check.valid_string,
                    },
                );
            }
            FieldAction::SetValid { key, valid, value } => {
                let is_touched = self
                    .entries
                    .get(&key)
                    .map(|entry| entry.is_touched)
                    .unwrap_or(true);
                self.entries.insert(
                    key,
                    FieldEntry {
                        value,
                        is_touched,
                        is_valid: valid,
                        valid_string: String::new(),
                    },
                );
            }
        }
    }

    /// Registers a default the way a freshly rendered input does: only when
    /// the field has no entry yet, and untouched.
    pub fn register_default(&mut self, key: FieldKey, value: FieldValue, rules: ValidationRules) {
        if self.contains(key) {
            return;
        }
        self.apply(
            FieldAction::Change {
                key,
                value,
                touched: false,
            },
            rules,
        );
    }
}

/// The four per-step stores, in step order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepStores {
    pub secret_seed: StepFields,
    pub network_options: StepFields,
    pub ban_management: StepFields,
    pub administrative_interface: StepFields,
}

impl StepStores {
    pub fn for_step(&self, step: Step) -> &StepFields {
        match step {
            Step::SecretSeed => &self.secret_seed,
            Step::NetworkOptions => &self.network_options,
            Step::BanManagement => &self.ban_management,
            Step::AdministrativeInterface => &self.administrative_interface,
        }
    }

    pub fn for_step_mut(&mut self, step: Step) -> &mut StepFields {
        match step {
            Step::SecretSeed => &mut self.secret_seed,
            Step::NetworkOptions => &mut self.network_options,
            Step::BanManagement => &mut self.ban_management,
            Step::AdministrativeInterface => &mut self.administrative_interface,
        }
    }

    pub fn flag(&self, step: Step, key: FieldKey) -> Option<bool> {
        self.for_step(step).value(key).and_then(FieldValue::as_flag)
    }

    pub fn text(&self, step: Step, key: FieldKey) -> Option<&str> {
        self.for_step(step).value(key).and_then(FieldValue::as_text)
    }

    pub fn list(&self, step: Step, key: FieldKey) -> &[String] {
        self.for_step(step)
            .value(key)
            .and_then(FieldValue::as_list)
            .unwrap_or(&[])
    }

    pub fn choice(&self, step: Step, key: FieldKey) -> Option<usize> {
        self.for_step(step).value(key).and_then(FieldValue::as_choice)
    }
}

pub fn ban_duration_seconds(index: usize) -> u64 {
    BAN_DURATION_OPTIONS
        .get(index)
        .unwrap_or(&BAN_DURATION_OPTIONS[DEFAULT_BAN_DURATION_INDEX])
        .seconds
}

pub fn max_failed_requests(index: usize) -> u32 {
    MAX_FAILED_REQUEST_OPTIONS
        .get(index)
        .copied()
        .unwrap_or(MAX_FAILED_REQUEST_OPTIONS[DEFAULT_MAX_FAILED_REQUESTS_INDEX])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::validate::SeedCaseRule;

    fn rules() -> ValidationRules {
        ValidationRules::default()
    }

    fn valid_seed() -> String {
        format!("S{}", "b".repeat(SEED_LENGTH - 1))
    }

    #[test]
    fn seed_check_reports_empty_short_and_invalid_text() {
        let empty = check_field(FieldKey::Seed, &FieldValue::text(""), rules());
        assert_eq!(empty.valid_string, SEED_EMPTY_TEXT);
        let short = check_field(FieldKey::Seed, &FieldValue::text("Sabc"), rules());
        assert_eq!(short.valid_string, SEED_SHORT_TEXT);
        let wrong_prefix = format!("X{}", "a".repeat(SEED_LENGTH - 1));
        let invalid = check_field(FieldKey::Seed, &FieldValue::Text(wrong_prefix), rules());
        assert!(!invalid.is_valid);
        assert_eq!(invalid.valid_string, TOOLTIP_INVALID_TEXT);
        let ok = check_field(FieldKey::Seed, &FieldValue::Text(valid_seed()), rules());
        assert!(ok.is_valid);
        assert!(ok.valid_string.is_empty());
    }

    #[test]
    fn seed_case_rule_flows_through_check_field() {
        let upper = format!("S{}", "B".repeat(SEED_LENGTH - 1));
        let strict = check_field(FieldKey::Seed, &FieldValue::Text(upper.clone()), rules());
        assert!(!strict.is_valid);
        let relaxed = check_field(
            FieldKey::Seed,
            &FieldValue::Text(upper),
            ValidationRules {
                seed_case: SeedCaseRule::Insensitive,
            },
        );
        assert!(relaxed.is_valid);
    }

    #[test]
    fn list_checks_fail_when_any_item_is_invalid() {
        let dns = FieldValue::List(vec!["seed.bosagora.io".to_string(), "bad host".to_string()]);
        let check = check_field(FieldKey::Dns, &dns, rules());
        assert!(!check.is_valid);
        assert_eq!(check.valid_string, TOOLTIP_INVALID_TEXT);
        let network = FieldValue::List(Vec::new());
        assert!(check_field(FieldKey::Network, &network, rules()).is_valid);
    }

    #[test]
    fn port_check_enforces_range() {
        for (raw, ok) in [("2826", true), ("70000", false), ("abc", false), ("0", false)] {
            let check = check_field(FieldKey::AdminPort, &FieldValue::text(raw), rules());
            assert_eq!(check.is_valid, ok, "port {raw}");
        }
        let empty = check_field(FieldKey::AdminPort, &FieldValue::text(""), rules());
        assert_eq!(empty.valid_string, EMPTY_VALUE_TEXT);
    }

    #[test]
    fn unvalidated_fields_default_to_valid() {
        let check = check_field(FieldKey::BanDuration, &FieldValue::Choice(3), rules());
        assert!(check.is_valid);
        assert!(check.valid_string.is_empty());
    }

    #[test]
    fn set_valid_keeps_touch_state_and_clears_text() {
        let mut fields = StepFields::default();
        fields.apply(
            FieldAction::Change {
                key: FieldKey::Seed,
                value: FieldValue::text("S"),
                touched: false,
            },
            rules(),
        );
        fields.apply(
            FieldAction::SetValid {
                key: FieldKey::Seed,
                valid: true,
                value: FieldValue::text(""),
            },
            rules(),
        );
        let entry = fields.get(FieldKey::Seed).expect("seed entry");
        assert!(entry.is_valid);
        assert!(!entry.is_touched);
        assert!(entry.valid_string.is_empty());

        fields.apply(
            FieldAction::SetValid {
                key: FieldKey::AdminPort,
                valid: true,
                value: FieldValue::text(""),
            },
            rules(),
        );
        assert!(fields.get(FieldKey::AdminPort).expect("port").is_touched);
    }

    #[test]
    fn register_default_does_not_overwrite_existing_entries() {
        let mut fields = StepFields::default();
        fields.apply(
            FieldAction::Change {
                key: FieldKey::AdminPort,
                value: FieldValue::text("9000"),
                touched: true,
            },
            rules(),
        );
        fields.register_default(
            FieldKey::AdminPort,
            FieldValue::text(DEFAULT_ADMIN_PORT),
            rules(),
        );
        assert_eq!(
            fields.value(FieldKey::AdminPort),
            Some(&FieldValue::text("9000"))
        );
    }

    #[test]
    fn visible_error_requires_touch() {
        let mut fields = StepFields::default();
        fields.register_default(FieldKey::Seed, FieldValue::text(""), rules());
        let entry = fields.get(FieldKey::Seed).expect("seed");
        assert!(!entry.is_valid);
        assert_eq!(entry.visible_error(), None);
    }

    #[test]
    fn option_tables_fall_back_to_defaults_for_out_of_range_indices() {
        assert_eq!(max_failed_requests(0), 5);
        assert_eq!(max_failed_requests(99), 10);
        assert_eq!(ban_duration_seconds(5), 86_400);
        assert_eq!(ban_duration_seconds(99), 3_600);
    }
}
