use crate::config::{Settings, SubmitFormat, DEFAULT_DNS_SEED};
use crate::setup::fields::{
    FieldAction, FieldKey, FieldKind, FieldValue, StepFields, StepStores, DEFAULT_ADMIN_ADDRESS,
    DEFAULT_ADMIN_PORT, DEFAULT_BAN_DURATION_INDEX, DEFAULT_MAX_FAILED_REQUESTS_INDEX,
};
use crate::setup::gate::{gate_step, GateOutcome};
use crate::setup::steps::{
    step_transition, Step, StepAction, StepNavError, StepState, StepTransition, ALL_STEPS,
    STEP_COUNT,
};
use crate::setup::validate::ValidationRules;
use crate::submit::{
    assemble_legacy_config, assemble_node_config, PayloadError, RequestError, RequestEvent,
    RequestState, RequestTracker, SubmissionPayload, SubmitError,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Navigation(#[from] StepNavError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("cannot assemble configuration: {0}")]
    Payload(#[from] PayloadError),
    #[error("configuration can only be submitted from the Administrative Interface step")]
    NotFinalStep,
    #[error("step {} has not been reached yet; continue with Next", .index + 1)]
    StepNotReached { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOptions {
    pub rules: ValidationRules,
    pub default_dns_seed: String,
    pub submit_format: SubmitFormat,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            rules: ValidationRules::default(),
            default_dns_seed: DEFAULT_DNS_SEED.to_string(),
            submit_format: SubmitFormat::Json,
        }
    }
}

impl SetupOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            rules: ValidationRules {
                seed_case: settings.seed_case,
            },
            default_dns_seed: settings.default_dns_seed.clone(),
            submit_format: settings.submit_format,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Moved { from: Step, to: Step },
    Blocked { invalid: Vec<FieldKey> },
    /// Already on the final step; the next action there is a submission.
    AtFinalStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStart {
    Ready(SubmissionPayload),
    Blocked { invalid: Vec<FieldKey> },
}

/// The whole wizard: step position, the four field stores and the request
/// lifecycle of the single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupState {
    pub steps: StepState,
    pub stores: StepStores,
    pub request: RequestTracker,
    pub options: SetupOptions,
}

impl SetupState {
    pub fn new(options: SetupOptions) -> Self {
        let mut state = Self {
            steps: StepState::first(),
            stores: StepStores::default(),
            request: RequestTracker::default(),
            options,
        };
        state.register_defaults();
        state
    }

    fn register_defaults(&mut self) {
        let rules = self.options.rules;
        let defaults = [
            (FieldKey::IsValidator, FieldValue::Flag(true)),
            (FieldKey::Seed, FieldValue::text("")),
            (FieldKey::Network, FieldValue::List(Vec::new())),
            (FieldKey::Dns, FieldValue::List(Vec::new())),
            (
                FieldKey::MaxFailedRequests,
                FieldValue::Choice(DEFAULT_MAX_FAILED_REQUESTS_INDEX),
            ),
            (
                FieldKey::BanDuration,
                FieldValue::Choice(DEFAULT_BAN_DURATION_INDEX),
            ),
            (FieldKey::AdminDisabled, FieldValue::Flag(false)),
            (FieldKey::AdminAddress, FieldValue::text(DEFAULT_ADMIN_ADDRESS)),
            (FieldKey::AdminPort, FieldValue::text(DEFAULT_ADMIN_PORT)),
        ];
        for (key, value) in defaults {
            self.stores
                .for_step_mut(key.step())
                .register_default(key, value, rules);
        }
    }

    pub fn current_step(&self) -> Step {
        self.steps.current()
    }

    pub fn fields(&self, step: Step) -> &StepFields {
        self.stores.for_step(step)
    }

    pub fn is_validator(&self) -> bool {
        self.stores
            .flag(Step::SecretSeed, FieldKey::IsValidator)
            .unwrap_or(true)
    }

    pub fn admin_disabled(&self) -> bool {
        self.stores
            .flag(Step::AdministrativeInterface, FieldKey::AdminDisabled)
            .unwrap_or(false)
    }

    /// Fields rendered for a step; dependent inputs hide behind their toggle.
    pub fn visible_fields(&self, step: Step) -> Vec<FieldKey> {
        match step {
            Step::SecretSeed if self.is_validator() => vec![FieldKey::IsValidator, FieldKey::Seed],
            Step::SecretSeed => vec![FieldKey::IsValidator],
            Step::NetworkOptions => vec![FieldKey::Network, FieldKey::Dns],
            Step::BanManagement => vec![FieldKey::MaxFailedRequests, FieldKey::BanDuration],
            Step::AdministrativeInterface if self.admin_disabled() => {
                vec![FieldKey::AdminDisabled]
            }
            Step::AdministrativeInterface => vec![
                FieldKey::AdminDisabled,
                FieldKey::AdminAddress,
                FieldKey::AdminPort,
            ],
        }
    }

    fn apply_field(&mut self, action: FieldAction) {
        let key = match &action {
            FieldAction::Change { key, .. } | FieldAction::SetValid { key, .. } => *key,
        };
        let rules = self.options.rules;
        self.stores.for_step_mut(key.step()).apply(action, rules);
    }

    /// User edit of a field, followed by the toggle side effects it implies.
    pub fn change_field(&mut self, key: FieldKey, value: FieldValue) {
        let toggled = value.as_flag();
        self.apply_field(FieldAction::Change {
            key,
            value,
            touched: true,
        });
        match (key, toggled) {
            (FieldKey::IsValidator, Some(false)) => self.apply_field(FieldAction::SetValid {
                key: FieldKey::Seed,
                valid: true,
                value: FieldValue::text(""),
            }),
            (FieldKey::IsValidator, Some(true)) => self.apply_field(FieldAction::Change {
                key: FieldKey::Seed,
                value: FieldValue::text(""),
                touched: true,
            }),
            (FieldKey::AdminDisabled, Some(true)) => {
                for key in [FieldKey::AdminAddress, FieldKey::AdminPort] {
                    self.apply_field(FieldAction::SetValid {
                        key,
                        valid: true,
                        value: FieldValue::text(""),
                    });
                }
            }
            (FieldKey::AdminDisabled, Some(false)) => {
                for (key, default) in [
                    (FieldKey::AdminAddress, DEFAULT_ADMIN_ADDRESS),
                    (FieldKey::AdminPort, DEFAULT_ADMIN_PORT),
                ] {
                    self.apply_field(FieldAction::Change {
                        key,
                        value: FieldValue::text(default),
                        touched: true,
                    });
                }
            }
            _ => {}
        }
    }

    /// Applies raw text from an input line, shaped by the field's kind.
    pub fn edit_field(&mut self, key: FieldKey, raw: &str) {
        let value = match key.kind() {
            FieldKind::List => FieldValue::List(parse_list_values(raw)),
            FieldKind::Text => FieldValue::text(raw.trim()),
            FieldKind::Flag => FieldValue::Flag(matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "true" | "yes" | "on" | "1"
            )),
            FieldKind::Choice { options } => {
                let index = raw.trim().parse::<usize>().unwrap_or(0);
                FieldValue::Choice(index.min(options.saturating_sub(1)))
            }
        };
        self.change_field(key, value);
    }

    pub fn toggle_flag(&mut self, key: FieldKey) {
        let current = self
            .fields(key.step())
            .value(key)
            .and_then(FieldValue::as_flag)
            .unwrap_or(false);
        self.change_field(key, FieldValue::Flag(!current));
    }

    pub fn cycle_choice(&mut self, key: FieldKey) {
        let FieldKind::Choice { options } = key.kind() else {
            return;
        };
        let current = self
            .fields(key.step())
            .value(key)
            .and_then(FieldValue::as_choice)
            .unwrap_or(0);
        self.change_field(key, FieldValue::Choice((current + 1) % options.max(1)));
    }

    /// Gates the current step, then moves forward when every entry is valid.
    pub fn next_step(&mut self) -> Result<AdvanceOutcome, SetupError> {
        let step = self.current_step();
        if step.is_last() {
            return Ok(AdvanceOutcome::AtFinalStep);
        }
        let rules = self.options.rules;
        if let GateOutcome::Blocked { invalid } = gate_step(self.stores.for_step_mut(step), rules)
        {
            return Ok(AdvanceOutcome::Blocked { invalid });
        }
        match step_transition(&mut self.steps, StepAction::ToNextStep)? {
            StepTransition::Moved { from, to } => Ok(AdvanceOutcome::Moved { from, to }),
            StepTransition::Unchanged => Ok(AdvanceOutcome::AtFinalStep),
        }
    }

    pub fn prev_step(&mut self) -> Result<StepTransition, SetupError> {
        Ok(step_transition(&mut self.steps, StepAction::ToPrevStep)?)
    }

    /// Jumps back to the current step or an earlier one. Forward moves go
    /// through [`SetupState::next_step`] so every skipped step is gated.
    pub fn jump_to(&mut self, index: usize) -> Result<StepTransition, SetupError> {
        if index < STEP_COUNT && index > self.steps.current_index {
            return Err(SetupError::StepNotReached { index });
        }
        Ok(step_transition(&mut self.steps, StepAction::ToStep(index))?)
    }

    fn assemble(&self) -> Result<SubmissionPayload, SetupError> {
        let payload = match self.options.submit_format {
            SubmitFormat::Json => SubmissionPayload::Json(assemble_node_config(
                &self.stores,
                &self.options.default_dns_seed,
            )?),
            SubmitFormat::Yaml => SubmissionPayload::Yaml(assemble_legacy_config(&self.stores)?),
        };
        Ok(payload)
    }

    /// Re-gates every step store, assembles the payload and moves the
    /// request tracker into flight.
    pub fn begin_submit(&mut self) -> Result<SubmitStart, SetupError> {
        if self.request.in_flight() {
            return Err(RequestError::InFlight.into());
        }
        if !self.current_step().is_last() {
            return Err(SetupError::NotFinalStep);
        }
        let rules = self.options.rules;
        let mut invalid = Vec::new();
        for step in ALL_STEPS {
            if let GateOutcome::Blocked { invalid: keys } =
                gate_step(self.stores.for_step_mut(step), rules)
            {
                invalid.extend(keys);
            }
        }
        if !invalid.is_empty() {
            return Ok(SubmitStart::Blocked { invalid });
        }
        let payload = self.assemble()?;
        self.request.apply(RequestEvent::Submit)?;
        Ok(SubmitStart::Ready(payload))
    }

    pub fn retry_submit(&mut self) -> Result<SubmissionPayload, SetupError> {
        let payload = self.assemble()?;
        self.request.apply(RequestEvent::Retry)?;
        Ok(payload)
    }

    pub fn finish_submit(
        &mut self,
        result: Result<(), SubmitError>,
    ) -> Result<&RequestState, SetupError> {
        let event = match result {
            Ok(()) => RequestEvent::Succeeded,
            Err(err) => RequestEvent::Failed(err.to_string()),
        };
        Ok(self.request.apply(event)?)
    }

    /// Closes the result dialog: continue after success, cancel after error.
    pub fn dismiss_dialog(&mut self) -> Result<&RequestState, SetupError> {
        let event = match self.request.state() {
            RequestState::Success => RequestEvent::Continue,
            _ => RequestEvent::Cancel,
        };
        Ok(self.request.apply(event)?)
    }
}

pub fn parse_list_values(raw: &str) -> Vec<String> {
    raw.split(|ch: char| ch == ',' || ch.is_whitespace())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
