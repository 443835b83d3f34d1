use crate::setup::fields::{FieldKey, FieldKind, FieldValue};
use crate::setup::gate::blocked_feedback;
use crate::setup::state::{AdvanceOutcome, SetupError, SetupState, SubmitStart};
use crate::setup::steps::{StepTransition, STEP_COUNT};
use crate::submit::{RequestState, SubmissionPayload};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub const SCRIPT_KEYS_ENV: &str = "TALOS_SETUP_SCRIPT_KEYS";

const BROWSE_HINT_TEXT: &str =
    "Up/Down field | Enter edit/toggle | Left/Right step | 1-4 jump | s submit | Esc quit";
const EDIT_HINT_TEXT: &str = "Type value | Enter apply | Esc discard";
const DIALOG_HINT_TEXT: &str = "Enter retry/continue | Esc cancel";
const INITIAL_STATUS_TEXT: &str = "Configure your node, one step at a time.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMode {
    Browse,
    Editing,
    Dialog,
}

impl NavMode {
    fn as_str(self) -> &'static str {
        match self {
            NavMode::Browse => "browse",
            NavMode::Editing => "editing",
            NavMode::Dialog => "dialog",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupAction {
    MovePrev,
    MoveNext,
    Activate,
    NextStep,
    PrevStep,
    JumpTo(usize),
    Submit,
    Cancel,
    Input(char),
    Erase,
    CommitEdit,
    AbortEdit,
    DialogConfirm,
    DialogDismiss,
}

impl SetupAction {
    fn as_str(self) -> &'static str {
        match self {
            SetupAction::MovePrev => "move_prev",
            SetupAction::MoveNext => "move_next",
            SetupAction::Activate => "activate",
            SetupAction::NextStep => "next_step",
            SetupAction::PrevStep => "prev_step",
            SetupAction::JumpTo(_) => "jump_to",
            SetupAction::Submit => "submit",
            SetupAction::Cancel => "cancel",
            SetupAction::Input(_) => "input",
            SetupAction::Erase => "erase",
            SetupAction::CommitEdit => "commit_edit",
            SetupAction::AbortEdit => "abort_edit",
            SetupAction::DialogConfirm => "dialog_confirm",
            SetupAction::DialogDismiss => "dialog_dismiss",
        }
    }
}

/// Cursor and line-editor state layered over the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    pub selected: usize,
    pub editing: Option<String>,
    pub status_text: String,
    pub hint_text: String,
}

impl NavState {
    pub fn start() -> Self {
        Self {
            selected: 0,
            editing: None,
            status_text: INITIAL_STATUS_TEXT.to_string(),
            hint_text: BROWSE_HINT_TEXT.to_string(),
        }
    }

    pub fn mode(&self, state: &SetupState) -> NavMode {
        if state.request.dialog_open() {
            NavMode::Dialog
        } else if self.editing.is_some() {
            NavMode::Editing
        } else {
            NavMode::Browse
        }
    }

    pub fn clamp_selection(&mut self, len: usize) {
        self.selected = clamp_selection(self.selected, len);
    }

    fn refresh_hint(&mut self, mode: NavMode) {
        self.hint_text = match mode {
            NavMode::Browse => BROWSE_HINT_TEXT,
            NavMode::Editing => EDIT_HINT_TEXT,
            NavMode::Dialog => DIALOG_HINT_TEXT,
        }
        .to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupNavEffect {
    None,
    Submit(SubmissionPayload),
    Finish,
    CancelSetup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupTransition {
    pub effect: SetupNavEffect,
    pub feedback: Option<String>,
}

impl SetupTransition {
    fn no_op(feedback: Option<String>) -> Self {
        Self {
            effect: SetupNavEffect::None,
            feedback,
        }
    }

    fn with_effect(effect: SetupNavEffect, feedback: Option<String>) -> Self {
        Self { effect, feedback }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupNavError {
    #[error("invalid setup transition: mode={} action={}", .mode.as_str(), .action.as_str())]
    InvalidTransition { mode: NavMode, action: SetupAction },
    #[error(transparent)]
    Wizard(#[from] SetupError),
}

pub fn clamp_selection(selected: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    selected.min(len - 1)
}

pub fn setup_action_from_key(mode: NavMode, key: KeyEvent) -> Option<SetupAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(SetupAction::Cancel);
    }
    match mode {
        NavMode::Editing => match key.code {
            KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') => {
                Some(SetupAction::CommitEdit)
            }
            KeyCode::Esc => Some(SetupAction::AbortEdit),
            KeyCode::Backspace => Some(SetupAction::Erase),
            KeyCode::Char(ch) => Some(SetupAction::Input(ch)),
            _ => None,
        },
        NavMode::Dialog => match key.code {
            KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') | KeyCode::Char('r') => {
                Some(SetupAction::DialogConfirm)
            }
            KeyCode::Esc => Some(SetupAction::DialogDismiss),
            _ => None,
        },
        NavMode::Browse => match key.code {
            KeyCode::Up => Some(SetupAction::MovePrev),
            KeyCode::Down => Some(SetupAction::MoveNext),
            KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') => {
                Some(SetupAction::Activate)
            }
            KeyCode::Right | KeyCode::Tab => Some(SetupAction::NextStep),
            KeyCode::Left | KeyCode::BackTab => Some(SetupAction::PrevStep),
            KeyCode::Char('s') => Some(SetupAction::Submit),
            KeyCode::Esc => Some(SetupAction::Cancel),
            KeyCode::Char(ch) => ch
                .to_digit(10)
                .filter(|digit| *digit > 0)
                .map(|digit| SetupAction::JumpTo(digit as usize - 1)),
            _ => None,
        },
    }
}

/// Parses a comma-separated key script. `text:<chars>` types each char.
pub fn parse_scripted_setup_keys(raw: &str) -> Result<Vec<KeyEvent>, String> {
    let mut keys = Vec::new();
    for token in raw.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(text) = trimmed.strip_prefix("text:") {
            keys.extend(
                text.chars()
                    .map(|ch| KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE)),
            );
            continue;
        }
        let normalized = trimmed.to_ascii_lowercase();
        let code = match normalized.as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "tab" => KeyCode::Tab,
            "enter" => KeyCode::Enter,
            "esc" => KeyCode::Esc,
            "backspace" => KeyCode::Backspace,
            "ctrl-c" => {
                keys.push(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
                continue;
            }
            single if single.chars().count() == 1 => match single.chars().next() {
                Some(ch) => KeyCode::Char(ch),
                None => continue,
            },
            other => {
                return Err(format!(
                    "invalid {SCRIPT_KEYS_ENV} token `{other}`; valid tokens: up,down,left,right,tab,enter,esc,backspace,ctrl-c,<single char>,text:<chars>"
                ));
            }
        };
        keys.push(KeyEvent::new(code, KeyModifiers::NONE));
    }
    Ok(keys)
}

fn selected_field(state: &SetupState, nav: &NavState) -> Option<FieldKey> {
    state
        .visible_fields(state.current_step())
        .get(nav.selected)
        .copied()
}

fn edit_buffer(state: &SetupState, key: FieldKey) -> String {
    match state.fields(key.step()).value(key) {
        Some(FieldValue::Text(value)) => value.clone(),
        Some(FieldValue::List(values)) => values.join(","),
        _ => String::new(),
    }
}

fn field_feedback(state: &SetupState, key: FieldKey) -> String {
    match state
        .fields(key.step())
        .get(key)
        .and_then(|entry| entry.visible_error())
    {
        Some(error) => format!("{}: {error}", key.label()),
        None => format!("{} updated.", key.label()),
    }
}

fn begin_submit(state: &mut SetupState) -> Result<SetupTransition, SetupNavError> {
    match state.begin_submit()? {
        SubmitStart::Ready(payload) => Ok(SetupTransition::with_effect(
            SetupNavEffect::Submit(payload),
            Some("Submitting configuration...".to_string()),
        )),
        SubmitStart::Blocked { invalid } => {
            Ok(SetupTransition::no_op(Some(blocked_feedback(&invalid))))
        }
    }
}

fn browse_transition(
    state: &mut SetupState,
    nav: &mut NavState,
    action: SetupAction,
) -> Result<SetupTransition, SetupNavError> {
    let field_count = state.visible_fields(state.current_step()).len();
    match action {
        SetupAction::MovePrev => {
            nav.selected = nav.selected.saturating_sub(1);
            Ok(SetupTransition::no_op(None))
        }
        SetupAction::MoveNext => {
            nav.selected = clamp_selection(nav.selected + 1, field_count);
            Ok(SetupTransition::no_op(None))
        }
        SetupAction::Activate => {
            let Some(key) = selected_field(state, nav) else {
                return Ok(SetupTransition::no_op(None));
            };
            match key.kind() {
                FieldKind::Flag => {
                    state.toggle_flag(key);
                    Ok(SetupTransition::no_op(Some(field_feedback(state, key))))
                }
                FieldKind::Choice { .. } => {
                    state.cycle_choice(key);
                    Ok(SetupTransition::no_op(Some(field_feedback(state, key))))
                }
                FieldKind::Text | FieldKind::List => {
                    nav.editing = Some(edit_buffer(state, key));
                    Ok(SetupTransition::no_op(Some(format!(
                        "Editing {}.",
                        key.label()
                    ))))
                }
            }
        }
        SetupAction::NextStep => match state.next_step()? {
            AdvanceOutcome::Moved { to, .. } => {
                nav.selected = 0;
                Ok(SetupTransition::no_op(Some(format!("Step: {}", to.title()))))
            }
            AdvanceOutcome::Blocked { invalid } => {
                Ok(SetupTransition::no_op(Some(blocked_feedback(&invalid))))
            }
            AdvanceOutcome::AtFinalStep => begin_submit(state),
        },
        SetupAction::PrevStep => match state.prev_step()? {
            StepTransition::Moved { to, .. } => {
                nav.selected = 0;
                Ok(SetupTransition::no_op(Some(format!("Step: {}", to.title()))))
            }
            StepTransition::Unchanged => Ok(SetupTransition::no_op(Some(
                "Already on the first step.".to_string(),
            ))),
        },
        SetupAction::JumpTo(index) => match state.jump_to(index) {
            Ok(_) => {
                nav.selected = 0;
                Ok(SetupTransition::no_op(Some(format!(
                    "Step: {}",
                    state.current_step().title()
                ))))
            }
            Err(err @ SetupError::Navigation(_)) => Ok(SetupTransition::no_op(Some(format!(
                "{err}; choose 1-{STEP_COUNT}"
            )))),
            Err(err) => Ok(SetupTransition::no_op(Some(err.to_string()))),
        },
        SetupAction::Submit => {
            if !state.current_step().is_last() {
                return Ok(SetupTransition::no_op(Some(
                    SetupError::NotFinalStep.to_string(),
                )));
            }
            begin_submit(state)
        }
        SetupAction::Cancel => Ok(SetupTransition::with_effect(
            SetupNavEffect::CancelSetup,
            None,
        )),
        SetupAction::Input(_)
        | SetupAction::Erase
        | SetupAction::CommitEdit
        | SetupAction::AbortEdit
        | SetupAction::DialogConfirm
        | SetupAction::DialogDismiss => Err(SetupNavError::InvalidTransition {
            mode: NavMode::Browse,
            action,
        }),
    }
}

fn editing_transition(
    state: &mut SetupState,
    nav: &mut NavState,
    action: SetupAction,
) -> Result<SetupTransition, SetupNavError> {
    match action {
        SetupAction::Input(ch) => {
            if let Some(buffer) = nav.editing.as_mut() {
                buffer.push(ch);
            }
            Ok(SetupTransition::no_op(None))
        }
        SetupAction::Erase => {
            if let Some(buffer) = nav.editing.as_mut() {
                buffer.pop();
            }
            Ok(SetupTransition::no_op(None))
        }
        SetupAction::CommitEdit => {
            let raw = nav.editing.take().unwrap_or_default();
            let Some(key) = selected_field(state, nav) else {
                return Ok(SetupTransition::no_op(None));
            };
            state.edit_field(key, &raw);
            Ok(SetupTransition::no_op(Some(field_feedback(state, key))))
        }
        SetupAction::AbortEdit => {
            nav.editing = None;
            Ok(SetupTransition::no_op(Some("Edit discarded.".to_string())))
        }
        SetupAction::Cancel => Ok(SetupTransition::with_effect(
            SetupNavEffect::CancelSetup,
            None,
        )),
        _ => Err(SetupNavError::InvalidTransition {
            mode: NavMode::Editing,
            action,
        }),
    }
}

fn dialog_transition(
    state: &mut SetupState,
    action: SetupAction,
) -> Result<SetupTransition, SetupNavError> {
    match (state.request.state().clone(), action) {
        (_, SetupAction::Cancel) => Ok(SetupTransition::with_effect(
            SetupNavEffect::CancelSetup,
            None,
        )),
        (RequestState::Error(_), SetupAction::DialogConfirm) => {
            let payload = state.retry_submit()?;
            Ok(SetupTransition::with_effect(
                SetupNavEffect::Submit(payload),
                Some("Retrying submission...".to_string()),
            ))
        }
        (RequestState::Error(_), SetupAction::DialogDismiss) => {
            state.dismiss_dialog()?;
            Ok(SetupTransition::no_op(Some(
                "Submission canceled. Adjust the configuration and submit again.".to_string(),
            )))
        }
        (RequestState::Success, SetupAction::DialogConfirm | SetupAction::DialogDismiss) => {
            state.dismiss_dialog()?;
            Ok(SetupTransition::with_effect(SetupNavEffect::Finish, None))
        }
        _ => Err(SetupNavError::InvalidTransition {
            mode: NavMode::Dialog,
            action,
        }),
    }
}

pub fn setup_transition(
    state: &mut SetupState,
    nav: &mut NavState,
    action: SetupAction,
) -> Result<SetupTransition, SetupNavError> {
    let mode = nav.mode(state);
    let transition = match mode {
        NavMode::Browse => browse_transition(state, nav, action),
        NavMode::Editing => editing_transition(state, nav, action),
        NavMode::Dialog => dialog_transition(state, action),
    };
    nav.clamp_selection(state.visible_fields(state.current_step()).len());
    nav.refresh_hint(nav.mode(state));
    transition
}
