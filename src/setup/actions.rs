use crate::app::command_support::load_settings;
use crate::config::SubmitFormat;
use crate::setup::navigation::{
    parse_scripted_setup_keys, setup_action_from_key, setup_transition, NavState,
    SetupNavEffect, SCRIPT_KEYS_ENV,
};
use crate::setup::screens::{draw_setup_ui, project_setup_view_model};
use crate::setup::state::{SetupOptions, SetupState};
use crate::shared::logging::EventLog;
use crate::submit::{ConfigSubmitter, HttpSubmitter, RequestState, SubmissionPayload};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, IsTerminal};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetupArgs {
    pub legacy: bool,
}

pub fn parse_setup_args(args: &[String]) -> Result<SetupArgs, String> {
    let mut parsed = SetupArgs::default();
    for arg in args {
        match arg.as_str() {
            "--legacy" => parsed.legacy = true,
            other => {
                return Err(format!(
                    "unknown setup option `{other}`; usage: setup [--legacy]"
                ))
            }
        }
    }
    Ok(parsed)
}

pub(crate) fn cmd_setup(args: &[String]) -> Result<String, String> {
    let args = parse_setup_args(args)?;
    let settings = load_settings()?;
    let mut options = SetupOptions::from_settings(&settings);
    if args.legacy {
        options.submit_format = SubmitFormat::Yaml;
    }
    let format = options.submit_format;
    let submitter = HttpSubmitter::from_settings(&settings);
    let mut state = SetupState::new(options);
    let log = EventLog::default_location();
    log.record(
        "info",
        "setup.started",
        &format!("format={format} api_base_url={}", settings.api_base_url),
    );

    let exit = if let Some(scripted_keys) = load_scripted_setup_keys()? {
        run_setup_scripted(&mut state, &submitter, &log, scripted_keys)?
    } else if is_interactive_setup() {
        run_setup_tui(&mut state, &submitter, &log)?
    } else {
        return Err(format!(
            "setup needs an interactive terminal; set {SCRIPT_KEYS_ENV} to drive it from a script"
        ));
    };

    match exit {
        SetupExit::Submitted(payload) => {
            log.record("info", "setup.finished", "configuration submitted");
            Ok(format!(
                "setup=submitted\nformat={format}\nendpoint={}",
                submitter.endpoint(&payload)
            ))
        }
        SetupExit::Cancel => {
            log.record("info", "setup.canceled", "setup canceled by user");
            Ok("setup canceled".to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SetupExit {
    Submitted(SubmissionPayload),
    Cancel,
}

fn is_interactive_setup() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

fn load_scripted_setup_keys() -> Result<Option<Vec<KeyEvent>>, String> {
    let Ok(raw) = std::env::var(SCRIPT_KEYS_ENV) else {
        return Ok(None);
    };
    parse_scripted_setup_keys(&raw).map(Some)
}

/// Runs one blocking submission and feeds its result back into the tracker.
pub(crate) fn perform_submission(
    state: &mut SetupState,
    nav: &mut NavState,
    submitter: &dyn ConfigSubmitter,
    log: &EventLog,
    payload: &SubmissionPayload,
) -> Result<(), String> {
    log.record(
        "info",
        "setup.submit",
        &format!("posting configuration to /{}", payload.endpoint_path()),
    );
    let result = submitter.submit(payload);
    match &result {
        Ok(()) => log.record("info", "setup.submit.succeeded", "configuration accepted"),
        Err(err) => log.record(
            "warn",
            "setup.submit.failed",
            &format!("kind={} message={err}", err.kind()),
        ),
    }
    let status = state.finish_submit(result).map_err(|err| err.to_string())?;
    nav.status_text = match status {
        RequestState::Success => "Configuration submitted.".to_string(),
        RequestState::Error(message) => format!("Submission failed: {message}"),
        other => format!("Submission state: {}", other.as_str()),
    };
    Ok(())
}

fn run_setup_tui(
    state: &mut SetupState,
    submitter: &dyn ConfigSubmitter,
    log: &EventLog,
) -> Result<SetupExit, String> {
    let mut stdout = io::stdout();
    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    execute!(stdout, EnterAlternateScreen, Hide)
        .map_err(|e| format!("failed to enter setup screen: {e}"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create setup terminal: {e}"))?;
    let result = run_setup_tui_loop(state, submitter, log, &mut terminal);
    disable_raw_mode().map_err(|e| format!("failed to disable raw mode: {e}"))?;
    execute!(terminal.backend_mut(), Show, LeaveAlternateScreen)
        .map_err(|e| format!("failed to leave setup screen: {e}"))?;
    result
}

fn draw_setup_screen(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &SetupState,
    nav: &NavState,
) -> Result<(), String> {
    let view_model = project_setup_view_model(state, nav);
    terminal
        .draw(|frame| draw_setup_ui(frame, &view_model))
        .map_err(|e| format!("failed to render setup ui: {e}"))?;
    Ok(())
}

fn run_setup_tui_loop(
    state: &mut SetupState,
    submitter: &dyn ConfigSubmitter,
    log: &EventLog,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<SetupExit, String> {
    let mut nav = NavState::start();
    let mut last_payload = None;
    loop {
        draw_setup_screen(terminal, state, &nav)?;
        if !event::poll(Duration::from_millis(250))
            .map_err(|e| format!("failed to poll setup input: {e}"))?
        {
            continue;
        }
        let ev = event::read().map_err(|e| format!("failed to read setup input: {e}"))?;
        let Event::Key(key) = ev else {
            continue;
        };
        let Some(action) = setup_action_from_key(nav.mode(state), key) else {
            continue;
        };
        let transition = match setup_transition(state, &mut nav, action) {
            Ok(transition) => transition,
            Err(err) => {
                nav.status_text = err.to_string();
                continue;
            }
        };
        if let Some(feedback) = transition.feedback {
            nav.status_text = feedback;
        }
        match transition.effect {
            SetupNavEffect::None => {}
            SetupNavEffect::Submit(payload) => {
                draw_setup_screen(terminal, state, &nav)?;
                perform_submission(state, &mut nav, submitter, log, &payload)?;
                last_payload = Some(payload);
            }
            SetupNavEffect::Finish => {
                if let Some(payload) = last_payload.take() {
                    return Ok(SetupExit::Submitted(payload));
                }
            }
            SetupNavEffect::CancelSetup => return Ok(SetupExit::Cancel),
        }
    }
}

pub(crate) fn run_setup_scripted(
    state: &mut SetupState,
    submitter: &dyn ConfigSubmitter,
    log: &EventLog,
    scripted_keys: Vec<KeyEvent>,
) -> Result<SetupExit, String> {
    let mut nav = NavState::start();
    let mut last_payload = None;
    for key in scripted_keys {
        let Some(action) = setup_action_from_key(nav.mode(state), key) else {
            continue;
        };
        let transition = setup_transition(state, &mut nav, action).map_err(|e| e.to_string())?;
        if let Some(feedback) = transition.feedback {
            nav.status_text = feedback;
        }
        match transition.effect {
            SetupNavEffect::None => {}
            SetupNavEffect::Submit(payload) => {
                perform_submission(state, &mut nav, submitter, log, &payload)?;
                last_payload = Some(payload);
            }
            SetupNavEffect::Finish => {
                if let Some(payload) = last_payload.take() {
                    return Ok(SetupExit::Submitted(payload));
                }
            }
            SetupNavEffect::CancelSetup => return Ok(SetupExit::Cancel),
        }
    }
    match (state.request.state(), last_payload) {
        (RequestState::Success, Some(payload)) => Ok(SetupExit::Submitted(payload)),
        (RequestState::Error(message), _) => {
            Err(format!("configuration submission failed: {message}"))
        }
        _ => Err(format!(
            "scripted setup did not terminate; include submit or cancel keys (last status: {})",
            nav.status_text
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::fields::FieldKey;
    use crate::setup::steps::Step;
    use crate::setup::validate::SEED_LENGTH;
    use crate::submit::SubmitError;
    use std::cell::RefCell;

    struct RecordingSubmitter {
        results: RefCell<Vec<Result<(), SubmitError>>>,
        sent: RefCell<Vec<SubmissionPayload>>,
    }

    impl RecordingSubmitter {
        fn new(results: Vec<Result<(), SubmitError>>) -> Self {
            Self {
                results: RefCell::new(results),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl ConfigSubmitter for RecordingSubmitter {
        fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
            self.sent.borrow_mut().push(payload.clone());
            let mut results = self.results.borrow_mut();
            if results.is_empty() {
                Ok(())
            } else {
                results.remove(0)
            }
        }
    }

    fn keys(raw: &str) -> Vec<KeyEvent> {
        parse_scripted_setup_keys(raw).expect("valid script")
    }

    fn server_error(message: &str) -> SubmitError {
        SubmitError::Server {
            status: 400,
            message: message.to_string(),
        }
    }

    #[test]
    fn parse_setup_args_accepts_legacy_and_rejects_unknown() {
        assert_eq!(
            parse_setup_args(&["--legacy".to_string()]).expect("legacy"),
            SetupArgs { legacy: true }
        );
        assert!(parse_setup_args(&["--fast".to_string()]).is_err());
    }

    #[test]
    fn scripted_full_node_submission_posts_default_payload() {
        let mut state = SetupState::new(SetupOptions::default());
        let submitter = RecordingSubmitter::new(Vec::new());

        let exit = run_setup_scripted(
            &mut state,
            &submitter,
            &EventLog::disabled(),
            keys("enter,right,right,right,s,enter"),
        )
        .expect("scripted setup");

        let SetupExit::Submitted(SubmissionPayload::Json(config)) = exit else {
            panic!("expected a submitted json payload");
        };
        assert!(!config.validator.enabled);
        assert_eq!(config.dns, vec!["seed.bosagora.io".to_string()]);
        assert_eq!(submitter.sent.borrow().len(), 1);
        assert_eq!(state.request.state(), &RequestState::Begin);
    }

    #[test]
    fn scripted_validator_flow_types_seed_and_dns() {
        let seed = format!("S{}", "q".repeat(SEED_LENGTH - 1));
        let mut state = SetupState::new(SetupOptions::default());
        let submitter = RecordingSubmitter::new(Vec::new());
        let script = format!(
            "down,enter,text:{seed},enter,right,down,enter,text:dns.bosagora.io,enter,right,right,right"
        );

        let exit = run_setup_scripted(&mut state, &submitter, &EventLog::disabled(), keys(&script))
            .expect("scripted setup");

        let SetupExit::Submitted(SubmissionPayload::Json(config)) = exit else {
            panic!("expected a submitted json payload");
        };
        assert!(config.validator.enabled);
        assert_eq!(config.validator.seed.as_deref(), Some(seed.as_str()));
        assert_eq!(config.dns, vec!["dns.bosagora.io".to_string()]);
    }

    #[test]
    fn scripted_run_reports_server_status_when_script_ends_in_error() {
        let mut state = SetupState::new(SetupOptions::default());
        let submitter = RecordingSubmitter::new(vec![Err(server_error("Invalid configuration"))]);

        let err = run_setup_scripted(
            &mut state,
            &submitter,
            &EventLog::disabled(),
            keys("enter,right,right,right,s"),
        )
        .expect_err("submission fails");

        assert_eq!(err, "configuration submission failed: Invalid configuration");
    }

    #[test]
    fn scripted_retry_after_error_resubmits() {
        let mut state = SetupState::new(SetupOptions::default());
        let submitter = RecordingSubmitter::new(vec![
            Err(SubmitError::NoResponse {
                detail: "connection refused".to_string(),
            }),
            Ok(()),
        ]);

        let exit = run_setup_scripted(
            &mut state,
            &submitter,
            &EventLog::disabled(),
            keys("enter,right,right,right,s,enter,enter"),
        )
        .expect("retry succeeds");

        assert!(matches!(exit, SetupExit::Submitted(_)));
        assert_eq!(submitter.sent.borrow().len(), 2);
    }

    #[test]
    fn blocked_seed_keeps_script_on_first_step() {
        let mut state = SetupState::new(SetupOptions::default());
        let submitter = RecordingSubmitter::new(Vec::new());
        let wrong = format!("X{}", "a".repeat(SEED_LENGTH - 1));
        let script = format!("down,enter,text:{wrong},enter,right");

        let err = run_setup_scripted(&mut state, &submitter, &EventLog::disabled(), keys(&script))
            .expect_err("script never submits");

        assert!(err.contains("Fix the highlighted fields before continuing: Secret Seed"));
        assert_eq!(state.current_step(), Step::SecretSeed);
        assert!(submitter.sent.borrow().is_empty());
    }

    #[test]
    fn digit_jump_does_not_skip_seed_gate() {
        let mut state = SetupState::new(SetupOptions::default());
        let submitter = RecordingSubmitter::new(Vec::new());
        let wrong = format!("X{}", "a".repeat(SEED_LENGTH - 1));
        let script = format!("down,enter,text:{wrong},enter,4,s");

        run_setup_scripted(&mut state, &submitter, &EventLog::disabled(), keys(&script))
            .expect_err("script never submits");

        assert_eq!(state.current_step(), Step::SecretSeed);
        assert!(submitter.sent.borrow().is_empty());
    }

    #[test]
    fn escape_cancels_setup() {
        let mut state = SetupState::new(SetupOptions::default());
        let submitter = RecordingSubmitter::new(Vec::new());
        assert_eq!(
            run_setup_scripted(&mut state, &submitter, &EventLog::disabled(), keys("esc")).expect("cancel"),
            SetupExit::Cancel
        );
    }

    #[test]
    fn disabling_admin_interface_omits_address_and_port() {
        let mut state = SetupState::new(SetupOptions::default());
        let submitter = RecordingSubmitter::new(Vec::new());

        run_setup_scripted(
            &mut state,
            &submitter,
            &EventLog::disabled(),
            keys("enter,right,right,right,enter,s,enter"),
        )
        .expect("scripted setup");

        let sent = submitter.sent.borrow();
        let SubmissionPayload::Json(config) = &sent[0] else {
            panic!("expected json payload");
        };
        assert!(!config.admin.enabled);
        assert_eq!(config.admin.address, None);
        assert_eq!(config.admin.port, None);
        assert_eq!(
            state.visible_fields(Step::AdministrativeInterface),
            vec![FieldKey::AdminDisabled]
        );
    }
}
