#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Begin,
    Request,
    Success,
    Error(String),
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Begin => "begin",
            RequestState::Request => "request",
            RequestState::Success => "success",
            RequestState::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestEvent {
    Submit,
    Succeeded,
    Failed(String),
    Retry,
    Cancel,
    Continue,
}

impl RequestEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestEvent::Submit => "submit",
            RequestEvent::Succeeded => "succeeded",
            RequestEvent::Failed(_) => "failed",
            RequestEvent::Retry => "retry",
            RequestEvent::Cancel => "cancel",
            RequestEvent::Continue => "continue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("a configuration submission is already in flight")]
    InFlight,
    #[error("invalid request transition: state={state} event={event}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

/// Tracks the single submission call and decides whether the result dialog
/// is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTracker {
    state: RequestState,
}

impl RequestTracker {
    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn dialog_open(&self) -> bool {
        !matches!(self.state, RequestState::Begin)
    }

    pub fn in_flight(&self) -> bool {
        matches!(self.state, RequestState::Request)
    }

    pub fn apply(&mut self, event: RequestEvent) -> Result<&RequestState, RequestError> {
        let next = match (&self.state, &event) {
            (RequestState::Request, RequestEvent::Submit | RequestEvent::Retry) => {
                return Err(RequestError::InFlight)
            }
            (RequestState::Begin, RequestEvent::Submit) => RequestState::Request,
            (RequestState::Error(_), RequestEvent::Retry) => RequestState::Request,
            (RequestState::Request, RequestEvent::Succeeded) => RequestState::Success,
            (RequestState::Request, RequestEvent::Failed(message)) => {
                RequestState::Error(message.clone())
            }
            (RequestState::Error(_), RequestEvent::Cancel) => RequestState::Begin,
            (RequestState::Success, RequestEvent::Continue) => RequestState::Begin,
            _ => {
                return Err(RequestError::InvalidTransition {
                    state: self.state.as_str(),
                    event: event.as_str(),
                })
            }
        };
        self.state = next;
        Ok(&self.state)
    }
}
