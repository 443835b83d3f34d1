#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    SecretSeed,
    NetworkOptions,
    BanManagement,
    AdministrativeInterface,
}

pub const ALL_STEPS: [Step; 4] = [
    Step::SecretSeed,
    Step::NetworkOptions,
    Step::BanManagement,
    Step::AdministrativeInterface,
];

pub const STEP_COUNT: usize = ALL_STEPS.len();

impl Step {
    pub fn title(self) -> &'static str {
        match self {
            Step::SecretSeed => "Secret Seed",
            Step::NetworkOptions => "Network Options",
            Step::BanManagement => "Ban Management",
            Step::AdministrativeInterface => "Administrative Interface",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Step::SecretSeed => 0,
            Step::NetworkOptions => 1,
            Step::BanManagement => 2,
            Step::AdministrativeInterface => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        ALL_STEPS.get(index).copied()
    }

    pub fn is_last(self) -> bool {
        self.index() == STEP_COUNT - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    ToStep(usize),
    ToNextStep,
    ToPrevStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepState {
    pub current_index: usize,
    pub prev_index: usize,
    pub furthest_index: usize,
}

impl Default for StepState {
    fn default() -> Self {
        Self::first()
    }
}

impl StepState {
    pub fn first() -> Self {
        Self {
            current_index: 0,
            prev_index: 0,
            furthest_index: 0,
        }
    }

    pub fn current(&self) -> Step {
        Step::from_index(self.current_index).unwrap_or(Step::SecretSeed)
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == STEP_COUNT
    }

    pub fn visited(&self, step: Step) -> bool {
        step.index() <= self.furthest_index
    }

    fn move_to(&mut self, index: usize) {
        self.prev_index = self.current_index;
        self.current_index = index;
        self.furthest_index = self.furthest_index.max(index);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepNavError {
    #[error("step index {index} is out of range (0..{count})")]
    OutOfRange { index: usize, count: usize },
}

/// Outcome of a step action: whether the index actually moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTransition {
    Moved { from: Step, to: Step },
    Unchanged,
}

pub fn step_transition(
    state: &mut StepState,
    action: StepAction,
) -> Result<StepTransition, StepNavError> {
    let from = state.current();
    match action {
        StepAction::ToStep(index) => {
            let Some(to) = Step::from_index(index) else {
                return Err(StepNavError::OutOfRange {
                    index,
                    count: STEP_COUNT,
                });
            };
            state.move_to(index);
            Ok(StepTransition::Moved { from, to })
        }
        StepAction::ToNextStep => {
            let next = state.current_index + 1;
            if next < STEP_COUNT {
                state.move_to(next);
                Ok(StepTransition::Moved {
                    from,
                    to: state.current(),
                })
            } else {
                Ok(StepTransition::Unchanged)
            }
        }
        StepAction::ToPrevStep => match state.current_index.checked_sub(1) {
            Some(prev) => {
                state.move_to(prev);
                Ok(StepTransition::Moved {
                    from,
                    to: state.current(),
                })
            }
            None => Ok(StepTransition::Unchanged),
        },
    }
}
