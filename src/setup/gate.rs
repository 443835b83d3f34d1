use crate::setup::fields::{FieldAction, FieldKey, StepFields};
use crate::setup::validate::ValidationRules;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Advance,
    Blocked { invalid: Vec<FieldKey> },
}

/// Checks every entry of a step before leaving it. Invalid entries the user
/// never touched are re-checked as touched so their helper text shows up.
pub fn gate_step(fields: &mut StepFields, rules: ValidationRules) -> GateOutcome {
    let mut invalid = Vec::new();
    let mut surface = Vec::new();
    for (key, entry) in fields.iter() {
        if entry.is_valid {
            continue;
        }
        invalid.push(key);
        if !entry.is_touched {
            surface.push(FieldAction::Change {
                key,
                value: entry.value.clone(),
                touched: true,
            });
        }
    }
    for action in surface {
        fields.apply(action, rules);
    }
    if invalid.is_empty() {
        GateOutcome::Advance
    } else {
        GateOutcome::Blocked { invalid }
    }
}

pub fn blocked_feedback(invalid: &[FieldKey]) -> String {
    let labels = invalid
        .iter()
        .map(|key| key.label())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Fix the highlighted fields before continuing: {labels}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::fields::{FieldValue, SEED_EMPTY_TEXT};

    #[test]
    fn gate_advances_when_every_entry_is_valid() {
        let mut fields = StepFields::default();
        fields.register_default(
            FieldKey::MaxFailedRequests,
            FieldValue::Choice(1),
            ValidationRules::default(),
        );
        assert_eq!(
            gate_step(&mut fields, ValidationRules::default()),
            GateOutcome::Advance
        );
    }

    #[test]
    fn gate_force_touches_untouched_invalid_entries() {
        let mut fields = StepFields::default();
        fields.register_default(
            FieldKey::IsValidator,
            FieldValue::Flag(true),
            ValidationRules::default(),
        );
        fields.register_default(FieldKey::Seed, FieldValue::text(""), ValidationRules::default());

        let outcome = gate_step(&mut fields, ValidationRules::default());
        assert_eq!(
            outcome,
            GateOutcome::Blocked {
                invalid: vec![FieldKey::Seed]
            }
        );
        let seed = fields.get(FieldKey::Seed).expect("seed");
        assert!(seed.is_touched);
        assert_eq!(seed.visible_error(), Some(SEED_EMPTY_TEXT));
    }

    #[test]
    fn blocked_feedback_lists_field_labels() {
        assert_eq!(
            blocked_feedback(&[FieldKey::AdminAddress, FieldKey::AdminPort]),
            "Fix the highlighted fields before continuing: Address, Port"
        );
    }
}
