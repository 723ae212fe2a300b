//! Settings form state transitions.
//!
//! Each user edit is a pure transition `(current params, edit) -> FormState`.
//! The new state is re-validated every time and carries fresh predictions
//! only when the whole configuration is valid.

use crate::engine::generate_predictions;
use crate::overlay::{build_event_map, EventTagMap};
use crate::{
    CalendarDate, CyclePrediction, CycleParameters, Error, ParameterField, ValidationError,
};

/// One edit to one settings field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldEdit {
    StartDate(CalendarDate),
    CycleLength(u32),
    LutealPhase(u32),
    PredictionCount(u32),
    DaysBeforeOvulation(u32),
    DaysAfterOvulation(u32),
}

/// Form contents after an edit
#[derive(Clone, Debug, PartialEq)]
pub struct FormState {
    pub params: CycleParameters,
    pub errors: Vec<ValidationError>,
    pub predictions: Option<Vec<CyclePrediction>>,
}

impl FormState {
    /// Validate `params` and predict if they are valid
    pub fn evaluate(params: CycleParameters) -> Self {
        match generate_predictions(&params) {
            Ok(predictions) => Self {
                params,
                errors: Vec::new(),
                predictions: Some(predictions),
            },
            Err(Error::Validation(first)) => {
                let mut errors = params.validate();
                if errors.is_empty() {
                    errors.push(first);
                }
                Self {
                    params,
                    errors,
                    predictions: None,
                }
            }
            Err(other) => {
                // generate_predictions only fails with validation errors
                tracing::error!("Unexpected prediction failure: {}", other);
                Self {
                    errors: params.validate(),
                    params,
                    predictions: None,
                }
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.predictions.is_some()
    }

    /// The error to show next to `field`, if any
    pub fn field_error(&self, field: ParameterField) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field() == field)
    }

    /// Overlay for the preview calendar; empty while invalid
    pub fn event_map(&self) -> EventTagMap {
        self.predictions
            .as_deref()
            .map(build_event_map)
            .unwrap_or_default()
    }
}

/// Apply one field edit and re-evaluate
pub fn apply_edit(current: &CycleParameters, edit: FieldEdit) -> FormState {
    let mut params = current.clone();

    match edit {
        FieldEdit::StartDate(date) => params.start_date = date,
        FieldEdit::CycleLength(days) => params.cycle_length = days,
        FieldEdit::LutealPhase(days) => params.luteal_phase = days,
        FieldEdit::PredictionCount(count) => params.prediction_count = count,
        FieldEdit::DaysBeforeOvulation(days) => params.fertile_window.days_before_ovulation = days,
        FieldEdit::DaysAfterOvulation(days) => params.fertile_window.days_after_ovulation = days,
    }

    tracing::debug!("Applied form edit {:?}", edit);
    FormState::evaluate(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventTag;

    fn start() -> CycleParameters {
        CycleParameters::new(CalendarDate::from_ymd(2024, 1, 1).unwrap())
    }

    #[test]
    fn test_valid_edit_produces_predictions() {
        let state = apply_edit(&start(), FieldEdit::PredictionCount(4));

        assert!(state.is_valid());
        assert_eq!(state.predictions.as_ref().unwrap().len(), 4);
        assert!(!state.event_map().is_empty());
    }

    #[test]
    fn test_invalid_luteal_flagged_inline() {
        let state = apply_edit(&start(), FieldEdit::LutealPhase(24));

        assert!(!state.is_valid());
        assert!(state.predictions.is_none());
        assert!(state.event_map().is_empty());
        assert!(matches!(
            state.field_error(ParameterField::LutealPhase),
            Some(ValidationError::LutealPhaseTooLong { max: 23, .. })
        ));
        assert!(state.field_error(ParameterField::CycleLength).is_none());
    }

    #[test]
    fn test_shortening_cycle_invalidates_luteal() {
        let state = apply_edit(&start(), FieldEdit::LutealPhase(20));
        assert!(state.is_valid());

        let state = apply_edit(&state.params, FieldEdit::CycleLength(24));
        assert!(state.field_error(ParameterField::LutealPhase).is_some());

        // Fixing the other field recovers
        let state = apply_edit(&state.params, FieldEdit::LutealPhase(19));
        assert!(state.is_valid());
    }

    #[test]
    fn test_window_edits_move_fertile_days() {
        let state = apply_edit(&start(), FieldEdit::DaysBeforeOvulation(3));
        let map = state.event_map();
        let jan = |d| CalendarDate::from_ymd(2024, 1, d).unwrap();

        assert!(!map.has(jan(11), EventTag::Fertile));
        assert!(map.has(jan(12), EventTag::Fertile));

        let state = apply_edit(&state.params, FieldEdit::DaysAfterOvulation(2));
        assert!(state.event_map().has(jan(17), EventTag::Fertile));
    }

    #[test]
    fn test_oversized_window_flagged_on_window_field() {
        let state = apply_edit(&start(), FieldEdit::DaysBeforeOvulation(u32::MAX));

        assert!(!state.is_valid());
        assert!(state.event_map().is_empty());
        assert!(matches!(
            state.field_error(ParameterField::FertileWindow),
            Some(ValidationError::FertileWindowOutOfRange { max: 28, .. })
        ));
        assert!(state.field_error(ParameterField::StartDate).is_none());

        let state = apply_edit(&state.params, FieldEdit::DaysBeforeOvulation(5));
        assert!(state.is_valid());
    }

    #[test]
    fn test_edit_does_not_mutate_input() {
        let params = start();
        let _ = apply_edit(&params, FieldEdit::CycleLength(30));
        assert_eq!(params.cycle_length, 28);
    }
}
