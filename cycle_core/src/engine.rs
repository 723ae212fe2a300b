//! Prediction engine for recurring cycles.
//!
//! Given a start date and cycle parameters, produces an ordered, finite,
//! gap-free sequence of predicted cycles:
//! - Next cycle start: `cycle_start + cycle_length`
//! - Ovulation: `cycle_start + (cycle_length - luteal_phase)`
//! - Fertile window: configurable days around ovulation
//!
//! Invalid parameters are rejected at this boundary, never clamped.

use crate::{
    CalendarDate, CyclePrediction, CycleParameters, FertileWindow, FertileWindowOffsets, Result,
    ValidationError, MAX_CYCLE_LENGTH, MAX_PREDICTION_COUNT, MIN_CYCLE_LENGTH, MIN_LUTEAL_PHASE,
    MIN_PREDICTION_COUNT,
};

impl CycleParameters {
    /// Check every precondition and return all violations.
    ///
    /// An empty list means the parameters are valid. The start date is not
    /// checked here; its range depends on the whole sequence and is reported
    /// by [`generate_predictions`].
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(MIN_CYCLE_LENGTH..=MAX_CYCLE_LENGTH).contains(&self.cycle_length) {
            errors.push(ValidationError::CycleLengthOutOfRange {
                value: self.cycle_length,
                min: MIN_CYCLE_LENGTH,
                max: MAX_CYCLE_LENGTH,
            });
        }

        if self.luteal_phase < MIN_LUTEAL_PHASE {
            errors.push(ValidationError::LutealPhaseTooShort {
                value: self.luteal_phase,
                min: MIN_LUTEAL_PHASE,
            });
        } else if self.luteal_phase > self.max_luteal_phase() {
            errors.push(ValidationError::LutealPhaseTooLong {
                luteal_phase: self.luteal_phase,
                cycle_length: self.cycle_length,
                max: self.max_luteal_phase(),
            });
        }

        if !(MIN_PREDICTION_COUNT..=MAX_PREDICTION_COUNT).contains(&self.prediction_count) {
            errors.push(ValidationError::PredictionCountOutOfRange {
                value: self.prediction_count,
                min: MIN_PREDICTION_COUNT,
                max: MAX_PREDICTION_COUNT,
            });
        }

        let max_offset = self.max_fertile_offset();
        let window = self.fertile_window;
        if window.days_before_ovulation > max_offset || window.days_after_ovulation > max_offset {
            errors.push(ValidationError::FertileWindowOutOfRange {
                days_before_ovulation: window.days_before_ovulation,
                days_after_ovulation: window.days_after_ovulation,
                max: max_offset,
            });
        }

        errors
    }

    /// Largest fertile window offset on either side of ovulation
    ///
    /// A window never reaches further than one cycle from ovulation, capped
    /// at the longest allowed cycle when the length itself is out of range.
    pub fn max_fertile_offset(&self) -> u32 {
        self.cycle_length.min(MAX_CYCLE_LENGTH)
    }
}

/// Generate `prediction_count` chained cycle predictions
///
/// Each prediction's `cycle_start` equals the previous prediction's
/// `next_cycle_start`. The result is deterministic: no clock, no randomness.
///
/// # Errors
/// Returns [`crate::Error::Validation`] with the first violated constraint.
pub fn generate_predictions(params: &CycleParameters) -> Result<Vec<CyclePrediction>> {
    if let Some(first) = params.validate().into_iter().next() {
        tracing::debug!("Rejected cycle parameters: {}", first);
        return Err(first.into());
    }

    let mut predictions = Vec::with_capacity(params.prediction_count as usize);
    let mut cycle_start = params.start_date;

    for _ in 0..params.prediction_count {
        let prediction = predict_single(
            cycle_start,
            params.cycle_length,
            params.luteal_phase,
            params.fertile_window,
        )
        .ok_or_else(|| ValidationError::StartDateOutOfRange {
            start_date: params.start_date.to_string(),
        })?;

        cycle_start = prediction.next_cycle_start;
        predictions.push(prediction);
    }

    tracing::debug!(
        "Generated {} predictions from {} ({}-day cycle, {}-day luteal phase)",
        predictions.len(),
        params.start_date,
        params.cycle_length,
        params.luteal_phase
    );

    Ok(predictions)
}

/// Project a single cycle from its start date
///
/// This performs no range validation of the lengths; it only returns `None`
/// when the date arithmetic leaves the representable calendar.
pub fn predict_single(
    cycle_start: CalendarDate,
    cycle_length: u32,
    luteal_phase: u32,
    offsets: FertileWindowOffsets,
) -> Option<CyclePrediction> {
    let next_cycle_start = cycle_start.add_days(i64::from(cycle_length))?;
    let ovulation_offset = i64::from(cycle_length) - i64::from(luteal_phase);
    let ovulation_date = cycle_start.add_days(ovulation_offset)?;

    let fertile_window = FertileWindow {
        start: ovulation_date.add_days(-i64::from(offsets.days_before_ovulation))?,
        end: ovulation_date.add_days(i64::from(offsets.days_after_ovulation))?,
    };

    Some(CyclePrediction {
        cycle_start,
        next_cycle_start,
        ovulation_date,
        fertile_window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ParameterField};

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    fn params(cycle_length: u32, luteal_phase: u32, prediction_count: u32) -> CycleParameters {
        CycleParameters {
            start_date: date(2024, 1, 1),
            cycle_length,
            luteal_phase,
            prediction_count,
            fertile_window: FertileWindowOffsets::default(),
        }
    }

    #[test]
    fn test_reference_scenario() {
        crate::logging::init_test();

        let predictions = generate_predictions(&params(28, 14, 2)).unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(
            predictions[0],
            CyclePrediction {
                cycle_start: date(2024, 1, 1),
                next_cycle_start: date(2024, 1, 29),
                ovulation_date: date(2024, 1, 15),
                fertile_window: FertileWindow {
                    start: date(2024, 1, 10),
                    end: date(2024, 1, 16),
                },
            }
        );
        assert_eq!(predictions[1].cycle_start, date(2024, 1, 29));
    }

    #[test]
    fn test_predictions_are_chained() {
        let predictions = generate_predictions(&params(31, 12, 12)).unwrap();

        assert_eq!(predictions.len(), 12);
        for pair in predictions.windows(2) {
            assert_eq!(pair[0].next_cycle_start, pair[1].cycle_start);
        }
    }

    #[test]
    fn test_rolls_over_leap_february_and_year_end() {
        let mut p = params(30, 14, 2);
        p.start_date = date(2024, 1, 31);

        let predictions = generate_predictions(&p).unwrap();
        assert_eq!(predictions[0].next_cycle_start, date(2024, 3, 1));
        assert_eq!(predictions[0].ovulation_date, date(2024, 2, 16));

        p.start_date = date(2023, 12, 20);
        let predictions = generate_predictions(&p).unwrap();
        assert_eq!(predictions[0].next_cycle_start, date(2024, 1, 19));
    }

    #[test]
    fn test_narrow_window_variant() {
        let mut p = params(28, 14, 1);
        p.fertile_window = FertileWindowOffsets {
            days_before_ovulation: 3,
            days_after_ovulation: 1,
        };

        let predictions = generate_predictions(&p).unwrap();
        assert_eq!(predictions[0].fertile_window.start, date(2024, 1, 12));
        assert_eq!(predictions[0].fertile_window.end, date(2024, 1, 16));
    }

    #[test]
    fn test_luteal_phase_too_close_to_cycle_length() {
        let err = generate_predictions(&params(28, 24, 2)).unwrap_err();

        match err {
            Error::Validation(v) => {
                assert_eq!(
                    v,
                    ValidationError::LutealPhaseTooLong {
                        luteal_phase: 24,
                        cycle_length: 28,
                        max: 23,
                    }
                );
                assert_eq!(v.field(), ParameterField::LutealPhase);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_boundaries_accepted() {
        assert!(generate_predictions(&params(21, 16, 1)).is_ok());
        assert!(generate_predictions(&params(35, 10, 12)).is_ok());
        assert!(generate_predictions(&params(28, 23, 1)).is_ok());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(matches!(
            generate_predictions(&params(20, 10, 1)),
            Err(Error::Validation(ValidationError::CycleLengthOutOfRange { value: 20, .. }))
        ));
        assert!(matches!(
            generate_predictions(&params(36, 14, 1)),
            Err(Error::Validation(ValidationError::CycleLengthOutOfRange { value: 36, .. }))
        ));
        assert!(matches!(
            generate_predictions(&params(28, 9, 1)),
            Err(Error::Validation(ValidationError::LutealPhaseTooShort { value: 9, .. }))
        ));
        assert!(matches!(
            generate_predictions(&params(28, 14, 0)),
            Err(Error::Validation(ValidationError::PredictionCountOutOfRange { value: 0, .. }))
        ));
        assert!(matches!(
            generate_predictions(&params(28, 14, 13)),
            Err(Error::Validation(ValidationError::PredictionCountOutOfRange { value: 13, .. }))
        ));
    }

    #[test]
    fn test_validate_reports_every_violation() {
        let errors = params(40, 5, 0).validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field()).collect();

        assert_eq!(
            fields,
            vec![
                ParameterField::CycleLength,
                ParameterField::LutealPhase,
                ParameterField::PredictionCount,
            ]
        );
    }

    #[test]
    fn test_start_date_near_calendar_end_rejected() {
        let mut p = params(28, 14, 12);
        p.start_date = CalendarDate::from_naive(chrono::NaiveDate::MAX)
            .add_days(-30)
            .unwrap();

        assert!(matches!(
            generate_predictions(&p),
            Err(Error::Validation(ValidationError::StartDateOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_fertile_window_bounded_by_cycle_length() {
        let mut p = params(28, 14, 1);
        p.fertile_window.days_before_ovulation = 28;
        p.fertile_window.days_after_ovulation = 28;
        assert!(generate_predictions(&p).is_ok());

        p.fertile_window.days_before_ovulation = 5_000_000;
        let err = generate_predictions(&p).unwrap_err();
        match err {
            Error::Validation(v) => {
                assert_eq!(
                    v,
                    ValidationError::FertileWindowOutOfRange {
                        days_before_ovulation: 5_000_000,
                        days_after_ovulation: 28,
                        max: 28,
                    }
                );
                assert_eq!(v.field(), ParameterField::FertileWindow);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_huge_offset_not_blamed_on_start_date() {
        let mut p = params(28, 14, 1);
        p.fertile_window.days_after_ovulation = u32::MAX;

        let fields: Vec<_> = p.validate().iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec![ParameterField::FertileWindow]);
    }

    #[test]
    fn test_start_date_near_calendar_start_rejected() {
        let mut p = params(28, 14, 1);
        p.fertile_window.days_before_ovulation = 20;
        p.start_date = CalendarDate::from_naive(chrono::NaiveDate::MIN);

        let err = generate_predictions(&p).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::StartDateOutOfRange { .. })
        ));
        assert!(err.to_string().contains("edge of the supported calendar"));
    }

    #[test]
    fn test_identical_inputs_identical_outputs() {
        let p = params(29, 13, 6);
        assert_eq!(
            generate_predictions(&p).unwrap(),
            generate_predictions(&p).unwrap()
        );
    }
}
