//! Namespace schema of the cycle tracker plugin.
//!
//! The plugin stores its configuration and the generated predictions under
//! its own id in the habit's plugin data. Earlier revisions stored a single
//! predicted cycle with different field names; those values are still
//! readable and are upgraded to the current shape on load.

use crate::engine::generate_predictions;
use crate::plugin::CYCLE_PLUGIN_ID;
use crate::{
    CalendarDate, CycleParameters, CyclePrediction, Error, FertileWindow, FertileWindowOffsets,
    PluginDataBag, Result,
};
use serde::{Deserialize, Serialize};

/// Value stored in the cycle plugin's namespace
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleData {
    pub cycle_start: CalendarDate,
    pub cycle_length: u32,
    pub luteal_phase: u32,
    #[serde(default)]
    pub fertile_window_offsets: FertileWindowOffsets,
    pub predictions: Vec<CyclePrediction>,
}

impl CycleData {
    /// Parameters that regenerate these predictions
    pub fn parameters(&self) -> CycleParameters {
        CycleParameters {
            start_date: self.cycle_start,
            cycle_length: self.cycle_length,
            luteal_phase: self.luteal_phase,
            prediction_count: u32::try_from(self.predictions.len()).unwrap_or(u32::MAX),
            fertile_window: self.fertile_window_offsets,
        }
    }
}

/// Single-cycle shape written by earlier plugin revisions
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyCycleData {
    cycle_start: CalendarDate,
    cycle_length: u32,
    next_period: CalendarDate,
    ovulation_date: CalendarDate,
    fertile_window: FertileWindow,
}

impl TryFrom<LegacyCycleData> for CycleData {
    type Error = String;

    fn try_from(legacy: LegacyCycleData) -> std::result::Result<Self, Self::Error> {
        let follicular = legacy.cycle_start.days_until(legacy.ovulation_date);
        let luteal_phase = u32::try_from(i64::from(legacy.cycle_length) - follicular)
            .map_err(|_| {
                format!(
                    "ovulation on {} falls outside a {}-day cycle starting {}",
                    legacy.ovulation_date, legacy.cycle_length, legacy.cycle_start
                )
            })?;

        let before = legacy.fertile_window.start.days_until(legacy.ovulation_date);
        let after = legacy.ovulation_date.days_until(legacy.fertile_window.end);
        let (days_before_ovulation, days_after_ovulation) =
            match (u32::try_from(before), u32::try_from(after)) {
                (Ok(before), Ok(after)) => (before, after),
                _ => {
                    return Err(format!(
                        "fertile window {} to {} does not contain ovulation on {}",
                        legacy.fertile_window.start,
                        legacy.fertile_window.end,
                        legacy.ovulation_date
                    ))
                }
            };

        Ok(CycleData {
            cycle_start: legacy.cycle_start,
            cycle_length: legacy.cycle_length,
            luteal_phase,
            fertile_window_offsets: FertileWindowOffsets {
                days_before_ovulation,
                days_after_ovulation,
            },
            predictions: vec![CyclePrediction {
                cycle_start: legacy.cycle_start,
                next_cycle_start: legacy.next_period,
                ovulation_date: legacy.ovulation_date,
                fertile_window: legacy.fertile_window,
            }],
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCycleData {
    Current(CycleData),
    Legacy(LegacyCycleData),
}

/// Read the cycle plugin's namespace, upgrading legacy values
///
/// The stored settings must pass the same checks as freshly entered ones and
/// the stored predictions must form a chain from `cycleStart`.
pub fn load(bag: &PluginDataBag) -> Result<Option<CycleData>> {
    let data = match bag.read::<StoredCycleData>(CYCLE_PLUGIN_ID)? {
        None => return Ok(None),
        Some(StoredCycleData::Current(data)) => data,
        Some(StoredCycleData::Legacy(legacy)) => {
            tracing::warn!(
                "Upgrading single-cycle data written by an earlier plugin revision (start {})",
                legacy.cycle_start
            );
            CycleData::try_from(legacy).map_err(invalid)?
        }
    };

    check_stored(&data).map_err(invalid)?;
    Ok(Some(data))
}

fn check_stored(data: &CycleData) -> std::result::Result<(), String> {
    let problems: Vec<String> = data
        .parameters()
        .validate()
        .iter()
        .map(|e| e.to_string())
        .collect();
    if !problems.is_empty() {
        return Err(problems.join("; "));
    }

    let mut expected_start = data.cycle_start;
    for (i, prediction) in data.predictions.iter().enumerate() {
        if prediction.cycle_start != expected_start {
            return Err(format!(
                "prediction {} starts {} instead of {}",
                i + 1,
                prediction.cycle_start,
                expected_start
            ));
        }
        expected_start = prediction.next_cycle_start;
    }
    Ok(())
}

fn invalid(message: String) -> Error {
    Error::PluginData {
        namespace: CYCLE_PLUGIN_ID.to_string(),
        message,
    }
}

/// Generate predictions and write them under the cycle plugin's namespace
///
/// Other namespaces in `bag` are left untouched.
pub fn store_predictions(
    bag: &PluginDataBag,
    params: &CycleParameters,
) -> Result<(PluginDataBag, CycleData)> {
    let predictions = generate_predictions(params)?;

    let data = CycleData {
        cycle_start: params.start_date,
        cycle_length: params.cycle_length,
        luteal_phase: params.luteal_phase,
        fertile_window_offsets: params.fertile_window,
        predictions,
    };

    let bag = bag.write(CYCLE_PLUGIN_ID, &data)?;
    tracing::info!(
        "Stored {} cycle predictions starting {}",
        data.predictions.len(),
        data.cycle_start
    );

    Ok((bag, data))
}
