//! Error types for the cycle_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cycle_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Cycle parameters rejected by the prediction engine
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A plugin namespace holds a value that does not match its schema
    #[error("Plugin data error in namespace '{namespace}': {message}")]
    PluginData { namespace: String, message: String },

    /// Plugin registration error
    #[error("Registry error: {0}")]
    Registry(String),

    /// Note text exceeds the configured maximum
    #[error("Note is {len} characters long, maximum is {max}")]
    NoteTooLong { len: usize, max: usize },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// The input field a validation failure refers to.
///
/// Settings forms use this to flag the offending control inline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterField {
    StartDate,
    CycleLength,
    LutealPhase,
    PredictionCount,
    FertileWindow,
}

/// A violated `CycleParameters` precondition
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("cycle length {value} is outside the allowed range {min}..={max} days")]
    CycleLengthOutOfRange { value: u32, min: u32, max: u32 },

    #[error("luteal phase {value} is shorter than the minimum of {min} days")]
    LutealPhaseTooShort { value: u32, min: u32 },

    #[error(
        "luteal phase {luteal_phase} is too long for a {cycle_length}-day cycle (maximum {max} days)"
    )]
    LutealPhaseTooLong {
        luteal_phase: u32,
        cycle_length: u32,
        max: u32,
    },

    #[error("prediction count {value} is outside the allowed range {min}..={max}")]
    PredictionCountOutOfRange { value: u32, min: u32, max: u32 },

    #[error(
        "fertile window of {days_before_ovulation} days before and {days_after_ovulation} after ovulation exceeds {max} days on a side"
    )]
    FertileWindowOutOfRange {
        days_before_ovulation: u32,
        days_after_ovulation: u32,
        max: u32,
    },

    #[error("start date {start_date} is too close to the edge of the supported calendar")]
    StartDateOutOfRange { start_date: String },
}

impl ValidationError {
    /// Which input field this failure refers to
    pub fn field(&self) -> ParameterField {
        match self {
            ValidationError::CycleLengthOutOfRange { .. } => ParameterField::CycleLength,
            ValidationError::LutealPhaseTooShort { .. }
            | ValidationError::LutealPhaseTooLong { .. } => ParameterField::LutealPhase,
            ValidationError::PredictionCountOutOfRange { .. } => ParameterField::PredictionCount,
            ValidationError::FertileWindowOutOfRange { .. } => ParameterField::FertileWindow,
            ValidationError::StartDateOutOfRange { .. } => ParameterField::StartDate,
        }
    }
}
