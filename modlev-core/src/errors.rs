use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum ModLevError {
    #[error("Invalid shape for {field}: {reason}")]
    InvalidShape { field: String, reason: String },
    #[error("Invalid hybrid coefficients: {0}")]
    InvalidCoefficients(String),
    #[error("Cannot decode time units {units:?}: {reason}")]
    InvalidTimeUnits { units: String, reason: String },
    #[error("Field {0:?} is not available from the field source")]
    MissingField(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ModLevError {
    pub(crate) fn shape(field: &str, reason: impl Into<String>) -> Self {
        ModLevError::InvalidShape {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type for `Result<T, ModLevError>`.
pub type ModLevResult<T> = Result<T, ModLevError>;
