use thiserror::Error;

use crate::domain::CategoricalField;

/// Errors raised by the estimation core (encoding, training, prediction, bundle loading).
///
/// None of these are retried: they indicate bad input or a malformed artifact.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unknown {field} category '{value}' (not present in the training data)")]
    UnknownCategory { field: CategoricalField, value: String },

    #[error("Model bundle is incomplete: missing `{missing}`")]
    IncompleteBundle { missing: &'static str },

    #[error("Ensemble has no models; prediction is undefined")]
    EmptyEnsemble,

    #[error("Training data error: {0}")]
    TrainingData(String),

    #[error("Feature width mismatch: expected {expected}, got {actual}")]
    FeatureShape { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid job profile: {0}")]
    InvalidProfile(String),

    #[error("Non-finite value produced by {0}")]
    NonFinite(&'static str),
}

impl ModelError {
    /// Process exit code used when this error reaches the CLI boundary.
    pub fn exit_code(&self) -> u8 {
        match self {
            ModelError::TrainingData(_) => 3,
            ModelError::EmptyEnsemble | ModelError::NonFinite(_) => 4,
            ModelError::UnknownCategory { .. }
            | ModelError::IncompleteBundle { .. }
            | ModelError::FeatureShape { .. }
            | ModelError::InvalidConfig(_)
            | ModelError::InvalidProfile(_) => 2,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
