//! Error taxonomy of the trajectory engine

use thiserror::Error;

/// Every failure the engine reports to its callers.
///
/// Each variant is scoped to the single operation that produced it; none of
/// them changes the state of the loaded dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// No dataset is currently loaded (never loaded, or cleared)
    #[error("no trajectory data is loaded (POST /post-data to fetch it)")]
    DatasetUnavailable,

    /// The requested epoch has no matching state vector
    #[error("epoch '{0}' not found in the trajectory data")]
    EpochNotFound(String),

    /// A pagination argument could not be parsed
    #[error("invalid value '{value}' for query parameter '{name}': must be a non-negative integer")]
    InvalidQueryParameter { name: String, value: String },

    /// The loader could not produce a dataset
    #[error("failed to load trajectory data: {0}")]
    LoadFailed(String),

    /// A single state vector failed validation
    #[error("invalid state vector at epoch '{epoch}': {reason}")]
    InvalidRecord { epoch: String, reason: String },

    /// The dataset as a whole failed validation
    #[error("invalid trajectory dataset: {0}")]
    InvalidDataset(String),
}

impl TrackerError {
    /// Short machine-readable name of the condition
    pub fn kind(&self) -> &'static str {
        match self {
            TrackerError::DatasetUnavailable => "dataset_unavailable",
            TrackerError::EpochNotFound(_) => "epoch_not_found",
            TrackerError::InvalidQueryParameter { .. } => "invalid_query_parameter",
            TrackerError::LoadFailed(_) => "load_failed",
            TrackerError::InvalidRecord { .. } => "invalid_record",
            TrackerError::InvalidDataset(_) => "invalid_dataset",
        }
    }

    pub(crate) fn invalid_parameter(name: &str, value: &str) -> Self {
        TrackerError::InvalidQueryParameter {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
