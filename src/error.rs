//! Error types for the housing preprocessing pipeline

use std::fmt;
use thiserror::Error;

/// Result type alias for preprocessing operations
pub type Result<T> = std::result::Result<T, PrepError>;

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SchemaRead,
    PipelineBuild,
    Load,
    Split,
    Fit,
    Transform,
    Save,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::SchemaRead => "schema read",
            Stage::PipelineBuild => "pipeline build",
            Stage::Load => "load",
            Stage::Split => "split",
            Stage::Fit => "fit",
            Stage::Transform => "transform",
            Stage::Save => "save",
        };
        f.write_str(name)
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Column index {index} out of bounds for matrix with {ncols} columns")]
    IndexOutOfBounds { index: usize, ncols: usize },

    #[error("Unknown category {category:?} in column {column}")]
    UnknownCategory { column: String, category: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<PrepError>,
    },
}

impl PrepError {
    /// Stage tag of a wrapped error, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PrepError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error, skipping stage wrappers
    pub fn root_cause(&self) -> &PrepError {
        match self {
            PrepError::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Tags the error side of a result with the stage it came from
pub trait StageExt<T> {
    fn stage(self, stage: Stage) -> Result<T>;
}

impl<T> StageExt<T> for Result<T> {
    fn stage(self, stage: Stage) -> Result<T> {
        self.map_err(|e| PrepError::Stage {
            stage,
            source: Box::new(e),
        })
    }
}

impl From<polars::error::PolarsError> for PrepError {
    fn from(err: polars::error::PolarsError) -> Self {
        PrepError::DataError(err.to_string())
    }
}

impl From<serde_yaml::Error> for PrepError {
    fn from(err: serde_yaml::Error) -> Self {
        PrepError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for PrepError {
    fn from(err: serde_json::Error) -> Self {
        PrepError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for PrepError {
    fn from(err: bincode::Error) -> Self {
        PrepError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PrepError {
    fn from(err: ndarray::ShapeError) -> Self {
        PrepError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<ndarray_npy::WriteNpyError> for PrepError {
    fn from(err: ndarray_npy::WriteNpyError) -> Self {
        PrepError::SerializationError(err.to_string())
    }
}

impl From<ndarray_npy::ReadNpyError> for PrepError {
    fn from(err: ndarray_npy::ReadNpyError) -> Self {
        PrepError::SerializationError(err.to_string())
    }
}

impl From<ndarray_npy::WriteNpzError> for PrepError {
    fn from(err: ndarray_npy::WriteNpzError) -> Self {
        PrepError::SerializationError(err.to_string())
    }
}

impl From<ndarray_npy::ReadNpzError> for PrepError {
    fn from(err: ndarray_npy::ReadNpzError) -> Self {
        PrepError::SerializationError(err.to_string())
    }
}
