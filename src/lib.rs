//! Housing Prep - feature engineering for tabular housing-price data
//!
//! Turns raw train/test CSV tables into numeric arrays ready for a
//! regression model, using a preprocessing pipeline fitted on the
//! training split only.
//!
//! # Modules
//!
//! ## Core
//! - [`feature_engineering`] - Derived ratio features (`FeatureGenerator`)
//! - [`preprocessing`] - Imputers, scaler, one-hot encoder, column routing
//! - [`components`] - The data transformation stage
//!
//! ## Supporting
//! - [`schema`] - Dataset schema file
//! - [`config`] - Stage and run configuration
//! - [`artifact`] - Records passed between pipeline stages
//! - [`observe`] - Progress events and observers
//! - [`utils`] - CSV, array and object I/O
//! - [`cli`] - Command-line interface

pub mod error;

pub mod feature_engineering;
pub mod preprocessing;
pub mod components;

pub mod artifact;
pub mod config;
pub mod observe;
pub mod schema;
pub mod utils;

pub mod cli;

pub use error::{PrepError, Result, Stage};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{PrepError, Result, Stage, StageExt};

    pub use crate::feature_engineering::{FeatureGenerator, FeatureIndices};
    pub use crate::preprocessing::{
        ColumnTransformer, HandleUnknown, ImputeStrategy, OneHotEncoder, PipelineConfig,
        SimpleImputer, StandardScaler, Transformer,
    };

    pub use crate::artifact::{DataIngestionArtifact, DataTransformationArtifact, DataValidationArtifact};
    pub use crate::components::DataTransformation;
    pub use crate::config::{DataTransformationConfig, RunConfig};
    pub use crate::observe::{RecordingObserver, TracingObserver, TransformationEvent, TransformationObserver};
    pub use crate::schema::DatasetSchema;
    pub use crate::utils::io::ArrayFormat;
}
