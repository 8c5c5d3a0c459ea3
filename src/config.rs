//! Component configuration and run configuration

use crate::artifact::{DataIngestionArtifact, DataValidationArtifact};
use crate::error::Result;
use crate::preprocessing::{CategoricalStrategy, HandleUnknown, ImputeStrategy, PipelineConfig};
use crate::utils::io::{read_yaml_file, ArrayFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_true() -> bool {
    true
}

fn default_numeric_impute() -> ImputeStrategy {
    ImputeStrategy::Median
}

fn default_categorical_impute() -> CategoricalStrategy {
    CategoricalStrategy::MostFrequent
}

/// Where and how the data transformation stage writes its outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTransformationConfig {
    /// Directory for the transformed training array
    pub transformed_train_dir: PathBuf,

    /// Directory for the transformed test array
    pub transformed_test_dir: PathBuf,

    /// File the fitted transformer is written to
    pub preprocessed_object_file_path: PathBuf,

    #[serde(default = "default_true")]
    pub add_bedrooms_per_room: bool,

    #[serde(default)]
    pub handle_unknown: HandleUnknown,

    #[serde(default = "default_numeric_impute")]
    pub numeric_impute_strategy: ImputeStrategy,

    #[serde(default = "default_categorical_impute")]
    pub categorical_impute_strategy: CategoricalStrategy,

    #[serde(default)]
    pub array_format: ArrayFormat,

    /// Fail the load when a table has columns the schema does not mention
    #[serde(default)]
    pub reject_undeclared_columns: bool,
}

impl DataTransformationConfig {
    /// Create a configuration with default options
    pub fn new(
        transformed_train_dir: impl Into<PathBuf>,
        transformed_test_dir: impl Into<PathBuf>,
        preprocessed_object_file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transformed_train_dir: transformed_train_dir.into(),
            transformed_test_dir: transformed_test_dir.into(),
            preprocessed_object_file_path: preprocessed_object_file_path.into(),
            add_bedrooms_per_room: true,
            handle_unknown: HandleUnknown::default(),
            numeric_impute_strategy: default_numeric_impute(),
            categorical_impute_strategy: default_categorical_impute(),
            array_format: ArrayFormat::default(),
            reject_undeclared_columns: false,
        }
    }

    /// Lay the outputs out under one root, as `train/`, `test/` and
    /// `preprocessed/preprocessed.bin`
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(
            root.join("train"),
            root.join("test"),
            root.join("preprocessed").join("preprocessed.bin"),
        )
    }

    pub fn with_bedrooms_per_room(mut self, enabled: bool) -> Self {
        self.add_bedrooms_per_room = enabled;
        self
    }

    pub fn with_handle_unknown(mut self, policy: HandleUnknown) -> Self {
        self.handle_unknown = policy;
        self
    }

    pub fn with_numeric_impute(mut self, strategy: ImputeStrategy) -> Self {
        self.numeric_impute_strategy = strategy;
        self
    }

    pub fn with_categorical_impute(mut self, strategy: CategoricalStrategy) -> Self {
        self.categorical_impute_strategy = strategy;
        self
    }

    pub fn with_array_format(mut self, format: ArrayFormat) -> Self {
        self.array_format = format;
        self
    }

    pub fn with_reject_undeclared_columns(mut self, reject: bool) -> Self {
        self.reject_undeclared_columns = reject;
        self
    }

    /// Pipeline options derived from this configuration
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_bedrooms_per_room(self.add_bedrooms_per_room)
            .with_handle_unknown(self.handle_unknown)
            .with_numeric_impute(self.numeric_impute_strategy.clone())
            .with_categorical_impute(self.categorical_impute_strategy.clone())
    }
}

/// Everything the `transform` command needs, read from one YAML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub data_transformation_config: DataTransformationConfig,
    pub data_ingestion_artifact: DataIngestionArtifact,
    pub data_validation_artifact: DataValidationArtifact,
}

impl RunConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        read_yaml_file(path)
    }
}
