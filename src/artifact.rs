//! Records passed between pipeline stages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Output of the ingestion stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataIngestionArtifact {
    pub train_file_path: PathBuf,
    pub test_file_path: PathBuf,
}

/// Output of the validation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValidationArtifact {
    pub schema_file_path: PathBuf,
}

/// Output of the transformation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTransformationArtifact {
    pub transformed_train_file_path: PathBuf,
    pub transformed_test_file_path: PathBuf,
    pub preprocessed_object_file_path: PathBuf,
    pub is_transformed: bool,
    pub message: String,
}

impl fmt::Display for DataTransformationArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (train: {}, test: {}, object: {})",
            self.message,
            self.transformed_train_file_path.display(),
            self.transformed_test_file_path.display(),
            self.preprocessed_object_file_path.display()
        )
    }
}
