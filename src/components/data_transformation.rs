//! Data transformation stage
//!
//! Fits the column transformer on the training split, applies it to the test
//! split, appends the target column and writes both arrays plus the fitted
//! transformer to disk.

use crate::artifact::{DataIngestionArtifact, DataTransformationArtifact, DataValidationArtifact};
use crate::config::DataTransformationConfig;
use crate::error::{PrepError, Result, Stage, StageExt};
use crate::observe::{Split, TracingObserver, TransformationEvent, TransformationObserver};
use crate::preprocessing::{ColumnTransformer, Transformer};
use crate::schema::DatasetSchema;
use crate::utils::io::{load_data, save_array, ARRAY_FILE_EXTENSION};
use ndarray::{concatenate, Array1, Array2, Axis};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Message stored in a successful artifact
pub const TRANSFORMATION_COMPLETED: &str = "Data transformation completed";

/// Transformation stage of the housing pipeline
pub struct DataTransformation {
    config: DataTransformationConfig,
    ingestion_artifact: DataIngestionArtifact,
    validation_artifact: DataValidationArtifact,
    observer: Arc<dyn TransformationObserver>,
}

impl DataTransformation {
    pub fn new(
        config: DataTransformationConfig,
        ingestion_artifact: DataIngestionArtifact,
        validation_artifact: DataValidationArtifact,
    ) -> Self {
        Self {
            config,
            ingestion_artifact,
            validation_artifact,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the default tracing observer
    pub fn with_observer(mut self, observer: Arc<dyn TransformationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &DataTransformationConfig {
        &self.config
    }

    fn emit(&self, event: TransformationEvent) {
        self.observer.on_event(&event);
    }

    fn read_schema(&self) -> Result<DatasetSchema> {
        DatasetSchema::from_yaml_file(&self.validation_artifact.schema_file_path)
            .stage(Stage::SchemaRead)
    }

    /// Build the unfitted column transformer described by the schema
    pub fn get_data_transformer_object(&self) -> Result<ColumnTransformer> {
        let schema = self.read_schema()?;

        self.emit(TransformationEvent::SchemaLoaded {
            numerical_columns: schema.numerical_columns.clone(),
            categorical_columns: schema.categorical_columns.clone(),
            target_column: schema.target_column.clone(),
        });

        ColumnTransformer::from_schema(&schema, &self.config.pipeline_config())
            .stage(Stage::PipelineBuild)
    }

    /// Run the stage end to end
    pub fn initiate_data_transformation(&self) -> Result<DataTransformationArtifact> {
        self.emit(TransformationEvent::StageStarted(Stage::PipelineBuild));
        let mut preprocessing = self.get_data_transformer_object()?;

        let train_file_path = &self.ingestion_artifact.train_file_path;
        let test_file_path = &self.ingestion_artifact.test_file_path;

        // Second read for the target name; the transformer only keeps column lists
        let schema = self.read_schema()?;

        self.emit(TransformationEvent::StageStarted(Stage::Load));
        let train_df = self.load_split(Split::Train, train_file_path, &schema)?;
        let test_df = self.load_split(Split::Test, test_file_path, &schema)?;

        self.emit(TransformationEvent::StageStarted(Stage::Split));
        let target_column = &schema.target_column;
        let (input_train, target_train) =
            split_target(&train_df, target_column).stage(Stage::Split)?;
        let (input_test, target_test) = split_target(&test_df, target_column).stage(Stage::Split)?;

        for (split, df) in [(Split::Train, &input_train), (Split::Test, &input_test)] {
            let columns = preprocessing.remainder_columns(df);
            if !columns.is_empty() {
                self.emit(TransformationEvent::ColumnsDropped { split, columns });
            }
        }

        self.emit(TransformationEvent::StageStarted(Stage::Fit));
        let input_train_arr = preprocessing.fit_transform(&input_train).stage(Stage::Fit)?;
        self.emit(TransformationEvent::Fitted {
            features_out: input_train_arr.ncols(),
        });

        self.emit(TransformationEvent::StageStarted(Stage::Transform));
        let input_test_arr = preprocessing.transform(&input_test).stage(Stage::Transform)?;

        let train_arr = append_target(input_train_arr, &target_train).stage(Stage::Transform)?;
        let test_arr = append_target(input_test_arr, &target_test).stage(Stage::Transform)?;

        self.emit(TransformationEvent::StageStarted(Stage::Save));
        let transformed_train_file_path = self
            .save_split(Split::Train, train_file_path, &self.config.transformed_train_dir, &train_arr)?;
        let transformed_test_file_path = self
            .save_split(Split::Test, test_file_path, &self.config.transformed_test_dir, &test_arr)?;

        let preprocessed_object_file_path = self.config.preprocessed_object_file_path.clone();
        preprocessing
            .save(&preprocessed_object_file_path)
            .stage(Stage::Save)?;
        self.emit(TransformationEvent::ObjectSaved {
            path: preprocessed_object_file_path.clone(),
        });

        let artifact = DataTransformationArtifact {
            transformed_train_file_path,
            transformed_test_file_path,
            preprocessed_object_file_path,
            is_transformed: true,
            message: TRANSFORMATION_COMPLETED.to_string(),
        };
        self.emit(TransformationEvent::Completed(artifact.clone()));
        Ok(artifact)
    }

    fn load_split(&self, split: Split, path: &Path, schema: &DatasetSchema) -> Result<DataFrame> {
        let df = load_data(path, schema, self.config.reject_undeclared_columns).stage(Stage::Load)?;
        self.emit(TransformationEvent::DataLoaded {
            split,
            path: path.to_path_buf(),
            rows: df.height(),
            columns: df.width(),
        });
        Ok(df)
    }

    fn save_split(
        &self,
        split: Split,
        source: &Path,
        dir: &Path,
        array: &Array2<f64>,
    ) -> Result<PathBuf> {
        let path = dir.join(array_file_name(source).stage(Stage::Save)?);
        save_array(&path, array, self.config.array_format).stage(Stage::Save)?;
        self.emit(TransformationEvent::ArraySaved {
            split,
            path: path.clone(),
            rows: array.nrows(),
            columns: array.ncols(),
        });
        Ok(path)
    }
}

/// Source base name with its extension replaced by the array extension
pub fn array_file_name(source: &Path) -> Result<PathBuf> {
    let name = source.file_name().ok_or_else(|| {
        PrepError::ConfigError(format!("'{}' has no file name", source.display()))
    })?;
    Ok(Path::new(name).with_extension(ARRAY_FILE_EXTENSION))
}

/// Separate the target column from the input features
pub fn split_target(df: &DataFrame, target_column: &str) -> Result<(DataFrame, Array1<f64>)> {
    let target = df
        .column(target_column)
        .map_err(|_| PrepError::FeatureNotFound(target_column.to_string()))?
        .strict_cast(&DataType::Float64)
        .map_err(|e| {
            PrepError::DataError(format!(
                "target column '{}' is not numeric: {}",
                target_column, e
            ))
        })?;

    let values: Array1<f64> = target
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();

    let inputs = df.drop(target_column)?;
    Ok((inputs, values))
}

/// Append the target as the last column
pub fn append_target(features: Array2<f64>, target: &Array1<f64>) -> Result<Array2<f64>> {
    if features.nrows() != target.len() {
        return Err(PrepError::ShapeError {
            expected: format!("{} target values", features.nrows()),
            actual: format!("{} target values", target.len()),
        });
    }

    Ok(concatenate(
        Axis(1),
        &[features.view(), target.view().insert_axis(Axis(1))],
    )?)
}
