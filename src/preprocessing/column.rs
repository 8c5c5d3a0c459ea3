//! Column transformer: routes named columns to per-type pipelines

use super::{
    CategoricalImputer, OneHotEncoder, Pipeline, PipelineConfig, SimpleImputer, StandardScaler,
    Transformer,
};
use crate::error::{PrepError, Result};
use crate::feature_engineering::FeatureGenerator;
use crate::schema::DatasetSchema;
use crate::utils::io::{load_object, save_object};
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Median impute, derive ratio features, standard scale
pub type NumericPipeline = Pipeline<Pipeline<SimpleImputer, FeatureGenerator>, StandardScaler>;

/// Most-frequent impute, one-hot encode, scale without centering
pub type CategoricalPipeline =
    Pipeline<Pipeline<CategoricalImputer, OneHotEncoder>, StandardScaler>;

/// Applies the numeric pipeline to the numeric columns and the categorical
/// pipeline to the categorical columns, then concatenates both outputs.
///
/// Columns named in neither list are dropped. Use
/// [`ColumnTransformer::remainder_columns`] to see which ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    num_pipeline: NumericPipeline,
    cat_pipeline: CategoricalPipeline,
    is_fitted: bool,
}

impl ColumnTransformer {
    /// Assemble a transformer from prebuilt pipelines
    pub fn new(
        numeric_columns: Vec<String>,
        categorical_columns: Vec<String>,
        num_pipeline: NumericPipeline,
        cat_pipeline: CategoricalPipeline,
    ) -> Self {
        Self {
            numeric_columns,
            categorical_columns,
            num_pipeline,
            cat_pipeline,
            is_fitted: false,
        }
    }

    /// Build both pipelines from the schema's column lists
    pub fn from_schema(schema: &DatasetSchema, config: &PipelineConfig) -> Result<Self> {
        let generator =
            FeatureGenerator::from_columns(config.add_bedrooms_per_room, &schema.numerical_columns)?;

        let num_pipeline = Pipeline::new(
            SimpleImputer::new(config.numeric_impute_strategy.clone()),
            generator,
        )
        .then(StandardScaler::new());

        let cat_pipeline = Pipeline::new(
            CategoricalImputer::new(config.categorical_impute_strategy.clone()),
            OneHotEncoder::new(config.handle_unknown)
                .with_feature_names(schema.categorical_columns.clone()),
        )
        .then(StandardScaler::without_mean());

        Ok(Self::new(
            schema.numerical_columns.clone(),
            schema.categorical_columns.clone(),
            num_pipeline,
            cat_pipeline,
        ))
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    pub fn num_pipeline(&self) -> &NumericPipeline {
        &self.num_pipeline
    }

    pub fn cat_pipeline(&self) -> &CategoricalPipeline {
        &self.cat_pipeline
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Columns of `df` that neither pipeline consumes
    pub fn remainder_columns(&self, df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .filter(|name| {
                !self.numeric_columns.contains(name) && !self.categorical_columns.contains(name)
            })
            .collect()
    }

    /// Names of the output columns in order
    pub fn feature_names_out(&self) -> Result<Vec<String>> {
        if !self.is_fitted {
            return Err(PrepError::ModelNotFitted);
        }
        let generator = self.num_pipeline.first().second();
        let encoder = self.cat_pipeline.first().second();

        let mut names = generator.feature_names_out(&self.numeric_columns);
        names.extend(encoder.feature_names_out()?);
        Ok(names)
    }

    /// Number of output columns
    pub fn n_features_out(&self) -> Result<usize> {
        self.feature_names_out().map(|names| names.len())
    }

    /// Persist the transformer with bincode
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_object(path, self)
    }

    /// Load a transformer written by [`ColumnTransformer::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_object(path)
    }

    fn numeric_matrix(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let mut result = Array2::from_elem((df.height(), self.numeric_columns.len()), f64::NAN);

        for (j, name) in self.numeric_columns.iter().enumerate() {
            let column = df
                .column(name)
                .map_err(|_| PrepError::FeatureNotFound(name.clone()))?;
            let casted = column.strict_cast(&DataType::Float64).map_err(|e| {
                PrepError::DataError(format!("column '{}' is not numeric: {}", name, e))
            })?;
            for (i, value) in casted.f64()?.into_iter().enumerate() {
                if let Some(v) = value {
                    result[[i, j]] = v;
                }
            }
        }

        Ok(result)
    }

    fn categorical_matrix(&self, df: &DataFrame) -> Result<Array2<Option<String>>> {
        let mut result = Array2::from_elem((df.height(), self.categorical_columns.len()), None);

        for (j, name) in self.categorical_columns.iter().enumerate() {
            let column = df
                .column(name)
                .map_err(|_| PrepError::FeatureNotFound(name.clone()))?;
            let casted = column.cast(&DataType::String)?;
            for (i, value) in casted.str()?.into_iter().enumerate() {
                result[[i, j]] = value.map(str::to_string);
            }
        }

        Ok(result)
    }

    fn hstack(numeric: Array2<f64>, categorical: Array2<f64>) -> Result<Array2<f64>> {
        Ok(concatenate(Axis(1), &[numeric.view(), categorical.view()])?)
    }
}

impl Transformer<DataFrame> for ColumnTransformer {
    type Output = Array2<f64>;

    fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let numeric = self.numeric_matrix(df)?;
        let categorical = self.categorical_matrix(df)?;

        self.num_pipeline.fit(&numeric)?;
        self.cat_pipeline.fit(&categorical)?;

        self.is_fitted = true;
        Ok(self)
    }

    fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PrepError::ModelNotFitted);
        }

        let numeric = self.num_pipeline.transform(&self.numeric_matrix(df)?)?;
        let categorical = self.cat_pipeline.transform(&self.categorical_matrix(df)?)?;
        Self::hstack(numeric, categorical)
    }

    fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        let numeric = self.num_pipeline.fit_transform(&self.numeric_matrix(df)?)?;
        let categorical = self.cat_pipeline.fit_transform(&self.categorical_matrix(df)?)?;

        self.is_fitted = true;
        Self::hstack(numeric, categorical)
    }
}
