//! Data preprocessing module
//!
//! Provides the estimator primitives the housing pipeline is assembled from:
//! - Missing value imputation (numeric and categorical)
//! - Standard scaling, with or without centering
//! - One-hot encoding of categorical columns
//! - Generic two-step pipeline composition
//! - A column transformer routing named columns to per-type pipelines

mod config;
mod imputer;
mod scaler;
mod encoder;
mod pipeline;
pub mod column;

pub use config::PipelineConfig;
pub use imputer::{CategoricalImputer, CategoricalStrategy, ImputeStrategy, SimpleImputer};
pub use scaler::StandardScaler;
pub use encoder::{HandleUnknown, OneHotEncoder};
pub use pipeline::Pipeline;
pub use column::{CategoricalPipeline, ColumnTransformer, NumericPipeline};

use crate::error::Result;

/// Fit/transform contract shared by every estimator in the crate.
///
/// `fit` learns whatever state the estimator needs and hands back the
/// estimator so calls can be chained; `transform` applies the learned state
/// without modifying it.
pub trait Transformer<In: ?Sized> {
    /// Type produced by `transform`
    type Output;

    /// Fit the transformer
    fn fit(&mut self, x: &In) -> Result<&mut Self>;

    /// Transform data with the fitted state
    fn transform(&self, x: &In) -> Result<Self::Output>;

    /// Fit and transform in one step
    fn fit_transform(&mut self, x: &In) -> Result<Self::Output> {
        self.fit(x)?;
        self.transform(x)
    }
}
