//! Categorical encoding

use super::Transformer;
use crate::error::{PrepError, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What to do with a category that was not seen during fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    /// Fail the transform
    Error,
    /// Encode as an all-zero indicator block
    #[default]
    Ignore,
}

/// One-hot encoder over string matrices.
///
/// Categories are learned per column and kept sorted, so the output column
/// order does not depend on row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    handle_unknown: HandleUnknown,
    feature_names_in: Option<Vec<String>>,
    categories: Option<Vec<Vec<String>>>,
}

impl OneHotEncoder {
    pub fn new(handle_unknown: HandleUnknown) -> Self {
        Self {
            handle_unknown,
            feature_names_in: None,
            categories: None,
        }
    }

    /// Set input feature names, used in output names and error messages
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names_in = Some(names);
        self
    }

    pub fn handle_unknown(&self) -> HandleUnknown {
        self.handle_unknown
    }

    /// Learned categories per input column
    pub fn categories(&self) -> Option<&[Vec<String>]> {
        self.categories.as_deref()
    }

    /// Number of output columns
    pub fn n_features_out(&self) -> Option<usize> {
        self.categories
            .as_ref()
            .map(|cats| cats.iter().map(Vec::len).sum())
    }

    /// Output column names: `<input>_<category>`
    pub fn feature_names_out(&self) -> Result<Vec<String>> {
        let categories = self.categories.as_ref().ok_or(PrepError::ModelNotFitted)?;

        Ok(categories
            .iter()
            .enumerate()
            .flat_map(|(j, cats)| {
                let input = self.input_name(j);
                cats.iter().map(move |cat| format!("{}_{}", input, cat))
            })
            .collect())
    }

    fn input_name(&self, index: usize) -> String {
        self.feature_names_in
            .as_ref()
            .and_then(|names| names.get(index).cloned())
            .unwrap_or_else(|| format!("x{}", index))
    }
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new(HandleUnknown::default())
    }
}

impl Transformer<Array2<String>> for OneHotEncoder {
    type Output = Array2<f64>;

    fn fit(&mut self, x: &Array2<String>) -> Result<&mut Self> {
        let categories = x
            .axis_iter(Axis(1))
            .map(|column| {
                column
                    .iter()
                    .cloned()
                    .collect::<BTreeSet<String>>()
                    .into_iter()
                    .collect::<Vec<_>>()
            })
            .collect();

        self.categories = Some(categories);
        Ok(self)
    }

    fn transform(&self, x: &Array2<String>) -> Result<Array2<f64>> {
        let categories = self.categories.as_ref().ok_or(PrepError::ModelNotFitted)?;
        if x.ncols() != categories.len() {
            return Err(PrepError::ShapeError {
                expected: format!("{} columns", categories.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let width: usize = categories.iter().map(Vec::len).sum();
        let mut result = Array2::<f64>::zeros((x.nrows(), width));

        let mut offset = 0;
        for (j, cats) in categories.iter().enumerate() {
            for (i, value) in x.column(j).iter().enumerate() {
                match cats.binary_search(value) {
                    Ok(k) => result[[i, offset + k]] = 1.0,
                    Err(_) if self.handle_unknown == HandleUnknown::Ignore => {}
                    Err(_) => {
                        return Err(PrepError::UnknownCategory {
                            column: self.input_name(j),
                            category: value.clone(),
                        })
                    }
                }
            }
            offset += cats.len();
        }

        Ok(result)
    }
}
