//! Missing value imputation strategies

use super::Transformer;
use crate::error::{PrepError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for imputing missing numeric values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    /// Replace with mean
    Mean,
    /// Replace with median
    Median,
    /// Replace with mode / most frequent value
    MostFrequent,
    /// Replace with a constant value
    Constant(f64),
}

/// Imputer for numeric matrices. Missing values are `NaN`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
    statistics: Option<Array1<f64>>,
}

impl SimpleImputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            statistics: None,
        }
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }

    /// Learned fill value per column
    pub fn statistics(&self) -> Option<&Array1<f64>> {
        self.statistics.as_ref()
    }

    fn compute_fill_value(&self, column: ArrayView1<f64>, index: usize) -> Result<f64> {
        if let ImputeStrategy::Constant(value) = self.strategy {
            return Ok(value);
        }

        let mut observed: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
        if observed.is_empty() {
            return Err(PrepError::DataError(format!(
                "column {} has no observed values to impute from",
                index
            )));
        }

        match self.strategy {
            ImputeStrategy::Mean => Ok(observed.iter().sum::<f64>() / observed.len() as f64),
            ImputeStrategy::Median => {
                observed.sort_by(|a, b| a.total_cmp(b));
                let mid = observed.len() / 2;
                if observed.len() % 2 == 0 {
                    Ok((observed[mid - 1] + observed[mid]) / 2.0)
                } else {
                    Ok(observed[mid])
                }
            }
            ImputeStrategy::MostFrequent => {
                // Sorted run-length count; ties resolve to the smallest value
                observed.sort_by(|a, b| a.total_cmp(b));
                let mut best = observed[0];
                let mut best_count = 0usize;
                let mut run_start = 0usize;
                for i in 1..=observed.len() {
                    if i == observed.len() || observed[i] != observed[run_start] {
                        let count = i - run_start;
                        if count > best_count {
                            best = observed[run_start];
                            best_count = count;
                        }
                        run_start = i;
                    }
                }
                Ok(best)
            }
            ImputeStrategy::Constant(value) => Ok(value),
        }
    }
}

impl Transformer<Array2<f64>> for SimpleImputer {
    type Output = Array2<f64>;

    fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let statistics = x
            .axis_iter(Axis(1))
            .enumerate()
            .map(|(j, column)| self.compute_fill_value(column, j))
            .collect::<Result<Vec<_>>>()?;

        self.statistics = Some(Array1::from(statistics));
        Ok(self)
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let statistics = self.statistics.as_ref().ok_or(PrepError::ModelNotFitted)?;
        if x.ncols() != statistics.len() {
            return Err(PrepError::ShapeError {
                expected: format!("{} columns", statistics.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut result = x.clone();
        for (mut column, &fill) in result.axis_iter_mut(Axis(1)).zip(statistics.iter()) {
            column.mapv_inplace(|v| if v.is_nan() { fill } else { v });
        }
        Ok(result)
    }
}

/// Strategy for imputing missing categorical values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalStrategy {
    /// Replace with the most frequent category
    MostFrequent,
    /// Replace with a constant category
    Constant(String),
}

/// Imputer for string matrices. Missing values are `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalImputer {
    strategy: CategoricalStrategy,
    fill_values: Option<Vec<String>>,
}

impl CategoricalImputer {
    pub fn new(strategy: CategoricalStrategy) -> Self {
        Self {
            strategy,
            fill_values: None,
        }
    }

    pub fn strategy(&self) -> &CategoricalStrategy {
        &self.strategy
    }

    pub fn fill_values(&self) -> Option<&[String]> {
        self.fill_values.as_deref()
    }

    fn compute_mode(column: ArrayView1<Option<String>>, index: usize) -> Result<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in column.iter().flatten() {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }

        // BTreeMap iterates in order, so a strict comparison keeps the
        // lexicographically smallest category among ties
        let mut mode: Option<(&str, usize)> = None;
        for (category, count) in counts {
            if mode.map_or(true, |(_, best)| count > best) {
                mode = Some((category, count));
            }
        }

        mode.map(|(category, _)| category.to_string()).ok_or_else(|| {
            PrepError::DataError(format!(
                "column {} has no observed categories to impute from",
                index
            ))
        })
    }
}

impl Transformer<Array2<Option<String>>> for CategoricalImputer {
    type Output = Array2<String>;

    fn fit(&mut self, x: &Array2<Option<String>>) -> Result<&mut Self> {
        let fill_values = match &self.strategy {
            CategoricalStrategy::Constant(value) => vec![value.clone(); x.ncols()],
            CategoricalStrategy::MostFrequent => x
                .axis_iter(Axis(1))
                .enumerate()
                .map(|(j, column)| Self::compute_mode(column, j))
                .collect::<Result<Vec<_>>>()?,
        };

        self.fill_values = Some(fill_values);
        Ok(self)
    }

    fn transform(&self, x: &Array2<Option<String>>) -> Result<Array2<String>> {
        let fill_values = self.fill_values.as_ref().ok_or(PrepError::ModelNotFitted)?;
        if x.ncols() != fill_values.len() {
            return Err(PrepError::ShapeError {
                expected: format!("{} columns", fill_values.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        Ok(Array2::from_shape_fn(x.dim(), |(i, j)| {
            x[[i, j]].clone().unwrap_or_else(|| fill_values[j].clone())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_imputer_not_fitted() {
        let imputer = SimpleImputer::new(ImputeStrategy::Mean);
        let x: Array2<f64> = array![[1.0]];
        assert!(matches!(imputer.transform(&x), Err(PrepError::ModelNotFitted)));
    }

    #[test]
    fn test_impute_strategy_serialize() {
        let strategy = ImputeStrategy::Constant(5.0);
        let json = serde_json::to_string(&strategy).unwrap();
        assert!(json.contains("Constant"));
        assert!(json.contains("5"));
    }

    #[test]
    fn test_mean_imputation() {
        let x: Array2<f64> = array![[1.0], [f64::NAN], [3.0], [4.0]];
        let mut imputer = SimpleImputer::new(ImputeStrategy::Mean);
        let result = imputer.fit_transform(&x).unwrap();

        // Mean of [1, 3, 4] = 8/3
        assert!((result[[1, 0]] - 2.666666666666667).abs() < 0.001);
    }

    #[test]
    fn test_median_imputation_even_count() {
        let x: Array2<f64> = array![[4.0], [f64::NAN], [1.0], [3.0], [10.0]];
        let mut imputer = SimpleImputer::new(ImputeStrategy::Median);
        imputer.fit(&x).unwrap();

        assert_eq!(imputer.statistics().unwrap()[0], 3.5);
    }

    #[test]
    fn test_most_frequent_breaks_ties_low() {
        let x: Array2<f64> = array![[2.0], [7.0], [7.0], [2.0], [f64::NAN]];
        let mut imputer = SimpleImputer::new(ImputeStrategy::MostFrequent);
        let result = imputer.fit_transform(&x).unwrap();

        assert_eq!(result[[4, 0]], 2.0);
    }

    #[test]
    fn test_all_missing_column_fails() {
        let x: Array2<f64> = array![[1.0, f64::NAN], [2.0, f64::NAN]];
        let mut imputer = SimpleImputer::new(ImputeStrategy::Median);
        assert!(matches!(imputer.fit(&x), Err(PrepError::DataError(_))));
    }

    #[test]
    fn test_width_mismatch_is_shape_error() {
        let mut imputer = SimpleImputer::new(ImputeStrategy::Median);
        imputer.fit(&array![[1.0, 2.0]]).unwrap();
        let err = imputer.transform(&array![[1.0]]).unwrap_err();
        assert!(matches!(err, PrepError::ShapeError { .. }));
    }

    #[test]
    fn test_categorical_most_frequent() {
        let x = Array2::from_shape_vec(
            (5, 1),
            vec![
                Some("INLAND".to_string()),
                None,
                Some("NEAR BAY".to_string()),
                Some("INLAND".to_string()),
                Some("NEAR BAY".to_string()),
            ],
        )
        .unwrap();

        let mut imputer = CategoricalImputer::new(CategoricalStrategy::MostFrequent);
        let result = imputer.fit_transform(&x).unwrap();

        // Tie between INLAND and NEAR BAY resolves to INLAND
        assert_eq!(result[[1, 0]], "INLAND");
        assert_eq!(result[[2, 0]], "NEAR BAY");
    }

    #[test]
    fn test_categorical_constant() {
        let x = Array2::from_shape_vec((2, 1), vec![None, Some("ISLAND".to_string())]).unwrap();
        let mut imputer =
            CategoricalImputer::new(CategoricalStrategy::Constant("missing".to_string()));
        let result = imputer.fit_transform(&x).unwrap();

        assert_eq!(result[[0, 0]], "missing");
        assert_eq!(result[[1, 0]], "ISLAND");
    }
}
