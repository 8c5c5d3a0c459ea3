//! Ratio feature generation

use crate::error::{PrepError, Result};
use crate::preprocessing::Transformer;
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};

pub const COLUMN_TOTAL_ROOMS: &str = "total_rooms";
pub const COLUMN_POPULATION: &str = "population";
pub const COLUMN_HOUSEHOLDS: &str = "households";
pub const COLUMN_TOTAL_BEDROOMS: &str = "total_bedrooms";

/// Positions of the source columns the ratios are computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureIndices {
    pub total_rooms: usize,
    pub population: usize,
    pub households: usize,
    pub total_bedrooms: usize,
}

impl Default for FeatureIndices {
    /// Positions in the raw California housing layout
    fn default() -> Self {
        Self {
            total_rooms: 3,
            population: 5,
            households: 6,
            total_bedrooms: 4,
        }
    }
}

impl FeatureIndices {
    /// Resolve indices by looking the required names up in `columns`
    pub fn resolve(columns: &[String]) -> Result<Self> {
        let position = |name: &str| {
            columns.iter().position(|c| c == name).ok_or_else(|| {
                PrepError::ConfigError(format!(
                    "required column '{}' not found in {:?}",
                    name, columns
                ))
            })
        };

        Ok(Self {
            total_rooms: position(COLUMN_TOTAL_ROOMS)?,
            population: position(COLUMN_POPULATION)?,
            households: position(COLUMN_HOUSEHOLDS)?,
            total_bedrooms: position(COLUMN_TOTAL_BEDROOMS)?,
        })
    }
}

/// Appends `rooms_per_household`, `population_per_household` and optionally
/// `bedrooms_per_room` to a numeric matrix.
///
/// Nothing is learned during fit. Division follows IEEE semantics, so a zero
/// household count yields `inf` or `NaN` rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureGenerator {
    add_bedrooms_per_room: bool,
    indices: FeatureIndices,
    columns: Option<Vec<String>>,
}

impl FeatureGenerator {
    /// Create a generator over fixed column positions
    pub fn new(add_bedrooms_per_room: bool, indices: FeatureIndices) -> Self {
        Self {
            add_bedrooms_per_room,
            indices,
            columns: None,
        }
    }

    /// Create a generator whose positions are resolved from column names.
    /// Fails if any required column is missing from `columns`.
    pub fn from_columns(add_bedrooms_per_room: bool, columns: &[String]) -> Result<Self> {
        let indices = FeatureIndices::resolve(columns)?;
        Ok(Self {
            add_bedrooms_per_room,
            indices,
            columns: Some(columns.to_vec()),
        })
    }

    pub fn add_bedrooms_per_room(&self) -> bool {
        self.add_bedrooms_per_room
    }

    pub fn indices(&self) -> FeatureIndices {
        self.indices
    }

    /// Column names the indices were resolved from, if any
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    /// Number of columns `transform` appends
    pub fn n_derived(&self) -> usize {
        if self.add_bedrooms_per_room { 3 } else { 2 }
    }

    /// Names of the appended columns, in output order
    pub fn derived_names(&self) -> Vec<String> {
        let mut names = vec![
            "rooms_per_household".to_string(),
            "population_per_household".to_string(),
        ];
        if self.add_bedrooms_per_room {
            names.push("bedrooms_per_room".to_string());
        }
        names
    }

    /// Input names followed by the derived names
    pub fn feature_names_out(&self, input: &[String]) -> Vec<String> {
        input.iter().cloned().chain(self.derived_names()).collect()
    }

    fn check_bounds(&self, ncols: usize) -> Result<()> {
        let mut used = vec![
            self.indices.total_rooms,
            self.indices.population,
            self.indices.households,
        ];
        if self.add_bedrooms_per_room {
            used.push(self.indices.total_bedrooms);
        }

        match used.into_iter().find(|&index| index >= ncols) {
            Some(index) => Err(PrepError::IndexOutOfBounds { index, ncols }),
            None => Ok(()),
        }
    }
}

impl Default for FeatureGenerator {
    fn default() -> Self {
        Self::new(true, FeatureIndices::default())
    }
}

impl Transformer<Array2<f64>> for FeatureGenerator {
    type Output = Array2<f64>;

    fn fit(&mut self, _x: &Array2<f64>) -> Result<&mut Self> {
        Ok(self)
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_bounds(x.ncols())?;

        let rooms = x.column(self.indices.total_rooms);
        let population = x.column(self.indices.population);
        let households = x.column(self.indices.households);

        let mut derived: Vec<Array1<f64>> = vec![&rooms / &households, &population / &households];
        if self.add_bedrooms_per_room {
            let bedrooms = x.column(self.indices.total_bedrooms);
            derived.push(&bedrooms / &rooms);
        }

        let ncols = x.ncols();
        let mut result = Array2::<f64>::zeros((x.nrows(), ncols + derived.len()));
        result.slice_mut(s![.., ..ncols]).assign(x);
        for (k, column) in derived.iter().enumerate() {
            result.column_mut(ncols + k).assign(column);
        }

        Ok(result)
    }
}
