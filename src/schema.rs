//! Dataset schema: column roles, target and declared dtypes

use crate::error::{PrepError, Result};
use crate::utils::io::read_yaml_file;
use polars::prelude::DataType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Schema file contents.
///
/// `numerical_columns`, `categorical_columns` and `target_column` are
/// required; `columns` maps column names to dtype names for load-time
/// coercion and `domain_value` lists allowed categories for validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    pub numerical_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub target_column: String,
    #[serde(default)]
    pub domain_value: BTreeMap<String, Vec<String>>,
}

impl DatasetSchema {
    /// Read and validate a schema file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let schema: Self = read_yaml_file(path)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Parse and validate a schema from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let schema: Self = serde_yaml::from_str(yaml)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Check that the column roles are consistent
    pub fn validate(&self) -> Result<()> {
        if self.target_column.trim().is_empty() {
            return Err(PrepError::SchemaError("target_column is empty".to_string()));
        }

        let mut seen = BTreeSet::new();
        for name in self.numerical_columns.iter().chain(&self.categorical_columns) {
            if !seen.insert(name.as_str()) {
                return Err(PrepError::SchemaError(format!(
                    "column '{}' is listed more than once",
                    name
                )));
            }
        }

        if seen.contains(self.target_column.as_str()) {
            return Err(PrepError::SchemaError(format!(
                "target column '{}' is also listed as a feature",
                self.target_column
            )));
        }

        for dtype in self.columns.values() {
            parse_dtype(dtype)?;
        }

        Ok(())
    }

    /// Every column the schema mentions
    pub fn declared_columns(&self) -> BTreeSet<&str> {
        self.columns
            .keys()
            .chain(&self.numerical_columns)
            .chain(&self.categorical_columns)
            .map(String::as_str)
            .chain(std::iter::once(self.target_column.as_str()))
            .collect()
    }

    /// Declared polars dtype for a column, if the schema lists one
    pub fn dtype_of(&self, column: &str) -> Result<Option<DataType>> {
        self.columns.get(column).map(|d| parse_dtype(d)).transpose()
    }
}

/// Map a schema dtype name to a polars dtype
pub fn parse_dtype(name: &str) -> Result<DataType> {
    match name.trim().to_ascii_lowercase().as_str() {
        "float" | "float64" | "double" => Ok(DataType::Float64),
        "int" | "int64" | "integer" => Ok(DataType::Int64),
        "object" | "str" | "string" | "category" => Ok(DataType::String),
        "bool" | "boolean" => Ok(DataType::Boolean),
        other => Err(PrepError::SchemaError(format!("unsupported dtype '{}'", other))),
    }
}
