//! Preprocessing configuration

use serde::{Deserialize, Serialize};
use super::{CategoricalStrategy, HandleUnknown, ImputeStrategy};

/// Configuration for the numeric and categorical branches of the column
/// transformer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Strategy for handling missing numeric values
    pub numeric_impute_strategy: ImputeStrategy,

    /// Strategy for handling missing categorical values
    pub categorical_impute_strategy: CategoricalStrategy,

    /// Whether the feature generator appends `bedrooms_per_room`
    pub add_bedrooms_per_room: bool,

    /// Policy for categories first seen after fit
    pub handle_unknown: HandleUnknown,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            numeric_impute_strategy: ImputeStrategy::Median,
            categorical_impute_strategy: CategoricalStrategy::MostFrequent,
            add_bedrooms_per_room: true,
            handle_unknown: HandleUnknown::Ignore,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set numeric impute strategy
    pub fn with_numeric_impute(mut self, strategy: ImputeStrategy) -> Self {
        self.numeric_impute_strategy = strategy;
        self
    }

    /// Builder method to set categorical impute strategy
    pub fn with_categorical_impute(mut self, strategy: CategoricalStrategy) -> Self {
        self.categorical_impute_strategy = strategy;
        self
    }

    /// Builder method to toggle the bedrooms-per-room feature
    pub fn with_bedrooms_per_room(mut self, enabled: bool) -> Self {
        self.add_bedrooms_per_room = enabled;
        self
    }

    /// Builder method to set the unknown-category policy
    pub fn with_handle_unknown(mut self, policy: HandleUnknown) -> Self {
        self.handle_unknown = policy;
        self
    }
}
