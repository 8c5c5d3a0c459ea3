//! Feature engineering module
//!
//! Derived ratio features for the housing dataset.

mod generator;

pub use generator::{
    FeatureGenerator, FeatureIndices, COLUMN_HOUSEHOLDS, COLUMN_POPULATION,
    COLUMN_TOTAL_BEDROOMS, COLUMN_TOTAL_ROOMS,
};
