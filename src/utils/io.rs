//! File I/O helpers: YAML, CSV tables, numeric arrays and serialized objects

use crate::error::{PrepError, Result};
use crate::schema::DatasetSchema;
use ndarray::Array2;
use ndarray_npy::{NpzReader, NpzWriter, ReadNpyExt, WriteNpyExt};
use polars::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Extension given to transformed array files
pub const ARRAY_FILE_EXTENSION: &str = "npz";

const NPZ_ARRAY_NAME: &str = "arr_0";

/// On-disk layout of a transformed array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayFormat {
    /// A single `.npy` payload
    #[default]
    Npy,
    /// A zip archive holding the array as `arr_0`
    Npz,
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        PrepError::IoError(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path).map_err(|e| {
        PrepError::IoError(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

/// Read a YAML file into any deserializable type
pub fn read_yaml_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        PrepError::IoError(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    serde_yaml::from_str(&text)
        .map_err(|e| PrepError::ConfigError(format!("{}: {}", path.display(), e)))
}

/// Load a CSV file with a header row, casting columns to the dtypes the
/// schema declares.
///
/// With `reject_undeclared`, any column the schema does not mention fails the
/// load; otherwise such columns are kept with their inferred dtype.
pub fn load_data(
    path: impl AsRef<Path>,
    schema: &DatasetSchema,
    reject_undeclared: bool,
) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = open(path)?;

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| PrepError::DataError(format!("{}: {}", path.display(), e)))?;

    let declared = schema.declared_columns();
    let mut undeclared = Vec::new();
    let mut casts = Vec::new();

    for column in df.get_columns() {
        let name = column.name().to_string();
        if !declared.contains(name.as_str()) {
            undeclared.push(name.clone());
        }
        if let Some(dtype) = schema.dtype_of(&name)? {
            if column.dtype() != &dtype {
                let casted = column.rechunk().strict_cast(&dtype).map_err(|e| {
                    PrepError::DataError(format!(
                        "{}: column '{}' does not parse as {}: {}",
                        path.display(),
                        name,
                        dtype,
                        e
                    ))
                })?;
                casts.push(casted);
            }
        }
    }

    if reject_undeclared && !undeclared.is_empty() {
        return Err(PrepError::SchemaError(format!(
            "{}: columns not in the schema: {}",
            path.display(),
            undeclared.join(", ")
        )));
    }

    for casted in casts {
        df.with_column(casted)?;
    }

    Ok(df)
}

/// Write a 2-D array, creating parent directories as needed
pub fn save_array(path: impl AsRef<Path>, array: &Array2<f64>, format: ArrayFormat) -> Result<()> {
    let mut writer = BufWriter::new(create(path.as_ref())?);
    match format {
        ArrayFormat::Npy => array.write_npy(&mut writer)?,
        ArrayFormat::Npz => {
            let mut npz = NpzWriter::new(&mut writer);
            npz.add_array(NPZ_ARRAY_NAME, array)?;
            npz.finish()?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Read an array written by [`save_array`] in either format
pub fn load_array(path: impl AsRef<Path>) -> Result<Array2<f64>> {
    let mut file = open(path.as_ref())?;

    let mut magic = [0u8; 2];
    file.read_exact(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    if &magic == b"PK" {
        let mut npz = NpzReader::new(BufReader::new(file))?;
        let name = npz
            .names()?
            .into_iter()
            .next()
            .ok_or_else(|| PrepError::SerializationError("empty npz archive".to_string()))?;
        Ok(npz.by_name(&name)?)
    } else {
        Ok(Array2::<f64>::read_npy(BufReader::new(file))?)
    }
}

/// Serialize an object with bincode, creating parent directories as needed
pub fn save_object<T: Serialize>(path: impl AsRef<Path>, obj: &T) -> Result<()> {
    let mut writer = BufWriter::new(create(path.as_ref())?);
    bincode::serialize_into(&mut writer, obj)?;
    writer.flush()?;
    Ok(())
}

/// Deserialize an object written by [`save_object`]
pub fn load_object<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let reader = BufReader::new(open(path.as_ref())?);
    Ok(bincode::deserialize_from(reader)?)
}
