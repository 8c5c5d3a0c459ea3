//! Utility functions and types

pub mod io;

pub use io::{
    load_array, load_data, load_object, read_yaml_file, save_array, save_object, ArrayFormat,
    ARRAY_FILE_EXTENSION,
};
