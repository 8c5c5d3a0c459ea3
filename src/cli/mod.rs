//! Housing Prep CLI Module
//!
//! Command-line interface for running the transformation stage and for
//! reusing a persisted preprocessing object.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::components::DataTransformation;
use crate::config::RunConfig;
use crate::preprocessing::{ColumnTransformer, Transformer};
use crate::schema::DatasetSchema;
use crate::utils::io::{load_data, save_array, ArrayFormat};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "housing-prep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Feature engineering for housing-price data")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Array layout accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Npy,
    Npz,
}

impl From<FormatArg> for ArrayFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Npy => ArrayFormat::Npy,
            FormatArg::Npz => ArrayFormat::Npz,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit the preprocessing object on the train split and transform both splits
    Transform {
        /// Run configuration (YAML)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Transform a CSV file with a persisted preprocessing object
    Apply {
        /// Preprocessing object written by `transform`
        #[arg(short, long)]
        object: PathBuf,

        /// Schema file the object was built from
        #[arg(short, long)]
        schema: PathBuf,

        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Output array file
        #[arg(long)]
        output: PathBuf,

        /// Output layout
        #[arg(long, value_enum, default_value = "npy")]
        format: FormatArg,
    },

    /// Show the output features of a persisted preprocessing object
    Inspect {
        /// Preprocessing object written by `transform`
        #[arg(short, long)]
        object: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_transform(config_path: &Path) -> anyhow::Result<()> {
    section("Transform");

    let run = RunConfig::from_yaml_file(config_path)?;

    step_run("Fitting and transforming");
    let start = Instant::now();
    let component = DataTransformation::new(
        run.data_transformation_config,
        run.data_ingestion_artifact,
        run.data_validation_artifact,
    );
    let artifact = component.initiate_data_transformation()?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!("{}", serde_json::to_string_pretty(&artifact)?);
    Ok(())
}

pub fn cmd_apply(
    object_path: &Path,
    schema_path: &Path,
    data_path: &Path,
    output_path: &Path,
    format: ArrayFormat,
) -> anyhow::Result<()> {
    section("Apply");

    let preprocessing = ColumnTransformer::load(object_path)?;
    let schema = DatasetSchema::from_yaml_file(schema_path)?;

    step_run("Loading data");
    let mut df = load_data(data_path, &schema, false)?;
    if df.column(&schema.target_column).is_ok() {
        df = df.drop(&schema.target_column)?;
    }
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    step_run("Transforming");
    let start = Instant::now();
    let array = preprocessing.transform(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run(&format!("Saving → {}", output_path.display()));
    save_array(output_path, &array, format)?;
    step_done(&format!("{} rows × {} cols", array.nrows(), array.ncols()));

    println!();
    Ok(())
}

pub fn cmd_inspect(object_path: &Path) -> anyhow::Result<()> {
    section("Inspect");

    let preprocessing = ColumnTransformer::load(object_path)?;
    let names = preprocessing.feature_names_out()?;

    println!("  {}", kv("numeric  ", &preprocessing.numeric_columns().join(", ")));
    println!("  {}", kv("category ", &preprocessing.categorical_columns().join(", ")));
    println!("  {}", kv("features ", &names.len().to_string()));
    println!();
    for (i, name) in names.iter().enumerate() {
        println!("  {} {}", dim(&format!("{:>3}", i)), name);
    }
    println!();
    Ok(())
}
