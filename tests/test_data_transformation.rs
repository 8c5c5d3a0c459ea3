//! Integration test: data transformation stage end-to-end

use housing_prep::artifact::{DataIngestionArtifact, DataValidationArtifact};
use housing_prep::components::DataTransformation;
use housing_prep::config::DataTransformationConfig;
use housing_prep::observe::{RecordingObserver, Split, TransformationEvent};
use housing_prep::preprocessing::{ColumnTransformer, HandleUnknown, Transformer};
use housing_prep::schema::DatasetSchema;
use housing_prep::utils::io::{load_array, load_data, ArrayFormat};
use housing_prep::{PrepError, Stage};
use ndarray::s;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SCHEMA: &str = r#"
columns:
  longitude: float
  latitude: float
  housing_median_age: float
  total_rooms: float
  total_bedrooms: float
  population: float
  households: float
  median_income: float
  median_house_value: float
  ocean_proximity: category
numerical_columns:
  - longitude
  - latitude
  - housing_median_age
  - total_rooms
  - total_bedrooms
  - population
  - households
  - median_income
categorical_columns:
  - ocean_proximity
target_column: median_house_value
"#;

const HEADER: &str = "longitude,latitude,housing_median_age,total_rooms,total_bedrooms,\
population,households,median_income,median_house_value,ocean_proximity";

const CATEGORIES: [&str; 4] = ["<1H OCEAN", "INLAND", "NEAR BAY", "NEAR OCEAN"];

/// 8 numeric + 3 derived + 4 one-hot
const FEATURES_OUT: usize = 15;

fn row(i: usize, category: &str) -> String {
    let rooms = 800.0 + (i * 37 % 500) as f64;
    // every seventh row has no bedroom count
    let bedrooms = if i % 7 == 3 {
        String::new()
    } else {
        format!("{}", 120.0 + (i * 13 % 90) as f64)
    };
    format!(
        "{},{},{},{},{},{},{},{},{},{}",
        -122.0 + i as f64 * 0.01,
        37.0 + (i % 10) as f64 * 0.1,
        10 + i % 40,
        rooms,
        bedrooms,
        300.0 + (i * 29 % 700) as f64,
        100.0 + (i * 11 % 150) as f64,
        2.0 + (i % 9) as f64 * 0.75,
        100000.0 + i as f64 * 1500.0,
        category
    )
}

fn write_table(path: &Path, header: &str, rows: impl IntoIterator<Item = String>) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut file = fs::File::create(path).unwrap();
    writeln!(file, "{}", header).unwrap();
    for line in rows {
        writeln!(file, "{}", line).unwrap();
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
    ingestion: DataIngestionArtifact,
    validation: DataValidationArtifact,
}

impl Fixture {
    fn new() -> Self {
        Self::with_test_categories(&CATEGORIES)
    }

    fn with_test_categories(test_categories: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let train_file_path = root.join("ingested/train/housing.csv");
        let test_file_path = root.join("ingested/test/housing.csv");
        let schema_file_path = root.join("config/schema.yaml");

        write_table(
            &train_file_path,
            HEADER,
            (0..100).map(|i| row(i, CATEGORIES[i % CATEGORIES.len()])),
        );
        write_table(
            &test_file_path,
            HEADER,
            (0..20).map(|i| row(i + 100, test_categories[i % test_categories.len()])),
        );
        fs::create_dir_all(schema_file_path.parent().unwrap()).unwrap();
        fs::write(&schema_file_path, SCHEMA).unwrap();

        Self {
            _dir: dir,
            root,
            ingestion: DataIngestionArtifact {
                train_file_path,
                test_file_path,
            },
            validation: DataValidationArtifact { schema_file_path },
        }
    }

    fn config(&self) -> DataTransformationConfig {
        DataTransformationConfig::under(self.root.join("transformed"))
    }

    fn component(&self, config: DataTransformationConfig) -> DataTransformation {
        DataTransformation::new(config, self.ingestion.clone(), self.validation.clone())
    }
}

#[test]
fn test_end_to_end_shapes() {
    let fixture = Fixture::new();
    let artifact = fixture
        .component(fixture.config())
        .initiate_data_transformation()
        .unwrap();

    assert!(artifact.is_transformed);
    assert_eq!(artifact.message, "Data transformation completed");
    assert!(artifact.transformed_train_file_path.ends_with("train/housing.npz"));
    assert!(artifact.transformed_test_file_path.ends_with("test/housing.npz"));
    assert!(artifact.preprocessed_object_file_path.exists());

    let train = load_array(&artifact.transformed_train_file_path).unwrap();
    let test = load_array(&artifact.transformed_test_file_path).unwrap();

    assert_eq!(train.dim(), (100, FEATURES_OUT + 1));
    assert_eq!(test.dim(), (20, FEATURES_OUT + 1));

    // target is appended unscaled as the last column
    assert_eq!(train[[0, FEATURES_OUT]], 100000.0);
    assert_eq!(test[[0, FEATURES_OUT]], 100000.0 + 100.0 * 1500.0);

    // imputed and scaled numeric block has no gaps
    assert!(train.slice(s![.., ..FEATURES_OUT]).iter().all(|v| v.is_finite()));

    // scaled numeric columns are centered on the training split
    let mean = train.column(0).sum() / 100.0;
    assert!(mean.abs() < 1e-9);
}

#[test]
fn test_persisted_object_reproduces_train_array() {
    let fixture = Fixture::new();
    let artifact = fixture
        .component(fixture.config())
        .initiate_data_transformation()
        .unwrap();

    let preprocessing = ColumnTransformer::load(&artifact.preprocessed_object_file_path).unwrap();
    assert_eq!(preprocessing.n_features_out().unwrap(), FEATURES_OUT);

    let schema = DatasetSchema::from_yaml_str(SCHEMA).unwrap();
    let df = load_data(&fixture.ingestion.train_file_path, &schema, false).unwrap();
    let inputs = df.drop(&schema.target_column).unwrap();

    let reproduced = preprocessing.transform(&inputs).unwrap();
    let saved = load_array(&artifact.transformed_train_file_path).unwrap();

    assert_eq!(reproduced, saved.slice(s![.., ..FEATURES_OUT]).to_owned());

    let names = preprocessing.feature_names_out().unwrap();
    assert_eq!(names[8], "rooms_per_household");
    assert_eq!(names[10], "bedrooms_per_room");
    assert_eq!(names[11], "ocean_proximity_<1H OCEAN");
}

#[test]
fn test_unseen_category_ignored() {
    let fixture = Fixture::with_test_categories(&["ISLAND", "INLAND"]);
    let artifact = fixture
        .component(fixture.config())
        .initiate_data_transformation()
        .unwrap();

    let test = load_array(&artifact.transformed_test_file_path).unwrap();
    let one_hot = test.slice(s![.., 11..FEATURES_OUT]);

    // row 0 is ISLAND, row 1 is INLAND
    assert!(one_hot.row(0).iter().all(|&v| v == 0.0));
    assert!(one_hot[[1, 1]] > 0.0);
}

#[test]
fn test_unseen_category_error_policy() {
    let fixture = Fixture::with_test_categories(&["ISLAND"]);
    let config = fixture.config().with_handle_unknown(HandleUnknown::Error);

    let err = fixture
        .component(config)
        .initiate_data_transformation()
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Transform));
    match err.root_cause() {
        PrepError::UnknownCategory { column, category } => {
            assert_eq!(column, "ocean_proximity");
            assert_eq!(category, "ISLAND");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_undeclared_column_is_dropped_and_reported() {
    let fixture = Fixture::new();
    let header = format!("{},note", HEADER);
    write_table(
        &fixture.ingestion.train_file_path,
        &header,
        (0..100).map(|i| format!("{},n{}", row(i, CATEGORIES[i % 4]), i)),
    );

    let observer = Arc::new(RecordingObserver::new());
    let artifact = fixture
        .component(fixture.config())
        .with_observer(observer.clone())
        .initiate_data_transformation()
        .unwrap();

    let train = load_array(&artifact.transformed_train_file_path).unwrap();
    assert_eq!(train.ncols(), FEATURES_OUT + 1);

    let events = observer.events();
    assert!(events.contains(&TransformationEvent::ColumnsDropped {
        split: Split::Train,
        columns: vec!["note".to_string()],
    }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, TransformationEvent::ColumnsDropped { split: Split::Test, .. })));
    assert!(matches!(events.last(), Some(TransformationEvent::Completed(_))));
}

#[test]
fn test_undeclared_column_rejected_when_configured() {
    let fixture = Fixture::new();
    write_table(
        &fixture.ingestion.test_file_path,
        &format!("{},note", HEADER),
        (0..20).map(|i| format!("{},x", row(i, "INLAND"))),
    );

    let config = fixture.config().with_reject_undeclared_columns(true);
    let err = fixture
        .component(config)
        .initiate_data_transformation()
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Load));
    assert!(matches!(err.root_cause(), PrepError::SchemaError(_)));
}

#[test]
fn test_schema_missing_key_fails_before_loading() {
    let fixture = Fixture::new();
    fs::write(
        &fixture.validation.schema_file_path,
        "numerical_columns: [total_rooms]\ncategorical_columns: [ocean_proximity]\n",
    )
    .unwrap();

    let observer = Arc::new(RecordingObserver::new());
    let err = fixture
        .component(fixture.config())
        .with_observer(observer.clone())
        .initiate_data_transformation()
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::SchemaRead));
    assert!(matches!(err.root_cause(), PrepError::ConfigError(_)));
    assert!(!observer
        .events()
        .iter()
        .any(|e| matches!(e, TransformationEvent::DataLoaded { .. })));
    assert!(!fixture.root.join("transformed").exists());
}

#[test]
fn test_missing_engineered_column_fails_pipeline_build() {
    let fixture = Fixture::new();
    let schema = SCHEMA.replace("  - households\n", "");
    fs::write(&fixture.validation.schema_file_path, schema).unwrap();

    let err = fixture
        .component(fixture.config())
        .initiate_data_transformation()
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::PipelineBuild));
}

#[test]
fn test_npz_archive_format() {
    let fixture = Fixture::new();
    let config = fixture.config().with_array_format(ArrayFormat::Npz);
    let artifact = fixture
        .component(config)
        .initiate_data_transformation()
        .unwrap();

    let bytes = fs::read(&artifact.transformed_train_file_path).unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let train = load_array(&artifact.transformed_train_file_path).unwrap();
    assert_eq!(train.dim(), (100, FEATURES_OUT + 1));
}

#[test]
fn test_without_bedrooms_per_room() {
    let fixture = Fixture::new();
    let config = fixture.config().with_bedrooms_per_room(false);
    let artifact = fixture
        .component(config)
        .initiate_data_transformation()
        .unwrap();

    let test = load_array(&artifact.transformed_test_file_path).unwrap();
    assert_eq!(test.ncols(), FEATURES_OUT);
}

#[test]
fn test_five_numeric_column_schema() {
    let fixture = Fixture::new();
    fs::write(
        &fixture.validation.schema_file_path,
        "numerical_columns: [total_rooms, total_bedrooms, population, households, median_income]\n\
         categorical_columns: [ocean_proximity]\n\
         target_column: median_house_value\n",
    )
    .unwrap();

    // keep only the declared columns
    let narrow = |line: String| {
        let fields: Vec<&str> = line.split(',').collect();
        [3, 4, 5, 6, 7, 8, 9]
            .iter()
            .map(|&k| fields[k])
            .collect::<Vec<_>>()
            .join(",")
    };
    let header = narrow(HEADER.to_string());
    write_table(
        &fixture.ingestion.train_file_path,
        &header,
        (0..100).map(|i| narrow(row(i, CATEGORIES[i % 4]))),
    );
    write_table(
        &fixture.ingestion.test_file_path,
        &header,
        (0..20).map(|i| narrow(row(i + 100, CATEGORIES[i % 4]))),
    );

    let artifact = fixture
        .component(fixture.config())
        .initiate_data_transformation()
        .unwrap();

    let train = load_array(&artifact.transformed_train_file_path).unwrap();
    let test = load_array(&artifact.transformed_test_file_path).unwrap();

    // 5 numeric + 3 derived + 4 one-hot + target
    assert_eq!(train.dim(), (100, 5 + 3 + 4 + 1));
    assert_eq!(test.dim(), (20, 5 + 3 + 4 + 1));
}

#[test]
fn test_statistics_come_from_train_split_only() {
    let fixture = Fixture::new();
    let artifact = fixture
        .component(fixture.config())
        .initiate_data_transformation()
        .unwrap();

    let preprocessing = ColumnTransformer::load(&artifact.preprocessed_object_file_path).unwrap();
    let imputer = preprocessing.num_pipeline().first().first();
    let scaler = preprocessing.num_pipeline().second();

    let longitudes: Vec<f64> = (0..100).map(|i| -122.0 + i as f64 * 0.01).collect();
    let train_mean = longitudes.iter().sum::<f64>() / 100.0;
    let train_median = (longitudes[49] + longitudes[50]) / 2.0;

    let mut bedrooms: Vec<f64> = (0..100)
        .filter(|i| i % 7 != 3)
        .map(|i| 120.0 + (i * 13 % 90) as f64)
        .collect();
    bedrooms.sort_by(|a, b| a.total_cmp(b));
    let mid = bedrooms.len() / 2;
    let bedrooms_median = (bedrooms[mid - 1] + bedrooms[mid]) / 2.0;

    let statistics = imputer.statistics().unwrap();
    assert!((statistics[0] - train_median).abs() < 1e-9);
    assert!((statistics[4] - bedrooms_median).abs() < 1e-9);
    assert!((scaler.mean().unwrap()[0] - train_mean).abs() < 1e-9);

    // test rows sit further east, so the train-fitted scaler does not center them
    let test = load_array(&artifact.transformed_test_file_path).unwrap();
    let test_mean = test.column(0).sum() / test.nrows() as f64;
    assert!(test_mean > 1.0);
}

#[test]
fn test_unparseable_numeric_cell_fails_load() {
    let fixture = Fixture::new();
    write_table(
        &fixture.ingestion.train_file_path,
        HEADER,
        (0..100).map(|i| {
            let line = row(i, CATEGORIES[i % 4]);
            if i == 5 {
                let mut fields: Vec<&str> = line.split(',').collect();
                fields[3] = "abc";
                fields.join(",")
            } else {
                line
            }
        }),
    );

    let err = fixture
        .component(fixture.config())
        .initiate_data_transformation()
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Load));
    assert!(matches!(err.root_cause(), PrepError::DataError(ref msg) if msg.contains("total_rooms")));
}

#[cfg(target_os = "linux")]
#[test]
fn test_failed_object_write_fails_save() {
    let fixture = Fixture::new();
    let root = fixture.root.join("transformed");
    let config = DataTransformationConfig::new(root.join("train"), root.join("test"), "/dev/full");

    let err = fixture
        .component(config)
        .initiate_data_transformation()
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Save));
    assert!(matches!(err.root_cause(), PrepError::IoError(_)));
}
