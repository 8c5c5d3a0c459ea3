//! Observability hooks for the transformation stage
//!
//! Components report progress through a [`TransformationObserver`] they are
//! given, instead of logging through a module-level logger. The default
//! [`TracingObserver`] forwards events to `tracing`.

use crate::artifact::DataTransformationArtifact;
use crate::error::Stage;
use parking_lot::Mutex;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Which data split an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => f.write_str("train"),
            Split::Test => f.write_str("test"),
        }
    }
}

/// Progress events emitted by the transformation stage
#[derive(Debug, Clone, PartialEq)]
pub enum TransformationEvent {
    StageStarted(Stage),
    SchemaLoaded {
        numerical_columns: Vec<String>,
        categorical_columns: Vec<String>,
        target_column: String,
    },
    DataLoaded {
        split: Split,
        path: PathBuf,
        rows: usize,
        columns: usize,
    },
    /// Columns present in the data but declared in neither schema list
    ColumnsDropped {
        split: Split,
        columns: Vec<String>,
    },
    Fitted {
        features_out: usize,
    },
    ArraySaved {
        split: Split,
        path: PathBuf,
        rows: usize,
        columns: usize,
    },
    ObjectSaved {
        path: PathBuf,
    },
    Completed(DataTransformationArtifact),
}

/// Sink for transformation events
pub trait TransformationObserver: Send + Sync {
    fn on_event(&self, event: &TransformationEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TransformationObserver for TracingObserver {
    fn on_event(&self, event: &TransformationEvent) {
        match event {
            TransformationEvent::StageStarted(stage) => info!(%stage, "Stage started"),
            TransformationEvent::SchemaLoaded {
                numerical_columns,
                categorical_columns,
                target_column,
            } => info!(
                ?numerical_columns,
                ?categorical_columns,
                target = %target_column,
                "Schema loaded"
            ),
            TransformationEvent::DataLoaded { split, path, rows, columns } => info!(
                %split,
                path = %path.display(),
                rows,
                columns,
                "Loaded data"
            ),
            TransformationEvent::ColumnsDropped { split, columns } => warn!(
                %split,
                ?columns,
                "Columns not declared in the schema are dropped"
            ),
            TransformationEvent::Fitted { features_out } => {
                info!(features_out, "Preprocessing object fitted on training data")
            }
            TransformationEvent::ArraySaved { split, path, rows, columns } => info!(
                %split,
                path = %path.display(),
                rows,
                columns,
                "Saved transformed array"
            ),
            TransformationEvent::ObjectSaved { path } => {
                info!(path = %path.display(), "Saved preprocessing object")
            }
            TransformationEvent::Completed(artifact) => {
                info!(%artifact, "Data transformation artifact")
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<TransformationEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far
    pub fn events(&self) -> Vec<TransformationEvent> {
        self.events.lock().clone()
    }
}

impl TransformationObserver for RecordingObserver {
    fn on_event(&self, event: &TransformationEvent) {
        self.events.lock().push(event.clone());
    }
}
