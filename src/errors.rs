use thiserror::Error;
use crate::manager_datapoint::errors::DataPointError;
use crate::manager_sun::errors::SunError;
use crate::models::SnapshotError;
use crate::reading::ReadingError;

/// Error depicting errors that abort a run before anything is published
///
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("DataSourceError: {0}")]
    DataSource(String),
    #[error("FieldExtractionError: {0}")]
    FieldExtraction(String),
}

impl From<DataPointError> for WorkerError {
    fn from(e: DataPointError) -> Self {
        WorkerError::DataSource(e.to_string())
    }
}

impl From<SunError> for WorkerError {
    fn from(e: SunError) -> Self {
        WorkerError::DataSource(e.to_string())
    }
}

impl From<ReadingError> for WorkerError {
    fn from(e: ReadingError) -> Self {
        match e {
            ReadingError::SunEvents(e) => e.into(),
            e => WorkerError::FieldExtraction(e.to_string()),
        }
    }
}

impl From<SnapshotError> for WorkerError {
    fn from(e: SnapshotError) -> Self {
        WorkerError::FieldExtraction(e.to_string())
    }
}
