// ⚠️ Error taxonomy for the materialization pipeline
//
// Row-level failures (MissingRequiredField) are skipped and counted.
// Configuration and sink failures abort the batch.

use crate::entities::{EntityType, Field};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("missing required field '{}' for {}", field.column(), entity_type.name())]
    MissingRequiredField { entity_type: EntityType, field: Field },

    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
