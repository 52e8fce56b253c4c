// 💾 Graph Sinks - where materialized entities, attributes and edges land
//
// Every sink has "insert if absent" semantics: writing something already
// stored is a benign no-op that returns false.

pub mod memory;
pub mod tables;
pub mod triples;

pub use memory::MemorySink;
pub use tables::TableSink;
pub use triples::TripleSink;

use crate::entities::{Entity, EntityType};
use crate::error::{GraphError, Result};
use crate::identity::EntityId;
use crate::relationships::Relationship;
use rusqlite::{Connection, Transaction};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Predicate declaring an entity's type in the triple store
pub const ENTITY_TYPE_PREDICATE: &str = "ENTITY_TYPE";

// ============================================================================
// SINK FORMAT
// ============================================================================

/// Persisted shape of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    /// Normalized relational tables
    Tables,
    /// Single (subject, predicate, object) table
    Triples,
}

impl SinkFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkFormat::Tables => "tables",
            SinkFormat::Triples => "triples",
        }
    }
}

impl fmt::Display for SinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkFormat {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tables" | "table" => Ok(SinkFormat::Tables),
            "triples" | "triple" => Ok(SinkFormat::Triples),
            other => Err(GraphError::SinkUnavailable(format!(
                "unknown sink format '{}' (expected 'tables' or 'triples')",
                other
            ))),
        }
    }
}

// ============================================================================
// SINK TRAIT
// ============================================================================

/// One attribute value of one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub entity_id: EntityId,
    pub entity_type: EntityType,
    /// Id from the registry's attribute namespace
    pub attribute_id: String,
    pub name: String,
    pub value: String,
}

pub trait GraphSink {
    /// Full reset: drop and recreate the output store, open the batch
    fn prepare(&mut self) -> Result<()>;

    /// Store an entity's identity (type and natural key)
    fn write_entity(&mut self, entity: &Entity) -> Result<bool>;

    fn write_attribute(&mut self, attribute: &AttributeValue) -> Result<bool>;

    fn write_relationship(&mut self, relationship: &Relationship) -> Result<bool>;

    /// Commit the batch
    fn finish(&mut self) -> Result<()>;
}

/// Open the SQLite database a sink writes into
pub fn open_database(path: &Path) -> Result<Connection> {
    Connection::open(path)
        .map_err(|e| GraphError::SinkUnavailable(format!("{}: {}", path.display(), e)))
}

/// Reset the output schema inside a fresh batch transaction
///
/// Any failure here means the destination cannot be written to.
pub(crate) fn begin_batch<'conn>(
    conn: &'conn Connection,
    ddl: &str,
) -> Result<Transaction<'conn>> {
    let unavailable = |e: rusqlite::Error| GraphError::SinkUnavailable(e.to_string());

    let tx = conn.unchecked_transaction().map_err(unavailable)?;
    tx.execute_batch(ddl).map_err(unavailable)?;
    Ok(tx)
}

/// Active batch transaction, or an error if `prepare` was not called
pub(crate) fn active<'a, 'conn>(tx: &'a Option<Transaction<'conn>>) -> Result<&'a Transaction<'conn>> {
    tx.as_ref()
        .ok_or_else(|| GraphError::SinkUnavailable("sink used before prepare()".to_string()))
}
