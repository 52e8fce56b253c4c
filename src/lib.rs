// Childcare Graph - Core Library
// Facility filings in, deduplicated entity graph out. Exposes all modules for
// use in the CLI and tests.

pub mod error;
pub mod identity;
pub mod entities;     // Entity types, typed fields, schedule/date parsing
pub mod attributes;   // Declared attribute schemas per entity type
pub mod keys;         // Natural key functions
pub mod registry;     // Per-run deduplicating registry
pub mod relationships;
pub mod db;           // Source CSV + SQLite source table
pub mod sink;         // Triple store, normalized tables, in-memory
pub mod materializer;
pub mod export;
pub mod config;

// Re-export commonly used types
pub use error::{GraphError, Result};
pub use identity::{entity_id, generate_id, EntityId};
pub use entities::{DayHours, Entity, EntityType, Field, RowData};
pub use attributes::{
    schema_for, AttributeDefinition, AttributeType, EntitySchema, SchemaRegistry,
};
pub use keys::{natural_key, KEY_SEPARATOR};
pub use registry::{EntityRegistry, Resolution};
pub use relationships::{
    build_relationship, Relationship, RelationshipType, DECLARED_EDGES,
};
pub use db::{
    SourceRow, SOURCE_TABLE,
    load_csv, setup_source_table, import_rows, load_source_rows, count_source_rows,
};
pub use sink::{
    AttributeValue, GraphSink, MemorySink, SinkFormat, TableSink, TripleSink,
    open_database,
};
pub use materializer::{materialize, GraphMaterializer, MaterializeReport, SkipReason};
pub use export::{export_csv, ExportedFile};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
