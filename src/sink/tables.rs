// 🗃️ Normalized table sink
//
// Facilities, locations, owners, licenses and school districts get typed
// tables keyed by entity id, with a UNIQUE natural key. Every other entity
// type lands in the generic entities / entity_attributes pair. All edges go
// to the relationships table; facility edges also fill foreign-key columns.

use super::{active, begin_batch, AttributeValue, GraphSink};
use crate::attributes::schema_for;
use crate::entities::{Entity, EntityType};
use crate::error::Result;
use crate::relationships::{Relationship, RelationshipType};
use rusqlite::{params, Connection, Transaction};

pub const ENTITIES_TABLE: &str = "entities";
pub const ENTITY_ATTRIBUTES_TABLE: &str = "entity_attributes";
pub const ATTRIBUTES_TABLE: &str = "attributes";
pub const RELATIONSHIPS_TABLE: &str = "relationships";

/// An entity type with its own typed table
#[derive(Debug, Clone, Copy)]
pub struct TypedTable {
    pub entity_type: EntityType,
    pub table: &'static str,
    /// Edges from this type that are mirrored into a foreign-key column
    pub foreign_keys: &'static [(RelationshipType, &'static str, &'static str)],
}

pub static TYPED_TABLES: [TypedTable; 5] = [
    TypedTable {
        entity_type: EntityType::Facility,
        table: "facilities",
        foreign_keys: &[
            (RelationshipType::LocatedAt, "location_id", "locations"),
            (RelationshipType::OwnedBy, "owner_id", "owners"),
            (RelationshipType::LicensedUnder, "license_id", "licenses"),
            (RelationshipType::AffiliatedWith, "school_district_id", "school_districts"),
        ],
    },
    TypedTable {
        entity_type: EntityType::Location,
        table: "locations",
        foreign_keys: &[],
    },
    TypedTable {
        entity_type: EntityType::Owner,
        table: "owners",
        foreign_keys: &[],
    },
    TypedTable {
        entity_type: EntityType::License,
        table: "licenses",
        foreign_keys: &[],
    },
    TypedTable {
        entity_type: EntityType::SchoolDistrict,
        table: "school_districts",
        foreign_keys: &[],
    },
];

pub fn typed_table(entity_type: EntityType) -> Option<&'static TypedTable> {
    TYPED_TABLES.iter().find(|t| t.entity_type == entity_type)
}

/// Every table this sink writes, in export order
pub fn output_tables() -> Vec<&'static str> {
    let mut tables: Vec<&'static str> = TYPED_TABLES.iter().map(|t| t.table).collect();
    tables.extend([
        ENTITIES_TABLE,
        ENTITY_ATTRIBUTES_TABLE,
        ATTRIBUTES_TABLE,
        RELATIONSHIPS_TABLE,
    ]);
    tables
}

impl TypedTable {
    fn create_sql(&self) -> String {
        let mut columns = vec![
            "entity_id TEXT PRIMARY KEY".to_string(),
            "natural_key TEXT NOT NULL UNIQUE".to_string(),
        ];
        columns.extend(
            schema_for(self.entity_type)
                .attributes
                .iter()
                .map(|attr| format!("\"{}\" {}", attr.name, attr.type_.sql_type())),
        );
        columns.extend(
            self.foreign_keys
                .iter()
                .map(|(_, column, target)| format!("{} TEXT REFERENCES {}(entity_id)", column, target)),
        );

        format!(
            "CREATE TABLE {} (\n        {}\n    );",
            self.table,
            columns.join(",\n        ")
        )
    }

    fn has_column(&self, name: &str) -> bool {
        schema_for(self.entity_type)
            .attributes
            .iter()
            .any(|attr| attr.name == name)
    }
}

fn schema_ddl() -> String {
    let mut ddl = String::new();
    for table in output_tables() {
        ddl.push_str(&format!("DROP TABLE IF EXISTS {};\n", table));
    }

    for typed in &TYPED_TABLES {
        ddl.push_str(&typed.create_sql());
        ddl.push('\n');
    }

    ddl.push_str(
        "CREATE TABLE entities (
            entity_id TEXT PRIMARY KEY,
            entity_type TEXT NOT NULL,
            natural_key TEXT NOT NULL,
            UNIQUE(entity_type, natural_key)
        );
        CREATE TABLE attributes (
            attribute_id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );
        CREATE TABLE entity_attributes (
            entity_id TEXT NOT NULL,
            attribute_id TEXT NOT NULL REFERENCES attributes(attribute_id),
            name TEXT NOT NULL,
            value TEXT NOT NULL,
            UNIQUE(entity_id, name)
        );
        CREATE TABLE relationships (
            relationship_id TEXT PRIMARY KEY,
            from_id TEXT NOT NULL,
            to_id TEXT NOT NULL,
            relationship_type TEXT NOT NULL,
            UNIQUE(from_id, to_id, relationship_type)
        );
        CREATE INDEX idx_entities_type ON entities(entity_type);
        CREATE INDEX idx_relationships_type ON relationships(relationship_type);",
    );

    ddl
}

pub struct TableSink<'conn> {
    conn: &'conn Connection,
    tx: Option<Transaction<'conn>>,
}

impl<'conn> TableSink<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        TableSink { conn, tx: None }
    }

    fn fill_foreign_key(&self, relationship: &Relationship) -> Result<()> {
        let tx = active(&self.tx)?;

        for typed in &TYPED_TABLES {
            for (kind, column, _) in typed.foreign_keys {
                if *kind != relationship.kind {
                    continue;
                }
                tx.prepare_cached(&format!(
                    "UPDATE {} SET {} = ?1 WHERE entity_id = ?2 AND {} IS NULL",
                    typed.table, column, column
                ))?
                .execute(params![relationship.to.as_str(), relationship.from.as_str()])?;
            }
        }

        Ok(())
    }
}

impl GraphSink for TableSink<'_> {
    fn prepare(&mut self) -> Result<()> {
        self.tx = Some(begin_batch(self.conn, &schema_ddl())?);
        tracing::info!(tables = output_tables().len(), "normalized tables reset");
        Ok(())
    }

    fn write_entity(&mut self, entity: &Entity) -> Result<bool> {
        let tx = active(&self.tx)?;

        let inserted = match typed_table(entity.entity_type) {
            Some(typed) => tx
                .prepare_cached(&format!(
                    "INSERT OR IGNORE INTO {} (entity_id, natural_key) VALUES (?1, ?2)",
                    typed.table
                ))?
                .execute(params![entity.entity_id.as_str(), entity.natural_key])?,
            None => tx
                .prepare_cached(
                    "INSERT OR IGNORE INTO entities (entity_id, entity_type, natural_key)
                     VALUES (?1, ?2, ?3)",
                )?
                .execute(params![
                    entity.entity_id.as_str(),
                    entity.entity_type.name(),
                    entity.natural_key
                ])?,
        };

        Ok(inserted > 0)
    }

    fn write_attribute(&mut self, attribute: &AttributeValue) -> Result<bool> {
        let tx = active(&self.tx)?;

        tx.prepare_cached("INSERT OR IGNORE INTO attributes (attribute_id, name) VALUES (?1, ?2)")?
            .execute(params![attribute.attribute_id, attribute.name])?;

        let updated = match typed_table(attribute.entity_type) {
            Some(typed) if typed.has_column(&attribute.name) => tx
                .prepare_cached(&format!(
                    "UPDATE {table} SET \"{column}\" = ?1 WHERE entity_id = ?2 AND \"{column}\" IS NULL",
                    table = typed.table,
                    column = attribute.name
                ))?
                .execute(params![attribute.value, attribute.entity_id.as_str()])?,
            _ => tx
                .prepare_cached(
                    "INSERT OR IGNORE INTO entity_attributes (entity_id, attribute_id, name, value)
                     VALUES (?1, ?2, ?3, ?4)",
                )?
                .execute(params![
                    attribute.entity_id.as_str(),
                    attribute.attribute_id,
                    attribute.name,
                    attribute.value
                ])?,
        };

        Ok(updated > 0)
    }

    fn write_relationship(&mut self, relationship: &Relationship) -> Result<bool> {
        let inserted = active(&self.tx)?
            .prepare_cached(
                "INSERT OR IGNORE INTO relationships (relationship_id, from_id, to_id, relationship_type)
                 VALUES (?1, ?2, ?3, ?4)",
            )?
            .execute(params![
                relationship.relationship_id,
                relationship.from.as_str(),
                relationship.to.as_str(),
                relationship.kind.label()
            ])?;

        if inserted > 0 {
            self.fill_foreign_key(relationship)?;
        }

        Ok(inserted > 0)
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit()?;
        }
        Ok(())
    }
}
