// 🔺 Triple store sink - (subject, predicate, object) with a unique full triple

use super::{active, begin_batch, AttributeValue, GraphSink, ENTITY_TYPE_PREDICATE};
use crate::entities::Entity;
use crate::error::Result;
use crate::relationships::Relationship;
use rusqlite::{params, Connection, Transaction};

pub const TRIPLES_TABLE: &str = "triples";

const TRIPLES_DDL: &str = "
    DROP TABLE IF EXISTS triples;
    CREATE TABLE triples (
        subject TEXT NOT NULL,
        predicate TEXT NOT NULL,
        object TEXT NOT NULL,
        UNIQUE(subject, predicate, object)
    );
    CREATE INDEX idx_triples_predicate ON triples(predicate);
";

pub struct TripleSink<'conn> {
    conn: &'conn Connection,
    tx: Option<Transaction<'conn>>,
}

impl<'conn> TripleSink<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        TripleSink { conn, tx: None }
    }

    fn insert(&self, subject: &str, predicate: &str, object: &str) -> Result<bool> {
        let tx = active(&self.tx)?;
        let mut stmt = tx.prepare_cached(
            "INSERT OR IGNORE INTO triples (subject, predicate, object) VALUES (?1, ?2, ?3)",
        )?;
        let inserted = stmt.execute(params![subject, predicate, object])?;
        Ok(inserted > 0)
    }
}

impl GraphSink for TripleSink<'_> {
    fn prepare(&mut self) -> Result<()> {
        self.tx = Some(begin_batch(self.conn, TRIPLES_DDL)?);
        tracing::info!(table = TRIPLES_TABLE, "triple store reset");
        Ok(())
    }

    fn write_entity(&mut self, entity: &Entity) -> Result<bool> {
        self.insert(
            entity.entity_id.as_str(),
            ENTITY_TYPE_PREDICATE,
            entity.entity_type.name(),
        )
    }

    fn write_attribute(&mut self, attribute: &AttributeValue) -> Result<bool> {
        self.insert(attribute.entity_id.as_str(), &attribute.name, &attribute.value)
    }

    fn write_relationship(&mut self, relationship: &Relationship) -> Result<bool> {
        self.insert(
            relationship.from.as_str(),
            relationship.kind.label(),
            relationship.to.as_str(),
        )
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit()?;
        }
        Ok(())
    }
}
