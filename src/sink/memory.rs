// 🧠 In-process sink for dry runs and tests

use super::{AttributeValue, GraphSink};
use crate::entities::{Entity, EntityType};
use crate::error::Result;
use crate::identity::EntityId;
use crate::relationships::{Relationship, RelationshipType};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct MemorySink {
    /// Entities by id, with every attribute written for them
    pub entities: BTreeMap<EntityId, Entity>,
    pub relationships: BTreeSet<(EntityId, EntityId, RelationshipType)>,
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn entities_of(&self, entity_type: EntityType) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| e.entity_type == entity_type)
            .collect()
    }

    pub fn relationships_of(&self, kind: RelationshipType) -> usize {
        self.relationships.iter().filter(|(_, _, k)| *k == kind).count()
    }

    pub fn attribute_count(&self) -> usize {
        self.entities.values().map(|e| e.attributes.len()).sum()
    }
}

impl GraphSink for MemorySink {
    fn prepare(&mut self) -> Result<()> {
        self.entities.clear();
        self.relationships.clear();
        self.finished = false;
        Ok(())
    }

    fn write_entity(&mut self, entity: &Entity) -> Result<bool> {
        if self.entities.contains_key(&entity.entity_id) {
            return Ok(false);
        }

        let stored = Entity {
            attributes: BTreeMap::new(),
            ..entity.clone()
        };
        self.entities.insert(entity.entity_id.clone(), stored);
        Ok(true)
    }

    fn write_attribute(&mut self, attribute: &AttributeValue) -> Result<bool> {
        let Some(entity) = self.entities.get_mut(&attribute.entity_id) else {
            return Ok(false);
        };

        if entity.attributes.contains_key(&attribute.name) {
            return Ok(false);
        }
        entity
            .attributes
            .insert(attribute.name.clone(), attribute.value.clone());
        Ok(true)
    }

    fn write_relationship(&mut self, relationship: &Relationship) -> Result<bool> {
        Ok(self.relationships.insert((
            relationship.from.clone(),
            relationship.to.clone(),
            relationship.kind,
        )))
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
