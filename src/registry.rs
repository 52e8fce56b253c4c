// 🗂️ Deduplicating Entity Registry
//
// Three independent namespaces (entities, attributes, relationships), each a
// map from key to id populated on first sight. One registry per batch run;
// ids are re-derivable from the Identity Generator, so nothing persists.

use crate::entities::EntityType;
use crate::identity::{entity_id, generate_id, EntityId};
use crate::relationships::{Relationship, RelationshipType};
use std::collections::{HashMap, HashSet};

/// Result of a get-or-create lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<T> {
    pub id: T,
    /// True the first time this key was seen in the run
    pub created: bool,
}

#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: HashMap<(EntityType, String), EntityId>,
    attributes: HashMap<String, String>,
    attribute_values: HashSet<(EntityId, String)>,
    relationships: HashMap<(EntityId, EntityId, RelationshipType), Relationship>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        EntityRegistry::default()
    }

    /// Id for `(entity_type, natural_key)`, created on first sight
    pub fn get_or_create_entity(
        &mut self,
        entity_type: EntityType,
        natural_key: &str,
    ) -> Resolution<EntityId> {
        let key = (entity_type, natural_key.to_string());
        if let Some(id) = self.entities.get(&key) {
            return Resolution {
                id: id.clone(),
                created: false,
            };
        }

        let id = entity_id(entity_type.name(), natural_key);
        self.entities.insert(key, id.clone());
        Resolution { id, created: true }
    }

    /// Id for an attribute name
    pub fn get_or_create_attribute(&mut self, name: &str) -> Resolution<String> {
        if let Some(id) = self.attributes.get(name) {
            return Resolution {
                id: id.clone(),
                created: false,
            };
        }

        let id = generate_id("Attribute", name);
        self.attributes.insert(name.to_string(), id.clone());
        Resolution { id, created: true }
    }

    /// Record that `entity` has a value for `name`
    ///
    /// Returns false if a value was already recorded: the first value seen
    /// for an (entity, attribute) pair is the one that is kept.
    pub fn claim_attribute_value(&mut self, entity: &EntityId, name: &str) -> bool {
        self.attribute_values
            .insert((entity.clone(), name.to_string()))
    }

    /// Edge for `(from, to, kind)`; None if either endpoint is missing
    pub fn get_or_create_relationship(
        &mut self,
        from: Option<&EntityId>,
        to: Option<&EntityId>,
        kind: RelationshipType,
    ) -> Option<Resolution<Relationship>> {
        let (from, to) = (from?, to?);

        let key = (from.clone(), to.clone(), kind);
        if let Some(existing) = self.relationships.get(&key) {
            return Some(Resolution {
                id: existing.clone(),
                created: false,
            });
        }

        let relationship = Relationship::new(from.clone(), to.clone(), kind);
        self.relationships.insert(key, relationship.clone());
        Some(Resolution {
            id: relationship,
            created: true,
        })
    }

    pub fn lookup_entity(&self, entity_type: EntityType, natural_key: &str) -> Option<&EntityId> {
        self.entities.get(&(entity_type, natural_key.to_string()))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn attribute_value_count(&self) -> usize {
        self.attribute_values.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }
}
