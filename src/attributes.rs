// 🏛️ Attribute Extractor - declared schemas per entity type
// An entity only ever stores the attributes its schema declares.

use crate::entities::{normalize_date, EntityType, Field, RowData};
use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// ATTRIBUTE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    Text,
    Integer,
    Date,
}

impl AttributeType {
    /// SQLite column type used by the table sink
    pub fn sql_type(&self) -> &'static str {
        match self {
            AttributeType::Text | AttributeType::Date => "TEXT",
            AttributeType::Integer => "INTEGER",
        }
    }
}

// ============================================================================
// ATTRIBUTE DEFINITION
// ============================================================================

/// One declared attribute: output name, the field it is read from, its type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Predicate / column name (e.g., "facility_name")
    pub name: String,

    /// Where the value comes from
    pub field: Field,

    pub type_: AttributeType,

    pub description: String,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, field: Field, type_: AttributeType) -> Self {
        AttributeDefinition {
            name: name.into(),
            field,
            type_,
            description: String::new(),
        }
    }

    pub fn text(name: impl Into<String>, field: Field) -> Self {
        Self::new(name, field, AttributeType::Text)
    }

    /// Builder: add description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Render a present value in its declared type's canonical text form
    fn render(&self, raw: &str) -> String {
        match self.type_ {
            AttributeType::Date => normalize_date(raw),
            AttributeType::Text | AttributeType::Integer => raw.to_string(),
        }
    }
}

// ============================================================================
// ENTITY SCHEMA
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySchema {
    pub entity_type: EntityType,
    pub attributes: Vec<AttributeDefinition>,
}

impl EntitySchema {
    pub fn new(entity_type: EntityType) -> Self {
        EntitySchema {
            entity_type,
            attributes: Vec::new(),
        }
    }

    /// Builder: declare an attribute
    pub fn with(mut self, attr: AttributeDefinition) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Project `data` onto this schema, omitting absent fields
    pub fn extract(&self, data: &RowData) -> BTreeMap<String, String> {
        self.attributes
            .iter()
            .filter_map(|attr| {
                data.get(attr.field)
                    .map(|value| (attr.name.clone(), attr.render(value)))
            })
            .collect()
    }
}

/// Declared schema for every entity type
pub fn schema_for(entity_type: EntityType) -> EntitySchema {
    use AttributeDefinition as A;
    let schema = EntitySchema::new(entity_type);

    match entity_type {
        EntityType::Facility => schema
            .with(A::text("facility_name", Field::FacilityName))
            .with(A::text("facility_type", Field::FacilityType))
            .with(A::text("facility_status", Field::FacilityStatus))
            .with(
                A::text("accepts_subsidies", Field::AcceptsSubsidies)
                    .with_description("Whether the facility accepts childcare subsidies"),
            )
            .with(A::text("phone_number", Field::PhoneNumber))
            .with(A::text("operational_schedule", Field::OperationalSchedule))
            .with(A::new("capacity", Field::Capacity, AttributeType::Integer))
            .with(A::new("enrollment", Field::Enrollment, AttributeType::Integer))
            .with(A::new("staff", Field::Staff, AttributeType::Integer)),

        EntityType::Location => schema
            .with(A::text("facility_address", Field::FacilityAddress))
            .with(A::text("city", Field::City))
            .with(A::text("state", Field::State))
            .with(A::text("zip_code", Field::ZipCode))
            .with(A::text("alternative_address", Field::AlternativeAddress))
            .with(A::text("alternative_zip", Field::AlternativeZip)),

        EntityType::Owner => schema
            .with(A::text("license_number", Field::LicenseNumber))
            .with(A::text("alternative_contact_number", Field::AlternativeContactNumber)),

        EntityType::License => schema
            .with(A::text("license_number", Field::LicenseNumber))
            .with(A::text("license_type", Field::LicenseType))
            .with(A::new("license_issue_date", Field::LicenseIssueDate, AttributeType::Date))
            .with(A::new("license_expiry_date", Field::LicenseExpiryDate, AttributeType::Date))
            .with(A::new(
                "date_originally_licensed",
                Field::DateOriginallyLicensed,
                AttributeType::Date,
            )),

        EntityType::SchoolDistrict => {
            schema.with(A::text("district_name", Field::SchoolDistrict))
        }
        EntityType::Schedule => {
            schema.with(A::text("operational_schedule", Field::OperationalSchedule))
        }
        EntityType::ScheduleEntry => schema
            .with(A::text("day", Field::Day))
            .with(A::text("hours", Field::Hours)),

        EntityType::City => schema.with(A::text("name", Field::City)),
        EntityType::State => schema.with(A::text("name", Field::State)),
        EntityType::ZipCode => schema.with(A::text("zip_code", Field::ZipCode)),
        EntityType::Address => schema.with(A::text("full_address", Field::FacilityAddress)),
        EntityType::TimeZone => schema.with(A::text("name", Field::TimeZone)),
        EntityType::PhoneNumber => schema.with(A::text("number", Field::PhoneNumber)),
        EntityType::LicenseType => schema.with(A::text("name", Field::LicenseType)),
        EntityType::Date => schema.with(A::new("date_value", Field::DateValue, AttributeType::Date)),
        EntityType::DayOfWeek => schema.with(A::text("day", Field::Day)),
        EntityType::Time => schema.with(A::text("time_value", Field::TimeValue)),
        EntityType::Status => schema.with(A::text("status", Field::Status)),
        EntityType::BirthYear => {
            schema.with(A::new("year", Field::Year, AttributeType::Integer))
        }
        EntityType::AgeGroup => schema.with(A::text("label", Field::AgeLabel)),
    }
}

// ============================================================================
// SCHEMA REGISTRY
// ============================================================================

/// Catalog of entity schemas consulted by the materializer
pub struct SchemaRegistry {
    schemas: HashMap<EntityType, EntitySchema>,
}

impl SchemaRegistry {
    /// Registry with the declared schema of every entity type
    pub fn new() -> Self {
        let mut registry = SchemaRegistry::empty();
        for entity_type in EntityType::ALL {
            registry.register(schema_for(entity_type));
        }
        registry
    }

    pub fn empty() -> Self {
        SchemaRegistry {
            schemas: HashMap::new(),
        }
    }

    pub fn register(&mut self, schema: EntitySchema) {
        self.schemas.insert(schema.entity_type, schema);
    }

    pub fn get(&self, entity_type: EntityType) -> Option<&EntitySchema> {
        self.schemas.get(&entity_type)
    }

    /// Attributes of `entity_type` present in `data`
    pub fn extract_attributes(
        &self,
        entity_type: EntityType,
        data: &RowData,
    ) -> Result<BTreeMap<String, String>> {
        self.get(entity_type)
            .map(|schema| schema.extract(data))
            .ok_or_else(|| GraphError::UnknownEntityType(entity_type.name().to_string()))
    }

    pub fn count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entity_type_has_a_schema() {
        let registry = SchemaRegistry::new();
        assert_eq!(registry.count(), EntityType::ALL.len());

        for entity_type in EntityType::ALL {
            let schema = registry.get(entity_type).unwrap();
            assert!(
                !schema.attributes.is_empty(),
                "{} should declare at least one attribute",
                entity_type
            );
        }
    }

    #[test]
    fn test_extract_only_declared_and_present() {
        let registry = SchemaRegistry::new();
        let data = RowData::new()
            .with(Field::FacilityName, "Sunny Daycare")
            .with(Field::FacilityType, "Group Home")
            .with(Field::DateExtracted, "2024-01-01")
            .with(Field::City, "Springfield");

        let attrs = registry.extract_attributes(EntityType::Facility, &data).unwrap();

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("facility_name").map(String::as_str), Some("Sunny Daycare"));
        assert_eq!(attrs.get("facility_type").map(String::as_str), Some("Group Home"));
        assert!(!attrs.contains_key("facility_status"), "Absent fields are omitted");
    }

    #[test]
    fn test_date_attributes_are_normalized() {
        let registry = SchemaRegistry::new();
        let data = RowData::new()
            .with(Field::LicenseNumber, "LIC001")
            .with(Field::LicenseIssueDate, "03/04/2021");

        let attrs = registry.extract_attributes(EntityType::License, &data).unwrap();
        assert_eq!(attrs["license_issue_date"], "2021-03-04");
    }

    #[test]
    fn test_integer_attributes_use_normalized_text() {
        let registry = SchemaRegistry::new();
        let data = RowData::new().with(Field::Capacity, "45.0");

        let attrs = registry.extract_attributes(EntityType::Facility, &data).unwrap();
        assert_eq!(attrs["capacity"], "45");
    }

    #[test]
    fn test_zip_codes_are_text_with_leading_zeros() {
        let registry = SchemaRegistry::new();
        let data = RowData::new()
            .with(Field::ZipCode, "02134.0")
            .with(Field::AlternativeZip, "01002");

        let location = schema_for(EntityType::Location);
        assert_eq!(location.get("zip_code").unwrap().type_, AttributeType::Text);
        assert_eq!(location.get("alternative_zip").unwrap().type_, AttributeType::Text);
        assert_eq!(
            schema_for(EntityType::ZipCode).get("zip_code").unwrap().type_,
            AttributeType::Text
        );
        assert_eq!(
            schema_for(EntityType::Facility).get("capacity").unwrap().type_,
            AttributeType::Integer,
            "Counts stay integers"
        );

        let attrs = registry.extract_attributes(EntityType::Location, &data).unwrap();
        assert_eq!(attrs["zip_code"], "02134");
        assert_eq!(attrs["alternative_zip"], "01002");
    }

    #[test]
    fn test_address_schema_is_full_address_only() {
        let schema = schema_for(EntityType::Address);
        let names: Vec<&str> = schema.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["full_address"], "Zip lives on ZipCode and Location");
    }

    #[test]
    fn test_missing_schema_is_unknown_entity_type() {
        let registry = SchemaRegistry::empty();
        let err = registry
            .extract_attributes(EntityType::City, &RowData::new())
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownEntityType(_)));
    }

    #[test]
    fn test_schema_builder_pattern() {
        let schema = EntitySchema::new(EntityType::State).with(
            AttributeDefinition::text("name", Field::State).with_description("Two-letter code"),
        );

        assert_eq!(schema.attributes.len(), 1);
        assert_eq!(schema.get("name").unwrap().description, "Two-letter code");
        assert!(schema.get("missing").is_none());
    }
}
