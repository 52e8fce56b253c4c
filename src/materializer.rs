// 🏗️ Graph Materializer - source rows in, deduplicated graph out
//
// Per row: resolve every enabled entity type, extract its attributes, build
// the declared edges between resolved ids, and hand anything new to the sink.
// A missing key field skips that entity (and its edges) for the row only.

use crate::attributes::SchemaRegistry;
use crate::db::SourceRow;
use crate::entities::{normalize_date, DayHours, Entity, EntityType, Field, RowData, WEEK};
use crate::error::{GraphError, Result};
use crate::identity::EntityId;
use crate::keys::natural_key;
use crate::registry::EntityRegistry;
use crate::relationships::{build_relationship, RelationshipType};
use crate::sink::{AttributeValue, GraphSink};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

// ============================================================================
// REPORT
// ============================================================================

/// Why an entity could not be resolved for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkipReason {
    pub entity_type: EntityType,
    pub field: Field,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: missing {}", self.entity_type.name(), self.field.column())
    }
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Summary of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    pub rows_processed: usize,
    /// Rows identical to an earlier row in every column (not re-resolved,
    /// but their skips are counted like the original row's)
    pub duplicate_rows: usize,
    pub entities_written: usize,
    pub attributes_written: usize,
    pub relationships_written: usize,
    /// Newly stored entities per type
    pub entities_by_type: BTreeMap<EntityType, usize>,
    /// Rows that skipped an entity, per reason (a row counts once per reason,
    /// duplicate rows included)
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl MaterializeReport {
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }
}

// ============================================================================
// MATERIALIZER
// ============================================================================

pub struct GraphMaterializer<S: GraphSink> {
    registry: EntityRegistry,
    schemas: SchemaRegistry,
    enabled: BTreeSet<EntityType>,
    sink: S,
    report: MaterializeReport,
    /// Row fingerprint -> skips that row produced
    seen_rows: HashMap<String, BTreeSet<SkipReason>>,
}

impl<S: GraphSink> GraphMaterializer<S> {
    /// Materializer for every entity type
    pub fn new(sink: S) -> Self {
        GraphMaterializer {
            registry: EntityRegistry::new(),
            schemas: SchemaRegistry::new(),
            enabled: EntityType::ALL.into_iter().collect(),
            sink,
            report: MaterializeReport::default(),
            seen_rows: HashMap::new(),
        }
    }

    /// Builder: restrict resolution to these entity types
    pub fn with_entity_types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.enabled = types.into_iter().collect();
        self
    }

    /// Builder: replace the schema catalog
    pub fn with_schemas(mut self, schemas: SchemaRegistry) -> Self {
        self.schemas = schemas;
        self
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Process a whole batch: reset the sink, every row in order, commit
    ///
    /// Configuration and sink failures abort before the first row.
    pub fn run(&mut self, rows: &[SourceRow]) -> Result<MaterializeReport> {
        self.check_schemas()?;
        self.sink.prepare()?;

        tracing::info!(
            rows = rows.len(),
            entity_types = self.enabled.len(),
            "materializing graph"
        );

        for row in rows {
            self.process_row(row)?;
        }

        self.sink.finish()?;

        tracing::info!(
            entities = self.report.entities_written,
            attributes = self.report.attributes_written,
            relationships = self.report.relationships_written,
            skipped = self.report.total_skipped(),
            "materialization complete"
        );

        Ok(self.report.clone())
    }

    /// Every enabled type needs a registered schema
    fn check_schemas(&self) -> Result<()> {
        match self.enabled.iter().find(|t| self.schemas.get(**t).is_none()) {
            Some(missing) => Err(GraphError::UnknownEntityType(missing.name().to_string())),
            None => Ok(()),
        }
    }

    pub fn process_row(&mut self, row: &SourceRow) -> Result<()> {
        self.report.rows_processed += 1;

        let fingerprint = row.fingerprint();
        if let Some(skips) = self.seen_rows.get(&fingerprint) {
            self.report.duplicate_rows += 1;
            for reason in skips {
                *self.report.skipped.entry(*reason).or_insert(0) += 1;
            }
            tracing::debug!(row = self.report.rows_processed, "exact duplicate row");
            return Ok(());
        }

        let data = row.project();
        let mut skips = BTreeSet::new();

        // ====================================================================
        // ENTITIES KEYED DIRECTLY ON SOURCE COLUMNS
        // ====================================================================
        let facility = self.resolve(EntityType::Facility, &data, &mut skips)?;
        let location = self.resolve(EntityType::Location, &data, &mut skips)?;
        let owner = self.resolve(EntityType::Owner, &data, &mut skips)?;
        let license = self.resolve(EntityType::License, &data, &mut skips)?;
        let district = self.resolve(EntityType::SchoolDistrict, &data, &mut skips)?;
        let schedule = self.resolve(EntityType::Schedule, &data, &mut skips)?;
        let city = self.resolve(EntityType::City, &data, &mut skips)?;
        let state = self.resolve(EntityType::State, &data, &mut skips)?;
        let zip = self.resolve(EntityType::ZipCode, &data, &mut skips)?;
        let address = self.resolve(EntityType::Address, &data, &mut skips)?;
        let zone = self.resolve(EntityType::TimeZone, &data, &mut skips)?;
        let license_type = self.resolve(EntityType::LicenseType, &data, &mut skips)?;
        let facility_phone = self.resolve(EntityType::PhoneNumber, &data, &mut skips)?;

        // ====================================================================
        // DERIVED ENTITIES (only when the source value is present)
        // ====================================================================
        let owner_phone = self.resolve_derived(
            EntityType::PhoneNumber,
            data.get(Field::AlternativeContactNumber)
                .map(|phone| RowData::new().with(Field::PhoneNumber, phone)),
        )?;
        let issued = self.resolve_derived(
            EntityType::Date,
            data.get(Field::LicenseIssueDate)
                .map(|date| RowData::new().with(Field::DateValue, normalize_date(date))),
        )?;
        let expires = self.resolve_derived(
            EntityType::Date,
            data.get(Field::LicenseExpiryDate)
                .map(|date| RowData::new().with(Field::DateValue, normalize_date(date))),
        )?;

        // ====================================================================
        // EDGES
        // ====================================================================
        use RelationshipType as R;

        self.link(facility.as_ref(), R::LocatedAt, location.as_ref())?;
        self.link(facility.as_ref(), R::OwnedBy, owner.as_ref())?;
        self.link(facility.as_ref(), R::LicensedUnder, license.as_ref())?;
        self.link(facility.as_ref(), R::AffiliatedWith, district.as_ref())?;
        self.link(facility.as_ref(), R::FollowsSchedule, schedule.as_ref())?;
        self.link(facility.as_ref(), R::HasPhone, facility_phone.as_ref())?;

        self.link(location.as_ref(), R::LocatedIn, city.as_ref())?;
        self.link(location.as_ref(), R::InState, state.as_ref())?;
        self.link(location.as_ref(), R::HasZip, zip.as_ref())?;
        self.link(location.as_ref(), R::HasAddress, address.as_ref())?;
        self.link(location.as_ref(), R::UsesTimezone, zone.as_ref())?;

        self.link(city.as_ref(), R::InState, state.as_ref())?;
        self.link(zip.as_ref(), R::InCity, city.as_ref())?;
        self.link(zip.as_ref(), R::InState, state.as_ref())?;

        self.link(owner.as_ref(), R::HasPhone, owner_phone.as_ref())?;
        self.link(owner.as_ref(), R::OwnsFacility, facility.as_ref())?;
        self.link(owner.as_ref(), R::HoldsLicense, license.as_ref())?;

        self.link(license.as_ref(), R::GrantedTo, facility.as_ref())?;
        self.link(license.as_ref(), R::HasType, license_type.as_ref())?;
        self.link(license.as_ref(), R::IssuedOn, issued.as_ref())?;
        self.link(license.as_ref(), R::ExpiresOn, expires.as_ref())?;

        self.link(district.as_ref(), R::Oversees, facility.as_ref())?;

        if let Some(schedule) = &schedule {
            self.materialize_week(&data, schedule)?;
        }

        for reason in &skips {
            *self.report.skipped.entry(*reason).or_insert(0) += 1;
        }
        self.seen_rows.insert(fingerprint, skips);

        Ok(())
    }

    /// One ScheduleEntry per day with hours, with its day/status/time edges
    ///
    /// Entries hang off the facility's Schedule; without one nothing is resolved.
    fn materialize_week(&mut self, data: &RowData, schedule: &EntityId) -> Result<()> {
        use RelationshipType as R;

        for (day, field) in WEEK {
            let Some(text) = data.get(field) else {
                continue;
            };
            let hours = DayHours::parse(text);
            let entry_data = RowData::new()
                .with(Field::Day, day)
                .with(Field::Hours, text)
                .with(Field::Status, hours.status());

            let entry = self.resolve_derived(EntityType::ScheduleEntry, Some(entry_data.clone()))?;
            let weekday = self.resolve_derived(EntityType::DayOfWeek, Some(entry_data.clone()))?;
            let status = self.resolve_derived(EntityType::Status, Some(entry_data))?;

            self.link(Some(schedule), R::HasOperationHours, entry.as_ref())?;
            self.link(entry.as_ref(), R::HasDay, weekday.as_ref())?;
            self.link(entry.as_ref(), R::Status, status.as_ref())?;

            if let DayHours::Open { opens, closes } = hours {
                let opens_at = self.resolve_time(opens)?;
                let closes_at = self.resolve_time(closes)?;
                self.link(entry.as_ref(), R::OpensAt, opens_at.as_ref())?;
                self.link(entry.as_ref(), R::ClosesAt, closes_at.as_ref())?;
            }
        }

        Ok(())
    }

    fn resolve_time(&mut self, time: Option<String>) -> Result<Option<EntityId>> {
        self.resolve_derived(
            EntityType::Time,
            time.map(|t| RowData::new().with(Field::TimeValue, t)),
        )
    }

    /// Resolve an entity from a sub-projection that exists only when its
    /// source value does; absence is not a skip
    fn resolve_derived(
        &mut self,
        entity_type: EntityType,
        data: Option<RowData>,
    ) -> Result<Option<EntityId>> {
        match data {
            Some(data) => self.resolve(entity_type, &data, &mut BTreeSet::new()),
            None => Ok(None),
        }
    }

    /// Key, register, and persist one entity with its attributes
    ///
    /// Returns None when the type is disabled or its key cannot be built.
    fn resolve(
        &mut self,
        entity_type: EntityType,
        data: &RowData,
        skips: &mut BTreeSet<SkipReason>,
    ) -> Result<Option<EntityId>> {
        if !self.enabled.contains(&entity_type) {
            return Ok(None);
        }

        let key = match natural_key(entity_type, data) {
            Ok(key) => key,
            Err(GraphError::MissingRequiredField { entity_type, field }) => {
                tracing::warn!(
                    row = self.report.rows_processed,
                    entity_type = entity_type.name(),
                    field = field.column(),
                    "skipping entity: missing required field"
                );
                skips.insert(SkipReason { entity_type, field });
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let resolution = self.registry.get_or_create_entity(entity_type, &key);
        let entity = Entity {
            entity_id: resolution.id,
            entity_type,
            natural_key: key,
            attributes: self.schemas.extract_attributes(entity_type, data)?,
        };

        if resolution.created && self.sink.write_entity(&entity)? {
            self.report.entities_written += 1;
            *self.report.entities_by_type.entry(entity_type).or_insert(0) += 1;
        }

        for (name, value) in &entity.attributes {
            if !self.registry.claim_attribute_value(&entity.entity_id, name) {
                continue;
            }
            let attribute = AttributeValue {
                entity_id: entity.entity_id.clone(),
                entity_type,
                attribute_id: self.registry.get_or_create_attribute(name).id,
                name: name.clone(),
                value: value.clone(),
            };
            if self.sink.write_attribute(&attribute)? {
                self.report.attributes_written += 1;
            }
        }

        Ok(Some(entity.entity_id))
    }

    fn link(
        &mut self,
        from: Option<&EntityId>,
        kind: RelationshipType,
        to: Option<&EntityId>,
    ) -> Result<()> {
        let Some(edge) = build_relationship(&mut self.registry, from, to, kind) else {
            return Ok(());
        };

        if edge.created && self.sink.write_relationship(&edge.id)? {
            self.report.relationships_written += 1;
        }
        Ok(())
    }
}

/// Materialize `rows` into `sink` for the given entity types
pub fn materialize<S: GraphSink>(
    rows: &[SourceRow],
    sink: S,
    entity_types: &BTreeSet<EntityType>,
) -> Result<(MaterializeReport, S)> {
    let mut materializer =
        GraphMaterializer::new(sink).with_entity_types(entity_types.iter().copied());
    let report = materializer.run(rows)?;
    Ok((report, materializer.into_sink()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::schema_for;
    use crate::identity::entity_id;
    use crate::relationships::is_declared;
    use crate::sink::{MemorySink, TripleSink};
    use rusqlite::Connection;

    fn sunny_row(extracted: &str) -> SourceRow {
        SourceRow::default()
            .with(Field::DateExtracted, extracted)
            .with(Field::FacilityName, "Sunny Daycare")
            .with(Field::LicenseNumber, "LIC001")
            .with(Field::FacilityAddress, "1 Main St")
            .with(Field::City, "Springfield")
            .with(Field::State, "IL")
            .with(Field::ZipCode, "62701")
    }

    fn full_row() -> SourceRow {
        sunny_row("2024-01-01")
            .with(Field::PhoneNumber, "555-0100")
            .with(Field::FacilityType, "Child Care Center")
            .with(Field::FacilityStatus, "Active")
            .with(Field::LicenseType, "Center")
            .with(Field::LicenseIssueDate, "01/15/2020")
            .with(Field::LicenseExpiryDate, "01/15/2025")
            .with(Field::SchoolDistrict, "Springfield SD 186")
            .with(Field::OperationalSchedule, "Full Time")
            .with(Field::HoursMonday, "7:00 AM - 6:00 PM")
            .with(Field::HoursTuesday, "7:00 AM - 6:00 PM")
            .with(Field::HoursSunday, "Closed")
            .with(Field::AlternativeContactNumber, "555-0199")
            .with(Field::Capacity, "45.0")
    }

    fn run_memory(rows: &[SourceRow]) -> (MaterializeReport, MemorySink) {
        let all = EntityType::ALL.into_iter().collect();
        materialize(rows, MemorySink::new(), &all).unwrap()
    }

    type GraphSnapshot = (
        BTreeSet<EntityId>,
        BTreeSet<(EntityId, String, String)>,
        BTreeSet<(EntityId, EntityId, RelationshipType)>,
    );

    fn snapshot(sink: &MemorySink) -> GraphSnapshot {
        let entities = sink.entities.keys().cloned().collect();
        let attributes = sink
            .entities
            .values()
            .flat_map(|e| {
                e.attributes
                    .iter()
                    .map(move |(k, v)| (e.entity_id.clone(), k.clone(), v.clone()))
            })
            .collect();
        (entities, attributes, sink.relationships.clone())
    }

    #[test]
    fn test_sunny_daycare_scenario() {
        let rows = vec![sunny_row("2024-01-01"), sunny_row("2024-02-01")];
        let (report, sink) = run_memory(&rows);

        assert_eq!(sink.entities_of(EntityType::Facility).len(), 1);
        assert_eq!(sink.entities_of(EntityType::Location).len(), 1);
        assert_eq!(sink.relationships_of(RelationshipType::LocatedAt), 1);
        assert_eq!(report.rows_processed, 2);
        assert_eq!(report.duplicate_rows, 0, "Extraction dates differ");

        let facility = sink.entities_of(EntityType::Facility)[0];
        assert_eq!(
            facility.entity_id,
            entity_id("Facility", "Sunny Daycare|LIC001|1 Main St")
        );
        assert!(sink.finished);
    }

    #[test]
    fn test_determinism_across_runs() {
        let rows = vec![full_row(), sunny_row("2024-03-01")];

        let (report1, sink1) = run_memory(&rows);
        let (report2, sink2) = run_memory(&rows);

        assert_eq!(snapshot(&sink1), snapshot(&sink2));
        assert_eq!(report1, report2);
    }

    #[test]
    fn test_row_order_does_not_change_graph() {
        let other = sunny_row("2024-01-01")
            .with(Field::FacilityName, "Little Stars")
            .with(Field::LicenseNumber, "LIC002")
            .with(Field::FacilityStatus, "Active");
        let forward = vec![full_row(), other.clone()];
        let backward = vec![other, full_row()];

        let (_, a) = run_memory(&forward);
        let (_, b) = run_memory(&backward);

        assert_eq!(snapshot(&a), snapshot(&b));
    }

    #[test]
    fn test_dedup_idempotence() {
        let (once, sink_once) = run_memory(&[full_row()]);
        let (twice, sink_twice) = run_memory(&[full_row(), full_row()]);

        assert_eq!(snapshot(&sink_once), snapshot(&sink_twice));
        assert_eq!(once.entities_written, twice.entities_written);
        assert_eq!(once.attributes_written, twice.attributes_written);
        assert_eq!(once.relationships_written, twice.relationships_written);
        assert_eq!(twice.duplicate_rows, 1);
    }

    #[test]
    fn test_repeat_row_through_registry_adds_nothing() {
        let mut materializer = GraphMaterializer::new(MemorySink::new());
        materializer.run(&[]).unwrap();

        materializer.process_row(&sunny_row("2024-01-01")).unwrap();
        let entities = materializer.registry().entity_count();
        let edges = materializer.registry().relationship_count();

        // Different fingerprint, same entities
        materializer.process_row(&sunny_row("2024-05-01")).unwrap();
        assert_eq!(materializer.registry().entity_count(), entities);
        assert_eq!(materializer.registry().relationship_count(), edges);
    }

    #[test]
    fn test_key_collision_prevention() {
        let a = sunny_row("2024-01-01");
        let b = sunny_row("2024-01-01").with(Field::FacilityAddress, "2 Main St");
        let (_, sink) = run_memory(&[a, b]);

        assert_eq!(sink.entities_of(EntityType::Facility).len(), 2, "No false merge");
        assert_eq!(sink.entities_of(EntityType::Location).len(), 2);
        assert_eq!(sink.entities_of(EntityType::Owner).len(), 1, "No false split");
        assert_eq!(sink.entities_of(EntityType::City).len(), 1);
    }

    #[test]
    fn test_missing_license_number_skips_owner_and_license() {
        let row = SourceRow::default()
            .with(Field::FacilityName, "Sunny Daycare")
            .with(Field::FacilityAddress, "1 Main St")
            .with(Field::City, "Springfield")
            .with(Field::State, "IL")
            .with(Field::ZipCode, "62701");
        let (report, sink) = run_memory(&[row]);

        assert!(sink.entities_of(EntityType::Owner).is_empty());
        assert!(sink.entities_of(EntityType::License).is_empty());
        assert_eq!(
            sink.entities_of(EntityType::Facility).len(),
            0,
            "Facility key also needs the license number"
        );
        assert_eq!(sink.entities_of(EntityType::Location).len(), 1);
        assert_eq!(sink.relationships_of(RelationshipType::OwnedBy), 0);

        let owner_skip = SkipReason {
            entity_type: EntityType::Owner,
            field: Field::LicenseNumber,
        };
        assert_eq!(report.skipped.get(&owner_skip), Some(&1));
    }

    #[test]
    fn test_skips_counted_once_per_row() {
        let row = sunny_row("2024-01-01");
        let (report, _) = run_memory(&[row.clone(), row.with(Field::DateExtracted, "2024-02-01")]);

        let reason = SkipReason {
            entity_type: EntityType::SchoolDistrict,
            field: Field::SchoolDistrict,
        };
        assert_eq!(report.skipped.get(&reason), Some(&2));
    }

    #[test]
    fn test_duplicate_rows_count_their_skips() {
        let row = sunny_row("2024-01-01");
        let (report, sink) = run_memory(&[row.clone(), row]);

        assert_eq!(report.duplicate_rows, 1);
        assert_eq!(sink.entities_of(EntityType::Facility).len(), 1);

        let district = SkipReason {
            entity_type: EntityType::SchoolDistrict,
            field: Field::SchoolDistrict,
        };
        let schedule = SkipReason {
            entity_type: EntityType::Schedule,
            field: Field::OperationalSchedule,
        };
        assert_eq!(report.skipped.get(&district), Some(&2), "Every row counts, duplicates too");
        assert_eq!(report.skipped.get(&schedule), Some(&2));

        let (single, _) = run_memory(&[sunny_row("2024-01-01")]);
        assert_eq!(report.total_skipped(), 2 * single.total_skipped());
    }

    #[test]
    fn test_no_dangling_edges() {
        let rows = vec![
            full_row(),
            sunny_row("2024-02-01").with(Field::LicenseNumber, ""),
            SourceRow::default().with(Field::City, "Springfield"),
        ];
        let (_, sink) = run_memory(&rows);

        assert!(!sink.relationships.is_empty());
        for (from, to, kind) in &sink.relationships {
            let from_entity = sink.entities.get(from).expect("edge source must exist");
            let to_entity = sink.entities.get(to).expect("edge target must exist");
            assert!(
                is_declared(from_entity.entity_type, *kind, to_entity.entity_type),
                "{} -[{}]-> {} is not a declared edge",
                from_entity.entity_type,
                kind,
                to_entity.entity_type
            );
        }
    }

    #[test]
    fn test_attribute_completeness() {
        let first = sunny_row("2024-01-01");
        let second = sunny_row("2024-02-01")
            .with(Field::FacilityStatus, "Active")
            .with(Field::FacilityType, "Home");
        let third = sunny_row("2024-03-01").with(Field::FacilityStatus, "Closed");
        let (report, sink) = run_memory(&[first, second, third]);

        let facility = sink.entities_of(EntityType::Facility)[0];
        assert_eq!(facility.attributes["facility_name"], "Sunny Daycare");
        assert_eq!(
            facility.attributes["facility_status"], "Active",
            "First value seen is kept exactly once"
        );
        assert_eq!(facility.attributes["facility_type"], "Home");
        assert_eq!(report.attributes_written, sink.attribute_count());

        let declared = schema_for(EntityType::Facility);
        for name in facility.attributes.keys() {
            assert!(declared.get(name).is_some(), "{} is not declared", name);
        }
    }

    #[test]
    fn test_weekly_schedule_entities() {
        let (_, sink) = run_memory(&[full_row()]);

        // Sunday is closed; Monday and Tuesday share their opening times
        assert_eq!(sink.entities_of(EntityType::ScheduleEntry).len(), 3);
        assert_eq!(sink.entities_of(EntityType::DayOfWeek).len(), 3);
        assert_eq!(sink.entities_of(EntityType::Status).len(), 2);
        assert_eq!(sink.entities_of(EntityType::Time).len(), 2);
        assert_eq!(sink.relationships_of(RelationshipType::HasOperationHours), 3);
        assert_eq!(sink.relationships_of(RelationshipType::OpensAt), 2);
        assert_eq!(sink.relationships_of(RelationshipType::ClosesAt), 2);

        let times: BTreeSet<_> = sink
            .entities_of(EntityType::Time)
            .iter()
            .map(|e| e.natural_key.clone())
            .collect();
        assert!(times.contains("07:00") && times.contains("18:00"));
    }

    #[test]
    fn test_schedule_entries_need_a_schedule() {
        let row = sunny_row("2024-01-01").with(Field::HoursMonday, "7:00 AM - 6:00 PM");
        let (report, sink) = run_memory(&[row]);

        assert!(sink.entities_of(EntityType::Schedule).is_empty());
        assert!(
            sink.entities_of(EntityType::ScheduleEntry).is_empty(),
            "No entry without a schedule to hang it on"
        );
        assert!(sink.entities_of(EntityType::DayOfWeek).is_empty());
        assert!(sink.entities_of(EntityType::Status).is_empty());
        assert!(sink.entities_of(EntityType::Time).is_empty());

        let reason = SkipReason {
            entity_type: EntityType::Schedule,
            field: Field::OperationalSchedule,
        };
        assert_eq!(report.skipped.get(&reason), Some(&1));
    }

    #[test]
    fn test_every_schedule_entry_has_operation_hours_edge() {
        let partial = sunny_row("2024-02-01")
            .with(Field::FacilityName, "Little Stars")
            .with(Field::LicenseNumber, "LIC002")
            .with(Field::HoursWednesday, "8:00 AM - 5:00 PM");
        let (_, sink) = run_memory(&[full_row(), partial]);

        let entries = sink.entities_of(EntityType::ScheduleEntry);
        assert!(!entries.is_empty());
        for entry in entries {
            let attached = sink.relationships.iter().any(|(_, to, kind)| {
                *kind == RelationshipType::HasOperationHours && *to == entry.entity_id
            });
            assert!(attached, "{} has no HAS_OPERATION_HOURS edge", entry.natural_key);
        }

        // Schedule disabled: entries have nothing to attach to either
        let enabled: BTreeSet<_> = EntityType::ALL
            .into_iter()
            .filter(|t| *t != EntityType::Schedule)
            .collect();
        let (_, sink) = materialize(&[full_row()], MemorySink::new(), &enabled).unwrap();
        assert!(sink.entities_of(EntityType::ScheduleEntry).is_empty());
    }

    #[test]
    fn test_license_dates_and_phones() {
        let (_, sink) = run_memory(&[full_row()]);

        let dates: BTreeSet<_> = sink
            .entities_of(EntityType::Date)
            .iter()
            .map(|e| e.natural_key.clone())
            .collect();
        assert_eq!(
            dates,
            ["2020-01-15", "2025-01-15"].iter().map(|s| s.to_string()).collect()
        );
        assert_eq!(sink.relationships_of(RelationshipType::IssuedOn), 1);
        assert_eq!(sink.relationships_of(RelationshipType::ExpiresOn), 1);
        assert_eq!(sink.entities_of(EntityType::PhoneNumber).len(), 2);
        assert_eq!(sink.relationships_of(RelationshipType::HasPhone), 2);
        assert_eq!(sink.entities_of(EntityType::TimeZone)[0].natural_key, "America/Chicago");
    }

    #[test]
    fn test_disabled_types_produce_no_edges() {
        let enabled: BTreeSet<_> = [EntityType::Facility, EntityType::Location].into_iter().collect();
        let (report, sink) = materialize(&[full_row()], MemorySink::new(), &enabled).unwrap();

        assert_eq!(sink.entities.len(), 2);
        assert_eq!(sink.relationships.len(), 1, "Only LOCATED_AT has both ends enabled");
        assert_eq!(report.entities_by_type.len(), 2);
    }

    #[test]
    fn test_missing_schema_aborts_before_rows() {
        let mut materializer =
            GraphMaterializer::new(MemorySink::new()).with_schemas(SchemaRegistry::empty());

        let err = materializer.run(&[full_row()]).unwrap_err();
        assert!(matches!(err, GraphError::UnknownEntityType(_)));
        assert!(materializer.sink().entities.is_empty());
        assert!(!materializer.sink().finished);
    }

    #[test]
    fn test_triple_store_run_matches_report() {
        let conn = Connection::open_in_memory().unwrap();
        let all = EntityType::ALL.into_iter().collect();
        let (report, _) = materialize(&[full_row(), full_row()], TripleSink::new(&conn), &all).unwrap();

        let triples: i64 = conn
            .query_row("SELECT COUNT(*) FROM triples", [], |row| row.get(0))
            .unwrap();
        let written =
            report.entities_written + report.attributes_written + report.relationships_written;
        assert_eq!(triples as usize, written);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let (report, _) = run_memory(&[sunny_row("2024-01-01")]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["rows_processed"], 1);
        assert_eq!(json["entities_by_type"]["Facility"], 1);
        assert_eq!(
            json["skipped"]["Owner: missing License Number"],
            serde_json::Value::Null,
            "Owner resolves when the license number is present"
        );
        assert_eq!(json["skipped"]["SchoolDistrict: missing School District Affiliation"], 1);
    }
}
