// 🗝️ Entity Key Resolver - what "the same real-world entity" means
//
// One key function per entity type. Components are joined with '|'.
// A missing required field rejects the entity for that row instead of
// letting unrelated rows collide on a key like "||".

use crate::entities::{EntityType, Field, RowData, CLOSED_MARKER, WEEK};
use crate::error::Result;

pub const KEY_SEPARATOR: &str = "|";

pub type KeyFn = fn(&RowData) -> Result<String>;

/// Key function for an entity type (exhaustive: every type has one)
pub fn key_fn(entity_type: EntityType) -> KeyFn {
    match entity_type {
        EntityType::Facility => |d: &RowData| {
            join(
                EntityType::Facility,
                d,
                &[Field::FacilityName, Field::LicenseNumber, Field::FacilityAddress],
            )
        },
        EntityType::Location => |d: &RowData| {
            join(
                EntityType::Location,
                d,
                &[Field::FacilityAddress, Field::City, Field::State, Field::ZipCode],
            )
        },
        EntityType::Owner => |d: &RowData| join(EntityType::Owner, d, &[Field::LicenseNumber]),
        EntityType::License => |d: &RowData| join(EntityType::License, d, &[Field::LicenseNumber]),
        EntityType::SchoolDistrict => {
            |d: &RowData| join(EntityType::SchoolDistrict, d, &[Field::SchoolDistrict])
        }
        EntityType::Schedule => schedule_key,
        EntityType::ScheduleEntry => {
            |d: &RowData| join(EntityType::ScheduleEntry, d, &[Field::Day, Field::Hours])
        }
        EntityType::City => |d: &RowData| join(EntityType::City, d, &[Field::City, Field::State]),
        EntityType::State => |d: &RowData| join(EntityType::State, d, &[Field::State]),
        EntityType::ZipCode => |d: &RowData| join(EntityType::ZipCode, d, &[Field::ZipCode]),
        EntityType::Address => {
            |d: &RowData| join(EntityType::Address, d, &[Field::FacilityAddress, Field::ZipCode])
        }
        EntityType::TimeZone => |d: &RowData| join(EntityType::TimeZone, d, &[Field::TimeZone]),
        EntityType::PhoneNumber => |d: &RowData| join(EntityType::PhoneNumber, d, &[Field::PhoneNumber]),
        EntityType::LicenseType => |d: &RowData| join(EntityType::LicenseType, d, &[Field::LicenseType]),
        EntityType::Date => |d: &RowData| join(EntityType::Date, d, &[Field::DateValue]),
        EntityType::DayOfWeek => |d: &RowData| join(EntityType::DayOfWeek, d, &[Field::Day]),
        EntityType::Time => |d: &RowData| join(EntityType::Time, d, &[Field::TimeValue]),
        EntityType::Status => |d: &RowData| join(EntityType::Status, d, &[Field::Status]),
        EntityType::BirthYear => |d: &RowData| join(EntityType::BirthYear, d, &[Field::Year]),
        EntityType::AgeGroup => |d: &RowData| join(EntityType::AgeGroup, d, &[Field::AgeLabel]),
    }
}

/// Natural key of `entity_type` for one row projection
pub fn natural_key(entity_type: EntityType, data: &RowData) -> Result<String> {
    key_fn(entity_type)(data)
}

fn join(entity_type: EntityType, data: &RowData, fields: &[Field]) -> Result<String> {
    let parts = fields
        .iter()
        .map(|field| data.require(entity_type, *field))
        .collect::<Result<Vec<_>>>()?;

    Ok(parts.join(KEY_SEPARATOR))
}

/// Operational schedule plus the hours of each weekday (absent days = closed)
fn schedule_key(data: &RowData) -> Result<String> {
    let mut parts = vec![data.require(EntityType::Schedule, Field::OperationalSchedule)?];
    parts.extend(
        WEEK.iter()
            .map(|(_, field)| data.get(*field).unwrap_or(CLOSED_MARKER)),
    );

    Ok(parts.join(KEY_SEPARATOR))
}
