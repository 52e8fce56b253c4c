// 🧩 Fields + RowData - the parsed projection every key function reads from
//
// A Field is either a column of the facility filing or a value derived while
// expanding nested entities (weekday, time, date, ...).

use super::EntityType;
use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    // ========================================================================
    // SOURCE COLUMNS
    // ========================================================================
    DateExtracted,
    LicenseNumber,
    LicenseIssueDate,
    LicenseExpiryDate,
    LicenseType,
    FacilityName,
    FacilityAddress,
    City,
    State,
    ZipCode,
    PhoneNumber,
    FacilityType,
    Capacity,
    Enrollment,
    Staff,
    OperationalSchedule,
    AcceptsSubsidies,
    HoursSunday,
    HoursMonday,
    HoursTuesday,
    HoursWednesday,
    HoursThursday,
    HoursFriday,
    HoursSaturday,
    SchoolDistrict,
    AlternativeAddress,
    AlternativeZip,
    AlternativeContactNumber,
    DateOriginallyLicensed,
    FacilityStatus,

    // ========================================================================
    // DERIVED (nested entity projections)
    // ========================================================================
    Day,
    Hours,
    TimeValue,
    DateValue,
    Status,
    TimeZone,
    Year,
    AgeLabel,
}

impl Field {
    /// Column header in the source table, or the derived value's name
    pub fn column(&self) -> &'static str {
        match self {
            Field::DateExtracted => "Date Extracted",
            Field::LicenseNumber => "License Number",
            Field::LicenseIssueDate => "License Issue Date",
            Field::LicenseExpiryDate => "License Expiry Date",
            Field::LicenseType => "License Type",
            Field::FacilityName => "Facility Name",
            Field::FacilityAddress => "Facility Address",
            Field::City => "City",
            Field::State => "State",
            Field::ZipCode => "Zip Code",
            Field::PhoneNumber => "Phone Number",
            Field::FacilityType => "Facility Type",
            Field::Capacity => "Capacity",
            Field::Enrollment => "Enrollment",
            Field::Staff => "Staff",
            Field::OperationalSchedule => "Operational Schedule",
            Field::AcceptsSubsidies => "Accepts Subsidies",
            Field::HoursSunday => "Hours of Operation (Sunday)",
            Field::HoursMonday => "Hours of Operation (Monday)",
            Field::HoursTuesday => "Hours of Operation (Tuesday)",
            Field::HoursWednesday => "Hours of Operation (Wednesday)",
            Field::HoursThursday => "Hours of Operation (Thursday)",
            Field::HoursFriday => "Hours of Operation (Friday)",
            Field::HoursSaturday => "Hours of Operation (Saturday)",
            Field::SchoolDistrict => "School District Affiliation",
            Field::AlternativeAddress => "Alternative Address",
            Field::AlternativeZip => "Facility Zip (Alt)",
            Field::AlternativeContactNumber => "Alternative Contact Number",
            Field::DateOriginallyLicensed => "Date Originally Licensed",
            Field::FacilityStatus => "Facility Status",
            Field::Day => "day",
            Field::Hours => "hours",
            Field::TimeValue => "time_value",
            Field::DateValue => "date_value",
            Field::Status => "status",
            Field::TimeZone => "time_zone",
            Field::Year => "year",
            Field::AgeLabel => "age_label",
        }
    }

    /// Columns the source stores as numbers (pandas writes them as floats)
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Field::ZipCode
                | Field::AlternativeZip
                | Field::Capacity
                | Field::Enrollment
                | Field::Staff
                | Field::Year
        )
    }
}

/// RowData - present, trimmed values of one row projection
///
/// Blank values never enter the map, so "present" always means non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowData {
    values: BTreeMap<Field, String>,
}

impl RowData {
    pub fn new() -> Self {
        RowData::default()
    }

    /// Builder: set a field (blank values are dropped)
    pub fn with(mut self, field: Field, value: impl AsRef<str>) -> Self {
        self.set(field, Some(value.as_ref()));
        self
    }

    /// Set a field from an optional raw value
    pub fn set(&mut self, field: Field, value: Option<&str>) {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            self.values.remove(&field);
            return;
        };

        let value = if field.is_integer() {
            normalize_integer(raw)
        } else {
            raw.to_string()
        };
        self.values.insert(field, value);
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    /// Value required to build a natural key for `entity_type`
    pub fn require(&self, entity_type: EntityType, field: Field) -> Result<&str> {
        self.get(field)
            .ok_or(GraphError::MissingRequiredField { entity_type, field })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// "62701.0" -> "62701"; anything else (including "02134") is kept as-is
fn normalize_integer(raw: &str) -> String {
    match raw.split_once('.') {
        Some((whole, fraction))
            if !whole.is_empty()
                && whole.chars().all(|c| c.is_ascii_digit())
                && fraction.chars().all(|c| c == '0') =>
        {
            whole.to_string()
        }
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_absent() {
        let data = RowData::new()
            .with(Field::FacilityName, "  ")
            .with(Field::City, "")
            .with(Field::State, " IL ");

        assert!(!data.contains(Field::FacilityName));
        assert!(!data.contains(Field::City));
        assert_eq!(data.get(Field::State), Some("IL"));
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_integer_fields_drop_float_suffix() {
        let data = RowData::new()
            .with(Field::ZipCode, "62701.0")
            .with(Field::Capacity, "12")
            .with(Field::AlternativeZip, "62701-1234");

        assert_eq!(data.get(Field::ZipCode), Some("62701"));
        assert_eq!(data.get(Field::Capacity), Some("12"));
        assert_eq!(data.get(Field::AlternativeZip), Some("62701-1234"));
    }

    #[test]
    fn test_integer_fields_keep_leading_zeros() {
        let data = RowData::new()
            .with(Field::ZipCode, "02134")
            .with(Field::AlternativeZip, "02134.0");

        assert_eq!(data.get(Field::ZipCode), Some("02134"));
        assert_eq!(data.get(Field::AlternativeZip), Some("02134"));
    }

    #[test]
    fn test_text_fields_are_not_normalized() {
        let data = RowData::new().with(Field::LicenseNumber, "0012.0");
        assert_eq!(data.get(Field::LicenseNumber), Some("0012.0"));
    }

    #[test]
    fn test_require_reports_entity_and_field() {
        let data = RowData::new();
        let err = data.require(EntityType::License, Field::LicenseNumber).unwrap_err();

        match err {
            GraphError::MissingRequiredField { entity_type, field } => {
                assert_eq!(entity_type, EntityType::License);
                assert_eq!(field, Field::LicenseNumber);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
