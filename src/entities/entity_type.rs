// 🏷️ Entity Types - the closed set of node kinds in the facility graph

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Facility,
    Location,
    Owner,
    License,
    SchoolDistrict,
    Schedule,
    ScheduleEntry,
    City,
    State,
    ZipCode,
    Address,
    TimeZone,
    PhoneNumber,
    LicenseType,
    Date,
    DayOfWeek,
    Time,
    Status,
    BirthYear,
    AgeGroup,
}

impl EntityType {
    pub const ALL: [EntityType; 20] = [
        EntityType::Facility,
        EntityType::Location,
        EntityType::Owner,
        EntityType::License,
        EntityType::SchoolDistrict,
        EntityType::Schedule,
        EntityType::ScheduleEntry,
        EntityType::City,
        EntityType::State,
        EntityType::ZipCode,
        EntityType::Address,
        EntityType::TimeZone,
        EntityType::PhoneNumber,
        EntityType::LicenseType,
        EntityType::Date,
        EntityType::DayOfWeek,
        EntityType::Time,
        EntityType::Status,
        EntityType::BirthYear,
        EntityType::AgeGroup,
    ];

    /// Name used as the identity category and as the ENTITY_TYPE triple object
    pub fn name(&self) -> &'static str {
        match self {
            EntityType::Facility => "Facility",
            EntityType::Location => "Location",
            EntityType::Owner => "Owner",
            EntityType::License => "License",
            EntityType::SchoolDistrict => "SchoolDistrict",
            EntityType::Schedule => "Schedule",
            EntityType::ScheduleEntry => "ScheduleEntry",
            EntityType::City => "City",
            EntityType::State => "State",
            EntityType::ZipCode => "ZipCode",
            EntityType::Address => "Address",
            EntityType::TimeZone => "TimeZone",
            EntityType::PhoneNumber => "PhoneNumber",
            EntityType::LicenseType => "LicenseType",
            EntityType::Date => "Date",
            EntityType::DayOfWeek => "DayOfWeek",
            EntityType::Time => "Time",
            EntityType::Status => "Status",
            EntityType::BirthYear => "BirthYear",
            EntityType::AgeGroup => "AgeGroup",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityType {
    type Err = GraphError;

    /// Accepts "SchoolDistrict", "School District", "school_district", ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        EntityType::ALL
            .iter()
            .copied()
            .find(|t| t.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| GraphError::UnknownEntityType(s.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = EntityType::ALL.iter().map(|t| t.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), EntityType::ALL.len());
    }

    #[test]
    fn test_parse_entity_type_spellings() {
        assert_eq!("Facility".parse::<EntityType>().unwrap(), EntityType::Facility);
        assert_eq!(
            "School District".parse::<EntityType>().unwrap(),
            EntityType::SchoolDistrict
        );
        assert_eq!(
            "schedule_entry".parse::<EntityType>().unwrap(),
            EntityType::ScheduleEntry
        );
    }

    #[test]
    fn test_parse_unknown_entity_type() {
        let err = "Spaceship".parse::<EntityType>().unwrap_err();
        assert!(matches!(err, GraphError::UnknownEntityType(ref name) if name == "Spaceship"));
    }
}
