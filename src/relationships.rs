// 🔗 Relationship Builder - typed, directed, deduplicated edges

use crate::entities::EntityType;
use crate::identity::{generate_id, EntityId};
use crate::registry::{EntityRegistry, Resolution};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationshipType {
    LocatedAt,
    OwnedBy,
    LicensedUnder,
    AffiliatedWith,
    FollowsSchedule,
    HasPhone,
    LocatedIn,
    InState,
    HasZip,
    HasAddress,
    UsesTimezone,
    InCity,
    OwnsFacility,
    HoldsLicense,
    GrantedTo,
    HasType,
    IssuedOn,
    ExpiresOn,
    Oversees,
    HasOperationHours,
    HasDay,
    OpensAt,
    ClosesAt,
    Status,
}

impl RelationshipType {
    /// Edge label in the graph (and predicate in the triple store)
    pub fn label(&self) -> &'static str {
        match self {
            RelationshipType::LocatedAt => "LOCATED_AT",
            RelationshipType::OwnedBy => "OWNED_BY",
            RelationshipType::LicensedUnder => "LICENSED_UNDER",
            RelationshipType::AffiliatedWith => "AFFILIATED_WITH",
            RelationshipType::FollowsSchedule => "FOLLOWS_SCHEDULE",
            RelationshipType::HasPhone => "HAS_PHONE",
            RelationshipType::LocatedIn => "LOCATED_IN",
            RelationshipType::InState => "IN_STATE",
            RelationshipType::HasZip => "HAS_ZIP",
            RelationshipType::HasAddress => "HAS_ADDRESS",
            RelationshipType::UsesTimezone => "USES_TIMEZONE",
            RelationshipType::InCity => "IN_CITY",
            RelationshipType::OwnsFacility => "OWNS_FACILITY",
            RelationshipType::HoldsLicense => "HOLDS_LICENSE",
            RelationshipType::GrantedTo => "GRANTED_TO",
            RelationshipType::HasType => "HAS_TYPE",
            RelationshipType::IssuedOn => "ISSUED_ON",
            RelationshipType::ExpiresOn => "EXPIRES_ON",
            RelationshipType::Oversees => "OVERSEES",
            RelationshipType::HasOperationHours => "HAS_OPERATION_HOURS",
            RelationshipType::HasDay => "HAS_DAY",
            RelationshipType::OpensAt => "OPENS_AT",
            RelationshipType::ClosesAt => "CLOSES_AT",
            RelationshipType::Status => "STATUS",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every edge the materializer may emit: (from type, label, to type)
pub const DECLARED_EDGES: [(EntityType, RelationshipType, EntityType); 27] = [
    (EntityType::Facility, RelationshipType::LocatedAt, EntityType::Location),
    (EntityType::Facility, RelationshipType::OwnedBy, EntityType::Owner),
    (EntityType::Facility, RelationshipType::LicensedUnder, EntityType::License),
    (EntityType::Facility, RelationshipType::AffiliatedWith, EntityType::SchoolDistrict),
    (EntityType::Facility, RelationshipType::FollowsSchedule, EntityType::Schedule),
    (EntityType::Facility, RelationshipType::HasPhone, EntityType::PhoneNumber),
    (EntityType::Location, RelationshipType::LocatedIn, EntityType::City),
    (EntityType::Location, RelationshipType::InState, EntityType::State),
    (EntityType::Location, RelationshipType::HasZip, EntityType::ZipCode),
    (EntityType::Location, RelationshipType::HasAddress, EntityType::Address),
    (EntityType::Location, RelationshipType::UsesTimezone, EntityType::TimeZone),
    (EntityType::City, RelationshipType::InState, EntityType::State),
    (EntityType::ZipCode, RelationshipType::InCity, EntityType::City),
    (EntityType::ZipCode, RelationshipType::InState, EntityType::State),
    (EntityType::Owner, RelationshipType::HasPhone, EntityType::PhoneNumber),
    (EntityType::Owner, RelationshipType::OwnsFacility, EntityType::Facility),
    (EntityType::Owner, RelationshipType::HoldsLicense, EntityType::License),
    (EntityType::License, RelationshipType::GrantedTo, EntityType::Facility),
    (EntityType::License, RelationshipType::HasType, EntityType::LicenseType),
    (EntityType::License, RelationshipType::IssuedOn, EntityType::Date),
    (EntityType::License, RelationshipType::ExpiresOn, EntityType::Date),
    (EntityType::SchoolDistrict, RelationshipType::Oversees, EntityType::Facility),
    (EntityType::Schedule, RelationshipType::HasOperationHours, EntityType::ScheduleEntry),
    (EntityType::ScheduleEntry, RelationshipType::HasDay, EntityType::DayOfWeek),
    (EntityType::ScheduleEntry, RelationshipType::OpensAt, EntityType::Time),
    (EntityType::ScheduleEntry, RelationshipType::ClosesAt, EntityType::Time),
    (EntityType::ScheduleEntry, RelationshipType::Status, EntityType::Status),
];

/// Whether `from -[kind]-> to` is part of the graph model
pub fn is_declared(from: EntityType, kind: RelationshipType, to: EntityType) -> bool {
    DECLARED_EDGES.iter().any(|edge| *edge == (from, kind, to))
}

/// A directed, typed edge between two resolved entities
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub relationship_id: String,
    pub from: EntityId,
    pub to: EntityId,
    pub kind: RelationshipType,
}

impl Relationship {
    pub fn new(from: EntityId, to: EntityId, kind: RelationshipType) -> Self {
        let relationship_id = generate_id(
            "Relationship",
            &format!("{}->{}:{}", from, to, kind.label()),
        );

        Relationship {
            relationship_id,
            from,
            to,
            kind,
        }
    }
}

/// Build (or find) the edge `from -[kind]-> to`
///
/// Returns None when either endpoint is missing: dangling edges are never
/// emitted. Building the same edge twice yields `created == false`.
pub fn build_relationship(
    registry: &mut EntityRegistry,
    from: Option<&EntityId>,
    to: Option<&EntityId>,
    kind: RelationshipType,
) -> Option<Resolution<Relationship>> {
    registry.get_or_create_relationship(from, to, kind)
}
