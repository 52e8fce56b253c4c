// Entity Models
// Every node in the facility graph is identified by (EntityType, natural key).
//
// Each entity has:
// - A content-derived id that is stable across runs
// - A declared attribute schema (see attributes.rs)
// - A natural key function (see keys.rs)

pub mod entity_type;
pub mod field;
pub mod schedule;
pub mod timezone;
pub mod values;

pub use entity_type::EntityType;
pub use field::{Field, RowData};
pub use schedule::{DayHours, CLOSED_MARKER, WEEK};
pub use timezone::zone_for_state;
pub use values::{normalize_date, normalize_time};

use crate::identity::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resolved entity together with the attributes observed for it in one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: EntityId,
    pub entity_type: EntityType,
    pub natural_key: String,
    pub attributes: BTreeMap<String, String>,
}
