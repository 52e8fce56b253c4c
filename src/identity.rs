// 🔑 Identity Generator - content-addressed ids
//
// id = md5("{category}:{natural_key}") as lowercase hex (128 bits).
// Pure: the same input always yields the same id, across runs and machines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an entity in the output graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId(id)
    }
}

/// Generate a stable id for `natural_key` within `category`
pub fn generate_id(category: &str, natural_key: &str) -> String {
    if natural_key.is_empty() {
        tracing::warn!(category, "generating id for an empty natural key");
    }

    let digest = md5::compute(format!("{}:{}", category, natural_key).as_bytes());
    format!("{:x}", digest)
}

/// Entity id for a natural key of the given entity category
pub fn entity_id(category: &str, natural_key: &str) -> EntityId {
    EntityId(generate_id(category, natural_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_deterministic() {
        let id1 = generate_id("Facility", "Sunny Daycare|LIC001|1 Main St");
        let id2 = generate_id("Facility", "Sunny Daycare|LIC001|1 Main St");

        assert_eq!(id1, id2, "Same input should produce same id");
        assert_eq!(id1.len(), 32, "MD5 hex digest should be 32 characters");
        assert!(id1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_id_known_value() {
        // md5("Owner:LIC001")
        let expected = format!("{:x}", md5::compute(b"Owner:LIC001"));
        assert_eq!(generate_id("Owner", "LIC001"), expected);
    }

    #[test]
    fn test_category_separates_ids() {
        let owner = generate_id("Owner", "LIC001");
        let license = generate_id("License", "LIC001");
        assert_ne!(owner, license, "Owner and License share a key but not an id");
    }

    #[test]
    fn test_different_keys_produce_different_ids() {
        assert_ne!(generate_id("City", "Springfield|IL"), generate_id("City", "Springfield|MO"));
    }

    #[test]
    fn test_empty_key_still_generates() {
        let id = generate_id("State", "");
        assert_eq!(id.len(), 32);
    }
}
