//! Core record types shared by every tier.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single domain record.
///
/// Identity is the `id`; everything else rides along opaquely as a JSON map
/// so the store never has to understand the payloads it caches. Tiers replace
/// entries by `id`, not by full-value comparison - the derived `PartialEq`
/// exists for tests and callers, not for cache-replacement decisions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique record key.
    pub id: String,

    /// Opaque attribute payload.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Record {
    /// Creates a record with an empty attribute payload.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    /// Creates a record carrying the given attributes.
    pub fn with_attributes(id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }
}

/// One tier's full contents at one instant, in the tier's order.
///
/// No uniqueness invariant is enforced here; each tier is responsible for not
/// duplicating keys internally.
pub type RecordCollection = Vec<Record>;

/// Milliseconds since the UNIX epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_roundtrips_with_flat_attributes() {
        let mut attributes = Map::new();
        attributes.insert("title".to_string(), json!("Dune"));
        attributes.insert("year".to_string(), json!(1965));
        let record = Record::with_attributes("book-1", attributes);

        let encoded = serde_json::to_string(&record).unwrap();
        assert!(encoded.contains("\"id\":\"book-1\""));
        assert!(encoded.contains("\"title\":\"Dune\""));

        let decoded: Record = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_record_new_has_empty_payload() {
        let record = Record::new("r-1");
        assert_eq!(record.id, "r-1");
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn test_now_ms_is_monotonic_enough() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }
}
