//! Typed field values extracted from matched log lines.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::BTreeMap;

/// A decoded, typed value for one capture slot.
///
/// The set is closed: every built-in line definition declares one of these
/// semantic types for each of its capture slots, and the decoder produces
/// exactly one variant per slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Base-10 integer.
    Integer(i64),
    /// An integer slot whose capture was present but empty. Distinct from
    /// a decode failure.
    Absent,
    /// A timestamp parsed against one of the registered layouts.
    Timestamp(DateTime<FixedOffset>),
    /// A duration in milliseconds. Milliseconds are the canonical unit for
    /// every duration field in the engine.
    Duration(f64),
    /// A traffic count. The unit is implied by field context (kilobytes
    /// for memory readings, bytes for derived memory diffs).
    Bytes(u64),
    /// Named integer counts parsed from a `Name: N | Name: N` list.
    Counts(BTreeMap<String, i64>),
    /// Free-form text, passed through unchanged.
    Text(String),
}

impl FieldValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<u64> {
        match self {
            FieldValue::Bytes(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_duration_ms(&self) -> Option<f64> {
        match self {
            FieldValue::Duration(ms) => Some(*ms),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_counts(&self) -> Option<&BTreeMap<String, i64>> {
        match self {
            FieldValue::Counts(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            FieldValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_variants() {
        assert_eq!(FieldValue::Integer(42).as_integer(), Some(42));
        assert_eq!(FieldValue::Bytes(1024).as_bytes(), Some(1024));
        assert_eq!(FieldValue::Duration(3.5).as_duration_ms(), Some(3.5));
        assert_eq!(FieldValue::Text("GET".to_string()).as_text(), Some("GET"));

        assert_eq!(FieldValue::Absent.as_integer(), None);
        assert_eq!(FieldValue::Integer(1).as_bytes(), None);
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_string(&FieldValue::Integer(200)).unwrap();
        assert_eq!(json, "200");

        let json = serde_json::to_string(&FieldValue::Text("index".to_string())).unwrap();
        assert_eq!(json, "\"index\"");
    }
}
