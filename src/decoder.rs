//! Field decoding: raw captured substrings to typed values.
//!
//! Every capture slot in a line definition declares one [`FieldKind`]; the
//! decoder is the single place where raw text becomes a [`FieldValue`].
//! A decode failure is reported to the caller as a [`DecodeError`] so the
//! line matcher can demote the candidate definition instead of crashing
//! the stream.

use crate::error::DecodeError;
use crate::value::FieldValue;
use chrono::DateTime;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Semantic type tag for one capture slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form text, passed through unchanged.
    Text,
    /// Base-10 integer; an empty capture decodes to [`FieldValue::Absent`].
    Integer,
    /// Timestamp matched against the registered layouts in priority order.
    Timestamp,
    /// Decimal duration in milliseconds.
    DurationMsec,
    /// Integer traffic count; the unit is implied by field context.
    Traffic,
    /// `Name: N | Name: N` list; malformed segments are dropped.
    PipeSeparatedCounts,
}

/// Timestamp layouts tried in fixed priority order. The first layout that
/// fully parses wins.
///
/// Covers both timestamp styles emitted by the supported log format:
/// `Wed Jul 07 09:13:27 -0700 2010` and `2010-07-07 09:13:27 -0700`.
const TIMESTAMP_LAYOUTS: [&str; 2] = ["%a %b %d %H:%M:%S %z %Y", "%Y-%m-%d %H:%M:%S %z"];

fn counts_segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w+): (\d+)").expect("counts segment pattern is valid"))
}

/// Decode one raw captured substring according to its declared kind.
pub fn decode(kind: FieldKind, raw: &str) -> Result<FieldValue, DecodeError> {
    match kind {
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Integer => {
            if raw.is_empty() {
                return Ok(FieldValue::Absent);
            }
            raw.parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| DecodeError::InvalidInteger(raw.to_string()))
        }
        FieldKind::Timestamp => {
            for layout in TIMESTAMP_LAYOUTS {
                if let Ok(ts) = DateTime::parse_from_str(raw, layout) {
                    return Ok(FieldValue::Timestamp(ts));
                }
            }
            Err(DecodeError::InvalidTimestamp(raw.to_string()))
        }
        FieldKind::DurationMsec => raw
            .parse::<f64>()
            .map(FieldValue::Duration)
            .map_err(|_| DecodeError::InvalidDuration(raw.to_string())),
        FieldKind::Traffic => raw
            .parse::<u64>()
            .map(FieldValue::Bytes)
            .map_err(|_| DecodeError::InvalidTraffic(raw.to_string())),
        FieldKind::PipeSeparatedCounts => {
            // Lenient by policy: segments that do not look like
            // `word: number` are dropped, not reported.
            let mut counts = BTreeMap::new();
            for segment in raw.split(" | ") {
                if let Some(caps) = counts_segment_re().captures(segment) {
                    let name = caps[1].to_string();
                    if let Ok(n) = caps[2].parse::<i64>() {
                        counts.insert(name, n);
                    }
                }
            }
            Ok(FieldValue::Counts(counts))
        }
    }
}
