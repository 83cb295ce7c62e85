//! Error types for the raillog engine.
//!
//! The taxonomy is deliberately small: [`DecodeError`] is a local,
//! recoverable condition that demotes a candidate line match and never
//! aborts the stream, while [`EngineError`] covers the only fatal class
//! (a malformed built-in definition table, caught at startup) plus I/O.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// A capture group's raw text did not satisfy its declared semantic type.
///
/// Decode failures are not stream errors: the line matcher treats them as
/// "this definition does not actually match" and moves on to the next
/// definition in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid integer: {0:?}")]
    InvalidInteger(String),
    #[error("timestamp matches no registered layout: {0:?}")]
    InvalidTimestamp(String),
    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),
    #[error("invalid traffic count: {0:?}")]
    InvalidTraffic(String),
}

/// Fatal engine errors.
///
/// Nothing that happens per input line lands here; unmatched lines and
/// incomplete requests are expected outcomes signaled through the data
/// model instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A line definition's capture slots do not line up with its pattern's
    /// capture groups. Startup-time invariant violation.
    #[error("invalid line definition {kind:?}: pattern has {groups} capture groups, {slots} slots declared")]
    InvalidDefinition {
        kind: &'static str,
        groups: usize,
        slots: usize,
    },

    /// A built-in pattern failed to compile.
    #[error("invalid pattern for {kind:?}: {source}")]
    InvalidPattern {
        kind: &'static str,
        #[source]
        source: regex::Error,
    },

    /// The teaser literal set could not be compiled into a prefilter
    /// automaton.
    #[error("invalid teaser set: {0}")]
    InvalidTeaserSet(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::InvalidInteger("abc".to_string());
        assert_eq!(err.to_string(), "invalid integer: \"abc\"");

        let err = DecodeError::InvalidTimestamp("not a date".to_string());
        assert!(err.to_string().contains("no registered layout"));
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::InvalidDefinition {
            kind: "started",
            groups: 4,
            slots: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("started"));
        assert!(msg.contains('4'));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_engine_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: EngineError = io_err.into();
        assert!(matches!(err, EngineError::Io(_)));
    }

    #[test]
    fn test_decode_error_equality() {
        assert_eq!(
            DecodeError::InvalidDuration("x".to_string()),
            DecodeError::InvalidDuration("x".to_string())
        );
        assert_ne!(
            DecodeError::InvalidDuration("x".to_string()),
            DecodeError::InvalidTraffic("x".to_string())
        );
    }
}
