//! Line definitions and classified lines.
//!
//! A [`LineDefinition`] is an immutable record built once at startup: a
//! symbolic kind, a cheap teaser pre-filter, a full pattern, and the named,
//! typed capture slots that correspond positionally to the pattern's
//! capture groups. Construction validates that slots and capture groups
//! line up; a mismatch is the one fatal error class in this crate.

use crate::decoder::FieldKind;
use crate::error::{EngineError, Result};
use crate::value::FieldValue;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Classification label for one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Started,
    Processing,
    Parameters,
    Completed,
    MemoryUsage,
    InstanceTypeCounter,
    Failure,
}

impl LineKind {
    pub fn name(self) -> &'static str {
        match self {
            LineKind::Started => "started",
            LineKind::Processing => "processing",
            LineKind::Parameters => "parameters",
            LineKind::Completed => "completed",
            LineKind::MemoryUsage => "memory_usage",
            LineKind::InstanceTypeCounter => "instance_type_counter",
            LineKind::Failure => "failure",
        }
    }
}

/// One named, typed capture slot of a line definition.
#[derive(Debug, Clone, Copy)]
pub struct CaptureSlot {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl CaptureSlot {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// An immutable line-pattern definition.
///
/// The teaser is a literal substring used to reject non-matching lines
/// before the full pattern runs. Skipping on a missed teaser must be
/// result-equivalent to always running the full pattern, so a teaser is
/// only ever a substring of every line the full pattern accepts.
#[derive(Debug, Clone)]
pub struct LineDefinition {
    kind: LineKind,
    is_header: bool,
    is_footer: bool,
    teaser: Option<&'static str>,
    pattern: Regex,
    captures: Vec<CaptureSlot>,
}

impl LineDefinition {
    /// Compile a definition, validating that the pattern's capture group
    /// count equals the declared slot count.
    pub fn new(kind: LineKind, pattern: &str, captures: Vec<CaptureSlot>) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| EngineError::InvalidPattern {
            kind: kind.name(),
            source,
        })?;
        let groups = pattern.captures_len() - 1;
        if groups != captures.len() {
            return Err(EngineError::InvalidDefinition {
                kind: kind.name(),
                groups,
                slots: captures.len(),
            });
        }
        Ok(Self {
            kind,
            is_header: false,
            is_footer: false,
            teaser: None,
            pattern,
            captures,
        })
    }

    /// Mark this definition as a request header.
    pub fn header(mut self) -> Self {
        self.is_header = true;
        self
    }

    /// Mark this definition as a request footer.
    pub fn footer(mut self) -> Self {
        self.is_footer = true;
        self
    }

    /// Attach a teaser literal for fast rejection.
    pub fn teaser(mut self, teaser: &'static str) -> Self {
        self.teaser = Some(teaser);
        self
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn is_header(&self) -> bool {
        self.is_header
    }

    pub fn is_footer(&self) -> bool {
        self.is_footer
    }

    pub fn teaser_literal(&self) -> Option<&'static str> {
        self.teaser
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn captures(&self) -> &[CaptureSlot] {
        &self.captures
    }
}

/// One classified input line: the matched kind plus its decoded fields.
///
/// Produced by the line matcher, consumed immediately by the request
/// assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedLine {
    pub kind: LineKind,
    pub is_header: bool,
    pub is_footer: bool,
    pub fields: BTreeMap<&'static str, FieldValue>,
}
