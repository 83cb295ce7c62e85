//! Downstream aggregation over emitted requests.
//!
//! The engine itself stops at emitting requests; reporting collaborators
//! register against that stream. This module ships the one aggregation
//! the format declares: largest memory increases, categorized by the
//! request's controller and action.

use crate::assembler::Request;
use crate::value::FieldValue;
use serde::Serialize;
use std::collections::HashMap;

/// Aggregated memory growth for one request category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryIncreaseEntry {
    /// Requests in this category that reported a memory diff.
    pub requests: u64,
    /// Sum of reported diffs, in bytes.
    pub total_bytes: u64,
    /// Largest single reported diff, in bytes.
    pub max_bytes: u64,
}

/// "Largest memory increases" aggregation, keyed by `Controller#action`.
#[derive(Debug, Default)]
pub struct MemoryIncreaseReport {
    categories: HashMap<String, MemoryIncreaseEntry>,
}

impl MemoryIncreaseReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Category label for a request: `Controller#action`, or `unknown`
    /// when the processing line never arrived.
    fn categorize(request: &Request) -> String {
        let controller = request.field("controller").and_then(FieldValue::as_text);
        let action = request.field("action").and_then(FieldValue::as_text);
        match (controller, action) {
            (Some(c), Some(a)) => format!("{c}#{a}"),
            _ => "unknown".to_string(),
        }
    }

    /// Observe one emitted request. Requests without a memory diff do not
    /// contribute.
    pub fn observe(&mut self, request: &Request) {
        let Some(diff) = request.memory_diff() else {
            return;
        };
        let entry = self
            .categories
            .entry(Self::categorize(request))
            .or_default();
        entry.requests += 1;
        entry.total_bytes += diff;
        entry.max_bytes = entry.max_bytes.max(diff);
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// The `n` categories with the largest summed memory growth,
    /// descending.
    pub fn top(&self, n: usize) -> Vec<(&str, MemoryIncreaseEntry)> {
        let mut rows: Vec<_> = self
            .categories
            .iter()
            .map(|(category, entry)| (category.as_str(), *entry))
            .collect();
        rows.sort_by(|a, b| b.1.total_bytes.cmp(&a.1.total_bytes).then(a.0.cmp(b.0)));
        rows.truncate(n);
        rows
    }
}
