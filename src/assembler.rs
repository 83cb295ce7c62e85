//! Request assembly: grouping classified lines into logical requests.
//!
//! The assembler is a two-state machine. A header line opens a request,
//! every classified line while one is open merges its fields in, and a
//! footer line closes and emits it. Logs with missing footers cannot
//! stall the pipeline: a second header force-closes the open request as
//! incomplete, and so does end of input.
//!
//! Derived attributes are injected through post-close hooks rather than
//! request subtypes; each hook runs exactly once per emitted request,
//! before the request reaches downstream collaborators.

use crate::line::{ClassifiedLine, LineKind};
use crate::value::FieldValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// One logical unit of work, bounded by a header and footer line.
///
/// Mutated incrementally while open; read-only once emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    fields: BTreeMap<&'static str, FieldValue>,
    completed: bool,
    failed: bool,
    processing_seen: bool,
}

impl Request {
    fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
            completed: false,
            failed: false,
            processing_seen: false,
        }
    }

    /// Merge one classified line's fields, last-write-wins. The seen-kind
    /// flags are monotonic: once set they stay set for the lifetime of
    /// the request.
    fn absorb(&mut self, line: &ClassifiedLine) {
        for (name, value) in &line.fields {
            self.fields.insert(name, value.clone());
        }
        match line.kind {
            LineKind::Failure => self.failed = true,
            LineKind::Processing => self.processing_seen = true,
            _ => {}
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<&'static str, FieldValue> {
        &self.fields
    }

    /// Set or overwrite a field. Used by post-close hooks to attach
    /// derived attributes.
    pub fn set_field(&mut self, name: &'static str, value: FieldValue) {
        self.fields.insert(name, value);
    }

    /// True when a footer closed this request; false when it was forced
    /// closed by a new header or end of input.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// True when the closing footer was a failure line.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// True when a processing line was seen.
    pub fn saw_processing(&self) -> bool {
        self.processing_seen
    }

    /// The emitting worker's process identifier.
    ///
    /// Failure lines capture the pid as raw text, so both representations
    /// are accepted here.
    pub fn pid(&self) -> Option<i64> {
        match self.fields.get("pid")? {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// The derived memory growth in bytes, when a post-close hook set one.
    pub fn memory_diff(&self) -> Option<u64> {
        self.fields.get("memory_diff").and_then(FieldValue::as_bytes)
    }
}

/// Post-close hook, invoked exactly once per emitted request.
pub trait RequestHook {
    fn on_close(&mut self, request: &mut Request);
}

/// Assembles the classified-line stream into requests.
#[derive(Default)]
pub struct RequestAssembler {
    open: Option<Request>,
    hooks: Vec<Box<dyn RequestHook>>,
}

impl RequestAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a post-close hook. Hooks run in registration order.
    pub fn register_hook(&mut self, hook: Box<dyn RequestHook>) {
        self.hooks.push(hook);
    }

    /// Feed one classified line; returns a request whenever one closes.
    ///
    /// A header while a request is open emits the previous request as
    /// incomplete and opens a new one. Classified non-header lines with
    /// no open request are ignored.
    pub fn push(&mut self, line: &ClassifiedLine) -> Option<Request> {
        if line.is_header {
            let interrupted = self.open.take().map(|r| self.close(r, false));
            let mut request = Request::new();
            request.absorb(line);
            self.open = Some(request);
            return interrupted;
        }

        let open = self.open.as_mut()?;
        open.absorb(line);
        if line.is_footer {
            let request = self.open.take().unwrap();
            return Some(self.close(request, true));
        }
        None
    }

    /// End of input: emit any open request as incomplete.
    pub fn finish(&mut self) -> Option<Request> {
        self.open.take().map(|r| self.close(r, false))
    }

    fn close(&mut self, mut request: Request, completed: bool) -> Request {
        request.completed = completed;
        for hook in &mut self.hooks {
            hook.on_close(&mut request);
        }
        request
    }
}
