//! The sequential processing pipeline: classify, assemble, track, emit.
//!
//! A [`LogEngine`] processes one raw line at a time in strict input
//! order. It owns its matcher, its assembler, and (through the
//! assembler's hook list) its memory tracker, so every engine instance is
//! a fully isolated log stream: process identifiers from different files
//! are never conflated as long as each file gets its own engine.

use crate::assembler::{Request, RequestAssembler};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::matcher::LineMatcher;
use crate::memory::MemoryDiffTracker;
use crate::rails::line_definitions;
use std::io::BufRead;

/// Per-run counters. Unmatched lines are dropped from the structured
/// stream but counted here for collaborators that care.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub lines_total: u64,
    pub lines_matched: u64,
    pub lines_unmatched: u64,
    pub requests_emitted: u64,
    pub requests_incomplete: u64,
}

/// Single-pass log processing engine for the built-in Rails format.
pub struct LogEngine {
    matcher: LineMatcher,
    assembler: RequestAssembler,
    stats: EngineStats,
}

impl LogEngine {
    pub fn new() -> Result<Self> {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        let matcher = LineMatcher::new(line_definitions()?, &config)?;
        let mut assembler = RequestAssembler::new();
        assembler.register_hook(Box::new(MemoryDiffTracker::new()));
        Ok(Self {
            matcher,
            assembler,
            stats: EngineStats::default(),
        })
    }

    /// Process one raw line; returns a request whenever one closes.
    pub fn process_line(&mut self, raw: &str) -> Option<Request> {
        self.stats.lines_total += 1;
        let Some(line) = self.matcher.classify(raw) else {
            self.stats.lines_unmatched += 1;
            return None;
        };
        self.stats.lines_matched += 1;
        let emitted = self.assembler.push(&line);
        if let Some(request) = &emitted {
            self.note_emitted(request);
        }
        emitted
    }

    /// Signal end of input; emits any still-open request as incomplete.
    pub fn finish(&mut self) -> Option<Request> {
        let emitted = self.assembler.finish();
        if let Some(request) = &emitted {
            self.note_emitted(request);
        }
        emitted
    }

    /// Drive the engine over a whole byte stream, one event per line.
    pub fn process_reader<R: BufRead>(&mut self, reader: R) -> Result<Vec<Request>> {
        let mut requests = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if let Some(request) = self.process_line(&line) {
                requests.push(request);
            }
        }
        if let Some(request) = self.finish() {
            requests.push(request);
        }
        Ok(requests)
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    fn note_emitted(&mut self, request: &Request) {
        self.stats.requests_emitted += 1;
        if !request.is_complete() {
            self.stats.requests_incomplete += 1;
        }
    }
}
