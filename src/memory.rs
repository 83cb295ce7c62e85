//! Per-process memory bookkeeping and the derived memory-diff attribute.
//!
//! Memory readings are logged once per request, in kilobytes, by whatever
//! worker process handled it. Readings from different workers must never
//! be compared, so state is keyed by pid. The tracker owns its keyspace
//! explicitly and is scoped to one logical log stream; independent
//! streams get independent trackers.

use crate::assembler::{Request, RequestHook};
use crate::value::FieldValue;
use std::collections::HashMap;

/// Sentinel meaning "no reading known".
const UNKNOWN: i64 = -1;

/// Last and current memory readings (kilobytes) for one worker process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessMemoryState {
    pub last_reading: i64,
    pub current_reading: i64,
}

impl Default for ProcessMemoryState {
    fn default() -> Self {
        Self {
            last_reading: UNKNOWN,
            current_reading: UNKNOWN,
        }
    }
}

/// Derives `memory_diff` for each closed request from consecutive memory
/// readings of the same worker process.
///
/// Runs as a post-close hook, exactly once per request; the state shift at
/// the end of each update is not idempotent, so the single-invocation
/// guarantee of the assembler's hook contract is load-bearing.
#[derive(Debug, Default)]
pub struct MemoryDiffTracker {
    pids: HashMap<i64, ProcessMemoryState>,
}

impl MemoryDiffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct worker processes seen so far.
    pub fn tracked_processes(&self) -> usize {
        self.pids.len()
    }

    pub fn state(&self, pid: i64) -> Option<&ProcessMemoryState> {
        self.pids.get(&pid)
    }
}

impl RequestHook for MemoryDiffTracker {
    fn on_close(&mut self, request: &mut Request) {
        let Some(pid) = request.pid() else {
            return;
        };
        let state = self.pids.entry(pid).or_default();

        if request.is_failed() && request.saw_processing() {
            // Memory is not logged with exceptions and may have changed
            // arbitrarily; the next reading for this pid must not produce
            // a diff against the pre-failure value.
            state.last_reading = UNKNOWN;
        } else if let Some(reading) = request.field("memory").and_then(FieldValue::as_bytes) {
            state.current_reading = reading as i64;
            if state.current_reading != UNKNOWN && state.last_reading != UNKNOWN {
                // Logged in kilobytes; the diff attribute is in bytes.
                let diff = (state.current_reading - state.last_reading) * 1024;
                if diff > 0 {
                    request.set_field("memory_diff", FieldValue::Bytes(diff as u64));
                }
            }
            state.last_reading = state.current_reading;
            state.current_reading = UNKNOWN;
        }
    }
}
