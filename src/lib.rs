//! # Raillog Engine
//!
//! A log-line classification and stateful metric-extraction engine for
//! Rails request logs with Oink memory instrumentation.
//!
//! Raw lines are classified against an ordered table of line definitions
//! (each with a cheap teaser pre-filter and a full pattern), their fields
//! are decoded into typed values, consecutive lines are assembled into
//! requests bounded by header and footer markers, and per-process memory
//! readings are tracked across requests to derive each request's memory
//! growth.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use raillog_engine::LogEngine;
//!
//! let mut engine = LogEngine::new()?;
//!
//! let log = [
//!     r#"[2812]: Started GET "/queries" for 127.0.0.1 at 2010-10-26 02:27:15 +0000"#,
//!     "[2812]: Processing by QueriesController#index as HTML",
//!     "[2812]: Memory usage: 86400",
//!     "[2812]: Completed 200 OK in 224ms (Views: 200.2ms | ActiveRecord: 3.4ms)",
//! ];
//!
//! for line in log {
//!     if let Some(request) = engine.process_line(line) {
//!         println!("{:?} complete={}", request.pid(), request.is_complete());
//!     }
//! }
//! if let Some(request) = engine.finish() {
//!     // Stream ended while a request was open; it is emitted incomplete.
//! }
//! # Ok::<(), raillog_engine::EngineError>(())
//! ```
//!
//! ## Reporting
//!
//! ```rust,ignore
//! use raillog_engine::{LogEngine, MemoryIncreaseReport};
//! use std::io::BufReader;
//!
//! let mut engine = LogEngine::new()?;
//! let mut report = MemoryIncreaseReport::new();
//!
//! let file = std::fs::File::open("production.log")?;
//! for request in engine.process_reader(BufReader::new(file))? {
//!     report.observe(&request);
//! }
//!
//! for (category, entry) in report.top(10) {
//!     println!("{category}: +{} bytes", entry.total_bytes);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assembler;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod line;
pub mod matcher;
pub mod memory;
pub mod rails;
pub mod report;
pub mod value;

// Pipeline driver
pub use engine::{EngineStats, LogEngine};

// Configuration and errors
pub use config::EngineConfig;
pub use error::{DecodeError, EngineError, Result};

// Classification
pub use decoder::FieldKind;
pub use line::{CaptureSlot, ClassifiedLine, LineDefinition, LineKind};
pub use matcher::LineMatcher;
pub use value::FieldValue;

// Assembly and tracking
pub use assembler::{Request, RequestAssembler, RequestHook};
pub use memory::{MemoryDiffTracker, ProcessMemoryState};

// Reporting collaborators
pub use report::{MemoryIncreaseEntry, MemoryIncreaseReport};
