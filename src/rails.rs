//! Built-in line definition table for Rails 3 request logs with Oink
//! memory instrumentation.
//!
//! Every line carries a `[pid]:` prefix from the emitting worker process.
//! The table order is the authoritative match priority: a line that could
//! textually satisfy more than one full pattern is classified by the first
//! definition in this order whose pattern matches and whose captures all
//! decode.

use crate::decoder::FieldKind;
use crate::error::Result;
use crate::line::{CaptureSlot, LineDefinition, LineKind};

/// Matches either timestamp style the format emits:
/// `Wed Jul 07 09:13:27 -0700 2010` or `2010-07-07 09:13:27 -0700`.
const TIMESTAMP: &str =
    r"\w{3} \w{3} \d{2} \d{2}:\d{2}:\d{2} [+-]\d{4} \d{4}|\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} [+-]\d{4}";

const IP_ADDRESS: &str = r"(?:\d{1,3}\.){3}\d{1,3}|[0-9a-fA-F:]+";

/// Build the definition table in priority order.
pub fn line_definitions() -> Result<Vec<LineDefinition>> {
    let mut defs = Vec::with_capacity(7);

    // Started GET "/" for 127.0.0.1 at Wed Jul 07 09:13:27 -0700 2010
    defs.push(
        LineDefinition::new(
            LineKind::Started,
            &format!(
                r#"\[(\d+)\]: Started ([A-Z]+) "([^"]+)" for ({IP_ADDRESS}) at ({TIMESTAMP})"#
            ),
            vec![
                CaptureSlot::new("pid", FieldKind::Integer),
                CaptureSlot::new("method", FieldKind::Text),
                CaptureSlot::new("path", FieldKind::Text),
                CaptureSlot::new("ip", FieldKind::Text),
                CaptureSlot::new("timestamp", FieldKind::Timestamp),
            ],
        )?
        .header()
        .teaser("]: Started "),
    );

    // Processing by QueriesController#index as HTML
    defs.push(
        LineDefinition::new(
            LineKind::Processing,
            r"\[(\d+)\]: Processing by ([A-Za-z0-9\-:]+)#(\w+) as ([\w/*]*)",
            vec![
                CaptureSlot::new("pid", FieldKind::Integer),
                CaptureSlot::new("controller", FieldKind::Text),
                CaptureSlot::new("action", FieldKind::Text),
                CaptureSlot::new("format", FieldKind::Text),
            ],
        )?
        .teaser("]: Processing by "),
    );

    // Parameters: {"action"=>"cached", "controller"=>"cached"}
    // The raw hash text passes through undecoded.
    defs.push(
        LineDefinition::new(
            LineKind::Parameters,
            r"\[(\d+)\]: Parameters:\s+(\{.*\})",
            vec![
                CaptureSlot::new("pid", FieldKind::Integer),
                CaptureSlot::new("params", FieldKind::Text),
            ],
        )?
        .teaser(" Parameters:"),
    );

    // Completed 200 OK in 224ms (Views: 200.2ms | ActiveRecord: 3.4ms)
    // Completed 302 Found in 23ms
    defs.push(
        LineDefinition::new(
            LineKind::Completed,
            r"\[(\d+)\]: Completed (\d+)? .*in (\d+(?:\.\d+)?)ms(?:[^(]*\(Views: (\d+(?:\.\d+)?)ms .* ActiveRecord: (\d+(?:\.\d+)?)ms.*\))?",
            vec![
                CaptureSlot::new("pid", FieldKind::Integer),
                CaptureSlot::new("status", FieldKind::Integer),
                CaptureSlot::new("duration", FieldKind::DurationMsec),
                CaptureSlot::new("view", FieldKind::DurationMsec),
                CaptureSlot::new("db", FieldKind::DurationMsec),
            ],
        )?
        .footer()
        .teaser("]: Completed "),
    );

    // Memory usage: 86400 (logged by Oink, in kilobytes)
    defs.push(LineDefinition::new(
        LineKind::MemoryUsage,
        r"\[(\d+)\]: Memory usage: (\d+)",
        vec![
            CaptureSlot::new("pid", FieldKind::Integer),
            CaptureSlot::new("memory", FieldKind::Traffic),
        ],
    )?);

    // Instantiation Breakdown: Query: 3 | Result: 7
    defs.push(LineDefinition::new(
        LineKind::InstanceTypeCounter,
        r"\[(\d+)\]: Instantiation Breakdown: (.*)$",
        vec![
            CaptureSlot::new("pid", FieldKind::Integer),
            CaptureSlot::new("instance_counts", FieldKind::PipeSeparatedCounts),
        ],
    )?);

    // ActionView::Template::Error (undefined method `field') on line #3 of app/views/queries/execute.csv.erb:
    //
    // The pid slot is untyped text here, matching the upstream format
    // definition. Known gap: this pattern has been observed not to match
    // at least one Rails development-log variant.
    defs.push(
        LineDefinition::new(
            LineKind::Failure,
            r"\[(\d+)\]: ((?:[A-Z]\w*[a-z]\w+::)*[A-Z]\w*[a-z]\w+) \((.*)\)(?: on line #(\d+) of (.+))?:\s*$",
            vec![
                CaptureSlot::new("pid", FieldKind::Text),
                CaptureSlot::new("error", FieldKind::Text),
                CaptureSlot::new("message", FieldKind::Text),
                CaptureSlot::new("line", FieldKind::Integer),
                CaptureSlot::new("file", FieldKind::Text),
            ],
        )?
        .footer(),
    );

    Ok(defs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_builds() {
        let defs = line_definitions().unwrap();
        assert_eq!(defs.len(), 7);
    }

    #[test]
    fn test_priority_order_is_explicit() {
        let kinds: Vec<LineKind> = line_definitions()
            .unwrap()
            .iter()
            .map(|d| d.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Started,
                LineKind::Processing,
                LineKind::Parameters,
                LineKind::Completed,
                LineKind::MemoryUsage,
                LineKind::InstanceTypeCounter,
                LineKind::Failure,
            ]
        );
    }

    #[test]
    fn test_boundary_roles() {
        let defs = line_definitions().unwrap();
        for def in &defs {
            match def.kind() {
                LineKind::Started => assert!(def.is_header() && !def.is_footer()),
                LineKind::Completed | LineKind::Failure => {
                    assert!(def.is_footer() && !def.is_header())
                }
                _ => assert!(!def.is_header() && !def.is_footer()),
            }
        }
    }

    #[test]
    fn test_teasers_are_substrings_of_matching_lines() {
        // Teaser skipping must be result-equivalent to running the full
        // pattern, so every teaser must occur in lines its pattern accepts.
        let samples = [
            (
                LineKind::Started,
                r#"[123]: Started GET "/" for 127.0.0.1 at Wed Jul 07 09:13:27 -0700 2010"#,
            ),
            (
                LineKind::Processing,
                "[123]: Processing by QueriesController#index as HTML",
            ),
            (
                LineKind::Parameters,
                r#"[123]: Parameters: {"action"=>"index"}"#,
            ),
            (
                LineKind::Completed,
                "[123]: Completed 200 OK in 224ms (Views: 200.2ms | ActiveRecord: 3.4ms)",
            ),
        ];
        let defs = line_definitions().unwrap();
        for (kind, sample) in samples {
            let def = defs.iter().find(|d| d.kind() == kind).unwrap();
            assert!(def.pattern().is_match(sample), "{kind:?} pattern");
            if let Some(teaser) = def.teaser_literal() {
                assert!(sample.contains(teaser), "{kind:?} teaser");
            }
        }
    }
}
