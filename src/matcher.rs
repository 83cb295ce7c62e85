//! Line classification: one raw line in, at most one classified line out.
//!
//! Definitions are tried in table order. A definition with a teaser
//! literal is skipped when the literal is absent from the line; when the
//! prefilter is enabled, a single aho-corasick scan locates every teaser
//! at once instead of one substring search per definition. Either way the
//! result is identical to always running the full patterns.
//!
//! A full-pattern match whose captures fail to decode is demoted: the
//! matcher continues with the next definition as if the pattern had not
//! matched. No input line is ever an error.

use crate::config::EngineConfig;
use crate::decoder::decode;
use crate::error::{EngineError, Result};
use crate::line::{ClassifiedLine, LineDefinition};
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use std::collections::BTreeMap;

/// Multi-literal teaser scanner.
///
/// Maps automaton pattern ids back to the owning definition's index so one
/// pass over the line marks every definition whose teaser occurs.
#[derive(Debug, Clone)]
struct TeaserPrefilter {
    automaton: AhoCorasick,
    owners: Vec<usize>,
}

impl TeaserPrefilter {
    fn build(definitions: &[LineDefinition]) -> Result<Option<Self>> {
        let mut literals = Vec::new();
        let mut owners = Vec::new();
        for (idx, def) in definitions.iter().enumerate() {
            if let Some(teaser) = def.teaser_literal() {
                literals.push(teaser);
                owners.push(idx);
            }
        }
        if literals.is_empty() {
            return Ok(None);
        }
        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .build(&literals)
            .map_err(|e| EngineError::InvalidTeaserSet(e.to_string()))?;
        Ok(Some(Self { automaton, owners }))
    }

    /// Returns one flag per definition: true when its teaser occurs in the
    /// line (definitions without a teaser stay false and are not skipped
    /// on that basis).
    fn scan(&self, raw: &str, definition_count: usize) -> Vec<bool> {
        let mut hits = vec![false; definition_count];
        for m in self.automaton.find_overlapping_iter(raw) {
            hits[self.owners[m.pattern().as_usize()]] = true;
        }
        hits
    }
}

/// Classifies raw lines against an ordered definition table.
#[derive(Debug, Clone)]
pub struct LineMatcher {
    definitions: Vec<LineDefinition>,
    prefilter: Option<TeaserPrefilter>,
}

impl LineMatcher {
    pub fn new(definitions: Vec<LineDefinition>, config: &EngineConfig) -> Result<Self> {
        let prefilter = if config.enable_prefilter {
            TeaserPrefilter::build(&definitions)?
        } else {
            None
        };
        Ok(Self {
            definitions,
            prefilter,
        })
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Classify one raw line.
    ///
    /// Returns the first definition in priority order whose full pattern
    /// matches and whose captures all decode, or `None` when the line is
    /// unmatched.
    pub fn classify(&self, raw: &str) -> Option<ClassifiedLine> {
        let teaser_hits = self
            .prefilter
            .as_ref()
            .map(|p| p.scan(raw, self.definitions.len()));

        for (idx, def) in self.definitions.iter().enumerate() {
            if let Some(teaser) = def.teaser_literal() {
                let present = match &teaser_hits {
                    Some(hits) => hits[idx],
                    None => raw.contains(teaser),
                };
                if !present {
                    continue;
                }
            }
            if let Some(line) = try_definition(def, raw) {
                return Some(line);
            }
        }
        None
    }
}

/// Run one definition's full pattern and decode its captures.
///
/// Absent optional groups contribute no field. Any decode failure demotes
/// the whole definition.
fn try_definition(def: &LineDefinition, raw: &str) -> Option<ClassifiedLine> {
    let caps = def.pattern().captures(raw)?;
    let mut fields = BTreeMap::new();
    for (i, slot) in def.captures().iter().enumerate() {
        if let Some(m) = caps.get(i + 1) {
            match decode(slot.kind, m.as_str()) {
                Ok(value) => {
                    fields.insert(slot.name, value);
                }
                Err(_) => return None,
            }
        }
    }
    Some(ClassifiedLine {
        kind: def.kind(),
        is_header: def.is_header(),
        is_footer: def.is_footer(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::FieldKind;
    use crate::line::{CaptureSlot, LineKind};
    use crate::rails::line_definitions;
    use crate::value::FieldValue;

    fn rails_matcher() -> LineMatcher {
        LineMatcher::new(line_definitions().unwrap(), &EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_classify_started_line() {
        let matcher = rails_matcher();
        let line = matcher
            .classify(r#"[2812]: Started GET "/queries" for 127.0.0.1 at 2010-10-26 02:27:15 +0000"#)
            .unwrap();
        assert_eq!(line.kind, LineKind::Started);
        assert!(line.is_header);
        assert_eq!(line.fields["pid"], FieldValue::Integer(2812));
        assert_eq!(line.fields["method"].as_text(), Some("GET"));
        assert_eq!(line.fields["path"].as_text(), Some("/queries"));
        assert_eq!(line.fields["ip"].as_text(), Some("127.0.0.1"));
        assert!(line.fields["timestamp"].as_timestamp().is_some());
    }

    #[test]
    fn test_classify_started_line_legacy_timestamp() {
        let matcher = rails_matcher();
        let line = matcher
            .classify(r#"[123]: Started GET "/" for 127.0.0.1 at Wed Jul 07 09:13:27 -0700 2010"#)
            .unwrap();
        assert_eq!(line.kind, LineKind::Started);
    }

    #[test]
    fn test_classify_processing_line() {
        let matcher = rails_matcher();
        let line = matcher
            .classify("[2812]: Processing by QueriesController#index as HTML")
            .unwrap();
        assert_eq!(line.kind, LineKind::Processing);
        assert!(!line.is_header);
        assert!(!line.is_footer);
        assert_eq!(line.fields["controller"].as_text(), Some("QueriesController"));
        assert_eq!(line.fields["action"].as_text(), Some("index"));
        assert_eq!(line.fields["format"].as_text(), Some("HTML"));
    }

    #[test]
    fn test_classify_completed_full_line() {
        let matcher = rails_matcher();
        let line = matcher
            .classify("[2812]: Completed 200 OK in 224ms (Views: 200.2ms | ActiveRecord: 3.4ms)")
            .unwrap();
        assert_eq!(line.kind, LineKind::Completed);
        assert!(line.is_footer);
        assert_eq!(line.fields["status"], FieldValue::Integer(200));
        assert_eq!(line.fields["duration"], FieldValue::Duration(224.0));
        assert_eq!(line.fields["view"], FieldValue::Duration(200.2));
        assert_eq!(line.fields["db"], FieldValue::Duration(3.4));
    }

    #[test]
    fn test_classify_completed_without_breakdown() {
        let matcher = rails_matcher();
        let line = matcher
            .classify("[2812]: Completed 302 Found in 23ms")
            .unwrap();
        assert_eq!(line.kind, LineKind::Completed);
        assert_eq!(line.fields["status"], FieldValue::Integer(302));
        assert_eq!(line.fields["duration"], FieldValue::Duration(23.0));
        assert!(!line.fields.contains_key("view"));
        assert!(!line.fields.contains_key("db"));
    }

    #[test]
    fn test_classify_memory_usage_line() {
        let matcher = rails_matcher();
        let line = matcher.classify("[2812]: Memory usage: 86400").unwrap();
        assert_eq!(line.kind, LineKind::MemoryUsage);
        assert_eq!(line.fields["memory"], FieldValue::Bytes(86400));
    }

    #[test]
    fn test_classify_instance_type_counter_line() {
        let matcher = rails_matcher();
        let line = matcher
            .classify("[2812]: Instantiation Breakdown: Query: 3 | Result: 7")
            .unwrap();
        assert_eq!(line.kind, LineKind::InstanceTypeCounter);
        let counts = line.fields["instance_counts"].as_counts().unwrap();
        assert_eq!(counts.get("Query"), Some(&3));
        assert_eq!(counts.get("Result"), Some(&7));
    }

    #[test]
    fn test_classify_failure_line() {
        let matcher = rails_matcher();
        let line = matcher
            .classify("[2812]: ActionView::Template::Error (undefined local variable `field') on line #3 of app/views/queries/execute.csv.erb:")
            .unwrap();
        assert_eq!(line.kind, LineKind::Failure);
        assert!(line.is_footer);
        assert_eq!(line.fields["pid"].as_text(), Some("2812"));
        assert_eq!(
            line.fields["error"].as_text(),
            Some("ActionView::Template::Error")
        );
        assert_eq!(line.fields["line"], FieldValue::Integer(3));
    }

    #[test]
    fn test_unmatched_line_returns_none() {
        let matcher = rails_matcher();
        assert!(matcher.classify("some random noise").is_none());
        assert!(matcher.classify("").is_none());
    }

    #[test]
    fn test_footer_kinds_are_unambiguous() {
        // A completed line must never classify as failure and vice versa.
        let matcher = rails_matcher();
        let completed = matcher
            .classify("[2812]: Completed 200 OK in 224ms (Views: 200.2ms | ActiveRecord: 3.4ms)")
            .unwrap();
        assert_eq!(completed.kind, LineKind::Completed);

        let failure = matcher
            .classify("[2812]: RuntimeError (boom):")
            .unwrap();
        assert_eq!(failure.kind, LineKind::Failure);
    }

    #[test]
    fn test_decode_failure_demotes_match() {
        // A bespoke table where the first definition's pattern matches but
        // its integer capture cannot decode; the second must win.
        let defs = vec![
            LineDefinition::new(
                LineKind::MemoryUsage,
                r"value=(\w+)",
                vec![CaptureSlot::new("memory", FieldKind::Traffic)],
            )
            .unwrap(),
            LineDefinition::new(
                LineKind::Parameters,
                r"value=(\w+)",
                vec![CaptureSlot::new("params", FieldKind::Text)],
            )
            .unwrap(),
        ];
        let matcher = LineMatcher::new(defs, &EngineConfig::default()).unwrap();
        let line = matcher.classify("value=abc").unwrap();
        assert_eq!(line.kind, LineKind::Parameters);

        let line = matcher.classify("value=123").unwrap();
        assert_eq!(line.kind, LineKind::MemoryUsage);
    }

    #[test]
    fn test_prefilter_equivalence() {
        // Teaser skipping is an optimization only: classification with and
        // without the prefilter must agree on every sample.
        let with = rails_matcher();
        let without = LineMatcher::new(
            line_definitions().unwrap(),
            &EngineConfig::default().prefilter(false),
        )
        .unwrap();

        let samples = [
            r#"[2812]: Started GET "/queries" for 127.0.0.1 at 2010-10-26 02:27:15 +0000"#,
            "[2812]: Processing by QueriesController#index as HTML",
            r#"[2812]: Parameters: {"action"=>"index"}"#,
            "[2812]: Completed 200 OK in 224ms (Views: 200.2ms | ActiveRecord: 3.4ms)",
            "[2812]: Memory usage: 86400",
            "[2812]: Instantiation Breakdown: Query: 3",
            "[2812]: RuntimeError (boom):",
            "plain noise",
            "",
        ];
        for sample in samples {
            assert_eq!(with.classify(sample), without.classify(sample), "{sample:?}");
        }
    }
}
