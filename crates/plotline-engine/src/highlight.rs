//! Mapping analyzer results back onto the tree.
//!
//! External analyzers work on a copy of the linearized text and answer
//! later with character spans. Those spans are only meaningful against the
//! version they were computed from, so [`AnalysisSession`] pairs each request
//! with its version and drops results that arrive after an edit.

use std::ops::Range;

use serde::Serialize;

use crate::editing::{Document, NodeId};
use crate::linear::PositionTable;

/// Part of a span that falls inside one text run, in run-local characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSegment {
    pub node: NodeId,
    pub range: Range<usize>,
}

/// Split a linear span into per-run local ranges.
///
/// Block newlines inside the span produce no segment. A span that is
/// inverted or reaches past the end is logged and yields nothing.
pub fn highlight_segments(table: &PositionTable, span: Range<usize>) -> Vec<HighlightSegment> {
    if span.start > span.end || span.end > table.text_len() {
        log::warn!(
            "cannot highlight {}..{} in text of length {}",
            span.start,
            span.end,
            table.text_len()
        );
        return Vec::new();
    }
    table
        .text_entries_in(span.start, span.end)
        .filter_map(|entry| {
            let start = span.start.max(entry.start) - entry.start;
            let end = span.end.min(entry.end()) - entry.start;
            (start < end).then(|| HighlightSegment {
                node: entry.node,
                range: start..end,
            })
        })
        .collect()
}

/// One finding reported by an analyzer against request text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSpan {
    pub range: Range<usize>,
    pub label: String,
}

/// An analyzer finding resolved against the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub label: String,
    pub range: Range<usize>,
    pub segments: Vec<HighlightSegment>,
}

/// Text handed to an external analyzer, tagged with its source version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub text: String,
    pub version: u64,
}

/// Guards against overlapping analyzer calls and stale answers
#[derive(Debug, Default)]
pub struct AnalysisSession {
    in_flight: Option<u64>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a request for the current text, unless one is already running
    pub fn begin(&mut self, doc: &Document) -> Option<AnalysisRequest> {
        if let Some(version) = self.in_flight {
            log::debug!("analysis of version {version} still in flight");
            return None;
        }
        let request = AnalysisRequest {
            text: doc.text(),
            version: doc.version(),
        };
        self.in_flight = Some(request.version);
        Some(request)
    }

    /// Finish `request`. Returns the resolved highlights, or `None` when the
    /// document changed since the request was made.
    pub fn complete(
        &mut self,
        request: &AnalysisRequest,
        spans: Vec<AnalysisSpan>,
        doc: &Document,
    ) -> Option<Vec<Highlight>> {
        self.in_flight = None;
        if request.version != doc.version() {
            log::debug!(
                "discarding analysis of version {}, document is at {}",
                request.version,
                doc.version()
            );
            return None;
        }
        let flattened = doc.flattened();
        Some(
            spans
                .into_iter()
                .map(|span| Highlight {
                    segments: highlight_segments(&flattened.table, span.range.clone()),
                    label: span.label,
                    range: span.range,
                })
                .collect(),
        )
    }

    /// Forget the in-flight request, e.g. when the analyzer failed
    pub fn abandon(&mut self) {
        self.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::Node;
    use crate::tests::paragraphs;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_span_inside_one_run() {
        let doc = paragraphs(&["Hello", "World"]);
        let world = doc.blocks()[1].children()[0].id;

        let segments = highlight_segments(&doc.flattened().table, 7..10);

        assert_eq!(
            segments,
            vec![HighlightSegment {
                node: world,
                range: 1..4
            }]
        );
    }

    #[test]
    fn test_span_across_blocks_skips_newline() {
        let doc = paragraphs(&["Hello", "World"]);
        let hello = doc.blocks()[0].children()[0].id;
        let world = doc.blocks()[1].children()[0].id;

        let segments = highlight_segments(&doc.flattened().table, 3..8);

        assert_eq!(
            segments,
            vec![
                HighlightSegment {
                    node: hello,
                    range: 3..5
                },
                HighlightSegment {
                    node: world,
                    range: 0..2
                },
            ]
        );
    }

    #[test]
    fn test_span_across_runs_in_one_block() {
        let bold = Node::text("dark");
        let bold_id = bold.id;
        let doc = Document::from_blocks(vec![Node::paragraph(vec![
            Node::text("a "),
            bold,
            Node::text(" night"),
        ])]);

        let segments = highlight_segments(&doc.flattened().table, 2..6);

        assert_eq!(
            segments,
            vec![HighlightSegment {
                node: bold_id,
                range: 0..4
            }]
        );
    }

    #[test]
    fn test_unresolvable_span_yields_nothing() {
        let doc = paragraphs(&["Hello"]);
        let flattened = doc.flattened();

        assert!(highlight_segments(&flattened.table, 2..40).is_empty());
        assert!(highlight_segments(&flattened.table, 4..2).is_empty());
        assert!(highlight_segments(&flattened.table, 5..6).is_empty());
    }

    #[test]
    fn test_session_rejects_overlapping_requests() {
        let doc = paragraphs(&["Hello"]);
        let mut session = AnalysisSession::new();

        let request = session.begin(&doc);
        assert!(request.is_some());
        assert!(session.is_in_flight());
        assert_eq!(session.begin(&doc), None);

        session.abandon();
        assert!(session.begin(&doc).is_some());
    }

    #[test]
    fn test_session_resolves_current_results() {
        let doc = paragraphs(&["It was a dark and stormy night."]);
        let mut session = AnalysisSession::new();
        let request = session.begin(&doc).unwrap();
        assert_eq!(request.text, "It was a dark and stormy night.\n");

        let highlights = session
            .complete(
                &request,
                vec![AnalysisSpan {
                    range: 18..30,
                    label: "cliche".to_string(),
                }],
                &doc,
            )
            .unwrap();

        assert!(!session.is_in_flight());
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].segments[0].range, 18..30);
    }

    #[test]
    fn test_session_discards_stale_results() {
        let mut doc = paragraphs(&["It was a dark and stormy night."]);
        let mut session = AnalysisSession::new();
        let request = session.begin(&doc).unwrap();

        doc.replace_range(0..2, "She");
        let result = session.complete(
            &request,
            vec![AnalysisSpan {
                range: 9..13,
                label: "adjective".to_string(),
            }],
            &doc,
        );

        assert_eq!(result, None);
        assert!(!session.is_in_flight());
    }
}
