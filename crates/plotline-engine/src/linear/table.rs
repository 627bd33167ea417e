use std::collections::HashMap;

use serde::Serialize;

use crate::editing::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Text,
    Marker,
}

/// One node's footprint in the linearized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionEntry {
    pub node: NodeId,
    /// Absolute character offset of the first character (or of the marker)
    pub start: usize,
    /// Character length; always 0 for markers
    pub len: usize,
    pub kind: EntryKind,
}

impl PositionEntry {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_marker(&self) -> bool {
        self.kind == EntryKind::Marker
    }
}

/// Immutable offset index for one document version.
///
/// Entries are in document order and never overlap. Every character of the
/// linearized text is covered by exactly one text entry, except block
/// newlines which have no entry; `text_len` accounts for both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionTable {
    entries: Vec<PositionEntry>,
    by_node: HashMap<NodeId, usize>,
    text_len: usize,
}

impl PositionTable {
    pub(crate) fn new(entries: Vec<PositionEntry>, text_len: usize) -> Self {
        let by_node = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.node, index))
            .collect();
        Self {
            entries,
            by_node,
            text_len,
        }
    }

    pub fn entries(&self) -> &[PositionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length in characters of the linearized text this table indexes
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn entry_for(&self, node: NodeId) -> Option<&PositionEntry> {
        self.by_node.get(&node).map(|&index| &self.entries[index])
    }

    /// Marker entries in document order
    pub fn markers(&self) -> impl Iterator<Item = &PositionEntry> {
        self.entries.iter().filter(|entry| entry.is_marker())
    }

    /// Text entries overlapping `start..end`
    pub fn text_entries_in(&self, start: usize, end: usize) -> impl Iterator<Item = &PositionEntry> {
        let first = self.entries.partition_point(|entry| entry.end() <= start);
        self.entries[first..]
            .iter()
            .take_while(move |entry| entry.start < end)
            .filter(|entry| !entry.is_marker())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{Document, Node};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_entries_are_ordered_and_disjoint() {
        let doc = crate::tests::manuscript();
        let flattened = doc.flattened();
        let entries = flattened.table.entries();

        for pair in entries.windows(2) {
            assert!(pair[0].end() <= pair[1].start, "{pair:?}");
        }
        let covered: usize = entries.iter().map(|entry| entry.len).sum();
        let newlines = flattened.text.matches('\n').count();
        assert_eq!(covered + newlines, flattened.table.text_len());
    }

    #[test]
    fn test_entry_lookup_and_markers() {
        let marker = Node::scene_break();
        let marker_id = marker.id;
        let doc = Document::from_blocks(vec![
            Node::paragraph_text("One"),
            marker,
            Node::paragraph_text("Two"),
        ]);
        let flattened = doc.flattened();

        let entry = flattened.table.entry_for(marker_id).unwrap();
        assert_eq!(entry.start, 4);
        assert_eq!(entry.len, 0);
        assert_eq!(flattened.table.markers().count(), 1);
        assert!(flattened.table.entry_for(NodeId::new()).is_none());
    }

    #[test]
    fn test_text_entries_in_skips_markers_and_touching_runs() {
        let doc = Document::from_blocks(vec![
            Node::paragraph(vec![Node::text("ab"), Node::text("cd")]),
            Node::scene_break(),
            Node::paragraph_text("ef"),
        ]);
        let flattened = doc.flattened();

        let hits: Vec<_> = flattened
            .table
            .text_entries_in(2, 6)
            .map(|entry| entry.start)
            .collect();
        assert_eq!(hits, vec![2, 5]);
    }
}
