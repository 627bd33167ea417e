use std::ops::Range;

use crate::editing::{Document, Node, NodeId, NodeKind};
use crate::linear::char_len;
use crate::linear::table::{EntryKind, PositionEntry, PositionTable};

/// Linearized view of one document version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened {
    pub text: String,
    pub table: PositionTable,
    /// Document version this view was built from
    pub version: u64,
}

impl Flattened {
    /// Whether this view still describes `doc`; a view held across a
    /// mutation must be rebuilt before its offsets are trusted
    pub fn is_current(&self, doc: &Document) -> bool {
        self.version == doc.version()
    }
}

/// Produce the canonical text and position table for a tree.
///
/// Pure and deterministic: the same tree always yields the same output.
pub fn flatten(root: &Node) -> (String, PositionTable) {
    let mut linearizer = Linearizer::default();
    linearizer.visit(root);
    let Linearizer {
        text,
        entries,
        offset,
    } = linearizer;
    (text, PositionTable::new(entries, offset))
}

pub(crate) fn flatten_document(doc: &Document) -> Flattened {
    let (text, table) = flatten(doc.root());
    Flattened {
        text,
        table,
        version: doc.version(),
    }
}

#[derive(Default)]
struct Linearizer {
    text: String,
    entries: Vec<PositionEntry>,
    /// Characters emitted so far
    offset: usize,
}

impl Linearizer {
    fn visit(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Text(text) => {
                let len = char_len(text);
                self.entries.push(PositionEntry {
                    node: node.id,
                    start: self.offset,
                    len,
                    kind: EntryKind::Text,
                });
                self.text.push_str(text);
                self.offset += len;
            }
            NodeKind::SceneBreak => self.entries.push(PositionEntry {
                node: node.id,
                start: self.offset,
                len: 0,
                kind: EntryKind::Marker,
            }),
            NodeKind::Paragraph(children) | NodeKind::Heading { children, .. } => {
                children.iter().for_each(|child| self.visit(child));
                self.text.push('\n');
                self.offset += 1;
            }
            NodeKind::Container { children, .. } => {
                children.iter().for_each(|child| self.visit(child));
            }
        }
    }
}

/// Characters a subtree contributes to the linearized text
pub(crate) fn linear_len(node: &Node) -> usize {
    match &node.kind {
        NodeKind::Text(text) => char_len(text),
        NodeKind::SceneBreak => 0,
        NodeKind::Paragraph(children) | NodeKind::Heading { children, .. } => {
            children.iter().map(linear_len).sum::<usize>() + 1
        }
        NodeKind::Container { children, .. } => children.iter().map(linear_len).sum(),
    }
}

/// Linear range covered by the node `id`, including a block's newline
pub(crate) fn node_span(root: &Node, id: NodeId) -> Option<Range<usize>> {
    fn walk(node: &Node, id: NodeId, offset: &mut usize) -> Option<Range<usize>> {
        if node.id == id {
            let start = *offset;
            return Some(start..start + linear_len(node));
        }
        match &node.kind {
            NodeKind::Text(text) => {
                *offset += char_len(text);
                None
            }
            NodeKind::SceneBreak => None,
            NodeKind::Paragraph(children) | NodeKind::Heading { children, .. } => {
                let found = children.iter().find_map(|child| walk(child, id, offset));
                *offset += 1;
                found
            }
            NodeKind::Container { children, .. } => {
                children.iter().find_map(|child| walk(child, id, offset))
            }
        }
    }

    walk(root, id, &mut 0)
}
