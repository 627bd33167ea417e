//! Offset-keyed range replacement over the node tree.
//!
//! A replace runs in three passes over one `&mut` borrow of the tree, after
//! a read-only planning step:
//!
//! 0. **Plan**: pair every block whose newline falls inside `[start, end)`
//!    with the block that follows it. If some newline has no following block
//!    (inline content or nothing comes next), the edit is rejected before
//!    anything changes.
//! 1. **Cut**: walk in linearization order, removing the characters of every
//!    run that intersects the range and every scene break strictly inside it.
//! 2. **Join**: each planned block absorbs the children of its partner,
//!    which is what deleting the newline between them means.
//! 3. **Insert**: the replacement goes into the run holding `start`, using
//!    the same tie rule as offset resolution.
//!
//! Runs emptied by the cut and transparent containers left without children
//! are pruned last.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use crate::editing::{Document, EditError, Node, NodeId, NodeKind, Patch};
use crate::linear::{byte_index, char_len, resolve};

/// Replace the linear range `range` of `doc` with `text` as one transaction.
///
/// Both ends must resolve against the current position table and every
/// newline in the range must be joinable; otherwise the tree is left
/// untouched and an error describes why.
pub fn replace_range(
    doc: &mut Document,
    range: Range<usize>,
    text: &str,
) -> Result<Patch, EditError> {
    if range.start > range.end {
        return Err(EditError::InvertedRange {
            start: range.start,
            end: range.end,
        });
    }
    {
        let flattened = doc.flattened();
        for offset in [range.start, range.end] {
            if resolve(&flattened.table, offset).is_none() {
                return Err(EditError::Unresolvable {
                    offset,
                    len: flattened.table.text_len(),
                });
            }
        }
    }
    if range.is_empty() && text.is_empty() {
        return Ok(Patch::unchanged(doc.version));
    }

    let joins = plan_joins(&doc.root, &block_newlines(&doc.root, &range))?;

    let mut cut = Cut::new(range.clone());
    if let Some(children) = doc.root.children_mut() {
        cut.visit_all(children);
    }
    join_blocks(&mut doc.root, &joins);

    if !text.is_empty() && !insert_text(&mut doc.root, range.start, text) {
        log::warn!("no text position at {} after deletion, dropped insert", range.start);
    }
    prune(&mut doc.root, &cut.emptied);

    doc.commit();
    log::trace!(
        "replaced {range:?} with {} chars, now version {}",
        char_len(text),
        doc.version
    );
    Ok(Patch::replaced(range, char_len(text), doc.version))
}

/// Blocks whose newline lies in `range`, with that newline's offset, in
/// document order
fn block_newlines(root: &Node, range: &Range<usize>) -> Vec<(NodeId, usize)> {
    fn walk(node: &Node, range: &Range<usize>, offset: &mut usize, out: &mut Vec<(NodeId, usize)>) {
        match &node.kind {
            NodeKind::Text(text) => *offset += char_len(text),
            NodeKind::SceneBreak => {}
            NodeKind::Paragraph(children) | NodeKind::Heading { children, .. } => {
                children.iter().for_each(|child| walk(child, range, offset, out));
                if range.contains(offset) {
                    out.push((node.id, *offset));
                }
                *offset += 1;
            }
            NodeKind::Container { children, .. } => {
                children.iter().for_each(|child| walk(child, range, offset, out));
            }
        }
    }

    let mut out = Vec::new();
    walk(root, range, &mut 0, &mut out);
    out
}

/// Pair each newline's block with the block it will absorb. A block already
/// absorbed by an earlier join is gone by the time later joins run: it is
/// skipped when looking for a partner, and its own join goes to the block
/// that absorbed it.
fn plan_joins(root: &Node, newlines: &[(NodeId, usize)]) -> Result<Vec<(NodeId, NodeId)>, EditError> {
    let mut absorbed: HashMap<NodeId, NodeId> = HashMap::new();
    newlines
        .iter()
        .map(|&(id, offset)| -> Result<(NodeId, NodeId), EditError> {
            let next = next_content(root, id, &absorbed)
                .filter(|node| node.is_block())
                .ok_or(EditError::UnjoinableNewline(offset))?;
            let mut target = id;
            while let Some(&owner) = absorbed.get(&target) {
                target = owner;
            }
            absorbed.insert(next.id, target);
            Ok((target, next.id))
        })
        .collect()
}

/// First block or text run after the subtree of `after`, in linearization
/// order. Transparent containers and scene breaks are looked through, so a
/// scene break between two joined blocks ends up after them.
fn next_content<'a>(
    root: &'a Node,
    after: NodeId,
    absorbed: &HashMap<NodeId, NodeId>,
) -> Option<&'a Node> {
    fn walk<'a>(
        node: &'a Node,
        after: NodeId,
        absorbed: &HashMap<NodeId, NodeId>,
        passed: &mut bool,
    ) -> Option<&'a Node> {
        for child in node.children() {
            if *passed && absorbed.contains_key(&child.id) {
                continue;
            }
            let see_through = child.is_marker() || matches!(child.kind, NodeKind::Container { .. });
            if *passed && !see_through {
                return Some(child);
            }
            if child.id == after {
                *passed = true;
            } else if let Some(found) = walk(child, after, absorbed, passed) {
                return Some(found);
            }
        }
        None
    }

    walk(root, after, absorbed, &mut false)
}

struct Cut {
    range: Range<usize>,
    /// Offset in the pre-edit linearization
    offset: usize,
    /// Runs that lost all of their text
    emptied: HashSet<NodeId>,
}

impl Cut {
    fn new(range: Range<usize>) -> Self {
        Self {
            range,
            offset: 0,
            emptied: HashSet::new(),
        }
    }

    fn visit_all(&mut self, children: &mut Vec<Node>) {
        children.retain_mut(|child| self.visit(child));
    }

    /// Returns false when the node is to be dropped from its parent
    fn visit(&mut self, node: &mut Node) -> bool {
        let id = node.id;
        match &mut node.kind {
            NodeKind::Text(text) => {
                let start = self.offset;
                let len = char_len(text);
                self.offset += len;

                let from = self.range.start.max(start);
                let to = self.range.end.min(start + len);
                if from < to {
                    let bytes = byte_index(text, from - start)..byte_index(text, to - start);
                    text.replace_range(bytes, "");
                    if text.is_empty() {
                        self.emptied.insert(id);
                    }
                }
                true
            }
            NodeKind::SceneBreak => {
                !(self.range.start < self.offset && self.offset < self.range.end)
            }
            NodeKind::Paragraph(children) | NodeKind::Heading { children, .. } => {
                self.visit_all(children);
                self.offset += 1;
                true
            }
            NodeKind::Container { children, .. } => {
                self.visit_all(children);
                true
            }
        }
    }
}

/// Remove planned newlines by moving each partner's children into its block
fn join_blocks(root: &mut Node, joins: &[(NodeId, NodeId)]) {
    for &(id, next) in joins {
        let Some(next) = root.detach(next) else {
            log::debug!("join partner {next} of block {id} is gone, keeping its newline");
            continue;
        };
        if let Some(children) = root.find_mut(id).and_then(Node::children_mut) {
            children.extend(next.into_children());
        }
    }
}

/// Insert `text` at linear offset `at`; false if no run or empty block
/// sits there
fn insert_text(root: &mut Node, at: usize, text: &str) -> bool {
    let mut insert = Insert {
        at,
        text,
        offset: 0,
        done: false,
    };
    insert.visit(root);
    insert.done
}

struct Insert<'a> {
    at: usize,
    text: &'a str,
    offset: usize,
    done: bool,
}

impl Insert<'_> {
    fn visit(&mut self, node: &mut Node) {
        if self.done {
            return;
        }
        match &mut node.kind {
            NodeKind::Text(run) => {
                let len = char_len(run);
                if self.offset <= self.at && self.at <= self.offset + len {
                    let byte = byte_index(run, self.at - self.offset);
                    run.insert_str(byte, self.text);
                    self.done = true;
                }
                self.offset += len;
            }
            NodeKind::SceneBreak => {}
            NodeKind::Paragraph(children) | NodeKind::Heading { children, .. } => {
                let start = self.offset;
                for child in children.iter_mut() {
                    self.visit(child);
                }
                if !self.done && start == self.at && self.offset == start {
                    children.push(Node::text(self.text));
                    self.done = true;
                }
                self.offset += 1;
            }
            NodeKind::Container { children, .. } => {
                for child in children.iter_mut() {
                    self.visit(child);
                }
            }
        }
    }
}

fn prune(node: &mut Node, emptied: &HashSet<NodeId>) {
    let Some(children) = node.children_mut() else {
        return;
    };
    for child in children.iter_mut() {
        prune(child, emptied);
    }
    children.retain(|child| match &child.kind {
        NodeKind::Text(text) => !(text.is_empty() && emptied.contains(&child.id)),
        NodeKind::Container { children, .. } => !children.is_empty(),
        _ => true,
    });
}
