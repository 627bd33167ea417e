use std::cell::OnceCell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::editing::{Cmd, Patch};
use crate::linear::{Flattened, Position};

/// Stable identity of a node, usable as a map key across edits
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type tag plus payload of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Leaf carrying literal text
    Text(String),
    /// Block terminated by one newline when linearized
    Paragraph(Vec<Node>),
    /// Block terminated by one newline when linearized
    Heading { level: u8, children: Vec<Node> },
    /// Zero-width scene delimiter
    SceneBreak,
    /// Transparent container: the document root, quotes, lists and any
    /// node type this crate does not know about
    Container { tag: String, children: Vec<Node> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            kind,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(text.into()))
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Paragraph(children))
    }

    /// Paragraph holding a single text run
    pub fn paragraph_text(text: impl Into<String>) -> Self {
        Self::paragraph(vec![Self::text(text)])
    }

    pub fn heading(level: u8, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Heading { level, children })
    }

    pub fn scene_break() -> Self {
        Self::new(NodeKind::SceneBreak)
    }

    pub fn container(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Container {
            tag: tag.into(),
            children,
        })
    }

    /// Type tag as exposed to hosts
    pub fn tag(&self) -> &str {
        match &self.kind {
            NodeKind::Text(_) => "text",
            NodeKind::Paragraph(_) => "paragraph",
            NodeKind::Heading { .. } => "heading",
            NodeKind::SceneBreak => "scene_break",
            NodeKind::Container { tag, .. } => tag,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Paragraph(_) | NodeKind::Heading { .. }
        )
    }

    pub fn is_marker(&self) -> bool {
        matches!(self.kind, NodeKind::SceneBreak)
    }

    /// Text of a leaf run, `None` for every other kind
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Ordered children; leaves have none
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Paragraph(children)
            | NodeKind::Heading { children, .. }
            | NodeKind::Container { children, .. } => children,
            NodeKind::Text(_) | NodeKind::SceneBreak => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.kind {
            NodeKind::Paragraph(children)
            | NodeKind::Heading { children, .. }
            | NodeKind::Container { children, .. } => Some(children),
            NodeKind::Text(_) | NodeKind::SceneBreak => None,
        }
    }

    pub(crate) fn into_children(self) -> Vec<Node> {
        match self.kind {
            NodeKind::Paragraph(children)
            | NodeKind::Heading { children, .. }
            | NodeKind::Container { children, .. } => children,
            NodeKind::Text(_) | NodeKind::SceneBreak => Vec::new(),
        }
    }

    /// Depth-first search by identity
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    pub(crate) fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// Remove the descendant `id` with its subtree and hand it back
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<Node> {
        let children = self.children_mut()?;
        if let Some(position) = children.iter().position(|child| child.id == id) {
            return Some(children.remove(position));
        }
        children.iter_mut().find_map(|child| child.detach(id))
    }

    /// Concatenated text of all runs below this node, without block newlines
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text(text) => out.push_str(text),
            _ => self
                .children()
                .iter()
                .for_each(|child| child.collect_text(out)),
        }
    }
}

/// The rich-text document tree plus its derived, per-version caches.
///
/// Every mutation goes through `&mut self` (see [`Document::apply`]), which
/// is the transaction: no reader can observe the tree between the delete and
/// insert halves of an edit. A committed mutation bumps `version` and drops
/// the cached [`Flattened`] view and scene boundaries wholesale; they are
/// rebuilt lazily on the next query.
///
/// ```rust
/// # use plotline_engine::editing::{Document, Node};
/// let doc = Document::from_blocks(vec![
///     Node::paragraph_text("Hello"),
///     Node::paragraph_text("World"),
/// ]);
/// assert_eq!(doc.text(), "Hello\nWorld\n");
/// ```
pub struct Document {
    /// Root container tagged `doc`
    pub(crate) root: Node,
    /// Incremented once per committed mutation
    pub(crate) version: u64,
    flattened: OnceCell<Rc<Flattened>>,
    boundaries: OnceCell<Rc<[usize]>>,
}

impl Document {
    pub const ROOT_TAG: &'static str = "doc";

    /// Empty document
    pub fn new() -> Self {
        Self::from_blocks(Vec::new())
    }

    pub fn from_blocks(blocks: Vec<Node>) -> Self {
        Self::from_root(Node::container(Self::ROOT_TAG, blocks))
    }

    /// Use `root` as the document root; a leaf or block root is wrapped in a
    /// `doc` container so the root always has children
    pub fn from_root(root: Node) -> Self {
        let root = match root.kind {
            NodeKind::Container { .. } => root,
            _ => Node::container(Self::ROOT_TAG, vec![root]),
        };
        Self {
            root,
            version: 0,
            flattened: OnceCell::new(),
            boundaries: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Top-level children of the root
    pub fn blocks(&self) -> &[Node] {
        self.root.children()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.root.children().is_empty()
    }

    /// Linearized text and position table for the current version
    pub fn flattened(&self) -> Rc<Flattened> {
        self.flattened
            .get_or_init(|| {
                log::trace!("rebuilding position table for version {}", self.version);
                Rc::new(crate::linear::flatten_document(self))
            })
            .clone()
    }

    /// Linearized text handed to external analyzers
    pub fn text(&self) -> String {
        self.flattened().text.clone()
    }

    /// Length of the linearized text in characters
    pub fn text_len(&self) -> usize {
        self.flattened().table.text_len()
    }

    /// Strictly increasing offsets of the top-level scene breaks
    pub fn scene_boundaries(&self) -> Rc<[usize]> {
        self.boundaries
            .get_or_init(|| crate::scenes::scene_boundaries(&self.root).into())
            .clone()
    }

    pub fn scene_for_cursor(&self, cursor: usize) -> usize {
        crate::scenes::scene_for_cursor(&self.scene_boundaries(), cursor)
    }

    pub fn resolve(&self, offset: usize) -> Option<Position> {
        crate::linear::resolve(&self.flattened().table, offset)
    }

    pub fn absolute(&self, node: NodeId, local: usize) -> Option<usize> {
        crate::linear::absolute(&self.flattened().table, node, local)
    }

    /// Linear range covered by any node, block newline included
    pub fn span_of(&self, node: NodeId) -> Option<Range<usize>> {
        crate::linear::node_span(&self.root, node)
    }

    /// Text of `range`, or `None` if it reaches past the end
    pub fn slice(&self, range: Range<usize>) -> Option<String> {
        let flattened = self.flattened();
        if range.start > range.end || range.end > flattened.table.text_len() {
            return None;
        }
        Some(
            flattened
                .text
                .chars()
                .skip(range.start)
                .take(range.len())
                .collect(),
        )
    }

    /// Apply an edit command as one transaction.
    ///
    /// Unresolvable input never fails the caller: the command is dropped
    /// with a warning and the returned patch reports no change.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        match crate::editing::commands::apply_command(self, &cmd) {
            Ok(patch) => patch,
            Err(err) => {
                log::warn!("ignoring {cmd:?}: {err}");
                Patch::unchanged(self.version)
            }
        }
    }

    /// Replace the linear range `range` with `text`
    pub fn replace_range(&mut self, range: Range<usize>, text: impl Into<String>) -> Patch {
        self.apply(Cmd::ReplaceRange {
            range,
            text: text.into(),
        })
    }

    /// Record a committed mutation: bump the version and drop derived caches
    pub(crate) fn commit(&mut self) {
        self.version += 1;
        self.flattened = OnceCell::new();
        self.boundaries = OnceCell::new();
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("version", &self.version)
            .field("root", &self.root)
            .finish()
    }
}

// Caches are not carried over; a clone rebuilds them on first query
impl Clone for Document {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            version: self.version,
            flattened: OnceCell::new(),
            boundaries: OnceCell::new(),
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}
