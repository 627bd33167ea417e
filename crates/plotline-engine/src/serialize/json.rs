use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::editing::{Document, Node, NodeId, NodeKind};

/// Persisted node shape: `{ "type", "id", "text", "level", "content" }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<StoredNode>,
}

impl From<&Node> for StoredNode {
    fn from(node: &Node) -> Self {
        let (text, level) = match &node.kind {
            NodeKind::Text(text) => (Some(text.clone()), None),
            NodeKind::Heading { level, .. } => (None, Some(*level)),
            _ => (None, None),
        };
        Self {
            kind: node.tag().to_string(),
            id: Some(node.id),
            text,
            level,
            content: node.children().iter().map(StoredNode::from).collect(),
        }
    }
}

/// Write the full node structure, ids included
pub fn to_json(doc: &Document) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&StoredNode::from(doc.root()))
}

/// Load a document written by [`to_json`].
///
/// Malformed input loads as an empty document. Unknown node types load as
/// transparent containers; missing or repeated ids are replaced with fresh
/// ones.
pub fn from_json(json: &str) -> Document {
    let stored: StoredNode = match serde_json::from_str(json) {
        Ok(stored) => stored,
        Err(err) => {
            log::warn!("malformed document JSON, loading empty document: {err}");
            return Document::new();
        }
    };
    let mut seen = HashSet::new();
    let root = restore(stored, &mut seen);
    if root.tag() == Document::ROOT_TAG {
        Document::from_root(root)
    } else {
        Document::from_blocks(vec![root])
    }
}

fn restore(stored: StoredNode, seen: &mut HashSet<NodeId>) -> Node {
    let StoredNode {
        kind,
        id,
        text,
        level,
        content,
    } = stored;
    let id = match id {
        Some(id) if seen.insert(id) => id,
        Some(id) => {
            log::warn!("duplicate node id {id}, assigning a fresh one");
            fresh_id(seen)
        }
        None => fresh_id(seen),
    };
    let children = || {
        content
            .into_iter()
            .map(|child| restore(child, seen))
            .collect::<Vec<_>>()
    };
    let kind = match kind.as_str() {
        "text" => NodeKind::Text(text.unwrap_or_default()),
        "paragraph" => NodeKind::Paragraph(children()),
        "heading" => NodeKind::Heading {
            level: level.unwrap_or(1),
            children: children(),
        },
        "scene_break" => NodeKind::SceneBreak,
        _ => NodeKind::Container {
            children: children(),
            tag: kind.clone(),
        },
    };
    Node { id, kind }
}

fn fresh_id(seen: &mut HashSet<NodeId>) -> NodeId {
    let id = NodeId::new();
    seen.insert(id);
    id
}
