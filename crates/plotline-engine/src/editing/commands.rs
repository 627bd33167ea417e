use std::ops::Range;

use crate::editing::{Document, EditError, Node, NodeId, Patch, range};
use crate::linear::{linear_len, node_span};

/// Edit commands accepted by [`Document::apply`]
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Replace a linear range with text; the workhorse for analyzer fixes
    ReplaceRange { range: Range<usize>, text: String },
    InsertText { at: usize, text: String },
    DeleteRange { range: Range<usize> },
    /// Insert a top-level scene break before the block starting at `at`, or
    /// at the end when `at` is the text length
    InsertSceneBreak { at: usize },
    /// Remove any node, with its whole subtree
    RemoveNode { id: NodeId },
}

pub(crate) fn apply_command(doc: &mut Document, cmd: &Cmd) -> Result<Patch, EditError> {
    match cmd {
        Cmd::ReplaceRange { range, text } => range::replace_range(doc, range.clone(), text),
        Cmd::InsertText { at, text } => range::replace_range(doc, *at..*at, text),
        Cmd::DeleteRange { range } => range::replace_range(doc, range.clone(), ""),
        Cmd::InsertSceneBreak { at } => insert_scene_break(doc, *at),
        Cmd::RemoveNode { id } => remove_node(doc, *id),
    }
}

fn insert_scene_break(doc: &mut Document, at: usize) -> Result<Patch, EditError> {
    let mut offset = 0;
    let mut index = None;
    for (position, child) in doc.root.children().iter().enumerate() {
        if offset == at && !child.is_marker() {
            index = Some(position);
            break;
        }
        offset += linear_len(child);
    }
    let Some(children) = doc.root.children_mut() else {
        return Err(EditError::NotABlockStart(at));
    };
    let index = match index {
        Some(index) => index,
        None if offset == at => children.len(),
        None => return Err(EditError::NotABlockStart(at)),
    };

    children.insert(index, Node::scene_break());
    doc.commit();
    Ok(Patch::replaced(at..at, 0, doc.version))
}

fn remove_node(doc: &mut Document, id: NodeId) -> Result<Patch, EditError> {
    if id == doc.root.id {
        return Err(EditError::RootRemoval);
    }
    let span = node_span(&doc.root, id).ok_or(EditError::UnknownNode(id))?;
    doc.root.detach(id).ok_or(EditError::UnknownNode(id))?;
    doc.commit();
    Ok(Patch::replaced(span, 0, doc.version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::paragraphs;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_and_delete_commands() {
        let mut doc = paragraphs(&["Hello", "World"]);

        let patch = doc.apply(Cmd::InsertText {
            at: 5,
            text: ", there".to_string(),
        });
        assert_eq!(doc.text(), "Hello, there\nWorld\n");
        assert_eq!(patch.inserted, 5..12);

        doc.apply(Cmd::DeleteRange { range: 0..7 });
        assert_eq!(doc.text(), "there\nWorld\n");
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn test_insert_scene_break_at_block_start() {
        let mut doc = paragraphs(&["One", "Two", "Three"]);

        let patch = doc.apply(Cmd::InsertSceneBreak { at: 4 });

        assert!(patch.applied);
        assert_eq!(&*doc.scene_boundaries(), &[4]);
        assert_eq!(doc.text(), "One\nTwo\nThree\n");
        assert!(doc.blocks()[1].is_marker());
    }

    #[test]
    fn test_insert_scene_break_at_document_end() {
        let mut doc = paragraphs(&["One"]);

        doc.apply(Cmd::InsertSceneBreak { at: 4 });

        assert_eq!(&*doc.scene_boundaries(), &[4]);
        assert!(doc.blocks()[1].is_marker());
    }

    #[test]
    fn test_insert_scene_break_mid_block_is_rejected() {
        let mut doc = paragraphs(&["One", "Two"]);

        let patch = doc.apply(Cmd::InsertSceneBreak { at: 2 });

        assert!(!patch.applied);
        assert_eq!(doc.version(), 0);
        assert!(doc.scene_boundaries().is_empty());
    }

    #[test]
    fn test_remove_node_reports_its_span() {
        let mut doc = paragraphs(&["One", "Two", "Three"]);
        let second = doc.blocks()[1].id;

        let patch = doc.apply(Cmd::RemoveNode { id: second });

        assert_eq!(patch.removed, 4..8);
        assert_eq!(doc.text(), "One\nThree\n");
    }

    #[test]
    fn test_remove_scene_break() {
        let mut doc = paragraphs(&["One", "Two"]);
        doc.apply(Cmd::InsertSceneBreak { at: 4 });
        let marker = doc.blocks()[1].id;

        let patch = doc.apply(Cmd::RemoveNode { id: marker });

        assert_eq!(patch.removed, 4..4);
        assert!(doc.scene_boundaries().is_empty());
    }

    #[test]
    fn test_remove_unknown_or_root_is_noop() {
        let mut doc = paragraphs(&["One"]);
        let root = doc.root().id;

        assert!(!doc.apply(Cmd::RemoveNode { id: NodeId::new() }).applied);
        assert!(!doc.apply(Cmd::RemoveNode { id: root }).applied);
        assert_eq!(doc.version(), 0);
    }
}
