use crate::editing::NodeId;
use crate::linear::table::PositionTable;

/// A point inside a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub node: NodeId,
    /// Character offset within the run
    pub local: usize,
}

/// Map an absolute offset to the text run holding it.
///
/// The offset belongs to the first text entry whose end reaches it, so an
/// offset on the seam between two runs resolves to the end of the earlier
/// one. Markers are skipped since they hold no interior offsets. Offsets past
/// the end of the text, or in a gap no run covers (an empty block, the
/// position after a trailing newline), resolve to `None`.
pub fn resolve(table: &PositionTable, offset: usize) -> Option<Position> {
    if offset > table.text_len() {
        return None;
    }
    let entries = table.entries();
    let first = entries.partition_point(|entry| entry.end() < offset);
    entries[first..]
        .iter()
        .find(|entry| !entry.is_marker())
        .filter(|entry| entry.start <= offset)
        .map(|entry| Position {
            node: entry.node,
            local: offset - entry.start,
        })
}

/// Inverse of [`resolve`]: absolute offset of `local` within `node`.
///
/// `None` if the node is not in this table or `local` is past its end.
pub fn absolute(table: &PositionTable, node: NodeId, local: usize) -> Option<usize> {
    let entry = table.entry_for(node)?;
    (local <= entry.len).then(|| entry.start + local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{Document, Node};
    use crate::tests::manuscript;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn hello_world() -> (Document, NodeId, NodeId) {
        let hello = Node::paragraph_text("Hello");
        let world = Node::paragraph_text("World");
        let hello_run = hello.children()[0].id;
        let world_run = world.children()[0].id;
        (Document::from_blocks(vec![hello, world]), hello_run, world_run)
    }

    #[rstest]
    #[case(0, true, 0)]
    #[case(3, true, 3)]
    #[case(5, true, 5)]
    #[case(6, false, 0)]
    #[case(11, false, 5)]
    fn test_resolve_hello_world(#[case] offset: usize, #[case] in_hello: bool, #[case] local: usize) {
        let (doc, hello, world) = hello_world();
        let flattened = doc.flattened();
        let table = &flattened.table;

        let expected = if in_hello { hello } else { world };
        assert_eq!(
            resolve(table, offset),
            Some(Position {
                node: expected,
                local
            })
        );
    }

    #[test]
    fn test_resolve_past_end_is_none() {
        let (doc, _, _) = hello_world();
        let flattened = doc.flattened();
        let table = &flattened.table;

        // 12 is after the trailing newline: no run covers it
        assert_eq!(resolve(table, 12), None);
        assert_eq!(resolve(table, 13), None);
        assert_eq!(resolve(table, usize::MAX), None);
    }

    #[test]
    fn test_resolve_skips_marker_at_boundary() {
        let run = Node::text("After");
        let run_id = run.id;
        let doc = Document::from_blocks(vec![
            Node::paragraph_text("Before"),
            Node::scene_break(),
            Node::paragraph(vec![run]),
        ]);

        assert_eq!(
            doc.resolve(7),
            Some(Position {
                node: run_id,
                local: 0
            })
        );
    }

    #[test]
    fn test_resolve_seam_between_runs_favours_earlier_run() {
        let first = Node::text("Hel");
        let second = Node::text("lo");
        let (first_id, second_id) = (first.id, second.id);
        let doc = Document::from_blocks(vec![Node::paragraph(vec![first, second])]);

        assert_eq!(
            doc.resolve(3),
            Some(Position {
                node: first_id,
                local: 3
            })
        );
        assert_eq!(
            doc.resolve(4),
            Some(Position {
                node: second_id,
                local: 1
            })
        );
    }

    #[test]
    fn test_resolve_empty_block_gap_is_none() {
        let doc = Document::from_blocks(vec![
            Node::paragraph_text("A"),
            Node::paragraph(vec![]),
            Node::paragraph_text("B"),
        ]);

        // "A\n\nB\n": offset 2 is the empty paragraph
        assert_eq!(doc.resolve(2), None);
        assert!(doc.resolve(3).is_some());
    }

    #[test]
    fn test_absolute_rejects_unknown_node_and_overflow() {
        let (doc, hello, world) = hello_world();
        let flattened = doc.flattened();
        let table = &flattened.table;

        assert_eq!(absolute(table, world, 0), Some(6));
        assert_eq!(absolute(table, hello, 5), Some(5));
        assert_eq!(absolute(table, hello, 6), None);
        assert_eq!(absolute(table, NodeId::new(), 0), None);
    }

    #[test]
    fn test_round_trip_over_every_run_offset() {
        let doc = manuscript();
        let flattened = doc.flattened();
        let table = &flattened.table;

        for entry in table.entries().iter().filter(|entry| !entry.is_marker()) {
            for local in 0..=entry.len {
                let offset = absolute(table, entry.node, local).unwrap();
                let position = resolve(table, offset).unwrap();
                assert_eq!(absolute(table, position.node, position.local), Some(offset));
                // Each run in the fixture sits alone in its block, so identity holds
                assert_eq!(
                    position,
                    Position {
                        node: entry.node,
                        local
                    }
                );
            }
        }
    }
}
