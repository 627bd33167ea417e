use thiserror::Error;

use crate::editing::NodeId;

/// Why an edit command could not be applied.
///
/// These never reach callers of [`crate::editing::Document::apply`]; they are
/// logged and the command becomes a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("offset {offset} does not resolve to a text position (text length {len})")]
    Unresolvable { offset: usize, len: usize },

    #[error("range start {start} is after its end {end}")]
    InvertedRange { start: usize, end: usize },

    #[error("node {0} is not in the current document")]
    UnknownNode(NodeId),

    #[error("the document root cannot be removed")]
    RootRemoval,

    #[error("newline at offset {0} is not followed by a block it could join")]
    UnjoinableNewline(usize),

    #[error("offset {0} is not the start of a top-level block")]
    NotABlockStart(usize),
}
