//! Linearization of the document tree into a flat character-offset space.
//!
//! External analyzers work on the plain text produced here and hand back
//! character offsets. The position table built in the same walk maps those
//! offsets back onto tree nodes, so both directions must follow exactly the
//! same traversal rule:
//!
//! | node               | contributes                  | table entry          |
//! |--------------------|------------------------------|----------------------|
//! | text run           | its literal text             | start, char length   |
//! | paragraph, heading | children, then one `\n`      | none for the newline |
//! | scene break        | nothing                      | zero-length marker   |
//! | any other node     | its children                 | none                 |
//!
//! Offsets count Unicode scalar values, not bytes.

mod flatten;
mod resolve;
mod table;

pub use flatten::{Flattened, flatten};
pub use resolve::{Position, absolute, resolve};
pub use table::{EntryKind, PositionEntry, PositionTable};

pub(crate) use flatten::{flatten_document, linear_len, node_span};

/// Byte index of the `char_index`-th character of `text`, clamped to its end
pub(crate) fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(byte, _)| byte)
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_index_multibyte() {
        let text = "aé😀b";

        assert_eq!(byte_index(text, 0), 0);
        assert_eq!(byte_index(text, 1), 1);
        assert_eq!(byte_index(text, 2), 3);
        assert_eq!(byte_index(text, 3), 7);
        assert_eq!(byte_index(text, 4), text.len());
        assert_eq!(byte_index(text, 99), text.len());
        assert_eq!(char_len(text), 4);
    }
}
