/*!
 * # Editing Core Module
 *
 * The live document tree and every way of changing it.
 *
 * ## Architecture Overview
 *
 * ### 1. The tree is the source of truth
 * - A [`Document`] owns a root `doc` container of [`Node`]s: text runs,
 *   blocks (paragraphs, headings), zero-width scene breaks and transparent
 *   containers
 * - Every node carries a stable [`NodeId`] that survives edits elsewhere in
 *   the tree
 *
 * ### 2. Command-based editing
 * - All edits are [`Cmd`]s applied through [`Document::apply`]
 * - One command is one transaction: the `&mut` borrow guarantees nobody sees
 *   the tree between a range delete and the insert that follows it
 * - Each command returns a [`Patch`] that maps caller-held offsets across it
 *
 * ### 3. Derived views are per version
 * - The linearized text, position table and scene boundaries are cached
 *   against `Document::version` and dropped wholesale on every commit
 * - Nothing patches a cached view in place
 *
 * ### 4. Offset-keyed edits never fail loudly
 * - Offsets that do not resolve against the current table turn the command
 *   into a logged no-op ([`EditError`] describes why)
 *
 * ## Module Structure
 *
 * - **`document`**: `Document`, `Node`, `NodeKind`, `NodeId`
 * - **`commands`**: `Cmd` enum and its dispatch
 * - **`range`**: multi-node range replacement (cut, join, insert)
 * - **`patch`**: edit result with offset transformation
 * - **`error`**: `EditError`
 *
 * ## Usage Pattern
 *
 * ```rust
 * use plotline_engine::editing::*;
 *
 * let mut doc = Document::from_blocks(vec![
 *     Node::paragraph_text("It was a dark and stormy night."),
 *     Node::scene_break(),
 *     Node::paragraph_text("Morning came."),
 * ]);
 *
 * // An analyzer flagged chars 9..14 ("dark ") as a cliché
 * let patch = doc.apply(Cmd::ReplaceRange { range: 9..14, text: String::new() });
 * assert_eq!(doc.text(), "It was a and stormy night.\nMorning came.\n");
 * assert_eq!(patch.transform_offset(32, false), 27);
 * ```
 */

pub mod commands;
pub mod document;
pub mod error;
pub mod patch;
pub mod range;

pub use commands::Cmd;
pub use document::{Document, Node, NodeId, NodeKind};
pub use error::EditError;
pub use patch::Patch;
pub use range::replace_range;
