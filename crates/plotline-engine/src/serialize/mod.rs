//! Plain-text and JSON persistence for documents.
//!
//! Plain text is one line per top-level block with scene breaks written as
//! a break line; content lines that look like a break are escaped with a
//! leading `\`. It keeps every character of content but not blank-line
//! formatting, inline structure or node identity; the JSON form in [`json`]
//! keeps all of those.

pub mod json;

use std::sync::OnceLock;

use regex::Regex;

use crate::editing::{Document, Node, NodeKind};

pub use json::{from_json, to_json};

/// Marks a content line that would otherwise parse as a scene break
const ESCAPE: char = '\\';

/// Options for the plain-text form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Line written for each top-level scene break
    pub scene_break: String,
}

impl SerializeOptions {
    pub const DEFAULT_SCENE_BREAK: &'static str = "* * *";
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            scene_break: Self::DEFAULT_SCENE_BREAK.to_string(),
        }
    }
}

pub fn serialize(doc: &Document) -> String {
    serialize_with(doc, &SerializeOptions::default())
}

/// One line per top-level block, joined with `\n` and no trailing newline
pub fn serialize_with(doc: &Document, options: &SerializeOptions) -> String {
    let mut lines = Vec::new();
    for child in doc.blocks() {
        emit_lines(child, true, options, &mut lines);
    }
    lines.join("\n")
}

fn emit_lines(node: &Node, top_level: bool, options: &SerializeOptions, lines: &mut Vec<String>) {
    match &node.kind {
        NodeKind::SceneBreak if top_level => lines.push(options.scene_break.clone()),
        NodeKind::SceneBreak => log::debug!("dropping nested scene break {}", node.id),
        NodeKind::Container { children, .. } => children
            .iter()
            .for_each(|child| emit_lines(child, false, options, lines)),
        NodeKind::Text(text) => lines.push(escape_line(text.clone(), options)),
        NodeKind::Paragraph(_) | NodeKind::Heading { .. } => {
            lines.push(escape_line(node.plain_text(), options))
        }
    }
}

/// Prefix content lines that would read back as a scene break, or that
/// already start with the escape, with one `\`
fn escape_line(line: String, options: &SerializeOptions) -> String {
    if line.starts_with(ESCAPE) || is_scene_break(&line, options) {
        format!("{ESCAPE}{line}")
    } else {
        line
    }
}

pub fn deserialize(text: &str) -> Document {
    deserialize_with(text, &SerializeOptions::default())
}

/// Parse plain text: blank lines are dropped, break lines become scene
/// breaks and every other line becomes a one-run paragraph, minus one
/// leading `\` if it has one
pub fn deserialize_with(text: &str, options: &SerializeOptions) -> Document {
    let blocks = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            if let Some(escaped) = line.strip_prefix(ESCAPE) {
                Node::paragraph_text(escaped)
            } else if is_scene_break(line, options) {
                Node::scene_break()
            } else {
                Node::paragraph_text(line)
            }
        })
        .collect();
    Document::from_blocks(blocks)
}

/// Whether `line` reads as a scene break: the configured break line, or a
/// conventional one such as `***`, `* * *`, `---` or a lone `#`
pub fn is_scene_break(line: &str, options: &SerializeOptions) -> bool {
    static BREAK_REGEX: OnceLock<Regex> = OnceLock::new();
    let break_regex = BREAK_REGEX.get_or_init(|| {
        Regex::new(r"^\s*(?:(?:\*\s*){3,}|(?:-\s*){3,}|#)\s*$").expect("Invalid scene break regex")
    });

    let configured = options.scene_break.trim();
    (!configured.is_empty() && line.trim() == configured) || break_regex.is_match(line)
}
