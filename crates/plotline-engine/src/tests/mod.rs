use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use tempfile::TempDir;

use crate::editing::{Document, Node};
use crate::scenes::SceneChange;

/// Document of plain paragraphs, one run each
pub fn paragraphs(texts: &[&str]) -> Document {
    Document::from_blocks(texts.iter().map(|text| Node::paragraph_text(*text)).collect())
}

/// Three-scene fixture: a heading, then paragraphs split by two top-level
/// scene breaks. Every run sits alone in its block and none are empty.
pub fn manuscript() -> Document {
    Document::from_blocks(vec![
        Node::heading(1, vec![Node::text("Chapter One")]),
        Node::paragraph_text("It was a dark and stormy night."),
        Node::paragraph_text("The rain fell in torrents."),
        Node::scene_break(),
        Node::paragraph_text("Morning came."),
        Node::scene_break(),
        Node::paragraph_text("Café au lait, naïvely."),
        Node::paragraph_text("The end."),
    ])
}

/// Callback that records every scene change it receives
pub fn recorder() -> (Rc<RefCell<Vec<SceneChange>>>, impl FnMut(SceneChange) + 'static) {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    (changes, move |change: SceneChange| sink.borrow_mut().push(change))
}

/// Create a temporary directory for file round trips
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test file with content
pub fn create_test_file(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}
