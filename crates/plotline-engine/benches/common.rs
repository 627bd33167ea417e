use plotline_engine::{Document, Node};

// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_manuscript(scenes: usize, paragraphs_per_scene: usize) -> Document {
    let mut blocks = Vec::new();
    for scene in 0..scenes {
        if scene > 0 {
            blocks.push(Node::scene_break());
        }
        blocks.push(Node::heading(2, vec![Node::text(format!("Scene {scene}"))]));
        for paragraph in 0..paragraphs_per_scene {
            blocks.push(Node::paragraph(vec![
                Node::text(format!("Paragraph {paragraph} opens plainly, ")),
                Node::text("then turns to emphasis"),
                Node::text(" and closes with a café scene."),
            ]));
        }
    }
    Document::from_blocks(blocks)
}

#[allow(dead_code)]
pub fn generate_nested_manuscript(scenes: usize, depth: usize) -> Document {
    let mut blocks = Vec::new();
    for scene in 0..scenes {
        if scene > 0 {
            blocks.push(Node::scene_break());
        }
        let mut node = Node::paragraph_text(format!("Deep paragraph in scene {scene}"));
        for level in 0..depth {
            node = Node::container(format!("level_{level}"), vec![node]);
        }
        blocks.push(node);
    }
    Document::from_blocks(blocks)
}
