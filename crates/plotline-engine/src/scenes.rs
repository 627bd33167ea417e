//! Scene boundaries and cursor-to-scene mapping.
//!
//! Scene breaks only appear at the top level, so boundaries come from a
//! single walk over the root's children rather than a full flatten.

use std::fmt;

use crate::editing::Node;
use crate::linear::linear_len;

/// Offsets of the top-level scene breaks, strictly increasing.
///
/// Adjacent breaks with no text between them share an offset and collapse
/// into one boundary.
pub fn scene_boundaries(root: &Node) -> Vec<usize> {
    let mut boundaries: Vec<usize> = Vec::new();
    let mut offset = 0;
    for child in root.children() {
        if !child.is_marker() {
            offset += linear_len(child);
        } else if boundaries.last() == Some(&offset) {
            log::debug!("collapsing repeated scene break at offset {offset}");
        } else {
            boundaries.push(offset);
        }
    }
    boundaries
}

/// Number of boundaries at or before `cursor`; scene 0 precedes the first
/// break and a cursor sitting on a boundary is already in the new scene
pub fn scene_for_cursor(boundaries: &[usize], cursor: usize) -> usize {
    boundaries.partition_point(|&boundary| boundary <= cursor)
}

/// Scene index reported to scene-context consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneChange {
    pub scene: usize,
    pub cursor: usize,
}

/// Tracks the scene under the cursor and reports only when it changes
pub struct SceneIndexer {
    boundaries: Vec<usize>,
    last_reported: Option<usize>,
    on_scene_change: Box<dyn FnMut(SceneChange)>,
}

impl SceneIndexer {
    pub fn new(on_scene_change: impl FnMut(SceneChange) + 'static) -> Self {
        Self {
            boundaries: Vec::new(),
            last_reported: None,
            on_scene_change: Box::new(on_scene_change),
        }
    }

    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Replace the boundary list; returns whether it differed
    pub fn set_boundaries(&mut self, boundaries: Vec<usize>) -> bool {
        if self.boundaries == boundaries {
            return false;
        }
        self.boundaries = boundaries;
        true
    }

    pub fn last_reported(&self) -> Option<usize> {
        self.last_reported
    }

    /// Compute the scene at `cursor` and invoke the callback if it differs
    /// from the last one reported. The first call always reports.
    pub fn on_cursor_move(&mut self, cursor: usize) -> bool {
        let scene = scene_for_cursor(&self.boundaries, cursor);
        if self.last_reported == Some(scene) {
            return false;
        }
        self.last_reported = Some(scene);
        (self.on_scene_change)(SceneChange { scene, cursor });
        true
    }
}

impl fmt::Debug for SceneIndexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneIndexer")
            .field("boundaries", &self.boundaries)
            .field("last_reported", &self.last_reported)
            .finish_non_exhaustive()
    }
}
