pub mod editing;
pub mod highlight;
pub mod io;
pub mod linear;
pub mod observer;
pub mod scenes;
pub mod serialize;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{Cmd, Document, EditError, Node, NodeId, NodeKind, Patch};
pub use highlight::{AnalysisRequest, AnalysisSession, AnalysisSpan, Highlight, HighlightSegment, highlight_segments};
pub use io::*;
pub use linear::{EntryKind, Flattened, Position, PositionEntry, PositionTable, absolute, flatten, resolve};
pub use observer::{ChangeObserver, DocumentChange, ObserverSettings, SharedDocument};
pub use scenes::{SceneChange, SceneIndexer, scene_boundaries, scene_for_cursor};
pub use serialize::{SerializeOptions, deserialize, from_json, serialize, to_json};
