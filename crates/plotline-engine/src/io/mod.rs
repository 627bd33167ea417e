use crate::editing::Document;
use crate::serialize::{SerializeOptions, deserialize_with, from_json, serialize_with, to_json};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk representation, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One line per block, scene breaks as break lines
    PlainText,
    /// Full node structure with ids
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::PlainText,
        }
    }
}

/// Read a file and return its content
pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(path, content).map_err(IoError::Io)
}

/// Load a document, as JSON for `.json` files and as plain text otherwise
pub fn load_document(path: &Path, options: &SerializeOptions) -> Result<Document, IoError> {
    let content = read_file(path)?;
    let doc = match Format::from_path(path) {
        Format::Json => from_json(&content),
        Format::PlainText => deserialize_with(&content, options),
    };
    log::debug!("loaded {} blocks from {}", doc.blocks().len(), path.display());
    Ok(doc)
}

/// Save a document in the format its extension calls for
pub fn save_document(path: &Path, doc: &Document, options: &SerializeOptions) -> Result<(), IoError> {
    let content = match Format::from_path(path) {
        Format::Json => to_json(doc)?,
        Format::PlainText => serialize_with(doc, options),
    };
    write_file(path, &content)
}
