use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("Note not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
}

/// Read a note and return its text
pub fn read_note(relative_path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write note text, creating parent directories as needed
pub fn write_note(
    relative_path: &RelativePath,
    notes_root: &Path,
    text: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(notes_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, text).map_err(IoError::Io)
}

/// Validate that the notes directory exists and is a directory
pub fn validate_notes_dir(notes_root: &Path) -> Result<(), IoError> {
    if !notes_root.exists() {
        return Err(IoError::InvalidNotesDir(format!(
            "{} does not exist",
            notes_root.display()
        )));
    }
    if !notes_root.is_dir() {
        return Err(IoError::InvalidNotesDir(format!(
            "{} is not a directory",
            notes_root.display()
        )));
    }
    Ok(())
}
