use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("No note name")]
    MissingName,

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("A note with the new name already exists: {0}")]
    Conflict(String),

    #[error("Unsaved changes to {0}")]
    UnsavedChanges(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered `success: false`.
    #[error("Server error ({status}): {message}")]
    Remote { status: u16, message: String },
}

impl NotesError {
    /// Classify an I/O failure on a single note file.
    ///
    /// A missing file is `NotFound`, everything else is a storage failure.
    pub fn from_note_io(name: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            NotesError::NotFound(name.to_string())
        } else {
            NotesError::Storage(format!("{}: {}", name, err))
        }
    }
}

pub type Result<T> = std::result::Result<T, NotesError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_missing_file_is_not_found() {
        let err = NotesError::from_note_io("a/b", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, NotesError::NotFound(name) if name == "a/b"));
    }

    #[test]
    fn test_other_io_is_storage() {
        let err = NotesError::from_note_io(
            "a",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        match err {
            NotesError::Storage(msg) => assert!(msg.contains("denied")),
            other => panic!("Expected Storage, got {:?}", other),
        }
    }
}
