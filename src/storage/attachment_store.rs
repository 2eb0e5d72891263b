use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::entity::Attachment;
use crate::error::{NotesError, Result};

const MAX_COLLISION_RETRIES: u32 = 1000;

/// Rewrite an uploaded file name to `[A-Za-z0-9._-]`.
pub fn sanitize_filename(original: &str) -> String {
    let sanitized: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "image".to_string()
    } else {
        sanitized
    }
}

/// Uploaded images, stored flat in one directory and never garbage
/// collected.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    dir: PathBuf,
    url_prefix: String,
}

impl AttachmentStore {
    /// `url_prefix` is the public path the directory is served under,
    /// e.g. `/files/images`.
    pub fn new(dir: &Path, url_prefix: &str) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an upload as `<unix-millis>-<sanitized name>`.
    pub fn store(&self, original_filename: &str, bytes: &[u8]) -> Result<Attachment> {
        self.store_at(Utc::now().timestamp_millis(), original_filename, bytes)
    }

    /// Same as [`store`](Self::store) with an explicit timestamp. A name
    /// already taken gets a counter inserted after the timestamp.
    pub fn store_at(&self, millis: i64, original_filename: &str, bytes: &[u8]) -> Result<Attachment> {
        let base = sanitize_filename(original_filename);

        for attempt in 0..=MAX_COLLISION_RETRIES {
            let file_name = if attempt == 0 {
                format!("{}-{}", millis, base)
            } else {
                format!("{}-{}-{}", millis, attempt, base)
            };
            let path = self.dir.join(&file_name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(bytes)
                        .map_err(|e| NotesError::Storage(format!("{}: {}", file_name, e)))?;
                    info!(file = %file_name, bytes = bytes.len(), "stored attachment");
                    return Ok(Attachment {
                        url: format!("{}/{}", self.url_prefix, file_name),
                        file_name,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(NotesError::Storage(format!("{}: {}", file_name, e))),
            }
        }

        Err(NotesError::Storage(format!(
            "no free attachment name for {} at {}",
            base, millis
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename_keeps_dots() {
        assert_eq!(sanitize_filename("photo 1.png"), "photo_1.png");
        assert_eq!(sanitize_filename("../x.jpg"), ".._x.jpg");
        assert_eq!(sanitize_filename(""), "image");
    }

    #[test]
    fn test_store_writes_bytes_and_url() {
        let tmp = TempDir::new().unwrap();
        let store = AttachmentStore::new(&tmp.path().join("images"), "/files/images/").unwrap();

        let attachment = store.store_at(1700000000000, "cat pic.png", b"\x89PNG").unwrap();
        assert_eq!(attachment.file_name, "1700000000000-cat_pic.png");
        assert_eq!(attachment.url, "/files/images/1700000000000-cat_pic.png");
        assert_eq!(
            std::fs::read(store.dir().join(&attachment.file_name)).unwrap(),
            b"\x89PNG"
        );
        assert_eq!(
            attachment.markdown("cat"),
            "![cat](/files/images/1700000000000-cat_pic.png)"
        );
    }

    #[test]
    fn test_same_millisecond_uploads_do_not_overwrite() {
        let tmp = TempDir::new().unwrap();
        let store = AttachmentStore::new(tmp.path(), "/files/images").unwrap();

        let first = store.store_at(42, "a.png", b"first").unwrap();
        let second = store.store_at(42, "a.png", b"second").unwrap();
        assert_eq!(first.file_name, "42-a.png");
        assert_eq!(second.file_name, "42-1-a.png");
        assert_eq!(std::fs::read(tmp.path().join("42-a.png")).unwrap(), b"first");
    }
}
