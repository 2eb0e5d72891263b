use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ListLimits;
use crate::entity::{NoteEntry, NoteName};
use crate::error::{NotesError, Result};
use crate::storage::path::{name_from_relative, resolve, NOTE_EXTENSION};

/// Reserved directory for uploaded attachments, directly under the root.
pub const IMAGES_DIR: &str = "images";

/// Markdown notes kept as `<root>/<name>.md` files.
///
/// Every operation is a direct filesystem call; nothing is cached and no
/// locking is done across calls.
#[derive(Debug, Clone)]
pub struct NoteStore {
    root: PathBuf,
    limits: ListLimits,
}

impl NoteStore {
    /// Open a store rooted at `root`, creating it and the images directory
    /// if needed.
    pub fn new(root: &Path, limits: ListLimits) -> Result<Self> {
        fs::create_dir_all(root.join(IMAGES_DIR))?;
        let root = fs::canonicalize(root)?;
        Ok(Self { root, limits })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn limits(&self) -> ListLimits {
        self.limits
    }

    /// File backing a note name. Names inside the images directory are
    /// rejected, since listings never descend into it.
    pub fn path_for(&self, name: &NoteName) -> Result<PathBuf> {
        if name.segments().next() == Some(IMAGES_DIR) && name.folder().is_some() {
            return Err(NotesError::InvalidPath(name.to_string()));
        }
        resolve(&self.root, name.as_str())
    }

    /// Create or overwrite a note, creating missing folders first.
    pub fn save(&self, raw_name: &str, content: &str) -> Result<NoteName> {
        let name = NoteName::parse(raw_name)?;
        let path = self.path_for(&name)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| NotesError::Storage(format!("{}: {}", name, e)))?;
        }
        fs::write(&path, content).map_err(|e| NotesError::Storage(format!("{}: {}", name, e)))?;

        debug!(note = %name, bytes = content.len(), "saved note");
        Ok(name)
    }

    pub fn open(&self, raw_name: &str) -> Result<String> {
        let name = NoteName::parse(raw_name)?;
        let path = self.path_for(&name)?;
        fs::read_to_string(&path).map_err(|e| NotesError::from_note_io(name.as_str(), e))
    }

    pub fn exists(&self, raw_name: &str) -> Result<bool> {
        let name = NoteName::parse(raw_name)?;
        Ok(self.path_for(&name)?.is_file())
    }

    pub fn delete(&self, raw_name: &str) -> Result<()> {
        let name = NoteName::parse(raw_name)?;
        let path = self.path_for(&name)?;
        fs::remove_file(&path).map_err(|e| NotesError::from_note_io(name.as_str(), e))?;

        info!(note = %name, "deleted note");
        Ok(())
    }

    /// Move a note to a new name. Fails if the source is absent or the
    /// destination is occupied, leaving both files untouched.
    pub fn rename(&self, raw_old: &str, raw_new: &str) -> Result<NoteName> {
        let old = NoteName::parse(raw_old)?;
        let new = NoteName::parse(raw_new)?;
        let old_path = self.path_for(&old)?;
        let new_path = self.path_for(&new)?;

        if !old_path.is_file() {
            return Err(NotesError::NotFound(old.to_string()));
        }
        if new_path.exists() {
            return Err(NotesError::Conflict(new.to_string()));
        }
        if let Some(parent) = new_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| NotesError::Storage(format!("{}: {}", new, e)))?;
        }
        move_exclusive(&old_path, &new_path).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                NotesError::Conflict(new.to_string())
            } else {
                NotesError::Storage(format!("{} -> {}: {}", old, new, e))
            }
        })?;

        info!(from = %old, to = %new, "renamed note");
        Ok(new)
    }

    /// Names of every note, in discovery order.
    pub fn list_names(&self) -> Result<Vec<String>> {
        Ok(self.walk()?.into_iter().map(|(name, _)| name).collect())
    }

    /// Every note with its content. A file that cannot be read is reported
    /// as unreadable instead of failing the listing.
    pub fn list_with_content(&self) -> Result<Vec<NoteEntry>> {
        let entries = self
            .walk()?
            .into_iter()
            .map(|(name, path)| match fs::read_to_string(&path) {
                Ok(content) => NoteEntry::new(name, content),
                Err(e) => {
                    warn!(note = %name, error = %e, "note unreadable during listing");
                    NoteEntry::unreadable(name, e.to_string())
                }
            })
            .collect();
        Ok(entries)
    }

    /// Walk the root for note files, skipping the images directory.
    fn walk(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut found = Vec::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(self.limits.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !(entry.depth() == 1 && entry.file_name() == IMAGES_DIR));

        for entry in walker {
            let entry = entry.map_err(|e| NotesError::Storage(format!("listing notes: {}", e)))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if !entry.file_name().to_string_lossy().ends_with(NOTE_EXTENSION) {
                continue;
            }
            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let Some(name) = name_from_relative(relative) else {
                continue;
            };

            if found.len() >= self.limits.max_notes {
                warn!(
                    limit = self.limits.max_notes,
                    "note listing truncated at max_notes"
                );
                break;
            }
            found.push((name, entry.into_path()));
        }

        Ok(found)
    }
}

/// Move `from` to `to`, failing with `AlreadyExists` instead of replacing
/// an existing destination.
fn move_exclusive(from: &Path, to: &Path) -> io::Result<()> {
    fs::hard_link(from, to)?;
    if let Err(e) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}
