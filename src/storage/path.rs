//! Mapping from user-supplied note names to files under the storage root.

use std::path::{Path, PathBuf};

use crate::error::{NotesError, Result};

/// File suffix of every note on disk.
pub const NOTE_EXTENSION: &str = ".md";

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Sanitize a hierarchical note name.
///
/// Splits on `/`, drops empty segments and rewrites every character outside
/// `[A-Za-z0-9_-]` to `_`. Dots are rewritten too, so `..` becomes `__`.
pub fn sanitize(raw: &str) -> String {
    raw.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .chars()
                .map(|c| if is_allowed(c) { c } else { '_' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve an already sanitized name to `<root>/<name>.md`.
///
/// Fails with `InvalidPath` if the result is not a descendant of `root`.
pub fn resolve(root: &Path, sanitized: &str) -> Result<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in sanitized.split('/') {
        path.push(segment);
    }
    let file_name = match path.file_name() {
        Some(name) => format!("{}{}", name.to_string_lossy(), NOTE_EXTENSION),
        None => return Err(NotesError::InvalidPath(sanitized.to_string())),
    };
    path.set_file_name(file_name);

    if path == root || !path.starts_with(root) {
        return Err(NotesError::InvalidPath(sanitized.to_string()));
    }
    Ok(path)
}

/// Turn a path relative to the root (with the `.md` suffix) back into a
/// `/`-joined note name.
pub fn name_from_relative(relative: &Path) -> Option<String> {
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let joined = parts.join("/");
    joined
        .strip_suffix(NOTE_EXTENSION)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain_name() {
        assert_eq!(sanitize("projects/x"), "projects/x");
        assert_eq!(sanitize("My-Note_1"), "My-Note_1");
    }

    #[test]
    fn test_sanitize_collapses_separators() {
        assert_eq!(sanitize("//a///b/"), "a/b");
        assert_eq!(sanitize("///"), "");
    }

    #[test]
    fn test_sanitize_rewrites_disallowed_characters() {
        assert_eq!(sanitize("meeting notes.v2"), "meeting_notes_v2");
        assert_eq!(sanitize("café"), "caf_");
        assert_eq!(sanitize("a\\b"), "a_b");
    }

    #[test]
    fn test_sanitize_rewrites_traversal() {
        assert_eq!(sanitize("../secret"), "__/secret");
        assert_eq!(sanitize("a/../../b"), "a/__/__/b");
        assert_eq!(sanitize("."), "_");
    }

    #[test]
    fn test_sanitize_output_alphabet() {
        let inputs = ["../../etc/passwd", "a b/c?d", "~/x", "\u{0}/\u{7f}", "ok/name-1"];
        for input in inputs {
            let out = sanitize(input);
            assert!(
                out.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/')),
                "unexpected character in {:?}",
                out
            );
        }
    }

    #[test]
    fn test_resolve_appends_extension() {
        let root = Path::new("/srv/notes");
        let path = resolve(root, "projects/x").unwrap();
        assert_eq!(path, Path::new("/srv/notes/projects/x.md"));
    }

    #[test]
    fn test_resolve_stays_under_root() {
        let root = Path::new("/srv/notes");
        for raw in ["../secret", "../../../../etc/passwd", "a/./b", "/abs"] {
            let path = resolve(root, &sanitize(raw)).unwrap();
            assert!(path.starts_with(root), "{:?} escaped", path);
        }
    }

    #[test]
    fn test_resolve_rejects_unsanitized_traversal() {
        let root = Path::new("/srv/notes");
        assert!(matches!(
            resolve(root, ".."),
            Err(NotesError::InvalidPath(_))
        ));
        assert!(matches!(resolve(root, ""), Err(NotesError::InvalidPath(_))));
    }

    #[test]
    fn test_name_from_relative() {
        assert_eq!(
            name_from_relative(Path::new("projects/x.md")),
            Some("projects/x".to_string())
        );
        assert_eq!(name_from_relative(Path::new("x.txt")), None);
        assert_eq!(name_from_relative(Path::new(".md")), None);
    }
}
