//! Search module for filtering listed notes by name, content and folder.

use crate::entity::{NoteContent, NoteEntry};

/// Parsed search filter from query string.
///
/// Filters can be specified in the query string using prefixes:
/// - `folder:projects` - Only notes under the `projects` folder
///   (can specify multiple, a note matching any of them is kept)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    /// Folder prefixes, without leading or trailing `/`
    pub folders: Vec<String>,
}

impl SearchFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if filter has any constraints.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    fn admits(&self, name: &str) -> bool {
        self.is_empty()
            || self.folders.iter().any(|folder| {
                name.strip_prefix(folder.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
            })
    }
}

/// Parse a raw query string into (remaining query text, filters).
///
/// # Examples
///
/// ```ignore
/// let (query, filter) = parse_query("folder:projects roadmap");
/// assert_eq!(query, "roadmap");
/// assert_eq!(filter.folders, vec!["projects".to_string()]);
/// ```
pub fn parse_query(raw: &str) -> (String, SearchFilter) {
    let mut filter = SearchFilter::default();
    let mut remaining = Vec::new();

    for token in raw.split_whitespace() {
        if let Some(value) = token.strip_prefix("folder:") {
            let folder = value.trim_matches('/');
            if !folder.is_empty() {
                filter.folders.push(folder.to_string());
            }
        } else {
            remaining.push(token);
        }
    }

    (remaining.join(" "), filter)
}

/// Keep the entries whose name or content contains the query text
/// (case-insensitive) and that pass the folder filter.
pub fn filter_notes(entries: Vec<NoteEntry>, raw_query: &str) -> Vec<NoteEntry> {
    let (text, filter) = parse_query(raw_query);
    let needle = text.to_lowercase();

    entries
        .into_iter()
        .filter(|entry| filter.admits(&entry.name))
        .filter(|entry| {
            if needle.is_empty() {
                return true;
            }
            if entry.name.to_lowercase().contains(&needle) {
                return true;
            }
            match &entry.content {
                NoteContent::Text(content) => content.to_lowercase().contains(&needle),
                NoteContent::Unreadable(_) => false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<NoteEntry> {
        vec![
            NoteEntry::new("projects/roadmap", "# Q3 Plans"),
            NoteEntry::new("projects/archive/old", "nothing here"),
            NoteEntry::new("journal/2025-01-01", "Started the ROADMAP draft"),
            NoteEntry::unreadable("broken", "invalid UTF-8"),
        ]
    }

    fn names(entries: &[NoteEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_parse_query_no_filters() {
        let (query, filter) = parse_query("hello world");
        assert_eq!(query, "hello world");
        assert!(filter.is_empty());
    }

    #[test]
    fn test_parse_query_folder_filters() {
        let (query, filter) = parse_query("folder:/projects/ folder:journal plans");
        assert_eq!(query, "plans");
        assert_eq!(filter.folders, vec!["projects".to_string(), "journal".to_string()]);
    }

    #[test]
    fn test_parse_query_only_filters() {
        let (query, filter) = parse_query("folder:projects");
        assert_eq!(query, "");
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_empty_query_keeps_everything() {
        assert_eq!(filter_notes(sample(), "").len(), 4);
    }

    #[test]
    fn test_matches_name_or_content_case_insensitively() {
        let found = filter_notes(sample(), "roadmap");
        assert_eq!(names(&found), vec!["projects/roadmap", "journal/2025-01-01"]);

        let found = filter_notes(sample(), "q3 PLANS");
        assert_eq!(names(&found), vec!["projects/roadmap"]);
    }

    #[test]
    fn test_folder_filter() {
        let found = filter_notes(sample(), "folder:projects");
        assert_eq!(names(&found), vec!["projects/roadmap", "projects/archive/old"]);

        let found = filter_notes(sample(), "folder:proj");
        assert!(found.is_empty());
    }

    #[test]
    fn test_unreadable_notes_match_by_name_only() {
        assert_eq!(names(&filter_notes(sample(), "broken")), vec!["broken"]);
        assert!(filter_notes(sample(), "UTF").is_empty());
    }
}
