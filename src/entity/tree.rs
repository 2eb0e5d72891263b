use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A node of the folder tree built from flat note names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Folder {
        name: String,
        path: String,
        children: Vec<TreeNode>,
    },
    Note {
        name: String,
        path: String,
    },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder { name, .. } | TreeNode::Note { name, .. } => name,
        }
    }
}

#[derive(Default)]
struct Builder {
    folders: BTreeMap<String, Builder>,
    notes: Vec<String>,
}

impl Builder {
    fn insert(&mut self, segments: &[&str]) {
        match segments {
            [] => {}
            [leaf] => {
                if !self.notes.iter().any(|n| n == leaf) {
                    self.notes.push(leaf.to_string());
                }
            }
            [folder, rest @ ..] => self
                .folders
                .entry(folder.to_string())
                .or_default()
                .insert(rest),
        }
    }

    fn build(mut self, prefix: &str) -> Vec<TreeNode> {
        let join = |name: &str| {
            if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", prefix, name)
            }
        };

        let mut nodes = Vec::with_capacity(self.folders.len() + self.notes.len());
        for (name, child) in self.folders {
            let path = join(&name);
            nodes.push(TreeNode::Folder {
                children: child.build(&path),
                name,
                path,
            });
        }
        self.notes.sort();
        for name in self.notes {
            let path = join(&name);
            nodes.push(TreeNode::Note { name, path });
        }
        nodes
    }
}

/// Folder tree over a set of note names: folders first, then notes, each
/// level sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteTree {
    pub children: Vec<TreeNode>,
}

impl NoteTree {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = Builder::default();
        for name in names {
            let segments: Vec<&str> = name
                .as_ref()
                .split('/')
                .filter(|s| !s.is_empty())
                .collect();
            root.insert(&segments);
        }
        Self {
            children: root.build(""),
        }
    }

    /// Every folder path containing at least one note, depth first.
    pub fn folders(&self) -> Vec<String> {
        fn walk(nodes: &[TreeNode], out: &mut Vec<String>) {
            for node in nodes {
                if let TreeNode::Folder { path, children, .. } = node {
                    out.push(path.clone());
                    walk(children, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.children, &mut out);
        out
    }

    /// Render as an indented outline for terminal output.
    pub fn render(&self) -> String {
        fn walk(nodes: &[TreeNode], depth: usize, out: &mut String) {
            for node in nodes {
                let indent = "  ".repeat(depth);
                match node {
                    TreeNode::Folder { name, children, .. } => {
                        out.push_str(&format!("{}{}/\n", indent, name));
                        walk(children, depth + 1, out);
                    }
                    TreeNode::Note { name, .. } => {
                        out.push_str(&format!("{}{}\n", indent, name));
                    }
                }
            }
        }
        let mut out = String::new();
        walk(&self.children, 0, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_folders_before_notes() {
        let tree = NoteTree::from_names(["zeta", "projects/x", "alpha", "projects/sub/y"]);
        let names: Vec<&str> = tree.children.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["projects", "alpha", "zeta"]);

        match &tree.children[0] {
            TreeNode::Folder { path, children, .. } => {
                assert_eq!(path, "projects");
                assert_eq!(children.len(), 2);
                assert!(matches!(&children[0], TreeNode::Folder { path, .. } if path == "projects/sub"));
                assert!(matches!(&children[1], TreeNode::Note { path, .. } if path == "projects/x"));
            }
            other => panic!("Expected folder, got {:?}", other),
        }
    }

    #[test]
    fn test_tree_note_and_folder_with_same_name() {
        let tree = NoteTree::from_names(["a", "a/b"]);
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.folders(), vec!["a".to_string()]);
    }

    #[test]
    fn test_folders_are_nested_paths() {
        let tree = NoteTree::from_names(["a/b/c", "a/d", "e/f"]);
        assert_eq!(
            tree.folders(),
            vec!["a".to_string(), "a/b".to_string(), "e".to_string()]
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        let tree = NoteTree::from_names(["x", "x"]);
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn test_render_outline() {
        let tree = NoteTree::from_names(["projects/x", "inbox"]);
        assert_eq!(tree.render(), "projects/\n  x\ninbox\n");
    }
}
