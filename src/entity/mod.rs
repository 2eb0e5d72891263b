mod attachment;
mod note;
mod tree;

pub use attachment::Attachment;
pub use note::{NoteContent, NoteEntry, NoteName};
pub use tree::{NoteTree, TreeNode};
