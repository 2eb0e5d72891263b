mod attachment_store;
mod note_store;
pub mod path;

pub use attachment_store::{sanitize_filename, AttachmentStore};
pub use note_store::{NoteStore, IMAGES_DIR};
