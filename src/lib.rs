pub mod cli;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod search;
pub mod server;
pub mod storage;

pub use client::{Editor, EditorSession, HttpNotes, LocalNotes, NoteApi};
pub use config::Config;
pub use error::{NotesError, Result};
pub use storage::{AttachmentStore, NoteStore};
