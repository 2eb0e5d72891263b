//! Editor-side logic: dirty tracking, serialized saves and autosave.

mod api;
mod editor;
mod http;
mod session;

pub use api::{LocalNotes, NoteApi};
pub use editor::{Editor, SaveOutcome};
pub use http::HttpNotes;
pub use session::{DocState, EditorSession, Snapshot};
