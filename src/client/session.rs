//! Dirty tracking for the one document an editor holds.

/// A (name, content) pair as it was last persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub name: String,
    pub content: String,
}

impl Snapshot {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocState {
    /// Current name and content equal the last saved snapshot, or no name
    /// is set.
    Clean,
    /// A named document that differs from the last saved snapshot.
    Dirty,
}

/// Editor state for a single document.
///
/// The state is recomputed on every mutation, so an edit that restores the
/// saved text makes the session clean again.
#[derive(Debug, Clone)]
pub struct EditorSession {
    name: String,
    content: String,
    saved: Snapshot,
    state: DocState,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            content: String::new(),
            saved: Snapshot::default(),
            state: DocState::Clean,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn state(&self) -> DocState {
        self.state
    }

    pub fn last_saved(&self) -> &Snapshot {
        &self.saved
    }

    /// Whether a save should be offered: dirty with a non-empty name.
    pub fn can_save(&self) -> bool {
        self.state == DocState::Dirty
    }

    /// The snapshot to send if a save is due.
    pub fn pending(&self) -> Option<Snapshot> {
        self.can_save()
            .then(|| Snapshot::new(self.name.clone(), self.content.clone()))
    }

    /// Names are trimmed the way the name field is read.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.trim().to_string();
        self.refresh();
    }

    pub fn edit_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.refresh();
    }

    /// A note was loaded: it becomes both the current and the saved state.
    pub fn opened(&mut self, name: &str, content: impl Into<String>) {
        self.name = name.trim().to_string();
        self.content = content.into();
        self.saved = Snapshot::new(self.name.clone(), self.content.clone());
        self.state = DocState::Clean;
    }

    /// A save of `sent` succeeded. Edits made after it was sent keep the
    /// session dirty.
    pub fn saved(&mut self, sent: &Snapshot) {
        self.saved = sent.clone();
        self.refresh();
    }

    /// The current note was renamed on the server.
    pub fn renamed(&mut self, new_name: &str) {
        self.name = new_name.trim().to_string();
        self.saved.name = self.name.clone();
        self.refresh();
    }

    fn refresh(&mut self) {
        let differs = self.name != self.saved.name || self.content != self.saved.content;
        self.state = if !self.name.is_empty() && differs {
            DocState::Dirty
        } else {
            DocState::Clean
        };
    }
}
