// src/entity/note.rs
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{NotesError, Result};
use crate::storage::path::sanitize;

/// A sanitized, `/`-delimited note name.
///
/// Two notes are the same entity iff their sanitized names are byte-equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NoteName(String);

impl NoteName {
    /// Sanitize a user-supplied name. Empty input, or input with no
    /// non-separator characters, is `MissingName`.
    pub fn parse(raw: &str) -> Result<Self> {
        let sanitized = sanitize(raw);
        if sanitized.is_empty() {
            return Err(NotesError::MissingName);
        }
        Ok(Self(sanitized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Folder part of the name, if the note is not at the root.
    pub fn folder(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(folder, _)| folder)
    }

    pub fn leaf(&self) -> &str {
        self.0.rsplit_once('/').map(|(_, leaf)| leaf).unwrap_or(self.0.as_str())
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NoteName {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NoteName::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Content of a listed note: the text, or why it could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteContent {
    Text(String),
    Unreadable(String),
}

impl NoteContent {
    pub fn text(&self) -> Option<&str> {
        match self {
            NoteContent::Text(text) => Some(text),
            NoteContent::Unreadable(_) => None,
        }
    }
}

/// One note as returned by list-with-content.
///
/// The name is the on-disk relative path without the suffix, which is not
/// necessarily a sanitized name for files created outside the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    pub name: String,
    pub content: NoteContent,
}

impl NoteEntry {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: NoteContent::Text(content.into()),
        }
    }

    pub fn unreadable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: NoteContent::Unreadable(reason.into()),
        }
    }
}

impl Serialize for NoteEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match &self.content {
            NoteContent::Text(text) => {
                let mut state = serializer.serialize_struct("NoteEntry", 2)?;
                state.serialize_field("name", &self.name)?;
                state.serialize_field("content", text)?;
                state.end()
            }
            NoteContent::Unreadable(reason) => {
                let mut state = serializer.serialize_struct("NoteEntry", 3)?;
                state.serialize_field("name", &self.name)?;
                state.serialize_field("content", &Option::<String>::None)?;
                state.serialize_field("error", reason)?;
                state.end()
            }
        }
    }
}

#[derive(Deserialize)]
struct RawEntry {
    name: String,
    content: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl<'de> Deserialize<'de> for NoteEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawEntry::deserialize(deserializer)?;
        Ok(match raw.content {
            Some(text) => NoteEntry::new(raw.name, text),
            None => NoteEntry::unreadable(
                raw.name,
                raw.error.unwrap_or_else(|| "unreadable".to_string()),
            ),
        })
    }
}
