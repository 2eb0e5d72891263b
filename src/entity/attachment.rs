use serde::{Deserialize, Serialize};

/// An uploaded binary stored under the reserved images directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name inside the images directory.
    pub file_name: String,
    /// Relative URL for embedding in Markdown.
    pub url: String,
}

impl Attachment {
    /// Markdown image reference for this attachment.
    pub fn markdown(&self, alt: &str) -> String {
        format!("![{}]({})", alt, self.url)
    }
}
