use std::future::Future;

use crate::config::Config;
use crate::entity::NoteEntry;
use crate::error::Result;
use crate::storage::{AttachmentStore, NoteStore, IMAGES_DIR};

/// The note operations an editor needs from a backend.
pub trait NoteApi: Send + Sync {
    fn save(&self, name: &str, content: &str) -> impl Future<Output = Result<()>> + Send;

    fn open(&self, name: &str) -> impl Future<Output = Result<String>> + Send;

    fn delete(&self, name: &str) -> impl Future<Output = Result<()>> + Send;

    fn rename(&self, old_name: &str, new_name: &str) -> impl Future<Output = Result<()>> + Send;

    fn list(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    fn list_with_content(&self) -> impl Future<Output = Result<Vec<NoteEntry>>> + Send;

    /// Store an image and return the URL to embed.
    fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// In-process backend working directly on a storage root.
#[derive(Debug, Clone)]
pub struct LocalNotes {
    pub store: NoteStore,
    pub attachments: AttachmentStore,
}

impl LocalNotes {
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = NoteStore::new(&config.root, config.list)?;
        let attachments = AttachmentStore::new(
            &store.images_dir(),
            &format!("{}/{}", config.public_prefix, IMAGES_DIR),
        )?;
        Ok(Self { store, attachments })
    }
}

impl NoteApi for LocalNotes {
    async fn save(&self, name: &str, content: &str) -> Result<()> {
        self.store.save(name, content).map(|_| ())
    }

    async fn open(&self, name: &str) -> Result<String> {
        self.store.open(name)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.store.delete(name)
    }

    async fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.store.rename(old_name, new_name).map(|_| ())
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.store.list_names()
    }

    async fn list_with_content(&self) -> Result<Vec<NoteEntry>> {
        self.store.list_with_content()
    }

    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        Ok(self.attachments.store(file_name, &bytes)?.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotesError;
    use tempfile::TempDir;

    fn local(tmp: &TempDir) -> LocalNotes {
        let config = Config {
            root: tmp.path().to_path_buf(),
            ..Config::default()
        };
        LocalNotes::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_local_scenario() {
        let tmp = TempDir::new().unwrap();
        let api = local(&tmp);

        api.save("projects/x", "# Hello").await.unwrap();
        assert!(api.list().await.unwrap().contains(&"projects/x".to_string()));
        assert_eq!(api.open("projects/x").await.unwrap(), "# Hello");

        api.rename("projects/x", "projects/y").await.unwrap();
        assert!(matches!(api.open("projects/x").await, Err(NotesError::NotFound(_))));
        assert_eq!(api.open("projects/y").await.unwrap(), "# Hello");

        api.delete("projects/y").await.unwrap();
        assert!(matches!(api.open("projects/y").await, Err(NotesError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_local_upload_url() {
        let tmp = TempDir::new().unwrap();
        let api = local(&tmp);

        let url = api.upload_image("shot.png", vec![1, 2, 3]).await.unwrap();
        assert!(url.starts_with("/files/images/"));
        assert!(url.ends_with("-shot.png"));
    }
}
