//! JSON client for a running server.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::{json, Value};

use super::api::NoteApi;
use crate::entity::NoteEntry;
use crate::error::{NotesError, Result};

#[derive(Deserialize)]
struct ContentBody {
    content: String,
}

#[derive(Deserialize)]
struct NotesBody<T> {
    notes: Vec<T>,
}

#[derive(Deserialize)]
struct UrlBody {
    url: String,
}

/// Client for the `/api/*` endpoints.
#[derive(Debug, Clone)]
pub struct HttpNotes {
    client: Client,
    base_url: String,
}

impl HttpNotes {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body: Value = response.json().await?;

        if body.get("success").and_then(Value::as_bool) == Some(true) {
            return Ok(serde_json::from_value(body)?);
        }
        Err(remote_error(status, &body))
    }
}

/// Turn a `{success: false, error, error_type}` body back into a typed error.
pub(crate) fn remote_error(status: u16, body: &Value) -> NotesError {
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("Unknown error")
        .to_string();

    match body.get("error_type").and_then(Value::as_str) {
        Some("MissingName") => NotesError::MissingName,
        Some("InvalidPath") => NotesError::InvalidPath(message),
        Some("NotFound") => NotesError::NotFound(message),
        Some("Conflict") => NotesError::Conflict(message),
        Some("StorageError") => NotesError::Storage(message),
        _ => NotesError::Remote { status, message },
    }
}

impl NoteApi for HttpNotes {
    async fn save(&self, name: &str, content: &str) -> Result<()> {
        let request = self
            .client
            .post(self.url("/api/save"))
            .json(&json!({ "name": name, "content": content }));
        self.call::<IgnoredAny>(request).await.map(|_| ())
    }

    async fn open(&self, name: &str) -> Result<String> {
        let request = self
            .client
            .post(self.url("/api/open"))
            .json(&json!({ "name": name }));
        Ok(self.call::<ContentBody>(request).await?.content)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let request = self
            .client
            .post(self.url("/api/delete"))
            .json(&json!({ "name": name }));
        self.call::<IgnoredAny>(request).await.map(|_| ())
    }

    async fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        let request = self
            .client
            .post(self.url("/api/rename"))
            .json(&json!({ "oldName": old_name, "newName": new_name }));
        self.call::<IgnoredAny>(request).await.map(|_| ())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let request = self.client.get(self.url("/api/list"));
        Ok(self.call::<NotesBody<String>>(request).await?.notes)
    }

    async fn list_with_content(&self) -> Result<Vec<NoteEntry>> {
        let request = self.client.get(self.url("/api/list-with-content"));
        Ok(self.call::<NotesBody<NoteEntry>>(request).await?.notes)
    }

    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("image", part);
        let request = self.client.post(self.url("/api/upload-image")).multipart(form);
        Ok(self.call::<UrlBody>(request).await?.url)
    }
}
