use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::error::{ApiError, Operation};
use super::AppState;
use crate::entity::{NoteEntry, NoteTree};
use crate::error::{NotesError, Result};
use crate::search::filter_notes;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Multipart field carrying an uploaded image.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    #[serde(default)]
    pub old_name: Option<String>,
    #[serde(default)]
    pub new_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct NotesResponse<T> {
    pub success: bool,
    pub notes: Vec<T>,
}

impl<T> NotesResponse<T> {
    fn new(notes: Vec<T>) -> Json<Self> {
        Json(Self {
            success: true,
            notes,
        })
    }
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> std::result::Result<T, ApiError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        })
}

/// Run filesystem work off the async workers.
async fn blocking<T, F>(op: Operation, state: &AppState, f: F) -> std::result::Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| ApiError::from_store(op, NotesError::Storage(e.to_string())))?
        .map_err(|e| ApiError::from_store(op, e))
}

fn ok() -> Json<Value> {
    Json(json!({ "success": true }))
}

pub async fn save_note(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SaveRequest>, JsonRejection>,
) -> std::result::Result<Json<Value>, ApiError> {
    let request = body(payload)?;
    let name = request.name.unwrap_or_default();
    blocking(Operation::Save, &state, move |state| {
        state.store.save(&name, &request.content)
    })
    .await?;
    Ok(ok())
}

pub async fn open_note(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NameRequest>, JsonRejection>,
) -> std::result::Result<Json<Value>, ApiError> {
    let name = body(payload)?.name.unwrap_or_default();
    let content = blocking(Operation::Open, &state, move |state| state.store.open(&name)).await?;
    Ok(Json(json!({ "success": true, "content": content })))
}

pub async fn delete_note(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NameRequest>, JsonRejection>,
) -> std::result::Result<Json<Value>, ApiError> {
    let name = body(payload)?.name.unwrap_or_default();
    blocking(Operation::Delete, &state, move |state| state.store.delete(&name)).await?;
    Ok(ok())
}

pub async fn rename_note(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RenameRequest>, JsonRejection>,
) -> std::result::Result<Json<Value>, ApiError> {
    let request = body(payload)?;
    let old_name = request.old_name.unwrap_or_default();
    let new_name = request.new_name.unwrap_or_default();
    blocking(Operation::Rename, &state, move |state| {
        state.store.rename(&old_name, &new_name)
    })
    .await?;
    Ok(ok())
}

pub async fn list_notes(
    State(state): State<AppState>,
) -> std::result::Result<Json<NotesResponse<String>>, ApiError> {
    let names = blocking(Operation::List, &state, |state| state.store.list_names()).await?;
    Ok(NotesResponse::new(names))
}

pub async fn list_with_content(
    State(state): State<AppState>,
) -> std::result::Result<Json<NotesResponse<NoteEntry>>, ApiError> {
    let entries = blocking(Operation::List, &state, |state| state.store.list_with_content()).await?;
    Ok(NotesResponse::new(entries))
}

pub async fn search_notes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> std::result::Result<Json<NotesResponse<NoteEntry>>, ApiError> {
    let entries = blocking(Operation::List, &state, |state| state.store.list_with_content()).await?;
    let matches = filter_notes(entries, &params.q);
    debug!(query = %params.q, matches = matches.len(), "search");
    Ok(NotesResponse::new(matches))
}

pub async fn note_tree(
    State(state): State<AppState>,
) -> std::result::Result<Json<Value>, ApiError> {
    let names = blocking(Operation::List, &state, |state| state.store.list_names()).await?;
    let tree = NoteTree::from_names(&names);
    Ok(Json(json!({ "success": true, "tree": tree })))
}

pub async fn list_folders(
    State(state): State<AppState>,
) -> std::result::Result<Json<Value>, ApiError> {
    let names = blocking(Operation::List, &state, |state| state.store.list_names()).await?;
    let folders = NoteTree::from_names(&names).folders();
    Ok(Json(json!({ "success": true, "folders": folders })))
}

pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> std::result::Result<Json<Value>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| ApiError::Rejected {
        status: err.status(),
        message: format!("invalid multipart payload: {}", err.body_text()),
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|err| ApiError::Rejected {
            status: err.status(),
            message: format!("invalid image field: {}", err.body_text()),
        })?;
        upload = Some((file_name, bytes.to_vec()));
    }

    let (file_name, bytes) = upload.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let attachment = blocking(Operation::Upload, &state, move |state| {
        state.attachments.store(&file_name, &bytes)
    })
    .await?;

    Ok(Json(json!({ "success": true, "url": attachment.url })))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let note_count = blocking(Operation::List, &state, |state| state.store.list_names())
        .await
        .map(|names| names.len())
        .ok();

    Json(json!({
        "status": "ok",
        "server": "toastnotes",
        "version": SERVER_VERSION,
        "note_count": note_count,
    }))
}
