use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use gridrights_application::ToggleCommand;
use gridrights_core::UserIdentity;
use gridrights_domain::{MatrixVariant, Subject};

use crate::dto::{
    EditorSnapshotResponse, OpenEditorRequest, OpenEditorResponse, SelectSubjectRequest,
    ToggleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn open_editor_handler(
    State(state): State<AppState>,
    Extension(operator): Extension<UserIdentity>,
    Json(payload): Json<OpenEditorRequest>,
) -> ApiResult<Json<OpenEditorResponse>> {
    let variant = MatrixVariant::from_str(&payload.variant)?;
    let (session_id, editor) = state.editor_registry.open(variant).await;

    let snapshot = if let Some(subject) = payload.subject {
        let selected = match Subject::try_from(subject) {
            Ok(subject) => editor.select_subject(&operator, Some(subject)).await,
            Err(error) => Err(error),
        };
        match selected {
            Ok(snapshot) => snapshot,
            Err(error) => {
                // Do not leave a half-initialized session behind.
                let _ = state.editor_registry.close(session_id).await;
                return Err(error.into());
            }
        }
    } else {
        editor.snapshot().await
    };

    Ok(Json(OpenEditorResponse {
        session_id: session_id.to_string(),
        snapshot: snapshot.into(),
    }))
}

pub async fn get_editor_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<EditorSnapshotResponse>> {
    let editor = state.editor_registry.get(session_id).await?;
    Ok(Json(editor.snapshot().await.into()))
}

pub async fn select_subject_handler(
    State(state): State<AppState>,
    Extension(operator): Extension<UserIdentity>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SelectSubjectRequest>,
) -> ApiResult<Json<EditorSnapshotResponse>> {
    let editor = state.editor_registry.get(session_id).await?;
    let subject = payload.subject.map(Subject::try_from).transpose()?;
    let snapshot = editor.select_subject(&operator, subject).await?;
    Ok(Json(snapshot.into()))
}

pub async fn toggle_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<ToggleRequest>,
) -> ApiResult<Json<EditorSnapshotResponse>> {
    let editor = state.editor_registry.get(session_id).await?;
    let command = ToggleCommand::try_from(payload)?;
    let snapshot = editor.apply(command).await?;
    Ok(Json(snapshot.into()))
}

pub async fn save_handler(
    State(state): State<AppState>,
    Extension(operator): Extension<UserIdentity>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<EditorSnapshotResponse>> {
    let editor = state.editor_registry.get(session_id).await?;
    let snapshot = editor.save(&operator).await?;
    Ok(Json(snapshot.into()))
}

pub async fn reload_handler(
    State(state): State<AppState>,
    Extension(operator): Extension<UserIdentity>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<EditorSnapshotResponse>> {
    let editor = state.editor_registry.get(session_id).await?;
    let snapshot = editor.load(&operator).await?;
    Ok(Json(snapshot.into()))
}

pub async fn close_editor_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.editor_registry.close(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
