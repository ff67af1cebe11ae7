use axum::Json;
use axum::extract::{Query, State};

use gridrights_domain::SubjectKind;

use crate::dto::SubjectDescriptorResponse;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct SubjectSearchQuery {
    pub query: Option<String>,
}

pub async fn search_users_handler(
    State(state): State<AppState>,
    Query(query): Query<SubjectSearchQuery>,
) -> ApiResult<Json<Vec<SubjectDescriptorResponse>>> {
    let entries = state
        .subject_directory_service
        .search(SubjectKind::User, query.query.as_deref().unwrap_or(""))
        .await?
        .into_iter()
        .map(SubjectDescriptorResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn search_user_groups_handler(
    State(state): State<AppState>,
    Query(query): Query<SubjectSearchQuery>,
) -> ApiResult<Json<Vec<SubjectDescriptorResponse>>> {
    let entries = state
        .subject_directory_service
        .search(SubjectKind::UserGroup, query.query.as_deref().unwrap_or(""))
        .await?
        .into_iter()
        .map(SubjectDescriptorResponse::from)
        .collect();

    Ok(Json(entries))
}
