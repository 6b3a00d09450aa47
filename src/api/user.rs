use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Deserializer};

use crate::api::error::ApiResult;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::user_service::{self, ProfileUpdate};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
    #[serde(rename = "userId")]
    pub user_id: Option<i32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    /// Absent leaves the photo alone; `null` clears it
    #[serde(default, deserialize_with = "present")]
    pub photo_url: Option<Option<String>>,
}

/// Distinguish an explicit `null` from a missing key
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(user_service::get_profile(&state, id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let update = ProfileUpdate {
        email: payload.email,
        username: payload.username,
        photo_url: payload.photo_url,
    };
    Ok(Json(user_service::update_profile(&state, id, update).await?))
}

pub async fn search_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let searcher = query.user_id.unwrap_or(claims.user_id);
    Ok(Json(
        user_service::search_users(&state, &query.query, searcher).await?,
    ))
}
