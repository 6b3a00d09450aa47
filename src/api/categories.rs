use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::infrastructure::AppState;
use crate::services::category_service;

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    name: String,
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(category_service::list_categories(&state).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let category = category_service::create_category(&state, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
