use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::{ApiError, ApiResult};
use crate::api::friend::{IdQuery, UserQuery};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::recommendation_service::{self, RecommendInput};

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(rename = "bookId")]
    pub book_id: Option<i32>,
    #[serde(rename = "senderId")]
    pub sender_id: Option<i32>,
    #[serde(rename = "receiverId")]
    pub receiver_id: Option<i32>,
    pub message: Option<String>,
}

pub async fn list_recommendations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<UserQuery>,
) -> ApiResult<impl IntoResponse> {
    let user_id = query.user_id.unwrap_or(claims.user_id);
    Ok(Json(
        recommendation_service::list_received(&state, user_id).await?,
    ))
}

pub async fn create_recommendation(
    State(state): State<AppState>,
    Json(body): Json<RecommendRequest>,
) -> ApiResult<impl IntoResponse> {
    let recommendation = recommendation_service::recommend(
        &state,
        RecommendInput {
            book_id: body.book_id,
            sender_id: body.sender_id,
            receiver_id: body.receiver_id,
            message: body.message,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(recommendation)))
}

pub async fn delete_recommendation(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<impl IntoResponse> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Recommendation ID is required".to_string()))?;
    recommendation_service::delete(&state, id).await?;
    Ok(Json(json!({ "message": "Recommendation deleted" })))
}
