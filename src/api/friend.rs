use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::{ApiError, ApiResult};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::friendship_service::{self, RespondOutcome};

#[derive(Debug, Deserialize, Default)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<i32>,
}

impl UserQuery {
    /// Explicit `userId`, else the caller
    fn resolve(&self, claims: &Claims) -> i32 {
        self.user_id.unwrap_or(claims.user_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct FriendRequestBody {
    #[serde(rename = "senderId")]
    pub sender_id: Option<i32>,
    #[serde(rename = "receiverId")]
    pub receiver_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RespondBody {
    #[serde(rename = "requestId")]
    pub request_id: Option<i32>,
    #[serde(default)]
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub id: Option<i32>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<i32>,
}

fn require_id(id: Option<i32>) -> Result<i32, ApiError> {
    id.ok_or_else(|| ApiError::BadRequest("Friendship ID is required".to_string()))
}

pub async fn send_request(
    State(state): State<AppState>,
    Json(body): Json<FriendRequestBody>,
) -> ApiResult<impl IntoResponse> {
    let request = friendship_service::send_request(&state, body.sender_id, body.receiver_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Friend request sent", "request": request })),
    ))
}

pub async fn list_pending(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<UserQuery>,
) -> ApiResult<impl IntoResponse> {
    let pending = friendship_service::list_pending(&state, query.resolve(&claims)).await?;
    Ok(Json(pending))
}

pub async fn respond(
    State(state): State<AppState>,
    Json(body): Json<RespondBody>,
) -> ApiResult<impl IntoResponse> {
    let outcome = friendship_service::respond(&state, body.request_id, &body.action).await?;
    let message = match &outcome {
        RespondOutcome::Accepted { .. } => "Friend request accepted",
        RespondOutcome::Rejected { .. } => "Friend request rejected",
    };
    Ok(Json(json!({ "message": message, "result": outcome })))
}

pub async fn list_friends(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<UserQuery>,
) -> ApiResult<impl IntoResponse> {
    let friends = friendship_service::list_friends(&state, query.resolve(&claims)).await?;
    Ok(Json(friends))
}

pub async fn list_friendships(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<UserQuery>,
) -> ApiResult<impl IntoResponse> {
    let rows = friendship_service::list_for_user(&state, query.resolve(&claims)).await?;
    Ok(Json(rows))
}

pub async fn update_friendship(
    State(state): State<AppState>,
    Json(body): Json<UpdateStatusBody>,
) -> ApiResult<impl IntoResponse> {
    let id = require_id(body.id)?;
    match friendship_service::update_status(&state, id, &body.status).await? {
        Some(friendship) => Ok(Json(json!({ "friendship": friendship }))),
        None => Ok(Json(json!({ "message": "Friendship removed" }))),
    }
}

pub async fn delete_friendship(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<impl IntoResponse> {
    friendship_service::delete(&state, require_id(query.id)?).await?;
    Ok(Json(json!({ "message": "Friendship deleted" })))
}
