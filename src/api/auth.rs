use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiResult;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::{clear_cookie, session_cookie, token_from_headers};
use crate::services::auth_service;

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    username: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize, Default)]
pub struct ValidateRequest {
    token: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let user =
        auth_service::register(&state, &payload.email, &payload.password, &payload.username)
            .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = auth_service::login(&state, &payload.email, &payload.password).await?;
    let cookie = session_cookie(&outcome.token, state.config.jwt.expires_in);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(outcome),
    ))
}

pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_cookie())],
        Json(json!({ "message": "Logged out" })),
    )
}

/// Token from the JSON body, else the bearer header, else the cookie
pub async fn validate(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Option<Json<ValidateRequest>>,
) -> ApiResult<impl IntoResponse> {
    let token = payload
        .and_then(|Json(body)| body.token)
        .filter(|t| !t.trim().is_empty())
        .or_else(|| token_from_headers(&headers))
        .unwrap_or_default();

    let claims = auth_service::validate_token(&state, &token)?;
    Ok(Json(json!({ "valid": true, "user": claims })))
}
