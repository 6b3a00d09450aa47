use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiResult;
use crate::api::form::read_book_form;
use crate::infrastructure::AppState;
use crate::services::book_service::{self, ListBooksQuery};

#[derive(Debug, Deserialize, Default)]
pub struct ListBooksParams {
    #[serde(rename = "userId")]
    pub user_id: Option<i32>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub category: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_place: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    pub language: Option<String>,
    pub query: Option<String>,
}

impl From<ListBooksParams> for ListBooksQuery {
    fn from(p: ListBooksParams) -> Self {
        Self {
            user_id: p.user_id,
            page: p.page,
            limit: p.limit,
            category: p.category,
            isbn: p.isbn,
            publisher: p.publisher,
            publication_place: p.publication_place,
            status: p.status,
            title: p.title,
            language: p.language,
            query: p.query,
        }
    }
}

pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<ListBooksParams>,
) -> ApiResult<impl IntoResponse> {
    let listing = book_service::list_books(&state, params.into()).await?;
    Ok(Json(listing))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(book_service::get_book(&state, id).await?))
}

pub async fn create_book(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = read_book_form(multipart).await?;
    let book = book_service::create_book(&state, form).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = read_book_form(multipart).await?;
    Ok(Json(book_service::update_book(&state, id, form).await?))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    book_service::delete_book(&state, id).await?;
    Ok(Json(json!({ "message": "Book deleted successfully" })))
}
